//! Leads page controller.

use crate::controller::{batch_failure, EntityPage};
use crate::model::company::Company;
use crate::model::contact::Contact;
use crate::model::lead::{Lead, LeadDraft, LeadStatus};
use crate::model::EntityId;
use crate::notify::Notifier;
use crate::repo::EntityRepository;
use std::sync::Arc;

/// Reference collections the leads table resolves names against.
#[derive(Debug, Default)]
pub struct LeadRefs {
    pub companies: Vec<Company>,
    pub contacts: Vec<Contact>,
}

pub struct LeadsPage<R, RC, RCt>
where
    R: EntityRepository<Lead>,
    RC: EntityRepository<Company>,
    RCt: EntityRepository<Contact>,
{
    list: EntityPage<Lead, LeadDraft, R, LeadRefs>,
    companies: RC,
    contacts: RCt,
}

impl<R, RC, RCt> LeadsPage<R, RC, RCt>
where
    R: EntityRepository<Lead>,
    RC: EntityRepository<Company>,
    RCt: EntityRepository<Contact>,
{
    pub fn new(leads: R, companies: RC, contacts: RCt, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            list: EntityPage::new(leads, notifier),
            companies,
            contacts,
        }
    }

    pub fn list(&self) -> &EntityPage<Lead, LeadDraft, R, LeadRefs> {
        &self.list
    }

    /// Batched page load; re-run for the retry affordance.
    pub async fn load(&self) {
        let generation = self.list.begin_load().await;

        let (leads, companies, contacts) = tokio::join!(
            self.list.fetch(),
            self.companies.get_all(),
            self.contacts.get_all()
        );

        let outcome = match (leads, companies, contacts) {
            (Ok(leads), Ok(companies), Ok(contacts)) => {
                Ok((leads, LeadRefs { companies, contacts }))
            }
            (leads, companies, contacts) => Err(batch_failure(vec![
                leads.err(),
                companies.err(),
                contacts.err(),
            ])),
        };

        self.list.finish_load(generation, outcome).await;
    }

    /// Narrows the table to one status; `None` shows every status.
    pub async fn filter_status(&self, status: Option<LeadStatus>) {
        self.list
            .set_filter(status.map(|status| status.label().to_string()))
            .await;
    }

    /// Resolves a company reference, dangling-safe.
    pub async fn company_name(&self, company_id: Option<EntityId>) -> String {
        self.list
            .read(|state| {
                company_id
                    .and_then(|id| state.refs.companies.iter().find(|company| company.id == id))
                    .map(|company| company.name.clone())
                    .unwrap_or_else(|| "N/A".to_string())
            })
            .await
    }

    /// Resolves a contact reference, dangling-safe.
    pub async fn contact_name(&self, contact_id: Option<EntityId>) -> String {
        self.list
            .read(|state| {
                contact_id
                    .and_then(|id| state.refs.contacts.iter().find(|contact| contact.id == id))
                    .map(|contact| contact.name.clone())
                    .unwrap_or_else(|| "N/A".to_string())
            })
            .await
    }
}
