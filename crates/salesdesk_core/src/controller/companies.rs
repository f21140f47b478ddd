//! Companies page controller.
//!
//! Loads companies together with contacts and deals, both for the table
//! aggregates and for the client-side referential-integrity delete guard.

use crate::controller::{batch_failure, EntityPage, RemoveOutcome};
use crate::model::company::{Company, CompanyDraft};
use crate::model::contact::Contact;
use crate::model::deal::Deal;
use crate::model::EntityId;
use crate::notify::Notifier;
use crate::repo::EntityRepository;
use log::warn;
use std::sync::Arc;

/// Reference collections backing the aggregates and the delete guard.
#[derive(Debug, Default)]
pub struct CompanyRefs {
    pub contacts: Vec<Contact>,
    pub deals: Vec<Deal>,
}

pub struct CompaniesPage<R, RC, RD>
where
    R: EntityRepository<Company>,
    RC: EntityRepository<Contact>,
    RD: EntityRepository<Deal>,
{
    list: EntityPage<Company, CompanyDraft, R, CompanyRefs>,
    contacts: RC,
    deals: RD,
}

impl<R, RC, RD> CompaniesPage<R, RC, RD>
where
    R: EntityRepository<Company>,
    RC: EntityRepository<Contact>,
    RD: EntityRepository<Deal>,
{
    pub fn new(companies: R, contacts: RC, deals: RD, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            list: EntityPage::new(companies, notifier),
            contacts,
            deals,
        }
    }

    pub fn list(&self) -> &EntityPage<Company, CompanyDraft, R, CompanyRefs> {
        &self.list
    }

    /// Batched page load; re-run for the retry affordance.
    pub async fn load(&self) {
        let generation = self.list.begin_load().await;

        let (companies, contacts, deals) = tokio::join!(
            self.list.fetch(),
            self.contacts.get_all(),
            self.deals.get_all()
        );

        let outcome = match (companies, contacts, deals) {
            (Ok(companies), Ok(contacts), Ok(deals)) => {
                Ok((companies, CompanyRefs { contacts, deals }))
            }
            (companies, contacts, deals) => Err(batch_failure(vec![
                companies.err(),
                contacts.err(),
                deals.err(),
            ])),
        };

        self.list.finish_load(generation, outcome).await;
    }

    /// Deletes a company unless dependent records still reference it.
    ///
    /// The guard runs entirely client-side: when any loaded contact or
    /// deal points at the company, the repository is never called.
    pub async fn remove(&self, id: EntityId) -> RemoveOutcome {
        let blocked = self
            .list
            .read(|state| {
                state
                    .refs
                    .contacts
                    .iter()
                    .any(|contact| contact.company_id == Some(id))
                    || state.refs.deals.iter().any(|deal| deal.company_id == Some(id))
            })
            .await;

        if blocked {
            warn!(
                "event=entity_delete module=controller entity=company status=refused id={id} reason=referential_conflict"
            );
            self.list
                .notifier()
                .error("Cannot delete company with associated contacts or deals");
            return RemoveOutcome::Refused;
        }

        self.list.remove(id).await
    }

    pub async fn contact_count(&self, company_id: EntityId) -> usize {
        self.list
            .read(|state| {
                state
                    .refs
                    .contacts
                    .iter()
                    .filter(|contact| contact.company_id == Some(company_id))
                    .count()
            })
            .await
    }

    pub async fn deal_count(&self, company_id: EntityId) -> usize {
        self.list
            .read(|state| {
                state
                    .refs
                    .deals
                    .iter()
                    .filter(|deal| deal.company_id == Some(company_id))
                    .count()
            })
            .await
    }

    /// Summed value of every deal attached to the company.
    pub async fn total_deal_value(&self, company_id: EntityId) -> f64 {
        self.list
            .read(|state| {
                state
                    .refs
                    .deals
                    .iter()
                    .filter(|deal| deal.company_id == Some(company_id))
                    .map(|deal| deal.value)
                    .sum()
            })
            .await
    }
}
