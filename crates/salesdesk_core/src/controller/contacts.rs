//! Contacts page controller.
//!
//! Loads contacts together with the companies and team members the table
//! columns resolve against.

use crate::controller::{batch_failure, EntityPage};
use crate::model::company::Company;
use crate::model::contact::{Contact, ContactDraft};
use crate::model::team_member::TeamMember;
use crate::model::EntityId;
use crate::notify::Notifier;
use crate::repo::EntityRepository;
use std::sync::Arc;

/// Reference collections the contacts table resolves names against.
#[derive(Debug, Default)]
pub struct ContactRefs {
    pub companies: Vec<Company>,
    pub team: Vec<TeamMember>,
}

pub struct ContactsPage<R, RC, RT>
where
    R: EntityRepository<Contact>,
    RC: EntityRepository<Company>,
    RT: EntityRepository<TeamMember>,
{
    list: EntityPage<Contact, ContactDraft, R, ContactRefs>,
    companies: RC,
    team: RT,
}

impl<R, RC, RT> ContactsPage<R, RC, RT>
where
    R: EntityRepository<Contact>,
    RC: EntityRepository<Company>,
    RT: EntityRepository<TeamMember>,
{
    pub fn new(contacts: R, companies: RC, team: RT, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            list: EntityPage::new(contacts, notifier),
            companies,
            team,
        }
    }

    /// List machinery: search, editor flow, submit, remove, snapshots.
    pub fn list(&self) -> &EntityPage<Contact, ContactDraft, R, ContactRefs> {
        &self.list
    }

    /// Batched page load; re-run for the retry affordance.
    pub async fn load(&self) {
        let generation = self.list.begin_load().await;

        let (contacts, companies, team) = tokio::join!(
            self.list.fetch(),
            self.companies.get_all(),
            self.team.get_all()
        );

        let outcome = match (contacts, companies, team) {
            (Ok(contacts), Ok(companies), Ok(team)) => {
                Ok((contacts, ContactRefs { companies, team }))
            }
            (contacts, companies, team) => Err(batch_failure(vec![
                contacts.err(),
                companies.err(),
                team.err(),
            ])),
        };

        self.list.finish_load(generation, outcome).await;
    }

    /// Resolves a company reference, dangling-safe.
    pub async fn company_name(&self, company_id: Option<EntityId>) -> String {
        self.list
            .read(|state| {
                company_id
                    .and_then(|id| state.refs.companies.iter().find(|company| company.id == id))
                    .map(|company| company.name.clone())
                    .unwrap_or_else(|| "No Company".to_string())
            })
            .await
    }

    /// Resolves an owner reference, dangling-safe.
    pub async fn owner_name(&self, owner_id: Option<EntityId>) -> String {
        self.list
            .read(|state| {
                owner_id
                    .and_then(|id| state.refs.team.iter().find(|member| member.id == id))
                    .map(|member| member.name.clone())
                    .unwrap_or_else(|| "Unassigned".to_string())
            })
            .await
    }
}
