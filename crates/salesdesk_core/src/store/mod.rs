//! Fixture-backed in-memory store.
//!
//! # Responsibility
//! - Own the process-local collections behind the in-memory repositories.
//! - Seed them from the embedded fixture data exactly once per instance.
//!
//! # Invariants
//! - The store is an explicit object with its own lifecycle: constructed
//!   once per process or per test and injected into repositories. No
//!   module-scoped mutable state.
//! - Handles from `contacts()`/`deals()`/... share the same collections;
//!   every handle observes every committed mutation.

use crate::model::activity::Activity;
use crate::model::company::Company;
use crate::model::contact::Contact;
use crate::model::deal::Deal;
use crate::model::lead::Lead;
use crate::model::task::Task;
use crate::model::team_member::TeamMember;
use crate::repo::memory::MemoryRepository;
use log::info;
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tokio::sync::RwLock;

const CONTACTS_JSON: &str = include_str!("../../fixtures/contacts.json");
const COMPANIES_JSON: &str = include_str!("../../fixtures/companies.json");
const DEALS_JSON: &str = include_str!("../../fixtures/deals.json");
const LEADS_JSON: &str = include_str!("../../fixtures/leads.json");
const TASKS_JSON: &str = include_str!("../../fixtures/tasks.json");
const TEAM_MEMBERS_JSON: &str = include_str!("../../fixtures/team_members.json");
const ACTIVITIES_JSON: &str = include_str!("../../fixtures/activities.json");

pub type StoreResult<T> = Result<T, SeedError>;

/// Fixture decoding failure during store construction.
#[derive(Debug)]
pub struct SeedError {
    pub file: &'static str,
    pub source: serde_json::Error,
}

impl Display for SeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid fixture data in {}: {}", self.file, self.source)
    }
}

impl Error for SeedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Explicit in-memory backing store for every local entity collection.
pub struct FixtureStore {
    contacts: Arc<RwLock<Vec<Contact>>>,
    companies: Arc<RwLock<Vec<Company>>>,
    deals: Arc<RwLock<Vec<Deal>>>,
    leads: Arc<RwLock<Vec<Lead>>>,
    tasks: Arc<RwLock<Vec<Task>>>,
    team_members: Arc<RwLock<Vec<TeamMember>>>,
    activities: Arc<RwLock<Vec<Activity>>>,
}

impl FixtureStore {
    /// Builds a store with every collection empty.
    pub fn empty() -> Self {
        Self {
            contacts: Arc::new(RwLock::new(Vec::new())),
            companies: Arc::new(RwLock::new(Vec::new())),
            deals: Arc::new(RwLock::new(Vec::new())),
            leads: Arc::new(RwLock::new(Vec::new())),
            tasks: Arc::new(RwLock::new(Vec::new())),
            team_members: Arc::new(RwLock::new(Vec::new())),
            activities: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Builds a store seeded from the embedded fixture data.
    pub fn seeded() -> StoreResult<Self> {
        let contacts: Vec<Contact> = decode("contacts.json", CONTACTS_JSON)?;
        let companies: Vec<Company> = decode("companies.json", COMPANIES_JSON)?;
        let deals: Vec<Deal> = decode("deals.json", DEALS_JSON)?;
        let leads: Vec<Lead> = decode("leads.json", LEADS_JSON)?;
        let tasks: Vec<Task> = decode("tasks.json", TASKS_JSON)?;
        let team_members: Vec<TeamMember> = decode("team_members.json", TEAM_MEMBERS_JSON)?;
        let activities: Vec<Activity> = decode("activities.json", ACTIVITIES_JSON)?;

        info!(
            "event=store_seed module=store status=ok contacts={} companies={} deals={} leads={} tasks={} team_members={} activities={}",
            contacts.len(),
            companies.len(),
            deals.len(),
            leads.len(),
            tasks.len(),
            team_members.len(),
            activities.len()
        );

        Ok(Self {
            contacts: Arc::new(RwLock::new(contacts)),
            companies: Arc::new(RwLock::new(companies)),
            deals: Arc::new(RwLock::new(deals)),
            leads: Arc::new(RwLock::new(leads)),
            tasks: Arc::new(RwLock::new(tasks)),
            team_members: Arc::new(RwLock::new(team_members)),
            activities: Arc::new(RwLock::new(activities)),
        })
    }

    pub fn contacts(&self) -> MemoryRepository<Contact> {
        MemoryRepository::new(Arc::clone(&self.contacts))
    }

    pub fn companies(&self) -> MemoryRepository<Company> {
        MemoryRepository::new(Arc::clone(&self.companies))
    }

    pub fn deals(&self) -> MemoryRepository<Deal> {
        MemoryRepository::new(Arc::clone(&self.deals))
    }

    pub fn leads(&self) -> MemoryRepository<Lead> {
        MemoryRepository::new(Arc::clone(&self.leads))
    }

    pub fn tasks(&self) -> MemoryRepository<Task> {
        MemoryRepository::new(Arc::clone(&self.tasks))
    }

    pub fn team_members(&self) -> MemoryRepository<TeamMember> {
        MemoryRepository::new(Arc::clone(&self.team_members))
    }

    pub fn activities(&self) -> MemoryRepository<Activity> {
        MemoryRepository::new(Arc::clone(&self.activities))
    }
}

fn decode<T: DeserializeOwned>(file: &'static str, raw: &str) -> StoreResult<Vec<T>> {
    serde_json::from_str(raw).map_err(|source| SeedError { file, source })
}

#[cfg(test)]
mod tests {
    use super::FixtureStore;
    use crate::repo::EntityRepository;

    #[tokio::test]
    async fn seeded_store_exposes_nonempty_collections() {
        let store = FixtureStore::seeded().unwrap();
        assert!(!store.contacts().get_all().await.unwrap().is_empty());
        assert!(!store.companies().get_all().await.unwrap().is_empty());
        assert!(!store.deals().get_all().await.unwrap().is_empty());
        assert!(!store.team_members().get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn handles_share_one_collection() {
        let store = FixtureStore::empty();
        let writer = store.contacts();
        let reader = store.contacts();

        let draft = crate::model::contact::Contact {
            id: 0,
            name: "Grace Hopper".to_string(),
            email: "grace@example.com".to_string(),
            phone: String::new(),
            company_id: None,
            owner_id: None,
            tags: Vec::new(),
            created_at: chrono::DateTime::UNIX_EPOCH,
            last_activity: chrono::DateTime::UNIX_EPOCH,
        };
        writer.create(draft).await.unwrap();

        assert_eq!(reader.get_all().await.unwrap().len(), 1);
    }
}
