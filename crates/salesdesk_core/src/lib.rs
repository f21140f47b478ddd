//! Client-side core for the SalesDesk CRM.
//! This crate is the single source of truth for entity state
//! synchronization: load, edit, optimistic mutation and reconciliation.

pub mod controller;
pub mod logging;
pub mod model;
pub mod notify;
pub mod remote;
pub mod repo;
pub mod store;

pub use controller::{
    EditTarget, EditorState, EntityPage, ListCore, PagePhase, RemoveOutcome, SubmitOutcome,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::{
    join_tags, split_tags, Entity, EntityDraft, EntityId, FormErrors,
};
pub use notify::{LogNotifier, Notice, NoticeLevel, Notifier, RecordingNotifier};
pub use repo::memory::MemoryRepository;
pub use repo::remote::RemoteRepository;
pub use repo::schema::RemoteEntity;
pub use repo::{parse_id, EntityRepository, Patch, RepoError, RepoResult};
pub use store::FixtureStore;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
