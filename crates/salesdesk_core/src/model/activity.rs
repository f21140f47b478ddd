//! Activity feed domain model.

use crate::model::{contains_needle, Entity, EntityId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A logged touchpoint (call, email, meeting, note) against another record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: EntityId,
    /// Touchpoint kind, e.g. "call" or "email".
    pub kind: String,
    pub description: String,
    /// Entity type name of the record this activity belongs to.
    pub entity_type: String,
    pub entity_id: EntityId,
    /// Weak reference to the team member who logged it.
    pub user_id: Option<EntityId>,
    pub timestamp: DateTime<Utc>,
}

impl Entity for Activity {
    const NAME: &'static str = "activity";
    const DISPLAY: &'static str = "Activity";

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn stamp_created(&mut self, at: DateTime<Utc>) {
        self.timestamp = at;
    }

    fn matches(&self, needle: &str) -> bool {
        contains_needle(&self.description, needle) || contains_needle(&self.kind, needle)
    }
}
