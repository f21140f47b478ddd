//! Team member domain model.

use crate::model::{contains_needle, Entity, EntityId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A sales team member; owner target for contacts, deals and tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    /// Display role, e.g. "Sales Manager" or "Sales Representative".
    pub role: String,
}

impl Entity for TeamMember {
    const NAME: &'static str = "team member";
    const DISPLAY: &'static str = "Team member";

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn stamp_created(&mut self, _at: DateTime<Utc>) {}

    fn matches(&self, needle: &str) -> bool {
        contains_needle(&self.name, needle)
            || contains_needle(&self.email, needle)
            || contains_needle(&self.role, needle)
    }
}
