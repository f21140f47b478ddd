//! Contact domain model and edit-form draft.

use crate::model::{contains_needle, join_tags, split_tags, Entity, EntityDraft, EntityId, FormErrors};
use crate::repo::Patch;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("valid email regex"));

/// A person record, optionally linked to a company and an owning team member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Weak reference; the company may have been deleted since.
    pub company_id: Option<EntityId>,
    /// Weak reference to the owning team member.
    pub owner_id: Option<EntityId>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Entity for Contact {
    const NAME: &'static str = "contact";
    const DISPLAY: &'static str = "Contact";

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn stamp_created(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
        self.last_activity = at;
    }

    fn matches(&self, needle: &str) -> bool {
        contains_needle(&self.name, needle)
            || contains_needle(&self.email, needle)
            || self.phone.contains(needle)
    }
}

/// Edit-form shape for contacts; tags are one comma-separated text field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company_id: Option<EntityId>,
    pub owner_id: Option<EntityId>,
    pub tags: String,
}

impl EntityDraft<Contact> for ContactDraft {
    fn from_entity(contact: &Contact) -> Self {
        Self {
            name: contact.name.clone(),
            email: contact.email.clone(),
            phone: contact.phone.clone(),
            company_id: contact.company_id,
            owner_id: contact.owner_id,
            tags: contact.tags.join(", "),
        }
    }

    fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        if self.name.trim().is_empty() {
            errors.insert("name", "Name is required".to_string());
        }
        if self.email.trim().is_empty() {
            errors.insert("email", "Email is required".to_string());
        } else if !EMAIL_RE.is_match(self.email.trim()) {
            errors.insert("email", "Email is invalid".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn into_entity(self) -> Contact {
        Contact {
            id: 0,
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            company_id: self.company_id,
            owner_id: self.owner_id,
            tags: split_tags(&self.tags),
            created_at: DateTime::UNIX_EPOCH,
            last_activity: DateTime::UNIX_EPOCH,
        }
    }

    fn to_patch(&self) -> Patch {
        Patch::new()
            .set("name", json!(self.name.trim()))
            .set("email", json!(self.email.trim()))
            .set("phone", json!(self.phone.trim()))
            .set("company_id", json!(self.company_id))
            .set("owner_id", json!(self.owner_id))
            .set("tags", json!(split_tags(&self.tags)))
    }
}
