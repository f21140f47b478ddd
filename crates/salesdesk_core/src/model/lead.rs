//! Lead domain model and edit-form draft.

use crate::model::{contains_needle, split_tags, Entity, EntityDraft, EntityId, FormErrors};
use crate::repo::Patch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Qualification status of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeadStatus {
    New,
    #[serde(rename = "In Progress")]
    InProgress,
    Qualified,
    #[serde(rename = "On Hold")]
    OnHold,
    Cancelled,
    Completed,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 6] = [
        LeadStatus::New,
        LeadStatus::InProgress,
        LeadStatus::Qualified,
        LeadStatus::OnHold,
        LeadStatus::Cancelled,
        LeadStatus::Completed,
    ];

    /// Stable display label, also the external storage value.
    pub fn label(self) -> &'static str {
        match self {
            LeadStatus::New => "New",
            LeadStatus::InProgress => "In Progress",
            LeadStatus::Qualified => "Qualified",
            LeadStatus::OnHold => "On Hold",
            LeadStatus::Cancelled => "Cancelled",
            LeadStatus::Completed => "Completed",
        }
    }
}

/// Parses a lead status from its display/storage label.
pub fn parse_lead_status(value: &str) -> Option<LeadStatus> {
    LeadStatus::ALL
        .into_iter()
        .find(|status| status.label() == value)
}

/// An inbound prospect that has not yet become a contact/deal pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: EntityId,
    pub name: String,
    pub status: LeadStatus,
    /// Free-text reachability details (email, phone, preferred channel).
    pub contact_info: String,
    pub project_details: String,
    pub company_id: Option<EntityId>,
    /// Weak reference to an existing contact, when the lead maps to one.
    pub contact_id: Option<EntityId>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Lead {
    const NAME: &'static str = "lead";
    const DISPLAY: &'static str = "Lead";

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn stamp_created(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
    }

    fn matches(&self, needle: &str) -> bool {
        contains_needle(&self.name, needle) || contains_needle(self.status.label(), needle)
    }

    fn matches_filter(&self, selector: &str) -> bool {
        self.status.label() == selector
    }
}

/// Edit-form shape for leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadDraft {
    pub name: String,
    pub status: LeadStatus,
    pub contact_info: String,
    pub project_details: String,
    pub company_id: Option<EntityId>,
    pub contact_id: Option<EntityId>,
    pub tags: String,
}

impl Default for LeadDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            status: LeadStatus::New,
            contact_info: String::new(),
            project_details: String::new(),
            company_id: None,
            contact_id: None,
            tags: String::new(),
        }
    }
}

impl EntityDraft<Lead> for LeadDraft {
    fn from_entity(lead: &Lead) -> Self {
        Self {
            name: lead.name.clone(),
            status: lead.status,
            contact_info: lead.contact_info.clone(),
            project_details: lead.project_details.clone(),
            company_id: lead.company_id,
            contact_id: lead.contact_id,
            tags: lead.tags.join(", "),
        }
    }

    fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        if self.name.trim().is_empty() {
            errors.insert("name", "Name is required".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn into_entity(self) -> Lead {
        Lead {
            id: 0,
            name: self.name.trim().to_string(),
            status: self.status,
            contact_info: self.contact_info.trim().to_string(),
            project_details: self.project_details.trim().to_string(),
            company_id: self.company_id,
            contact_id: self.contact_id,
            tags: split_tags(&self.tags),
            created_at: DateTime::UNIX_EPOCH,
        }
    }

    fn to_patch(&self) -> Patch {
        Patch::new()
            .set("name", json!(self.name.trim()))
            .set("status", json!(self.status.label()))
            .set("contact_info", json!(self.contact_info.trim()))
            .set("project_details", json!(self.project_details.trim()))
            .set("company_id", json!(self.company_id))
            .set("contact_id", json!(self.contact_id))
            .set("tags", json!(split_tags(&self.tags)))
    }
}
