//! Company domain model and edit-form draft.

use crate::model::{contains_needle, split_tags, Entity, EntityDraft, EntityId, FormErrors};
use crate::repo::Patch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// An organization record referenced by contacts, deals and leads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: EntityId,
    pub name: String,
    pub industry: String,
    /// Free-text headcount band, e.g. "51-200".
    pub size: String,
    pub website: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Company {
    const NAME: &'static str = "company";
    const DISPLAY: &'static str = "Company";

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
        contains_needle(&self.name, needle) || contains_needle(&self.industry, needle)
    }
}

/// Edit-form shape for companies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyDraft {
    pub name: String,
    pub industry: String,
    pub size: String,
    pub website: String,
    pub tags: String,
}

impl EntityDraft<Company> for CompanyDraft {
    fn from_entity(company: &Company) -> Self {
        Self {
            name: company.name.clone(),
            industry: company.industry.clone(),
            size: company.size.clone(),
            website: company.website.clone(),
            tags: company.tags.join(", "),
        }
    }

    fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        if self.name.trim().is_empty() {
            errors.insert("name", "Company name is required".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn into_entity(self) -> Company {
        Company {
            id: 0,
            name: self.name.trim().to_string(),
            industry: self.industry.trim().to_string(),
            size: self.size.trim().to_string(),
            website: self.website.trim().to_string(),
            tags: split_tags(&self.tags),
            created_at: DateTime::UNIX_EPOCH,
        }
    }

    fn to_patch(&self) -> Patch {
        Patch::new()
            .set("name", json!(self.name.trim()))
            .set("industry", json!(self.industry.trim()))
            .set("size", json!(self.size.trim()))
            .set("website", json!(self.website.trim()))
            .set("tags", json!(split_tags(&self.tags)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_requires_name() {
        let errors = CompanyDraft::default().validate().unwrap_err();
        assert_eq!(errors.get("name").unwrap(), "Company name is required");
    }

    #[test]
    fn search_matches_industry_case_insensitively() {
        let company = Company {
            id: 1,
            name: "Initech".to_string(),
            industry: "Software".to_string(),
            size: "51-200".to_string(),
            website: String::new(),
            tags: Vec::new(),
            created_at: DateTime::UNIX_EPOCH,
        };
        assert!(company.matches("soft"));
        assert!(!company.matches("hardware"));
    }
}
