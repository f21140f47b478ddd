//! Deal domain model, pipeline stages and edit-form draft.
//!
//! # Invariants
//! - `Stage::ALL` is the board column order.
//! - `Won` and `Lost` are terminal side-branches reachable from any stage;
//!   the first three stages form the working pipeline order.

use crate::model::{contains_needle, split_tags, Entity, EntityDraft, EntityId, FormErrors};
use crate::repo::Patch;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Pipeline stage of a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Lead,
    Qualified,
    Proposal,
    Won,
    Lost,
}

impl Stage {
    /// Board column order.
    pub const ALL: [Stage; 5] = [
        Stage::Lead,
        Stage::Qualified,
        Stage::Proposal,
        Stage::Won,
        Stage::Lost,
    ];

    /// Stable display label, also the external storage value.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Lead => "Lead",
            Stage::Qualified => "Qualified",
            Stage::Proposal => "Proposal",
            Stage::Won => "Won",
            Stage::Lost => "Lost",
        }
    }

    /// Whether the deal can no longer move forward in the pipeline.
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Won | Stage::Lost)
    }
}

/// Parses a stage from its display/storage label.
pub fn parse_stage(value: &str) -> Option<Stage> {
    Stage::ALL.into_iter().find(|stage| stage.label() == value)
}

/// A sales opportunity moving through the pipeline board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: EntityId,
    pub title: String,
    /// Monetary value in the account currency.
    pub value: f64,
    pub stage: Stage,
    pub contact_id: Option<EntityId>,
    pub company_id: Option<EntityId>,
    pub owner_id: Option<EntityId>,
    /// Win likelihood in percent, 0-100.
    pub probability: u8,
    pub close_date: NaiveDate,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Deal {
    const NAME: &'static str = "deal";
    const DISPLAY: &'static str = "Deal";

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
        contains_needle(&self.title, needle) || contains_needle(self.stage.label(), needle)
    }

    fn matches_filter(&self, selector: &str) -> bool {
        self.stage.label() == selector
    }
}

/// Edit-form shape for deals.
#[derive(Debug, Clone, PartialEq)]
pub struct DealDraft {
    pub title: String,
    pub value: f64,
    pub stage: Stage,
    pub contact_id: Option<EntityId>,
    pub company_id: Option<EntityId>,
    pub owner_id: Option<EntityId>,
    pub probability: u8,
    pub close_date: Option<NaiveDate>,
    pub tags: String,
}

impl Default for DealDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            value: 0.0,
            stage: Stage::Lead,
            contact_id: None,
            company_id: None,
            owner_id: None,
            probability: 0,
            close_date: None,
            tags: String::new(),
        }
    }
}

impl EntityDraft<Deal> for DealDraft {
    fn from_entity(deal: &Deal) -> Self {
        Self {
            title: deal.title.clone(),
            value: deal.value,
            stage: deal.stage,
            contact_id: deal.contact_id,
            company_id: deal.company_id,
            owner_id: deal.owner_id,
            probability: deal.probability,
            close_date: Some(deal.close_date),
            tags: deal.tags.join(", "),
        }
    }

    fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        if self.title.trim().is_empty() {
            errors.insert("title", "Title is required".to_string());
        }
        if !self.value.is_finite() || self.value <= 0.0 {
            errors.insert("value", "Value must be greater than 0".to_string());
        }
        if self.close_date.is_none() {
            errors.insert("close_date", "Close date is required".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn into_entity(self) -> Deal {
        Deal {
            id: 0,
            title: self.title.trim().to_string(),
            value: self.value,
            stage: self.stage,
            contact_id: self.contact_id,
            company_id: self.company_id,
            owner_id: self.owner_id,
            probability: self.probability,
            // validate() guarantees presence before create is reachable
            close_date: self.close_date.unwrap_or_default(),
            tags: split_tags(&self.tags),
            created_at: DateTime::UNIX_EPOCH,
        }
    }

    fn to_patch(&self) -> Patch {
        Patch::new()
            .set("title", json!(self.title.trim()))
            .set("value", json!(self.value))
            .set("stage", json!(self.stage.label()))
            .set("contact_id", json!(self.contact_id))
            .set("company_id", json!(self.company_id))
            .set("owner_id", json!(self.owner_id))
            .set("probability", json!(self.probability))
            .set("close_date", json!(self.close_date))
            .set("tags", json!(split_tags(&self.tags)))
    }
}

/// Per-stage derived board aggregates; recomputed on demand, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct StageSummary {
    pub stage: Stage,
    pub deal_count: usize,
    pub total_value: f64,
}

/// Recomputes per-stage counts and summed value from a deal collection.
pub fn summarize_stages(deals: &[Deal]) -> Vec<StageSummary> {
    Stage::ALL
        .into_iter()
        .map(|stage| {
            let in_stage = deals.iter().filter(|deal| deal.stage == stage);
            let (deal_count, total_value) = in_stage
                .fold((0usize, 0.0f64), |(count, sum), deal| {
                    (count + 1, sum + deal.value)
                });
            StageSummary {
                stage,
                deal_count,
                total_value,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_labels_roundtrip() {
        for stage in Stage::ALL {
            assert_eq!(parse_stage(stage.label()), Some(stage));
        }
        assert_eq!(parse_stage("Negotiation"), None);
    }

    #[test]
    fn won_and_lost_are_terminal() {
        assert!(Stage::Won.is_terminal());
        assert!(Stage::Lost.is_terminal());
        assert!(!Stage::Proposal.is_terminal());
    }

    #[test]
    fn draft_validation_covers_title_value_and_close_date() {
        let errors = DealDraft::default().validate().unwrap_err();
        assert_eq!(errors.get("title").unwrap(), "Title is required");
        assert_eq!(errors.get("value").unwrap(), "Value must be greater than 0");
        assert_eq!(errors.get("close_date").unwrap(), "Close date is required");
    }

    #[test]
    fn summary_is_pure_projection_of_the_collection() {
        let template = DealDraft {
            title: "A".to_string(),
            value: 100.0,
            close_date: NaiveDate::from_ymd_opt(2026, 9, 1),
            ..DealDraft::default()
        };
        let mut first = template.clone().into_entity();
        first.id = 1;
        let mut second = template.into_entity();
        second.id = 2;
        second.stage = Stage::Won;
        second.value = 250.0;

        let summary = summarize_stages(&[first, second]);
        assert_eq!(summary[0].stage, Stage::Lead);
        assert_eq!(summary[0].deal_count, 1);
        assert_eq!(summary[0].total_value, 100.0);
        assert_eq!(summary[3].stage, Stage::Won);
        assert_eq!(summary[3].total_value, 250.0);
    }
}
