//! CRM domain model: entities, drafts and client-side validation.
//!
//! # Responsibility
//! - Define the canonical view-model shape for every entity type.
//! - Provide form draft types with pre-submit validation.
//! - Keep identity and search semantics uniform across entity types.
//!
//! # Invariants
//! - `id` is assigned by the backing store and never mutated afterwards.
//! - Tag translation (`split_tags`/`join_tags`) round-trips losslessly.
//! - Draft validation runs before any repository call is made.

use crate::repo::Patch;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;

pub mod activity;
pub mod company;
pub mod contact;
pub mod deal;
pub mod lead;
pub mod task;
pub mod team_member;

/// Store-assigned integer identity, unique within one entity type.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type EntityId = i64;

/// Field-keyed validation messages produced by draft validation.
///
/// Ordered map so rendered messages and test assertions are deterministic.
pub type FormErrors = BTreeMap<&'static str, String>;

/// Common contract every CRM entity type implements.
///
/// The repository and controller layers are generic over this trait; the
/// concrete structs only describe their fields and how they are searched.
pub trait Entity:
    Clone + std::fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Lowercase singular noun used in log events and failure messages.
    const NAME: &'static str;
    /// Capitalized noun used in user-facing notifications.
    const DISPLAY: &'static str;

    fn id(&self) -> EntityId;

    fn set_id(&mut self, id: EntityId);

    /// Stamps store-assigned creation timestamps.
    ///
    /// Entities without server-managed timestamps implement this as a no-op.
    fn stamp_created(&mut self, at: DateTime<Utc>);

    /// Case-insensitive substring match across this entity's search fields.
    ///
    /// `needle` is already lowercased by the caller; an empty needle matches.
    fn matches(&self, needle: &str) -> bool;

    /// Exact match against a filter selector (e.g. a stage or status label).
    ///
    /// Entity types without a filter dimension match everything.
    fn matches_filter(&self, selector: &str) -> bool {
        let _ = selector;
        true
    }
}

/// Form draft contract tying an editable entity to its edit-form shape.
pub trait EntityDraft<E: Entity>: Clone + std::fmt::Debug + Send + Sync {
    /// Builds a draft pre-filled from an existing record (edit flow).
    fn from_entity(entity: &E) -> Self;

    /// Client-side validation; field messages block submission entirely.
    fn validate(&self) -> Result<(), FormErrors>;

    /// Converts the draft into a new record for `create`.
    ///
    /// Identity and creation timestamps are placeholders here; the backing
    /// store assigns both.
    fn into_entity(self) -> E;

    /// Converts the draft into the partial-field payload for `update`.
    fn to_patch(&self) -> Patch;
}

/// Splits one comma-delimited tag string into an ordered tag sequence.
///
/// Incidental whitespace around tags is dropped, as are empty segments.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Joins an ordered tag sequence back into its delimited storage form.
pub fn join_tags(tags: &[String]) -> String {
    tags.join(",")
}

pub(crate) fn contains_needle(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::{join_tags, split_tags};

    #[test]
    fn split_drops_whitespace_and_empty_segments() {
        assert_eq!(
            split_tags(" vip ,  enterprise ,, lead"),
            vec!["vip", "enterprise", "lead"]
        );
        assert_eq!(split_tags(""), Vec::<String>::new());
    }

    #[test]
    fn split_join_roundtrip_is_lossless() {
        let tags = vec!["vip".to_string(), "q3 pipeline".to_string()];
        assert_eq!(split_tags(&join_tags(&tags)), tags);
    }

    #[test]
    fn join_split_is_idempotent_for_messy_input() {
        let normalized = join_tags(&split_tags("a , b,c "));
        assert_eq!(normalized, "a,b,c");
        assert_eq!(join_tags(&split_tags(&normalized)), normalized);
    }
}
