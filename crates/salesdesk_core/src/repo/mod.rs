//! Repository layer abstractions shared by every entity type.
//!
//! # Responsibility
//! - Define the uniform CRUD contract over a backing store.
//! - Own partial-update semantics (`Patch`) and identity coercion.
//! - Return semantic errors (`NotFound`, `InvalidId`) in addition to
//!   transport errors.
//!
//! # Invariants
//! - `update` merges shallowly: absent keys are preserved, explicit nulls
//!   overwrite, and `id` can never be overwritten by a patch.
//! - `delete` is a hard delete; deleting an absent id is `NotFound`.

use crate::model::{Entity, EntityId};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod remote;
pub mod schema;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for entity persistence operations.
#[derive(Debug)]
pub enum RepoError {
    /// No record of the given entity type has this identity.
    NotFound {
        entity: &'static str,
        id: EntityId,
    },
    /// Caller-supplied identity could not be parsed as the identity type.
    InvalidId(String),
    /// Backend call failed or returned a non-success flag. Already
    /// surfaced to the user at the repository boundary.
    Remote(String),
    /// Record translation or merge produced an invalid shape.
    Data(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidId(raw) => write!(f, "invalid id: `{raw}`"),
            Self::Remote(message) => write!(f, "remote operation failed: {message}"),
            Self::Data(message) => write!(f, "invalid record data: {message}"),
        }
    }
}

impl Error for RepoError {}

impl RepoError {
    pub(crate) fn not_found<E: Entity>(id: EntityId) -> Self {
        Self::NotFound {
            entity: E::NAME,
            id,
        }
    }
}

/// Coerces a caller-supplied string identity into [`EntityId`].
///
/// Outer layers hand identities around in string form (route params, form
/// values); repositories only accept the parsed integer.
pub fn parse_id(raw: &str) -> RepoResult<EntityId> {
    raw.trim()
        .parse::<EntityId>()
        .map_err(|_| RepoError::InvalidId(raw.to_string()))
}

/// Partial-field update payload, keyed by internal field names.
///
/// Semantics mirror a shallow object spread: fields present in the patch
/// overwrite (including explicit nulls), everything else is preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch(Map<String, Value>);

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a single-field patch, e.g. a board stage change.
    pub fn single(field: &str, value: Value) -> Self {
        Self::new().set(field, value)
    }

    /// Adds or replaces one field of the patch.
    pub fn set(mut self, field: &str, value: Value) -> Self {
        self.0.insert(field.to_string(), value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the patched fields in insertion-independent key order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Returns the patched value for one internal field name, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Merges this patch over an existing record, shallowly.
    ///
    /// The record's identity is immune: an `id` key in the patch is
    /// ignored rather than applied.
    pub fn apply_to<E: Entity>(&self, current: &E) -> RepoResult<E> {
        let mut merged = match serde_json::to_value(current) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return Err(RepoError::Data(format!(
                    "{} does not serialize to an object",
                    E::NAME
                )))
            }
            Err(err) => return Err(RepoError::Data(err.to_string())),
        };

        for (field, value) in &self.0 {
            if field == "id" {
                continue;
            }
            merged.insert(field.clone(), value.clone());
        }

        serde_json::from_value(Value::Object(merged)).map_err(|err| {
            RepoError::Data(format!("merged {} record is invalid: {err}", E::NAME))
        })
    }
}

/// Uniform CRUD contract for one entity type over its backing store.
#[async_trait]
pub trait EntityRepository<E: Entity>: Send + Sync {
    /// Produces the full collection as of call time (defensive copy).
    async fn get_all(&self) -> RepoResult<Vec<E>>;

    /// Fetches one record; `NotFound` when the identity is absent.
    async fn get_by_id(&self, id: EntityId) -> RepoResult<E>;

    /// Persists a new record, assigning identity and creation timestamps.
    async fn create(&self, entity: E) -> RepoResult<E>;

    /// Merges `patch` over the stored record and returns the result.
    async fn update(&self, id: EntityId, patch: Patch) -> RepoResult<E>;

    /// Removes the record permanently; a second call is `NotFound` again.
    async fn delete(&self, id: EntityId) -> RepoResult<()>;
}
