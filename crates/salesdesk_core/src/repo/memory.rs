//! In-memory repository over a fixture-seeded collection.
//!
//! # Responsibility
//! - Serve the local storage variant: CRUD against a shared `Vec<E>`.
//! - Assign identities strictly greater than the current maximum.
//!
//! # Invariants
//! - Readers always receive defensive copies; internal state can only
//!   change through this repository's own write paths.
//! - Every operation takes the collection lock once for its whole
//!   critical section, so observers see fully-before or fully-after
//!   states only.
//! - Two rapid logical edits to one record are NOT serialized against
//!   each other; the second write may be based on stale pre-fetch state.
//!   Accepted limitation of the local variant.

use crate::model::{Entity, EntityId};
use crate::repo::{EntityRepository, Patch, RepoError, RepoResult};
use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared handle to one entity collection inside a [`FixtureStore`].
///
/// [`FixtureStore`]: crate::store::FixtureStore
pub struct MemoryRepository<E: Entity> {
    rows: Arc<RwLock<Vec<E>>>,
}

impl<E: Entity> MemoryRepository<E> {
    /// Wraps a store-owned collection handle.
    pub fn new(rows: Arc<RwLock<Vec<E>>>) -> Self {
        Self { rows }
    }
}

impl<E: Entity> Clone for MemoryRepository<E> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
        }
    }
}

#[async_trait]
impl<E: Entity> EntityRepository<E> for MemoryRepository<E> {
    async fn get_all(&self) -> RepoResult<Vec<E>> {
        Ok(self.rows.read().await.clone())
    }

    async fn get_by_id(&self, id: EntityId) -> RepoResult<E> {
        self.rows
            .read()
            .await
            .iter()
            .find(|row| row.id() == id)
            .cloned()
            .ok_or_else(|| RepoError::not_found::<E>(id))
    }

    async fn create(&self, mut entity: E) -> RepoResult<E> {
        let mut rows = self.rows.write().await;
        let next_id = rows.iter().map(Entity::id).max().unwrap_or(0) + 1;
        entity.set_id(next_id);
        entity.stamp_created(Utc::now());
        rows.push(entity.clone());
        debug!(
            "event=entity_create module=repo entity={} status=ok id={next_id}",
            E::NAME
        );
        Ok(entity)
    }

    async fn update(&self, id: EntityId, patch: Patch) -> RepoResult<E> {
        let mut rows = self.rows.write().await;
        let index = rows
            .iter()
            .position(|row| row.id() == id)
            .ok_or_else(|| RepoError::not_found::<E>(id))?;

        let merged = patch.apply_to(&rows[index])?;
        rows[index] = merged.clone();
        debug!(
            "event=entity_update module=repo entity={} status=ok id={id}",
            E::NAME
        );
        Ok(merged)
    }

    async fn delete(&self, id: EntityId) -> RepoResult<()> {
        let mut rows = self.rows.write().await;
        let index = rows
            .iter()
            .position(|row| row.id() == id)
            .ok_or_else(|| RepoError::not_found::<E>(id))?;

        rows.remove(index);
        debug!(
            "event=entity_delete module=repo entity={} status=ok id={id}",
            E::NAME
        );
        Ok(())
    }
}
