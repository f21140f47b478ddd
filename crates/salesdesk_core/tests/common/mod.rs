//! Shared test doubles for controller-level integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use salesdesk_core::{Entity, EntityId, EntityRepository, MemoryRepository, Patch, RepoError, RepoResult};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Wraps a [`MemoryRepository`] with call counters and failure switches.
pub struct Instrumented<E: Entity> {
    inner: MemoryRepository<E>,
    pub get_all_calls: Arc<AtomicUsize>,
    pub create_calls: Arc<AtomicUsize>,
    pub update_calls: Arc<AtomicUsize>,
    pub delete_calls: Arc<AtomicUsize>,
    pub fail_reads: Arc<AtomicBool>,
    pub fail_writes: Arc<AtomicBool>,
}

impl<E: Entity> Instrumented<E> {
    pub fn new(inner: MemoryRepository<E>) -> Self {
        Self {
            inner,
            get_all_calls: Arc::new(AtomicUsize::new(0)),
            create_calls: Arc::new(AtomicUsize::new(0)),
            update_calls: Arc::new(AtomicUsize::new(0)),
            delete_calls: Arc::new(AtomicUsize::new(0)),
            fail_reads: Arc::new(AtomicBool::new(false)),
            fail_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    fn offline() -> RepoError {
        RepoError::Remote("backend offline".to_string())
    }
}

impl<E: Entity> Clone for Instrumented<E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            get_all_calls: Arc::clone(&self.get_all_calls),
            create_calls: Arc::clone(&self.create_calls),
            update_calls: Arc::clone(&self.update_calls),
            delete_calls: Arc::clone(&self.delete_calls),
            fail_reads: Arc::clone(&self.fail_reads),
            fail_writes: Arc::clone(&self.fail_writes),
        }
    }
}

#[async_trait]
impl<E: Entity> EntityRepository<E> for Instrumented<E> {
    async fn get_all(&self) -> RepoResult<Vec<E>> {
        self.get_all_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::offline());
        }
        self.inner.get_all().await
    }

    async fn get_by_id(&self, id: EntityId) -> RepoResult<E> {
        self.inner.get_by_id(id).await
    }

    async fn create(&self, entity: E) -> RepoResult<E> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::offline());
        }
        self.inner.create(entity).await
    }

    async fn update(&self, id: EntityId, patch: Patch) -> RepoResult<E> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::offline());
        }
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: EntityId) -> RepoResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::offline());
        }
        self.inner.delete(id).await
    }
}
