//! Generic page controller over one entity collection.
//!
//! # Responsibility
//! - Orchestrate load/search/edit/submit/delete flows around `ListCore`.
//! - Guard against stale loads with a generation counter so a superseded
//!   or detached page can never install out-of-date data.
//!
//! # Invariants
//! - Repository calls run without the state lock held; every state
//!   transition happens inside one lock section with no await point, so
//!   observers only see fully-before or fully-after states.
//! - Failed submits leave both collections untouched and the editor open.
//! - Remote failures were already surfaced by the repository boundary;
//!   this layer only notifies for failures it is the first to observe.

use crate::controller::{EditTarget, ListCore, PagePhase, RemoveOutcome, SubmitOutcome};
use crate::model::{Entity, EntityDraft, EntityId, FormErrors};
use crate::notify::Notifier;
use crate::repo::{EntityRepository, RepoError, RepoResult};
use log::{debug, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Everything a page keeps behind its lock: the list machine plus the
/// page-specific reference collections.
#[derive(Debug)]
pub struct PageState<E: Entity, D: EntityDraft<E>, X> {
    pub list: ListCore<E, D>,
    pub refs: X,
}

impl<E: Entity, D: EntityDraft<E>, X> PageState<E, D, X> {
    fn new(refs: X) -> Self {
        Self {
            list: ListCore::new(),
            refs,
        }
    }
}

/// Reusable page controller; concrete pages wrap it with their reference
/// collections, guards and display helpers.
pub struct EntityPage<E, D, R, X>
where
    E: Entity,
    D: EntityDraft<E> + Default,
    R: EntityRepository<E>,
    X: Default + Send + Sync,
{
    repo: R,
    notifier: Arc<dyn Notifier>,
    state: RwLock<PageState<E, D, X>>,
    generation: AtomicU64,
}

impl<E, D, R, X> EntityPage<E, D, R, X>
where
    E: Entity,
    D: EntityDraft<E> + Default,
    R: EntityRepository<E>,
    X: Default + Send + Sync,
{
    pub fn new(repo: R, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repo,
            notifier,
            state: RwLock::new(PageState::new(X::default())),
            generation: AtomicU64::new(0),
        }
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    pub(crate) fn repository(&self) -> &R {
        &self.repo
    }

    /// Fetches this page's own collection; used inside batch loads.
    pub async fn fetch(&self) -> RepoResult<Vec<E>> {
        self.repo.get_all().await
    }

    /// Marks the start of a load and returns its generation token.
    pub async fn begin_load(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.write().await.list.begin_loading();
        generation
    }

    /// Invalidates all in-flight loads; their results will be discarded
    /// on arrival. Call when the page is unmounted or replaced.
    pub fn detach(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Installs a finished load, unless a newer load superseded it.
    ///
    /// Returns whether the result was applied. List and reference
    /// collections land in one lock section, so they stay consistent.
    pub async fn finish_load(
        &self,
        generation: u64,
        outcome: Result<(Vec<E>, X), String>,
    ) -> bool {
        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(
                "event=page_load module=controller entity={} status=discarded generation={generation}",
                E::NAME
            );
            return false;
        }

        match outcome {
            Ok((rows, refs)) => {
                debug!(
                    "event=page_load module=controller entity={} status=ok rows={}",
                    E::NAME,
                    rows.len()
                );
                state.refs = refs;
                state.list.install(rows);
            }
            Err(message) => {
                warn!(
                    "event=page_load module=controller entity={} status=error error={message}",
                    E::NAME
                );
                state.list.fail(message);
            }
        }
        true
    }

    pub async fn search(&self, term: &str) {
        self.state.write().await.list.search(term);
    }

    pub async fn set_filter(&self, selector: Option<String>) {
        self.state.write().await.list.set_filter(selector);
    }

    pub async fn open_create(&self) {
        self.state.write().await.list.open_create();
    }

    pub async fn open_edit(&self, id: EntityId) -> bool {
        self.state.write().await.list.open_edit(id)
    }

    pub async fn cancel_edit(&self) {
        self.state.write().await.list.cancel_edit();
    }

    /// Validates and commits the draft, then reconciles local state.
    pub async fn submit(&self, draft: D) -> SubmitOutcome {
        if let Err(errors) = draft.validate() {
            let mut state = self.state.write().await;
            state.list.editor_keep(draft, errors);
            return SubmitOutcome::Invalid;
        }

        let target = {
            let state = self.state.read().await;
            state.list.editor_target().unwrap_or(EditTarget::New)
        };

        match target {
            EditTarget::New => match self.repo.create(draft.clone().into_entity()).await {
                Ok(record) => {
                    let mut state = self.state.write().await;
                    state.list.insert_committed(record);
                    state.list.cancel_edit();
                    drop(state);
                    self.notifier
                        .success(&format!("{} created successfully", E::DISPLAY));
                    SubmitOutcome::Saved
                }
                Err(err) => {
                    self.mutation_failed("save", &err, draft).await;
                    SubmitOutcome::Failed
                }
            },
            EditTarget::Existing(id) => match self.repo.update(id, draft.to_patch()).await {
                Ok(record) => {
                    let mut state = self.state.write().await;
                    state.list.replace_committed(record);
                    state.list.cancel_edit();
                    drop(state);
                    self.notifier
                        .success(&format!("{} updated successfully", E::DISPLAY));
                    SubmitOutcome::Saved
                }
                Err(err) => {
                    self.mutation_failed("save", &err, draft).await;
                    SubmitOutcome::Failed
                }
            },
        }
    }

    /// Deletes one record and reconciles local state on success.
    pub async fn remove(&self, id: EntityId) -> RemoveOutcome {
        match self.repo.delete(id).await {
            Ok(()) => {
                let mut state = self.state.write().await;
                state.list.remove_committed(id);
                drop(state);
                self.notifier
                    .success(&format!("{} deleted successfully", E::DISPLAY));
                RemoveOutcome::Removed
            }
            Err(err) => {
                warn!(
                    "event=entity_delete module=controller entity={} status=error id={id} error={err}",
                    E::NAME
                );
                if !matches!(err, RepoError::Remote(_)) {
                    self.notifier
                        .error(&format!("Failed to delete {}", E::NAME));
                }
                RemoveOutcome::Failed
            }
        }
    }

    pub async fn phase(&self) -> PagePhase {
        self.state.read().await.list.phase().clone()
    }

    /// Snapshot of the derived filtered view, for rendering.
    pub async fn visible(&self) -> Vec<E> {
        self.state.read().await.list.visible().to_vec()
    }

    /// Snapshot of the canonical collection.
    pub async fn records(&self) -> Vec<E> {
        self.state.read().await.list.records().to_vec()
    }

    pub async fn editor_errors(&self) -> Option<FormErrors> {
        self.state.read().await.list.editor_errors().cloned()
    }

    pub async fn is_editing(&self) -> bool {
        self.state.read().await.list.editor_target().is_some()
    }

    /// Reads page state through a closure without cloning collections.
    pub async fn read<T>(&self, f: impl FnOnce(&PageState<E, D, X>) -> T) -> T {
        f(&*self.state.read().await)
    }

    pub(crate) async fn write<T>(&self, f: impl FnOnce(&mut PageState<E, D, X>) -> T) -> T {
        f(&mut *self.state.write().await)
    }

    async fn mutation_failed(&self, verb: &str, err: &RepoError, draft: D) {
        warn!(
            "event=entity_{verb} module=controller entity={} status=error error={err}",
            E::NAME
        );
        // Remote failures were already reported at the repository boundary.
        if !matches!(err, RepoError::Remote(_)) {
            self.notifier
                .error(&format!("Failed to {verb} {}", E::NAME));
        }
        let mut state = self.state.write().await;
        state.list.editor_keep(draft, FormErrors::new());
    }
}
