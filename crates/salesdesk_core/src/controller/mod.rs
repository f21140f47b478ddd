//! Page controller layer.
//!
//! # Responsibility
//! - Own each page's working set of one entity type and keep it
//!   consistent through loads, edits and deletes.
//! - Provide the reusable list state machine (`ListCore`) every page
//!   controller composes.
//!
//! # Invariants
//! - The canonical collection and its derived filtered view change
//!   together in the same reconciliation step; they never diverge, even
//!   across a failed repository call.
//! - The filtered view is recomputed from the canonical collection and
//!   the current search term / filter selector; it is never mutated
//!   independently.
//! - Validation failures keep the editor open with the entered draft and
//!   its field messages; no repository call is made.

use crate::model::{Entity, EntityDraft, EntityId, FormErrors};
use crate::repo::RepoError;

pub mod companies;
pub mod contacts;
pub mod deals;
pub mod leads;
mod page;
pub mod tasks;
pub mod team;

pub use page::{EntityPage, PageState};

/// Load lifecycle of one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagePhase {
    Loading,
    Ready,
    Failed(String),
}

/// What an open editor is pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    New,
    Existing(EntityId),
}

/// Create/edit form state carried by a page.
#[derive(Debug, Clone)]
pub enum EditorState<D> {
    Closed,
    Open {
        target: EditTarget,
        draft: D,
        errors: FormErrors,
    },
}

/// Result of a submit attempt, as observed by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Mutation committed and reconciled into both collections.
    Saved,
    /// Client-side validation failed; nothing was sent anywhere.
    Invalid,
    /// The repository call failed; collections are untouched.
    Failed,
}

/// Result of a delete attempt, as observed by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    /// Blocked by the client-side referential-integrity guard; no
    /// repository call was made.
    Refused,
    Failed,
}

/// Collapses a fan-out load's error slots into one page failure message.
///
/// The page fails as a whole when any fetch in the batch failed, even if
/// the rest succeeded.
pub(crate) fn batch_failure(errors: Vec<Option<RepoError>>) -> String {
    errors
        .into_iter()
        .flatten()
        .next()
        .map(|err| err.to_string())
        .unwrap_or_else(|| "page load failed".to_string())
}

/// Synchronous list state machine shared by every page controller.
///
/// Owns the canonical collection, the derived filtered view, the load
/// phase and the editor state. All methods are plain synchronous state
/// transitions; the owning page serializes access behind its lock.
#[derive(Debug)]
pub struct ListCore<E: Entity, D: EntityDraft<E>> {
    canonical: Vec<E>,
    filtered: Vec<E>,
    term: String,
    selector: Option<String>,
    phase: PagePhase,
    editor: EditorState<D>,
}

impl<E: Entity, D: EntityDraft<E>> Default for ListCore<E, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity, D: EntityDraft<E>> ListCore<E, D> {
    pub fn new() -> Self {
        Self {
            canonical: Vec::new(),
            filtered: Vec::new(),
            term: String::new(),
            selector: None,
            phase: PagePhase::Loading,
            editor: EditorState::Closed,
        }
    }

    pub fn phase(&self) -> &PagePhase {
        &self.phase
    }

    /// The authoritative collection.
    pub fn records(&self) -> &[E] {
        &self.canonical
    }

    /// The derived view currently matching search/filter criteria.
    pub fn visible(&self) -> &[E] {
        &self.filtered
    }

    pub fn find(&self, id: EntityId) -> Option<&E> {
        self.canonical.iter().find(|record| record.id() == id)
    }

    pub fn begin_loading(&mut self) {
        self.phase = PagePhase::Loading;
    }

    /// Installs a freshly fetched collection and enters `Ready`.
    pub fn install(&mut self, rows: Vec<E>) {
        self.canonical = rows;
        self.phase = PagePhase::Ready;
        self.recompute();
    }

    /// Routes the page to `Failed`; existing collections are preserved
    /// so a retry affordance can render alongside stale data counts.
    pub fn fail(&mut self, message: String) {
        self.phase = PagePhase::Failed(message);
    }

    pub fn search(&mut self, term: &str) {
        self.term = term.to_string();
        self.recompute();
    }

    pub fn set_filter(&mut self, selector: Option<String>) {
        self.selector = selector;
        self.recompute();
    }

    pub fn insert_committed(&mut self, record: E) {
        self.canonical.push(record);
        self.recompute();
    }

    pub fn replace_committed(&mut self, record: E) {
        if let Some(existing) = self
            .canonical
            .iter_mut()
            .find(|existing| existing.id() == record.id())
        {
            *existing = record;
        }
        self.recompute();
    }

    pub fn remove_committed(&mut self, id: EntityId) {
        self.canonical.retain(|record| record.id() != id);
        self.recompute();
    }

    pub fn editor(&self) -> &EditorState<D> {
        &self.editor
    }

    pub fn editor_target(&self) -> Option<EditTarget> {
        match &self.editor {
            EditorState::Open { target, .. } => Some(*target),
            EditorState::Closed => None,
        }
    }

    pub fn editor_errors(&self) -> Option<&FormErrors> {
        match &self.editor {
            EditorState::Open { errors, .. } => Some(errors),
            EditorState::Closed => None,
        }
    }

    pub fn open_create(&mut self)
    where
        D: Default,
    {
        self.editor = EditorState::Open {
            target: EditTarget::New,
            draft: D::default(),
            errors: FormErrors::new(),
        };
    }

    /// Opens the editor on a snapshot of an existing record.
    ///
    /// Returns `false` (editor untouched) when the id is not present.
    pub fn open_edit(&mut self, id: EntityId) -> bool {
        let Some(record) = self.find(id) else {
            return false;
        };
        self.editor = EditorState::Open {
            target: EditTarget::Existing(id),
            draft: D::from_entity(record),
            errors: FormErrors::new(),
        };
        true
    }

    pub fn cancel_edit(&mut self) {
        self.editor = EditorState::Closed;
    }

    /// Keeps the editor open with the submitted draft and its messages.
    ///
    /// Used after validation failures and failed commits so entered
    /// values survive the round-trip.
    pub fn editor_keep(&mut self, draft: D, errors: FormErrors) {
        let target = self.editor_target().unwrap_or(EditTarget::New);
        self.editor = EditorState::Open {
            target,
            draft,
            errors,
        };
    }

    fn recompute(&mut self) {
        let needle = self.term.trim().to_lowercase();
        self.filtered = self
            .canonical
            .iter()
            .filter(|record| needle.is_empty() || record.matches(&needle))
            .filter(|record| {
                self.selector
                    .as_deref()
                    .map_or(true, |selector| record.matches_filter(selector))
            })
            .cloned()
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::{EditTarget, ListCore, PagePhase};
    use crate::model::contact::{Contact, ContactDraft};
    use chrono::DateTime;

    fn contact(id: i64, name: &str, email: &str) -> Contact {
        Contact {
            id,
            name: name.to_string(),
            email: email.to_string(),
            phone: "555-0100".to_string(),
            company_id: None,
            owner_id: None,
            tags: Vec::new(),
            created_at: DateTime::UNIX_EPOCH,
            last_activity: DateTime::UNIX_EPOCH,
        }
    }

    fn ready_core() -> ListCore<Contact, ContactDraft> {
        let mut core = ListCore::new();
        core.install(vec![
            contact(1, "Ada Lovelace", "ada@x.com"),
            contact(2, "Bob Lee", "bob@x.com"),
        ]);
        core
    }

    #[test]
    fn install_enters_ready_with_unfiltered_view() {
        let core = ready_core();
        assert_eq!(core.phase(), &PagePhase::Ready);
        assert_eq!(core.visible().len(), 2);
    }

    #[test]
    fn search_is_case_insensitive_substring_over_name_and_email() {
        let mut core = ready_core();

        core.search("ada");
        assert_eq!(core.visible().len(), 1);
        assert_eq!(core.visible()[0].id, 1);

        core.search("x.com");
        assert_eq!(core.visible().len(), 2);

        core.search("");
        assert_eq!(core.visible().len(), 2);
    }

    #[test]
    fn search_never_mutates_the_canonical_collection() {
        let mut core = ready_core();
        core.search("nobody-matches-this");
        assert!(core.visible().is_empty());
        assert_eq!(core.records().len(), 2);
    }

    #[test]
    fn reconciliation_keeps_both_collections_in_lock_step() {
        let mut core = ready_core();

        core.insert_committed(contact(3, "Carol Park", "carol@x.com"));
        assert_eq!(core.records().len(), 3);
        assert_eq!(core.visible().len(), 3);

        let mut renamed = contact(3, "Carol Parker", "carol@x.com");
        renamed.phone = "555-0199".to_string();
        core.replace_committed(renamed);
        assert_eq!(core.records()[2].name, "Carol Parker");
        assert_eq!(core.visible()[2].name, "Carol Parker");

        core.remove_committed(3);
        assert_eq!(core.records().len(), 2);
        assert_eq!(core.visible().len(), 2);
    }

    #[test]
    fn committed_insert_respects_the_active_search() {
        let mut core = ready_core();
        core.search("ada");
        core.insert_committed(contact(3, "Carol Park", "carol@x.com"));

        assert_eq!(core.records().len(), 3);
        // The derived view still reflects the active criteria.
        assert_eq!(core.visible().len(), 1);
    }

    #[test]
    fn editor_open_edit_snapshots_the_record() {
        let mut core = ready_core();
        assert!(core.open_edit(1));
        assert_eq!(core.editor_target(), Some(EditTarget::Existing(1)));
        assert!(!core.open_edit(99));
        // A miss leaves the previous editor state alone.
        assert_eq!(core.editor_target(), Some(EditTarget::Existing(1)));
    }

    #[test]
    fn failed_phase_preserves_collections_for_retry() {
        let mut core = ready_core();
        core.fail("backend unavailable".to_string());
        assert!(matches!(core.phase(), PagePhase::Failed(_)));
        assert_eq!(core.records().len(), 2);
    }
}
