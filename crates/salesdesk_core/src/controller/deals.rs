//! Deals page controller and pipeline board operations.
//!
//! # Invariants
//! - A drop onto the deal's current column is a no-op: no repository
//!   call, no notification.
//! - Stage moves are two-phase: apply locally, commit remotely, and on
//!   commit failure replay the inverse mutation before surfacing the
//!   error. The canonical collection never keeps a stage the backend
//!   rejected.

use crate::controller::{batch_failure, EntityPage};
use crate::model::company::Company;
use crate::model::contact::Contact;
use crate::model::deal::{summarize_stages, Deal, DealDraft, Stage, StageSummary};
use crate::model::team_member::TeamMember;
use crate::model::EntityId;
use crate::notify::Notifier;
use crate::repo::{EntityRepository, Patch, RepoError};
use log::warn;
use serde_json::json;
use std::sync::Arc;

/// Reference collections the board and the deal form resolve against.
#[derive(Debug, Default)]
pub struct DealRefs {
    pub contacts: Vec<Contact>,
    pub companies: Vec<Company>,
    pub team: Vec<TeamMember>,
}

/// Outcome of a board drop, as observed by the gesture handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageMove {
    /// Same column, unknown deal, or otherwise nothing to do.
    NoOp,
    /// Optimistic move confirmed by the backend.
    Committed,
    /// Commit failed; the pre-drop stage was restored.
    RolledBack,
}

pub struct DealsPage<R, RC, RCo, RT>
where
    R: EntityRepository<Deal>,
    RC: EntityRepository<Contact>,
    RCo: EntityRepository<Company>,
    RT: EntityRepository<TeamMember>,
{
    list: EntityPage<Deal, DealDraft, R, DealRefs>,
    contacts: RC,
    companies: RCo,
    team: RT,
}

impl<R, RC, RCo, RT> DealsPage<R, RC, RCo, RT>
where
    R: EntityRepository<Deal>,
    RC: EntityRepository<Contact>,
    RCo: EntityRepository<Company>,
    RT: EntityRepository<TeamMember>,
{
    pub fn new(
        deals: R,
        contacts: RC,
        companies: RCo,
        team: RT,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            list: EntityPage::new(deals, notifier),
            contacts,
            companies,
            team,
        }
    }

    pub fn list(&self) -> &EntityPage<Deal, DealDraft, R, DealRefs> {
        &self.list
    }

    /// Batched page load; re-run for the retry affordance.
    pub async fn load(&self) {
        let generation = self.list.begin_load().await;

        let (deals, contacts, companies, team) = tokio::join!(
            self.list.fetch(),
            self.contacts.get_all(),
            self.companies.get_all(),
            self.team.get_all()
        );

        let outcome = match (deals, contacts, companies, team) {
            (Ok(deals), Ok(contacts), Ok(companies), Ok(team)) => Ok((
                deals,
                DealRefs {
                    contacts,
                    companies,
                    team,
                },
            )),
            (deals, contacts, companies, team) => Err(batch_failure(vec![
                deals.err(),
                contacts.err(),
                companies.err(),
                team.err(),
            ])),
        };

        self.list.finish_load(generation, outcome).await;
    }

    /// Narrows the board to one stage column; `None` shows every stage.
    pub async fn filter_stage(&self, stage: Option<Stage>) {
        self.list
            .set_filter(stage.map(|stage| stage.label().to_string()))
            .await;
    }

    /// Commits a board drop as a two-phase optimistic stage move.
    pub async fn move_stage(&self, deal_id: EntityId, target: Stage) -> StageMove {
        let previous = self
            .list
            .read(|state| state.list.find(deal_id).map(|deal| deal.stage))
            .await;
        let Some(previous) = previous else {
            warn!(
                "event=stage_move module=controller entity=deal status=skipped id={deal_id} reason=unknown_deal"
            );
            return StageMove::NoOp;
        };
        if previous == target {
            return StageMove::NoOp;
        }

        // Optimistic: the board reflects the new column before the commit.
        self.apply_stage(deal_id, target).await;

        let patch = Patch::single("stage", json!(target.label()));
        match self.list.repository().update(deal_id, patch).await {
            Ok(updated) => {
                self.list
                    .write(|state| state.list.replace_committed(updated))
                    .await;
                self.list.notifier().success("Deal updated successfully");
                StageMove::Committed
            }
            Err(err) => {
                // Compensating action: restore the pre-drop stage.
                self.apply_stage(deal_id, previous).await;
                warn!(
                    "event=stage_move module=controller entity=deal status=error id={deal_id} from={} to={} error={err}",
                    previous.label(),
                    target.label()
                );
                if !matches!(err, RepoError::Remote(_)) {
                    self.list.notifier().error("Failed to update deal");
                }
                StageMove::RolledBack
            }
        }
    }

    /// Per-stage count and summed value, derived from the visible board.
    pub async fn stage_summary(&self) -> Vec<StageSummary> {
        self.list
            .read(|state| summarize_stages(state.list.visible()))
            .await
    }

    async fn apply_stage(&self, deal_id: EntityId, stage: Stage) {
        self.list
            .write(|state| {
                if let Some(deal) = state.list.find(deal_id).cloned() {
                    let mut moved = deal;
                    moved.stage = stage;
                    state.list.replace_committed(moved);
                }
            })
            .await;
    }
}
