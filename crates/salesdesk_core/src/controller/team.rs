//! Team overview page controller.
//!
//! Read-only: batch-loads members, the activity feed and the collections
//! the per-member performance stats are derived from. No editor state.

use crate::controller::{batch_failure, PagePhase};
use crate::model::activity::Activity;
use crate::model::contact::Contact;
use crate::model::deal::{Deal, Stage};
use crate::model::team_member::TeamMember;
use crate::model::EntityId;
use crate::repo::EntityRepository;
use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Derived per-member performance figures; recomputed on demand.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MemberStats {
    pub total_deals: usize,
    pub total_contacts: usize,
    pub won_deals: usize,
    pub total_value: f64,
    pub won_value: f64,
}

#[derive(Debug)]
struct TeamState {
    members: Vec<TeamMember>,
    activities: Vec<Activity>,
    deals: Vec<Deal>,
    contacts: Vec<Contact>,
    phase: PagePhase,
}

impl Default for TeamState {
    fn default() -> Self {
        Self {
            members: Vec::new(),
            activities: Vec::new(),
            deals: Vec::new(),
            contacts: Vec::new(),
            phase: PagePhase::Loading,
        }
    }
}

pub struct TeamPage<RM, RA, RD, RC>
where
    RM: EntityRepository<TeamMember>,
    RA: EntityRepository<Activity>,
    RD: EntityRepository<Deal>,
    RC: EntityRepository<Contact>,
{
    team: RM,
    activities: RA,
    deals: RD,
    contacts: RC,
    state: RwLock<TeamState>,
    generation: AtomicU64,
}

impl<RM, RA, RD, RC> TeamPage<RM, RA, RD, RC>
where
    RM: EntityRepository<TeamMember>,
    RA: EntityRepository<Activity>,
    RD: EntityRepository<Deal>,
    RC: EntityRepository<Contact>,
{
    pub fn new(team: RM, activities: RA, deals: RD, contacts: RC) -> Self {
        Self {
            team,
            activities,
            deals,
            contacts,
            state: RwLock::new(TeamState::default()),
            generation: AtomicU64::new(0),
        }
    }

    /// Batched page load; re-run for the retry affordance.
    pub async fn load(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.write().await.phase = PagePhase::Loading;

        let (members, activities, deals, contacts) = tokio::join!(
            self.team.get_all(),
            self.activities.get_all(),
            self.deals.get_all(),
            self.contacts.get_all()
        );

        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(
                "event=page_load module=controller entity=team status=discarded generation={generation}"
            );
            return;
        }

        match (members, activities, deals, contacts) {
            (Ok(members), Ok(activities), Ok(deals), Ok(contacts)) => {
                state.members = members;
                state.activities = activities;
                state.deals = deals;
                state.contacts = contacts;
                state.phase = PagePhase::Ready;
            }
            (members, activities, deals, contacts) => {
                state.phase = PagePhase::Failed(batch_failure(vec![
                    members.err(),
                    activities.err(),
                    deals.err(),
                    contacts.err(),
                ]));
            }
        }
    }

    /// Invalidates all in-flight loads; their results will be discarded
    /// on arrival.
    pub fn detach(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub async fn phase(&self) -> PagePhase {
        self.state.read().await.phase.clone()
    }

    pub async fn members(&self) -> Vec<TeamMember> {
        self.state.read().await.members.clone()
    }

    /// Activity feed entries, newest first.
    pub async fn activities(&self) -> Vec<Activity> {
        let state = self.state.read().await;
        let mut feed = state.activities.clone();
        feed.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        feed
    }

    /// Recomputes one member's performance figures from the loaded
    /// collections.
    pub async fn member_stats(&self, member_id: EntityId) -> MemberStats {
        let state = self.state.read().await;
        let member_deals: Vec<&Deal> = state
            .deals
            .iter()
            .filter(|deal| deal.owner_id == Some(member_id))
            .collect();
        let won_deals: Vec<&&Deal> = member_deals
            .iter()
            .filter(|deal| deal.stage == Stage::Won)
            .collect();

        MemberStats {
            total_deals: member_deals.len(),
            total_contacts: state
                .contacts
                .iter()
                .filter(|contact| contact.owner_id == Some(member_id))
                .count(),
            won_deals: won_deals.len(),
            total_value: member_deals.iter().map(|deal| deal.value).sum(),
            won_value: won_deals.iter().map(|deal| deal.value).sum(),
        }
    }
}
