//! Tasks page controller.

use crate::controller::{batch_failure, EntityPage, SubmitOutcome};
use crate::model::task::{Task, TaskDraft, TaskPriority, TaskStatus};
use crate::model::team_member::TeamMember;
use crate::model::EntityId;
use crate::notify::Notifier;
use crate::repo::{EntityRepository, Patch, RepoError};
use log::warn;
use serde_json::json;
use std::sync::Arc;

/// Reference collection the assignee column resolves against.
#[derive(Debug, Default)]
pub struct TaskRefs {
    pub team: Vec<TeamMember>,
}

pub struct TasksPage<R, RT>
where
    R: EntityRepository<Task>,
    RT: EntityRepository<TeamMember>,
{
    list: EntityPage<Task, TaskDraft, R, TaskRefs>,
    team: RT,
}

impl<R, RT> TasksPage<R, RT>
where
    R: EntityRepository<Task>,
    RT: EntityRepository<TeamMember>,
{
    pub fn new(tasks: R, team: RT, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            list: EntityPage::new(tasks, notifier),
            team,
        }
    }

    pub fn list(&self) -> &EntityPage<Task, TaskDraft, R, TaskRefs> {
        &self.list
    }

    /// Batched page load; re-run for the retry affordance.
    pub async fn load(&self) {
        let generation = self.list.begin_load().await;

        let (tasks, team) = tokio::join!(self.list.fetch(), self.team.get_all());

        let outcome = match (tasks, team) {
            (Ok(tasks), Ok(team)) => Ok((tasks, TaskRefs { team })),
            (tasks, team) => Err(batch_failure(vec![tasks.err(), team.err()])),
        };

        self.list.finish_load(generation, outcome).await;
    }

    /// Narrows the table to one status; `None` shows everything.
    pub async fn filter_status(&self, status: Option<TaskStatus>) {
        self.list
            .set_filter(status.map(|status| status.label().to_string()))
            .await;
    }

    /// Narrows the table to one priority; `None` shows everything.
    pub async fn filter_priority(&self, priority: Option<TaskPriority>) {
        self.list
            .set_filter(priority.map(|priority| priority.label().to_string()))
            .await;
    }

    /// Commits a status-only change outside the edit form.
    pub async fn set_status(&self, id: EntityId, status: TaskStatus) -> SubmitOutcome {
        let patch = Patch::single("status", json!(status.label()));
        match self.list.repository().update(id, patch).await {
            Ok(updated) => {
                self.list
                    .write(|state| state.list.replace_committed(updated))
                    .await;
                self.list.notifier().success("Task updated successfully");
                SubmitOutcome::Saved
            }
            Err(err) => {
                warn!(
                    "event=entity_update module=controller entity=task status=error id={id} error={err}"
                );
                if !matches!(err, RepoError::Remote(_)) {
                    self.list.notifier().error("Failed to update task");
                }
                SubmitOutcome::Failed
            }
        }
    }

    /// Resolves the assignee reference, dangling-safe.
    pub async fn assignee_name(&self, assigned_to: Option<EntityId>) -> String {
        self.list
            .read(|state| {
                assigned_to
                    .and_then(|id| state.refs.team.iter().find(|member| member.id == id))
                    .map(|member| member.name.clone())
                    .unwrap_or_else(|| "Unassigned".to_string())
            })
            .await
    }
}
