//! Task domain model, status/priority enums and edit-form draft.

use crate::model::{contains_needle, split_tags, Entity, EntityDraft, EntityId, FormErrors};
use crate::repo::Patch;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Workflow state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::ToDo, TaskStatus::InProgress, TaskStatus::Done];

    /// Stable display label, also the external storage value.
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::ToDo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }
}

/// Parses a task status from its display/storage label.
pub fn parse_task_status(value: &str) -> Option<TaskStatus> {
    TaskStatus::ALL
        .into_iter()
        .find(|status| status.label() == value)
}

/// Urgency band of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 3] =
        [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High];

    /// Stable display label, also the external storage value.
    pub fn label(self) -> &'static str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
        }
    }
}

/// Parses a task priority from its display/storage label.
pub fn parse_task_priority(value: &str) -> Option<TaskPriority> {
    TaskPriority::ALL
        .into_iter()
        .find(|priority| priority.label() == value)
}

/// A unit of work assigned to a team member, optionally linked to a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: NaiveDate,
    /// Weak reference to the assigned team member.
    pub assigned_to: Option<EntityId>,
    /// Entity type name of the linked record, e.g. "contact" or "deal".
    pub related_entity_type: Option<String>,
    pub related_entity_id: Option<EntityId>,
    pub estimated_hours: f64,
    pub actual_hours: f64,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Task {
    const NAME: &'static str = "task";
    const DISPLAY: &'static str = "Task";

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn stamp_created(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
        self.updated_at = at;
    }

    fn matches(&self, needle: &str) -> bool {
        contains_needle(&self.title, needle) || contains_needle(&self.description, needle)
    }

    fn matches_filter(&self, selector: &str) -> bool {
        self.status.label() == selector || self.priority.label() == selector
    }
}

/// Edit-form shape for tasks.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<EntityId>,
    pub related_entity_type: Option<String>,
    pub related_entity_id: Option<EntityId>,
    pub estimated_hours: f64,
    pub actual_hours: f64,
    pub tags: String,
}

impl Default for TaskDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            status: TaskStatus::ToDo,
            priority: TaskPriority::Medium,
            due_date: None,
            assigned_to: None,
            related_entity_type: None,
            related_entity_id: None,
            estimated_hours: 0.0,
            actual_hours: 0.0,
            tags: String::new(),
        }
    }
}

impl EntityDraft<Task> for TaskDraft {
    fn from_entity(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            priority: task.priority,
            due_date: Some(task.due_date),
            assigned_to: task.assigned_to,
            related_entity_type: task.related_entity_type.clone(),
            related_entity_id: task.related_entity_id,
            estimated_hours: task.estimated_hours,
            actual_hours: task.actual_hours,
            tags: task.tags.join(", "),
        }
    }

    fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        if self.title.trim().is_empty() {
            errors.insert("title", "Task title is required".to_string());
        }
        if self.assigned_to.is_none() {
            errors.insert(
                "assigned_to",
                "Please assign this task to a team member".to_string(),
            );
        }
        if self.due_date.is_none() {
            errors.insert("due_date", "Due date is required".to_string());
        }
        if !self.estimated_hours.is_finite() || self.estimated_hours < 0.0 {
            errors.insert(
                "estimated_hours",
                "Estimated hours must be a non-negative number".to_string(),
            );
        }
        if !self.actual_hours.is_finite() || self.actual_hours < 0.0 {
            errors.insert(
                "actual_hours",
                "Actual hours must be a non-negative number".to_string(),
            );
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn into_entity(self) -> Task {
        Task {
            id: 0,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            status: self.status,
            priority: self.priority,
            // validate() guarantees presence before create is reachable
            due_date: self.due_date.unwrap_or_default(),
            assigned_to: self.assigned_to,
            related_entity_type: self.related_entity_type,
            related_entity_id: self.related_entity_id,
            estimated_hours: self.estimated_hours,
            actual_hours: self.actual_hours,
            tags: split_tags(&self.tags),
            created_at: DateTime::UNIX_EPOCH,
            updated_at: DateTime::UNIX_EPOCH,
        }
    }

    fn to_patch(&self) -> Patch {
        Patch::new()
            .set("title", json!(self.title.trim()))
            .set("description", json!(self.description.trim()))
            .set("status", json!(self.status.label()))
            .set("priority", json!(self.priority.label()))
            .set("due_date", json!(self.due_date))
            .set("assigned_to", json!(self.assigned_to))
            .set("related_entity_type", json!(self.related_entity_type))
            .set("related_entity_id", json!(self.related_entity_id))
            .set("estimated_hours", json!(self.estimated_hours))
            .set("actual_hours", json!(self.actual_hours))
            .set("tags", json!(split_tags(&self.tags)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_roundtrip() {
        for status in TaskStatus::ALL {
            assert_eq!(parse_task_status(status.label()), Some(status));
        }
        for priority in TaskPriority::ALL {
            assert_eq!(parse_task_priority(priority.label()), Some(priority));
        }
    }

    #[test]
    fn draft_requires_title_assignee_and_due_date() {
        let errors = TaskDraft::default().validate().unwrap_err();
        assert!(errors.contains_key("title"));
        assert!(errors.contains_key("assigned_to"));
        assert!(errors.contains_key("due_date"));
    }

    #[test]
    fn draft_rejects_negative_hours() {
        let draft = TaskDraft {
            title: "Follow up".to_string(),
            assigned_to: Some(1),
            due_date: NaiveDate::from_ymd_opt(2026, 8, 20),
            estimated_hours: -1.0,
            ..TaskDraft::default()
        };
        let errors = draft.validate().unwrap_err();
        assert!(errors.contains_key("estimated_hours"));
        assert!(!errors.contains_key("actual_hours"));
    }
}
