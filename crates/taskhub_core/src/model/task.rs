//! Task domain model.
//!
//! # Invariants
//! - `project_id` is set at creation and never changes.
//! - `assigned_user_id` is optional.

use super::project::{ProjectId, ProjectSummary};
use super::user::{UserId, UserSummary};
use super::{optional_text, require_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

pub type TaskId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::InProgress => "IN_PROGRESS",
            Self::Done => "DONE",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "TODO" => Ok(Self::Todo),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "DONE" => Ok(Self::Done),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(ValidationError::UnknownStatus {
                field: "task status",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub project_id: ProjectId,
    pub assigned_user_id: Option<UserId>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Task row joined with its project summary and assignee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    pub project: ProjectSummary,
    pub assigned_user: Option<UserSummary>,
}

/// Ownership facts of a task, loaded together for access decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOwnership {
    pub task: Task,
    /// Owner of the containing project.
    pub project_owner_id: UserId,
}

/// Validated input for a new task. Status always starts as `TODO`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub id: TaskId,
    pub project_id: ProjectId,
    pub title: String,
    pub description: Option<String>,
    pub assigned_user_id: Option<UserId>,
}

/// Caller-supplied task creation fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub assigned_user_id: Option<UserId>,
}

impl NewTask {
    pub fn new(project_id: ProjectId, draft: &TaskDraft) -> Result<Self, ValidationError> {
        Ok(Self {
            id: Uuid::new_v4(),
            project_id,
            title: require_text("title", &draft.title)?,
            description: optional_text(draft.description.as_deref()),
            assigned_user_id: draft.assigned_user_id,
        })
    }
}

/// Partial task update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    pub fn apply_to(&self, current: &Task) -> Result<Task, ValidationError> {
        let mut next = current.clone();
        if let Some(title) = self.title.as_deref() {
            next.title = require_text("title", title)?;
        }
        if let Some(description) = self.description.as_deref() {
            next.description = optional_text(Some(description));
        }
        if let Some(status) = self.status {
            next.status = status;
        }
        Ok(next)
    }
}

/// Optional equality filters for task listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub assigned_user_id: Option<UserId>,
}
