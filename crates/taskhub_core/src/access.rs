//! Ownership-based access decisions.
//!
//! # Responsibility
//! - Decide allow/deny for project, task and user actions.
//! - Stay pure: callers load ownership facts and raise `Forbidden`.
//!
//! # Invariants
//! - A project is readable and mutable by its owner only.
//! - A task is readable and mutable by its project owner or its assignee.
//! - A user record is mutable by that user only.

use crate::model::project::Project;
use crate::model::task::TaskOwnership;
use crate::model::user::UserId;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Authenticated identity making a request.
///
/// Upstream authentication produces this value; core code never reads the
/// caller identity from anywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Principal {
    pub user_id: UserId,
}

impl Principal {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}

/// Action being authorized, used for denial reporting and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ReadProject,
    MutateProject,
    ReadTask,
    MutateTask,
    MutateUser,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReadProject => "read_project",
            Self::MutateProject => "mutate_project",
            Self::ReadTask => "read_task",
            Self::MutateTask => "mutate_task",
            Self::MutateUser => "mutate_user",
        }
    }
}

/// Ownership facts of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectFacts {
    pub owner_id: UserId,
}

impl From<&Project> for ProjectFacts {
    fn from(value: &Project) -> Self {
        Self {
            owner_id: value.owner_id,
        }
    }
}

/// Ownership and assignment facts of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskFacts {
    pub project_owner_id: UserId,
    pub assignee_id: Option<UserId>,
}

impl From<&TaskOwnership> for TaskFacts {
    fn from(value: &TaskOwnership) -> Self {
        Self {
            project_owner_id: value.project_owner_id,
            assignee_id: value.task.assigned_user_id,
        }
    }
}

/// Denied access decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDenied {
    pub action: Action,
}

impl Display for AccessDenied {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "not authorized to {}", self.action.as_str())
    }
}

impl Error for AccessDenied {}

pub fn can_read_project(principal: &Principal, facts: ProjectFacts) -> bool {
    principal.user_id == facts.owner_id
}

pub fn can_mutate_project(principal: &Principal, facts: ProjectFacts) -> bool {
    principal.user_id == facts.owner_id
}

pub fn can_read_task(principal: &Principal, facts: TaskFacts) -> bool {
    principal.user_id == facts.project_owner_id || facts.assignee_id == Some(principal.user_id)
}

pub fn can_mutate_task(principal: &Principal, facts: TaskFacts) -> bool {
    principal.user_id == facts.project_owner_id || facts.assignee_id == Some(principal.user_id)
}

pub fn can_mutate_user(principal: &Principal, target_user_id: UserId) -> bool {
    principal.user_id == target_user_id
}

/// Converts a verdict into a result carrying the denied action.
pub fn require(allowed: bool, action: Action) -> Result<(), AccessDenied> {
    if allowed {
        Ok(())
    } else {
        Err(AccessDenied { action })
    }
}
