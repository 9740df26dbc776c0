//! Project domain model.
//!
//! # Invariants
//! - `owner_id` is set at creation and never changes.
//! - Status transitions are unconstrained; any recognized value may follow any other.

use super::task::TaskView;
use super::user::UserId;
use super::{optional_text, require_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

pub type ProjectId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Planned,
    InProgress,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    /// Stable storage and wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "PLANNED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl Display for ProjectStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "PLANNED" => Ok(Self::Planned),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(ValidationError::UnknownStatus {
                field: "project status",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub owner_id: UserId,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Project with its tasks, as returned by listing and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,
    /// Newest first.
    pub tasks: Vec<TaskView>,
    pub task_count: u64,
}

/// Project name/description embedded in task rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub name: String,
    pub description: Option<String>,
}

/// Validated input for a new project. Status always starts as `PLANNED`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: UserId,
}

impl NewProject {
    pub fn new(
        owner_id: UserId,
        name: &str,
        description: Option<&str>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: require_text("name", name)?,
            description: optional_text(description),
            owner_id,
        })
    }
}

/// Partial project update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
}

impl ProjectPatch {
    /// Applies the patch on top of `current`, validating supplied fields.
    pub fn apply_to(&self, current: &Project) -> Result<Project, ValidationError> {
        let mut next = current.clone();
        if let Some(name) = self.name.as_deref() {
            next.name = require_text("name", name)?;
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

#[cfg(test)]
mod tests {
    use super::{Project, ProjectPatch, ProjectStatus};
    use crate::model::ValidationError;
    use uuid::Uuid;

    fn sample() -> Project {
        Project {
            id: Uuid::new_v4(),
            name: "Apollo".to_string(),
            description: Some("moon".to_string()),
            status: ProjectStatus::Planned,
            owner_id: Uuid::new_v4(),
            created_at: 1,
            updated_at: 1,
        }
    }

    #[test]
    fn status_parses_wire_values() {
        assert_eq!(
            "IN_PROGRESS".parse::<ProjectStatus>().unwrap(),
            ProjectStatus::InProgress
        );
        assert!(matches!(
            "in progress".parse::<ProjectStatus>(),
            Err(ValidationError::UnknownStatus { .. })
        ));
    }

    #[test]
    fn patch_only_touches_supplied_fields() {
        let current = sample();
        let patch = ProjectPatch {
            status: Some(ProjectStatus::Completed),
            ..ProjectPatch::default()
        };
        let next = patch.apply_to(&current).unwrap();
        assert_eq!(next.name, "Apollo");
        assert_eq!(next.description.as_deref(), Some("moon"));
        assert_eq!(next.status, ProjectStatus::Completed);
        assert_eq!(next.owner_id, current.owner_id);
    }

    #[test]
    fn patch_rejects_blank_name() {
        let patch = ProjectPatch {
            name: Some("   ".to_string()),
            ..ProjectPatch::default()
        };
        assert_eq!(
            patch.apply_to(&sample()).unwrap_err(),
            ValidationError::BlankField("name")
        );
    }

    #[test]
    fn status_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&ProjectStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
    }
}
