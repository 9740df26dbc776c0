//! Notification domain model.
//!
//! Notifications are immutable except for the `read` flag and are never
//! linked to the project that triggered them.

use super::user::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type NotificationId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    /// Serialized as `userId` to match the external schema.
    #[serde(rename = "userId")]
    pub recipient_id: UserId,
    pub message: String,
    pub read: bool,
    pub created_at: i64,
}

/// Message for the owner when a project's status changes.
pub(crate) fn status_changed_message(project_name: &str, status: &str) -> String {
    format!("Project \"{project_name}\" status updated to {status}")
}

/// Message for each distinct assignee when a project is deleted.
pub(crate) fn project_deleted_message(project_name: &str) -> String {
    format!("Project \"{project_name}\" has been deleted")
}
