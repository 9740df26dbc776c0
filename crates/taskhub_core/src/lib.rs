//! Core domain logic for TaskHub.
//!
//! Users own projects, projects hold tasks, tasks may be assigned to users,
//! and specific project mutations notify the affected users. This crate is
//! the single source of truth for who may see or change what.

pub mod access;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod pagination;
pub mod repo;
pub mod service;

pub use access::{AccessDenied, Action, Principal};
pub use config::{PaginationSettings, Settings};
pub use logging::{default_log_level, init_from_settings, init_logging, logging_status};
pub use model::notification::{Notification, NotificationId};
pub use model::project::{Project, ProjectId, ProjectPatch, ProjectStatus, ProjectView};
pub use model::task::{Task, TaskDraft, TaskFilter, TaskId, TaskPatch, TaskStatus, TaskView};
pub use model::user::{User, UserId, UserPatch, UserSummary};
pub use model::ValidationError;
pub use pagination::{Page, PageLimits, PageMeta, PageRequest, PaginationError};
pub use repo::{RepoError, RepoResult};
pub use service::{
    CoreServices, ErrorKind, NotificationService, ProjectService, ServiceError, ServiceResult,
    TaskService, UserService,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
