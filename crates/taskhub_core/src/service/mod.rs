//! Core use-case services.
//!
//! # Responsibility
//! - Load ownership facts, ask `access` for a verdict, then mutate.
//! - Emit notifications for project status changes and deletions.
//! - Return one explicit error kind per failure; transports map kinds to
//!   status codes via `ErrorKind::http_status`.
//!
//! # Invariants
//! - The caller identity is always an explicit `Principal` argument.
//! - Internal failures keep their source chain and are logged before being
//!   returned; `public_message` stays generic.

use crate::access::AccessDenied;
use crate::config::PaginationSettings;
use crate::model::ValidationError;
use crate::pagination::{PageLimits, PaginationError};
use crate::repo::notification_repo::SqliteNotificationRepository;
use crate::repo::project_repo::SqliteProjectRepository;
use crate::repo::task_repo::SqliteTaskRepository;
use crate::repo::user_repo::SqliteUserRepository;
use crate::repo::{RepoError, RepoResult};
use log::{debug, error, info};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

pub mod notification_service;
pub mod project_service;
pub mod task_service;
pub mod user_service;

pub use notification_service::NotificationService;
pub use project_service::ProjectService;
pub use task_service::TaskService;
pub use user_service::UserService;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Transport-facing error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Forbidden,
    NotFound,
    Validation,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    pub fn http_status(self) -> u16 {
        match self {
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Validation => 400,
            Self::Internal => 500,
        }
    }
}

#[derive(Debug)]
pub enum ServiceError {
    /// Principal lacks the ownership/assignment relation for the action.
    Forbidden(AccessDenied),
    /// Referenced user, project or task does not exist.
    NotFound { entity: &'static str, id: Uuid },
    /// Malformed field input.
    InvalidInput(ValidationError),
    /// Malformed pagination input.
    InvalidPage(PaginationError),
    /// Input collides with existing data (e.g. a registered email).
    Conflict(String),
    /// Storage or consistency failure.
    Internal(RepoError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidInput(_) | Self::InvalidPage(_) | Self::Conflict(_) => {
                ErrorKind::Validation
            }
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Caller-facing text. Internal details never leave the process.
    pub fn public_message(&self) -> String {
        match self {
            Self::Forbidden(_) => "Not authorized".to_string(),
            Self::NotFound { entity, .. } => format!("{} not found", capitalize(entity)),
            Self::InvalidInput(err) => err.to_string(),
            Self::InvalidPage(err) => err.to_string(),
            Self::Conflict(message) => message.clone(),
            Self::Internal(_) => "Internal error".to_string(),
        }
    }

    pub(crate) fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forbidden(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidInput(err) => write!(f, "{err}"),
            Self::InvalidPage(err) => write!(f, "{err}"),
            Self::Conflict(message) => write!(f, "conflict: {message}"),
            Self::Internal(err) => write!(f, "internal: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Forbidden(err) => Some(err),
            Self::InvalidInput(err) => Some(err),
            Self::InvalidPage(err) => Some(err),
            Self::Internal(err) => Some(err),
            Self::NotFound { .. } | Self::Conflict(_) => None,
        }
    }
}

impl From<AccessDenied> for ServiceError {
    fn from(value: AccessDenied) -> Self {
        Self::Forbidden(value)
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::InvalidInput(value)
    }
}

impl From<PaginationError> for ServiceError {
    fn from(value: PaginationError) -> Self {
        Self::InvalidPage(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::Conflict(message) => Self::Conflict(message),
            other => Self::Internal(other),
        }
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Runs one use-case and logs its outcome as a single metadata-only event.
pub(crate) fn observe<T>(
    event: &'static str,
    module: &'static str,
    op: impl FnOnce() -> ServiceResult<T>,
) -> ServiceResult<T> {
    let started_at = Instant::now();
    let result = op();
    let duration_ms = started_at.elapsed().as_millis();
    match &result {
        Ok(_) => debug!("event={event} module={module} status=ok duration_ms={duration_ms}"),
        Err(ServiceError::Internal(err)) => error!(
            "event={event} module={module} status=error duration_ms={duration_ms} error_code=internal error={err}"
        ),
        Err(err) => info!(
            "event={event} module={module} status=rejected duration_ms={duration_ms} error_code={}",
            err.kind().as_str()
        ),
    }
    result
}

pub type SqliteUserService<'conn> = UserService<SqliteUserRepository<'conn>>;
pub type SqliteNotificationService<'conn> =
    NotificationService<SqliteNotificationRepository<'conn>>;
pub type SqliteProjectService<'conn> = ProjectService<
    SqliteProjectRepository<'conn>,
    SqliteTaskRepository<'conn>,
    SqliteNotificationRepository<'conn>,
>;
pub type SqliteTaskService<'conn> = TaskService<
    SqliteProjectRepository<'conn>,
    SqliteTaskRepository<'conn>,
    SqliteUserRepository<'conn>,
>;

/// All SQLite-backed services over one borrowed connection.
pub struct CoreServices<'conn> {
    pub users: SqliteUserService<'conn>,
    pub projects: SqliteProjectService<'conn>,
    pub tasks: SqliteTaskService<'conn>,
    pub notifications: SqliteNotificationService<'conn>,
}

impl<'conn> CoreServices<'conn> {
    /// Wires services over a migrated connection with configured page sizes.
    pub fn new(conn: &'conn Connection, pagination: &PaginationSettings) -> RepoResult<Self> {
        let notifier = |limits: PageLimits| -> RepoResult<SqliteNotificationService<'conn>> {
            Ok(NotificationService::new(SqliteNotificationRepository::try_new(conn)?)
                .with_page_limits(limits))
        };

        Ok(Self {
            users: UserService::new(SqliteUserRepository::try_new(conn)?),
            projects: ProjectService::new(
                SqliteProjectRepository::try_new(conn)?,
                SqliteTaskRepository::try_new(conn)?,
                notifier(pagination.notification_limits())?,
            )
            .with_page_limits(pagination.project_limits()),
            tasks: TaskService::new(
                SqliteProjectRepository::try_new(conn)?,
                SqliteTaskRepository::try_new(conn)?,
                SqliteUserRepository::try_new(conn)?,
            ),
            notifications: notifier(pagination.notification_limits())?,
        })
    }
}
