//! Domain model for users, projects, tasks and notifications.
//!
//! # Responsibility
//! - Define canonical records shared by repositories and services.
//! - Own field-level validation rules independent of storage.
//!
//! # Invariants
//! - Every record is identified by a stable UUID v4.
//! - Timestamps are Unix epoch milliseconds.
//! - JSON shapes use camelCase keys and SCREAMING_SNAKE_CASE statuses.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod notification;
pub mod project;
pub mod task;
pub mod user;

/// Field-level validation failure for domain input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is empty after trim.
    BlankField(&'static str),
    /// Email does not look like `local@domain.tld`.
    InvalidEmail(String),
    /// Status text is not one of the recognized values.
    UnknownStatus {
        field: &'static str,
        value: String,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "`{field}` must not be blank"),
            Self::InvalidEmail(value) => write!(f, "invalid email address `{value}`"),
            Self::UnknownStatus { field, value } => {
                write!(f, "unknown {field} `{value}`")
            }
        }
    }
}

impl Error for ValidationError {}

/// Trims `value` and rejects it when nothing is left.
pub(crate) fn require_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(trimmed.to_string())
}

/// Normalizes optional free text: trimmed, and `None` when blank.
pub(crate) fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::{optional_text, require_text, ValidationError};

    #[test]
    fn require_text_trims_and_rejects_blank() {
        assert_eq!(require_text("name", "  Apollo ").unwrap(), "Apollo");
        assert_eq!(
            require_text("name", " \t ").unwrap_err(),
            ValidationError::BlankField("name")
        );
    }

    #[test]
    fn optional_text_drops_blank_values() {
        assert_eq!(optional_text(Some("  ")), None);
        assert_eq!(optional_text(Some(" body ")).as_deref(), Some("body"));
        assert_eq!(optional_text(None), None);
    }
}
