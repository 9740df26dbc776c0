//! User domain model.

use super::{require_text, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Stable user identifier. Principals are identified by the same value.
pub type UserId = Uuid;

/// Public user record: the only user fields ever exposed by listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// Epoch milliseconds.
    pub created_at: i64,
}

/// Compact user shape embedded in task rows (`assignedUser`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// Validated input for a new user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl NewUser {
    /// Validates and normalizes registration input with a fresh id.
    ///
    /// Emails are trimmed and lowercased so uniqueness is case-insensitive.
    pub fn new(name: &str, email: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: require_text("name", name)?,
            email: normalize_email(email)?,
        })
    }
}

/// Partial self-service update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UserPatch {
    /// Returns a normalized copy, rejecting blank names and malformed emails.
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: self
                .name
                .as_deref()
                .map(|name| require_text("name", name))
                .transpose()?,
            email: self.email.as_deref().map(normalize_email).transpose()?,
        })
    }
}

pub(crate) fn normalize_email(value: &str) -> Result<String, ValidationError> {
    let normalized = value.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(ValidationError::BlankField("email"));
    }
    if !EMAIL_RE.is_match(&normalized) {
        return Err(ValidationError::InvalidEmail(value.trim().to_string()));
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::{normalize_email, NewUser, UserPatch};
    use crate::model::ValidationError;

    #[test]
    fn new_user_lowercases_email() {
        let user = NewUser::new(" Ada ", " Ada@Example.COM ").unwrap();
        assert_eq!(user.name, "Ada");
        assert_eq!(user.email, "ada@example.com");
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for value in ["ada", "ada@", "@example.com", "ada@example", "a da@example.com"] {
            assert!(
                matches!(normalize_email(value), Err(ValidationError::InvalidEmail(_))),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn patch_keeps_absent_fields_absent() {
        let patch = UserPatch {
            name: None,
            email: Some("NEW@example.com".to_string()),
        };
        let normalized = patch.normalized().unwrap();
        assert_eq!(normalized.name, None);
        assert_eq!(normalized.email.as_deref(), Some("new@example.com"));
    }
}
