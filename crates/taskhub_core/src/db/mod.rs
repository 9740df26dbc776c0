//! TaskHub storage entry points.
//!
//! # Responsibility
//! - Hand out SQLite connections that are ready for the repositories:
//!   foreign keys on, search helpers registered, schema migrated.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - A database written by a newer TaskHub build is refused, never downgraded.
//! - Users, projects and tasks are linked by enforced foreign keys, so owner
//!   and project deletion cascade in storage.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub(crate) use open::CASEFOLD_FN;
pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Parent directory of a database file does not exist.
    MissingDirectory(PathBuf),
    /// Stored schema is ahead of every migration this build knows.
    NewerSchema { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "storage error: {err}"),
            Self::MissingDirectory(dir) => {
                write!(f, "database directory `{}` does not exist", dir.display())
            }
            Self::NewerSchema { found, supported } => write!(
                f,
                "taskhub database is at schema {found}, this build supports up to {supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::MissingDirectory(_) | Self::NewerSchema { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
