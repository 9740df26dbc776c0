//! Layered runtime settings.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML file,
//! then `TASKHUB__<SECTION>__<KEY>` environment variables.

use crate::pagination::{PageLimits, MAX_PAGE_SIZE, NOTIFICATION_PAGE_SIZE, PROJECT_PAGE_SIZE};
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "TASKHUB";
const DEFAULT_DB_PATH: &str = "taskhub.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseSettings {
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    /// Absolute directory for rolling log files. Logging stays off when unset.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PaginationSettings {
    pub project_page_size: u32,
    pub notification_page_size: u32,
    pub max_page_size: u32,
}

impl PaginationSettings {
    pub fn project_limits(&self) -> PageLimits {
        PageLimits::new(self.project_page_size, self.max_page_size)
    }

    pub fn notification_limits(&self) -> PageLimits {
        PageLimits::new(self.notification_page_size, self.max_page_size)
    }
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            project_page_size: PROJECT_PAGE_SIZE,
            notification_page_size: NOTIFICATION_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
    pub pagination: PaginationSettings,
}

impl Settings {
    /// Loads settings, reading `file` when given and present.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(
            file,
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
    }

    fn load_with_env(file: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("database.path", DEFAULT_DB_PATH)?
            .set_default("logging.level", crate::logging::default_log_level())?
            .set_default("pagination.project_page_size", i64::from(PROJECT_PAGE_SIZE))?
            .set_default(
                "pagination.notification_page_size",
                i64::from(NOTIFICATION_PAGE_SIZE),
            )?
            .set_default("pagination.max_page_size", i64::from(MAX_PAGE_SIZE))?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        builder.add_source(env).build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::Settings;
    use config::Environment;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn no_env() -> Environment {
        Environment::with_prefix("TASKHUB").source(Some(HashMap::new()))
    }

    #[test]
    fn defaults_cover_every_section() {
        let settings = Settings::load_with_env(None, no_env()).unwrap();
        assert_eq!(settings.database.path, PathBuf::from("taskhub.sqlite3"));
        assert_eq!(settings.logging.dir, None);
        assert_eq!(settings.pagination.project_page_size, 10);
        assert_eq!(settings.pagination.notification_page_size, 20);
        assert_eq!(settings.pagination.max_page_size, 100);
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taskhub.toml");
        std::fs::write(
            &path,
            "[database]\npath = \"/var/lib/taskhub/data.db\"\n\n[pagination]\nproject_page_size = 25\n",
        )
        .unwrap();

        let settings = Settings::load_with_env(Some(&path), no_env()).unwrap();
        assert_eq!(
            settings.database.path,
            PathBuf::from("/var/lib/taskhub/data.db")
        );
        assert_eq!(settings.pagination.project_limits().default_limit, 25);
        assert_eq!(settings.pagination.notification_limits().default_limit, 20);
    }

    #[test]
    fn environment_overrides_defaults() {
        let env = Environment::with_prefix("TASKHUB")
            .separator("__")
            .try_parsing(true)
            .source(Some(HashMap::from([
                ("TASKHUB__LOGGING__LEVEL".to_string(), "warn".to_string()),
                (
                    "TASKHUB__PAGINATION__MAX_PAGE_SIZE".to_string(),
                    "40".to_string(),
                ),
            ])));

        let settings = Settings::load_with_env(None, env).unwrap();
        assert_eq!(settings.logging.level, "warn");
        assert_eq!(settings.pagination.max_page_size, 40);
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let settings =
            Settings::load_with_env(Some(&dir.path().join("absent.toml")), no_env()).unwrap();
        assert_eq!(settings.pagination.project_page_size, 10);
    }
}
