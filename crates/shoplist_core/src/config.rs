//! Core runtime configuration.
//!
//! # Responsibility
//! - Resolve store path and logging settings from defaults plus environment.
//!
//! # Invariants
//! - Resolution never fails; unusable values are caught later by
//!   `open_db`/`init_logging`, which report precise errors.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "SHOPLIST_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "SHOPLIST_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "SHOPLIST_LOG_DIR";

/// File name used when no store path is configured.
pub const DEFAULT_DB_FILE_NAME: &str = "shoplist.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// File logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Builds config from process environment on top of defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds config from an arbitrary key lookup; blank values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = value(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = value(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        config.log_dir = value(ENV_LOG_DIR).map(PathBuf::from);
        config
    }
}
