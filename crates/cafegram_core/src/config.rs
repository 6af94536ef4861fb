//! Runtime configuration for the café core.
//!
//! Values come from `CAFEGRAM_*` environment variables with built-in
//! defaults. Callers such as the CLI may override fields after resolution.

use crate::logging::{default_log_level, normalize_level};
use crate::service::recommendation::DEFAULT_REMINDER_DELAY;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const DB_PATH_ENV: &str = "CAFEGRAM_DB_PATH";
pub const LOG_DIR_ENV: &str = "CAFEGRAM_LOG_DIR";
pub const LOG_LEVEL_ENV: &str = "CAFEGRAM_LOG_LEVEL";
pub const REMINDER_DELAY_ENV: &str = "CAFEGRAM_REMINDER_DELAY_SECS";

const DEFAULT_DB_FILE_NAME: &str = "cafegram.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => write!(f, "invalid value `{value}` for {key}"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    /// Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
    pub reminder_delay: Duration,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_dir: None,
            log_level: default_log_level().to_string(),
            reminder_delay: DEFAULT_REMINDER_DELAY,
        }
    }
}

impl CoreConfig {
    /// Resolves configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration from an arbitrary key lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = read(DB_PATH_ENV) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(dir) = read(LOG_DIR_ENV) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(level) = read(LOG_LEVEL_ENV) {
            let normalized = normalize_level(&level).map_err(|_| ConfigError::InvalidValue {
                key: LOG_LEVEL_ENV,
                value: level.clone(),
            })?;
            config.log_level = normalized.to_string();
        }
        if let Some(raw) = read(REMINDER_DELAY_ENV) {
            let secs = raw.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                key: REMINDER_DELAY_ENV,
                value: raw.clone(),
            })?;
            config.reminder_delay = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
