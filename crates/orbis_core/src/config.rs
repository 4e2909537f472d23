//! Core runtime configuration.
//!
//! # Responsibility
//! - Collect logging, storage and chart settings in one typed value.
//! - Read overrides from `ORBIS_*` environment variables.
//!
//! # Invariants
//! - Invalid values are reported as `ConfigError`, never silently replaced.

use crate::finance::SeriesPeriod;
use crate::logging::{default_log_level, normalize_level};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_LOG_LEVEL: &str = "ORBIS_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "ORBIS_LOG_DIR";
pub const ENV_DB_PATH: &str = "ORBIS_DB_PATH";
pub const ENV_SERIES_PERIOD: &str = "ORBIS_SERIES_PERIOD";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub message: String,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid `{}`: {}", self.key, self.message)
    }
}

impl Error for ConfigError {}

/// Settings consumed by the CLI and embedding hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub log_level: String,
    /// Absolute directory for rolling log files; logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    /// SQLite store file; an in-memory store is used when unset.
    pub db_path: Option<PathBuf>,
    pub series_period: SeriesPeriod,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            db_path: None,
            series_period: SeriesPeriod::default(),
        }
    }
}

impl CoreConfig {
    /// Builds a config from defaults overridden by process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from defaults overridden by `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = normalize_level(&level)
                .map_err(|message| ConfigError {
                    key: ENV_LOG_LEVEL,
                    message,
                })?
                .to_string();
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            let dir = PathBuf::from(dir.trim());
            if !dir.is_absolute() {
                return Err(ConfigError {
                    key: ENV_LOG_DIR,
                    message: format!("must be an absolute path, got `{}`", dir.display()),
                });
            }
            config.log_dir = Some(dir);
        }
        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = Some(PathBuf::from(path.trim()));
        }
        if let Some(period) = read(ENV_SERIES_PERIOD) {
            config.series_period = period.parse().map_err(|message| ConfigError {
                key: ENV_SERIES_PERIOD,
                message,
            })?;
        }

        Ok(config)
    }
}
