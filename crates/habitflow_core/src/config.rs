//! Runtime configuration for embedding processes.
//!
//! # Responsibility
//! - Hold storage/logging locations and stats window bounds.
//! - Apply `HABITFLOW_*` environment overrides on top of defaults.
//!
//! # Invariants
//! - `1 <= default_window_days <= max_window_days`.
//! - `log_level` is one of `trace|debug|info|warn|error`.

use crate::logging::{default_log_level, LogLevel};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "HABITFLOW_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "HABITFLOW_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "HABITFLOW_LOG_DIR";
pub const ENV_STATS_WINDOW: &str = "HABITFLOW_STATS_WINDOW";

const DEFAULT_DB_FILE_NAME: &str = "habitflow.sqlite3";
const DEFAULT_WINDOW_DAYS: u32 = 7;
const MAX_WINDOW_DAYS: u32 = 366;

/// Invalid configuration value.
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

/// Core settings shared by every caller of the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// Logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
    /// Window used when a caller does not name one.
    pub default_window_days: u32,
    /// Largest window `get_rolling_stats` accepts.
    pub max_window_days: u32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            default_window_days: DEFAULT_WINDOW_DAYS,
            max_window_days: MAX_WINDOW_DAYS,
        }
    }
}

impl CoreConfig {
    /// Builds config from defaults plus process environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds config from defaults plus overrides returned by `lookup`.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = get(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            let parsed = level
                .parse::<LogLevel>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: ENV_LOG_LEVEL,
                    value: level.clone(),
                })?;
            config.log_level = parsed.as_str().to_string();
        }
        if let Some(dir) = get(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(window) = get(ENV_STATS_WINDOW) {
            config.default_window_days = window
                .parse::<u32>()
                .ok()
                .filter(|days| (1..=config.max_window_days).contains(days))
                .ok_or(ConfigError::InvalidValue {
                    key: ENV_STATS_WINDOW,
                    value: window,
                })?;
        }

        Ok(config)
    }
}
