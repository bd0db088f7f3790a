//! Configuration module for the daynote journal.
//!
//! This module handles parsing configuration from environment variables.
//!
//! # Environment Variables
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `DAYNOTE_ROOT` | No | `~/ll` | Root directory holding `YYYY/MM/YYYY-MM-DD.<ext>` notes |
//! | `DAYNOTE_EXTENSION` | No | `md` | File extension of daily notes |
//! | `DAYNOTE_SCHEDULE_AT` | No | `00:10` | Local time (`HH:MM`) of the daily job |
//! | `DAYNOTE_POLL_SECS` | No | 60 | Seconds between scheduler polls |
//!
//! # Example
//!
//! ```no_run
//! use daynote_journal::config::Config;
//!
//! let config = Config::from_env().expect("Failed to load configuration");
//! println!("Notes live under: {}", config.root.display());
//! ```

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveTime;
use directories::BaseDirs;
use thiserror::Error;

/// Default journal directory name relative to home.
const DEFAULT_ROOT_DIR: &str = "ll";

/// Default note file extension.
pub const DEFAULT_EXTENSION: &str = "md";

/// Default local time of the daily job.
const DEFAULT_SCHEDULE_AT: &str = "00:10";

/// Default scheduler polling interval (in seconds).
const DEFAULT_POLL_SECS: u64 = 60;

/// Errors that can occur during configuration parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Environment variable has an invalid value.
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to determine home directory.
    #[error("failed to determine home directory")]
    NoHomeDirectory,
}

impl ConfigError {
    fn invalid(key: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Configuration for the daynote journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root directory of the journal.
    pub root: PathBuf,

    /// Extension of note files, without the leading dot.
    pub extension: String,

    /// Local wall-clock time at which the daily job fires.
    pub schedule_at: NaiveTime,

    /// How often the scheduler checks whether the daily job is due.
    pub poll_interval: Duration,
}

impl Config {
    /// Creates a configuration rooted at `root` with every other value at its default.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            schedule_at: default_schedule_at(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_SECS),
        }
    }

    /// Creates a new `Config` by parsing environment variables.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if:
    /// - `DAYNOTE_ROOT` is unset and the home directory cannot be determined
    /// - `DAYNOTE_EXTENSION` is empty or contains a path separator or dot
    /// - `DAYNOTE_SCHEDULE_AT` is not a valid `HH:MM` time
    /// - `DAYNOTE_POLL_SECS` is not a positive integer
    pub fn from_env() -> Result<Self, ConfigError> {
        // Optional: DAYNOTE_ROOT (default: ~/ll)
        let root = match env::var("DAYNOTE_ROOT") {
            Ok(val) if !val.trim().is_empty() => PathBuf::from(val),
            _ => {
                let base_dirs = BaseDirs::new().ok_or(ConfigError::NoHomeDirectory)?;
                base_dirs.home_dir().join(DEFAULT_ROOT_DIR)
            }
        };

        let extension = match env::var("DAYNOTE_EXTENSION") {
            Ok(val) => parse_extension(&val)?,
            Err(_) => DEFAULT_EXTENSION.to_string(),
        };

        let schedule_at = match env::var("DAYNOTE_SCHEDULE_AT") {
            Ok(val) => parse_schedule_at(&val)?,
            Err(_) => default_schedule_at(),
        };

        // Optional: DAYNOTE_POLL_SECS (default: 60, must be >= 1)
        let poll_interval = match env::var("DAYNOTE_POLL_SECS") {
            Ok(val) => {
                let secs = val.trim().parse::<u64>().map_err(|_| {
                    ConfigError::invalid(
                        "DAYNOTE_POLL_SECS",
                        format!("expected positive integer, got '{val}'"),
                    )
                })?;
                if secs == 0 {
                    return Err(ConfigError::invalid(
                        "DAYNOTE_POLL_SECS",
                        "poll interval must be at least 1 second",
                    ));
                }
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(DEFAULT_POLL_SECS),
        };

        Ok(Self {
            root,
            extension,
            schedule_at,
            poll_interval,
        })
    }
}

fn default_schedule_at() -> NaiveTime {
    NaiveTime::from_hms_opt(0, 10, 0).unwrap_or(NaiveTime::MIN)
}

fn parse_extension(val: &str) -> Result<String, ConfigError> {
    let ext = val.trim().trim_start_matches('.');
    if ext.is_empty() {
        return Err(ConfigError::invalid(
            "DAYNOTE_EXTENSION",
            "extension cannot be empty",
        ));
    }
    if ext.contains(['.', '/', '\\']) {
        return Err(ConfigError::invalid(
            "DAYNOTE_EXTENSION",
            format!("extension must be a single component, got '{val}'"),
        ));
    }
    Ok(ext.to_string())
}

fn parse_schedule_at(val: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(val.trim(), "%H:%M").map_err(|_| {
        ConfigError::invalid(
            "DAYNOTE_SCHEDULE_AT",
            format!("expected HH:MM, got '{val}' (default {DEFAULT_SCHEDULE_AT})"),
        )
    })
}
