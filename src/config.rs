//! Configuration module for forum-privacy.

use serde::Deserialize;
use std::path::Path;

use crate::{PrivacyError, Result};

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/forum.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Export configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// Root directory that filesystem exports are written under.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Timezone used when rendering exported timestamps (e.g. "UTC", "Europe/Berlin").
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// chrono format string for exported timestamps.
    #[serde(default = "default_datetime_format")]
    pub datetime_format: String,
}

fn default_output_dir() -> String {
    "export".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_datetime_format() -> String {
    "%A, %-d %B %Y, %-I:%M %p".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            timezone: default_timezone(),
            datetime_format: default_datetime_format(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file. Empty logs to stdout only.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/forum-privacy.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Export configuration.
    #[serde(default)]
    pub export: ExportConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(PrivacyError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| PrivacyError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `FORUM_PRIVACY_DB`: Override the database path
    /// - `FORUM_PRIVACY_EXPORT_DIR`: Override the export output directory
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("FORUM_PRIVACY_DB") {
            if !path.is_empty() {
                self.database.path = path;
            }
        }
        if let Ok(dir) = std::env::var("FORUM_PRIVACY_EXPORT_DIR") {
            if !dir.is_empty() {
                self.export.output_dir = dir;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - the export timezone is not a known IANA name
    /// - the export output directory is empty
    /// - the log level is unknown
    pub fn validate(&self) -> Result<()> {
        if self.export.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(PrivacyError::Config(format!(
                "unknown export timezone: {}",
                self.export.timezone
            )));
        }
        if self.export.output_dir.trim().is_empty() {
            return Err(PrivacyError::Config(
                "export.output_dir must not be empty".to_string(),
            ));
        }
        if crate::logging::parse_level(&self.logging.level).is_none() {
            return Err(PrivacyError::Config(format!(
                "unknown log level: {}",
                self.logging.level
            )));
        }
        Ok(())
    }

    /// Install logging as configured in `[logging]`.
    pub fn init_logging(&self) -> Result<()> {
        crate::logging::init(&self.logging)
    }
}
