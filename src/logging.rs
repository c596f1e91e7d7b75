//! Logging setup.
//!
//! Every event this crate emits uses the `forum_privacy` target, so the
//! default filter enables that target at the configured level and leaves
//! dependencies such as sqlx quiet. `RUST_LOG`, when set, replaces the
//! default filter.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::{PrivacyError, Result};

/// Target prefix of this crate's events.
pub const TARGET: &str = "forum_privacy";

/// Parse a log level name.
pub fn parse_level(level: &str) -> Option<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Default filter directives for a logging configuration.
///
/// Unknown levels fall back to `info`.
pub fn default_directives(config: &LoggingConfig) -> String {
    let level = parse_level(&config.level).unwrap_or(Level::INFO);
    format!("{}={}", TARGET, level.as_str().to_lowercase())
}

fn filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(config)))
}

/// Install the global subscriber.
///
/// Events go to stdout and, unless `config.file` is empty, to that file as
/// well. Fails if a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let file_layer = if config.file.is_empty() {
        None
    } else {
        if let Some(parent) = Path::new(&config.file).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let log_file = Arc::new(File::create(&config.file)?);
        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(log_file)
                .with_ansi(false)
                .with_target(true),
        )
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_ansi(file_layer.is_none())
                .with_target(true),
        )
        .with(file_layer)
        .with(filter(config))
        .try_init()
        .map_err(|e| PrivacyError::Config(format!("logging already initialized: {e}")))
}
