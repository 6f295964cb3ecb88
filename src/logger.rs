//! Logging utilities for debugging and error tracking
//!
//! Call sites use the `log` macros; [`init`] wires them to a fern dispatch
//! built from [`LoggingConfig`]. Remote mutation failures are reported through
//! this channel rather than surfaced to the user.

use anyhow::{Context, Result};
use log::LevelFilter;

use crate::config::LoggingConfig;
use crate::constants::{APP_DIR, LOG_FILE};

/// Initialise the global logger from config. A no-op when logging is disabled.
/// Fails if called twice with logging enabled.
pub fn init(config: &LoggingConfig) -> Result<()> {
    if !config.enabled {
        return Ok(());
    }

    let level = parse_level(&config.level)?;
    let dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}][{}] {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level);

    let target = match &config.file {
        Some(path) => Some(path.clone()),
        None => dirs::data_dir().map(|dir| dir.join(APP_DIR).join(LOG_FILE)),
    };

    let dispatch = match target {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
            }
            dispatch.chain(
                fern::log_file(&path).with_context(|| format!("Failed to open log file: {}", path.display()))?,
            )
        }
        // No platform data dir (unusual); fall back to stderr.
        None => dispatch.chain(std::io::stderr()),
    };

    dispatch.apply().context("logger already initialised")?;
    Ok(())
}

/// Parse a config log level string.
pub fn parse_level(level: &str) -> Result<LevelFilter> {
    match level.to_ascii_lowercase().as_str() {
        "error" => Ok(LevelFilter::Error),
        "warn" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        other => anyhow::bail!("unknown log level '{other}'"),
    }
}
