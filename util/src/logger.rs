//! Logging setup
//!
//! Records go to stdout and the session log file. Each line is prefixed with
//! the session elapsed time, so a log can be lined up against the cycle
//! archive. Per-target overrides let high rate targets (per-tick `trace!`
//! output, for example) be quietened without lowering the global level.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::collections::BTreeMap;
use std::fmt;

use colored::{ColoredString, Colorize};
use log::{info, Level};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session;

pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Logging configuration, usually loaded as part of an executable's params.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Most verbose level written by targets without an override.
    pub level: LevelFilter,

    /// Level overrides keyed by target. An override on a module path also
    /// applies to its submodules.
    #[serde(default)]
    pub targets: BTreeMap<String, LevelFilter>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("The global log level must let at least INFO through, found `{0}`")]
    InvalidMinLogLevel(LevelFilter),

    #[error("Could not open the session log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("A logger has already been installed: {0}")]
    FernInitError(log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            targets: BTreeMap::new()
        }
    }
}

impl LogConfig {
    /// Global level only, no overrides.
    pub fn with_level(level: LevelFilter) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Override the level of `target` and its submodules.
    pub fn with_target(mut self, target: &str, level: LevelFilter) -> Self {
        self.targets.insert(target.to_string(), level);
        self
    }

    /// Check the global level is at least `Info`. Overrides may be anything.
    pub fn validate(&self) -> Result<(), LoggerInitError> {
        if self.level < Level::Info {
            Err(LoggerInitError::InvalidMinLogLevel(self.level))
        }
        else {
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// Must only be called once per process.
pub fn logger_init(
    config: &LogConfig,
    session: &session::Session
) -> Result<(), LoggerInitError> {
    config.validate()?;

    let log_file = fern::log_file(&session.log_file_path)
        .map_err(LoggerInitError::LogFileInitError)?;

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}",
                format_line(
                    session::get_elapsed_seconds(),
                    record.level(),
                    record.target(),
                    message
                )
            ))
        })
        .level(config.level);

    for (target, level) in config.targets.iter() {
        dispatch = dispatch.level_for(target.clone(), *level);
    }

    dispatch
        .chain(std::io::stdout())
        .chain(log_file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    info!("    Session epoch: {}", session::get_epoch());
    info!("    Log level: {:?}", config.level);
    for (target, level) in config.targets.iter() {
        info!("    {} -> {:?}", target, level);
    }
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Render one log line. Warnings and above, and anything more verbose than
/// `Info`, carry their target.
fn format_line(
    elapsed_s: f64,
    level: Level,
    target: &str,
    message: &fmt::Arguments
) -> String {
    if level == Level::Info {
        format!("[{:10.6} {}] {}", elapsed_s, level_tag(level), message)
    }
    else {
        format!("[{:10.6} {}] {}: {}", elapsed_s, level_tag(level), target, message)
    }
}

fn level_tag(level: Level) -> ColoredString {
    match level {
        Level::Trace => "TRC".dimmed().italic(),
        Level::Debug => "DBG".dimmed(),
        Level::Info  => "INF".normal(),
        Level::Warn  => "WRN".yellow(),
        Level::Error => "ERR".red().bold()
    }
}
