//! Session logging
//!
//! Log records go to two places: the terminal, filtered at `stdout_level`, and the session log
//! file, filtered at `file_level`. Per target overrides let the cyclic modules, which log every
//! cycle at trace level, be kept quiet without losing the rest of the debug output.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use std::collections::BTreeMap;
use log::{self, info};
use colored::{ColoredString, Colorize};
use serde::Deserialize;
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Logging parameters, normally loaded from `logger.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct LogParams {
    /// Level printed to the terminal, must be at least `Info`.
    pub stdout_level: LevelFilter,

    /// Level written to the session log file.
    #[serde(default = "default_file_level")]
    pub file_level: LevelFilter,

    /// Maximum level for particular log targets, for example `drive_lib::odom`.
    #[serde(default)]
    pub targets: BTreeMap<String, LevelFilter>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a terminal log level of at least `INFO`, found `{0}`")]
    InvalidMinLogLevel(log::LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LogParams {
    /// Log at `level` to both the terminal and the file, with no target overrides.
    pub fn new(level: LevelFilter) -> Self {
        Self {
            stdout_level: level,
            file_level: level,
            targets: BTreeMap::new(),
        }
    }

    /// Cap the level logged for `target` and its submodules.
    pub fn with_target(mut self, target: &str, level: LevelFilter) -> Self {
        self.targets.insert(target.to_string(), level);
        self
    }

    /// The most verbose level either output accepts.
    pub fn max_level(&self) -> LevelFilter {
        std::cmp::max(self.stdout_level, self.file_level)
    }

    fn check(&self) -> Result<(), LoggerInitError> {
        if self.stdout_level < log::Level::Info {
            return Err(LoggerInitError::InvalidMinLogLevel(self.stdout_level))
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// # Safety
///
/// - This function must only be called once to prevent corrupting logs.
pub fn logger_init(
    params: &LogParams,
    session: &session::Session
) -> Result<(), LoggerInitError> {
    params.check()?;

    let log_file = fern::log_file(session.log_file_path.clone())
        .map_err(LoggerInitError::LogFileInitError)?;

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{:10.6} {}] {}{}",
                session::get_elapsed_seconds(),
                level_to_str(record.level()),
                target_prefix(record.level(), record.target()),
                message
            ))
        })
        .level(params.max_level());

    for (target, level) in params.targets.iter() {
        dispatch = dispatch.level_for(target.clone(), *level);
    }

    dispatch
        .chain(fern::Dispatch::new()
            .level(params.stdout_level)
            .chain(std::io::stdout()))
        .chain(fern::Dispatch::new()
            .level(params.file_level)
            .chain(log_file))
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    if let Some(epoch) = session::get_epoch() {
        info!("    Session epoch: {}", epoch);
    }
    info!("    Terminal level: {:?}, file level: {:?}", params.stdout_level, params.file_level);
    for (target, level) in params.targets.iter() {
        info!("    {} capped at {:?}", target, level);
    }
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn default_file_level() -> LevelFilter {
    LevelFilter::Trace
}

/// Debug and trace records carry their target, info and above don't.
fn target_prefix(level: log::Level, target: &str) -> String {
    if level > log::Level::Info {
        format!("{}: ", target)
    }
    else {
        String::new()
    }
}

/// Get the string representation of a log level
fn level_to_str(level: log::Level) -> ColoredString {
    match level {
        log::Level::Trace => "TRC".dimmed().italic(),
        log::Level::Debug => "DBG".dimmed(),
        log::Level::Info  => "INF".normal(),
        log::Level::Warn  => "WRN".yellow(),
        log::Level::Error => "ERR".red().bold()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
