//! Logging bootstrap for the binaries built on this crate.
//!
//! # Invariants
//! - Logging is initialized at most once per process.
//! - Re-initialization with the same level is a no-op; a different level is rejected.
//! - The parsing modules never log; only the library layer and front ends do.

use flexi_logger::{Logger, LoggerHandle};
use log::info;
use once_cell::sync::OnceCell;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();

struct LoggingState {
    level: &'static str,
    _logger: LoggerHandle,
}

/// Starts logging to stderr at `level`.
pub fn init_logging(level: &str) -> Result<(), LoggingError> {
    let level = normalize_level(level)?;
    let state = LOGGING_STATE.get_or_try_init(|| -> Result<LoggingState, LoggingError> {
        let logger = Logger::try_with_str(level)
            .map_err(|e| LoggingError::Backend(e.to_string()))?
            .format(flexi_logger::default_format)
            .start()
            .map_err(|e| LoggingError::Backend(e.to_string()))?;
        info!(
            "event=logging_init module=core status=ok level={} version={}",
            level,
            env!("CARGO_PKG_VERSION")
        );
        Ok(LoggingState {
            level,
            _logger: logger,
        })
    })?;

    if state.level != level {
        return Err(LoggingError::AlreadyInitialized {
            active: state.level,
            requested: level,
        });
    }
    Ok(())
}

/// Active level, or `None` before [`init_logging`].
pub fn logging_level() -> Option<&'static str> {
    LOGGING_STATE.get().map(|state| state.level)
}

fn normalize_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(LoggingError::UnsupportedLevel(other.to_string())),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("unsupported log level `{0}`; expected trace|debug|info|warn|error")]
    UnsupportedLevel(String),
    #[error("logging already initialized with level `{active}`; refusing to switch to `{requested}`")]
    AlreadyInitialized {
        active: &'static str,
        requested: &'static str,
    },
    #[error("failed to start logger: {0}")]
    Backend(String),
}
