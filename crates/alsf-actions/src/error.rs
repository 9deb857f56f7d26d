//! Error types for action discovery, lookup and execution.
//!
//! All public APIs return `Result<T, ActionError>`. Nothing below the
//! dispatch layer retries or swallows these: they propagate unchanged to
//! the CLI, which turns them into a user-visible message.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::action::Capability;

/// Error type for action operations.
#[derive(Debug, Error)]
pub enum ActionError {
    /// IO error (blacklist file, cache file, pipes).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A script directory passed to discovery doesn't exist.
    #[error("Directory does not exist: {0:?}")]
    MissingDirectory(PathBuf),

    /// Walking a script directory failed.
    #[error("Failed to read {path:?}: {message}")]
    Walk { path: PathBuf, message: String },

    /// No action with this title in the requested class(es).
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// Requested window/tab no longer exists.
    #[error("Tab not found: {window}x{tab}")]
    TabNotFound { window: usize, tab: usize },

    /// A tab action was given a bare URL.
    #[error("Action '{title}' needs a {expected} target")]
    TargetMismatch { title: String, expected: Capability },

    /// Script is neither executable nor a recognised script type.
    #[error("Don't know how to run script: {0:?}")]
    UnrunnableScript(PathBuf),

    /// Subprocess could not be started.
    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Script exited with a non-zero status.
    #[error("Script {path:?} failed ({status}): {stderr}")]
    ScriptFailed {
        path: PathBuf,
        status: String,
        stderr: String,
    },

    /// Script exceeded the configured timeout and was killed.
    #[error("Script {path:?} timed out after {duration:?}")]
    Timeout { path: PathBuf, duration: Duration },

    /// Safari scripting bridge call failed.
    #[error("Safari error: {0}")]
    Bridge(String),

    /// Bridge output could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL could not be parsed.
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Result type alias for action operations.
pub type ActionResult<T> = Result<T, ActionError>;
