//! Error types shared across the workflow crates.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No platform data or cache directory could be determined.
    #[error("Data directory not found")]
    NoDataDir,

    /// IO error on a configuration path.
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings file could not be parsed.
    #[error("Parse error in {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::Parse {
            path: PathBuf::from("settings.toml"),
            message: "expected table".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Parse error in \"settings.toml\": expected table"
        );
    }
}
