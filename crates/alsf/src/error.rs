//! Errors surfaced by the `alsf` binary.

use alsf_actions::ActionError;
use alsf_core::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error("Couldn't get active tab: {0}")]
    ActiveTab(#[source] ActionError),

    #[error("Failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}

pub type AppResult<T> = Result<T, AppError>;
