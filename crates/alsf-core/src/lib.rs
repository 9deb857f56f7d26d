//! Core types for the Safari assistant workflow.
//!
//! This crate contains data structures shared by the action and CLI crates:
//! - Alfred result items (Script Filter JSON)
//! - Workflow paths and user settings
//! - Error types

mod config;
mod error;
mod item;

pub use config::{
    env, CacheSettings, Paths, ScriptSettings, Settings, BLACKLIST_FILENAME, BUNDLE_ID,
    SETTINGS_FILENAME,
};
pub use error::ConfigError;
pub use item::{icons, ArgVars, Feedback, Icon, Item, Modifier};
