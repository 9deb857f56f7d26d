//! Safari tab and URL actions.
//!
//! This crate holds everything between the command line and Safari:
//!
//! - `action`: the action model (built-ins, scripts, targets)
//! - `registry`: per-invocation catalogue of actions, filtered by the blacklist
//! - `discovery`: finds script actions on disk
//! - `blacklist`: the user's list of hidden action titles
//! - `exec`: runs an action against a tab or URL
//! - `dispatch`: resolves requests and ties the above together
//! - `safari`: the `Browser` trait and its osascript implementation
//! - `cache`: short-lived on-disk cache of Safari's window list

pub mod action;
pub mod blacklist;
pub mod cache;
pub mod discovery;
pub mod dispatch;
pub mod error;
pub mod exec;
pub mod registry;
pub mod safari;

pub use action::{
    script_title, Action, ActionKind, ActionType, Builtin, Capability, ScriptAction, ScriptType,
    Shell, Target,
};
pub use blacklist::{Blacklist, BlacklistStore};
pub use cache::CachingBrowser;
pub use discovery::{discover_scripts, is_candidate, script_icon, Discoverer, Discovery};
pub use dispatch::{is_web_url, ActionRequest, Dispatcher, TargetRequest};
pub use error::{ActionError, ActionResult};
pub use exec::{invocation_plan, Executor, Invocation};
pub use registry::Registry;
pub use safari::{find_tab, Browser, CloseScope, OsaScriptBrowser, Tab, Window};
