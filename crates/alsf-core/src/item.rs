//! Result items sent to Alfred.
//!
//! These types serialize to Alfred's Script Filter JSON format. Every
//! list the workflow produces (actions, tabs, configuration entries) is a
//! `Feedback` value printed to stdout.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Icon shown next to an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
    /// Path to an image file, relative to the workflow directory or absolute.
    pub path: String,
}

impl Icon {
    /// Create an icon from a path.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl From<&str> for Icon {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Built-in icons shipped in the workflow's `icons/` directory.
pub mod icons {
    pub const TAB: &str = "icons/tab.png";
    pub const TAB_ACTIVE: &str = "icons/tab-active.png";
    pub const URL: &str = "icons/url.png";
    pub const FOLDER: &str = "icons/folder.png";
    pub const WARNING: &str = "icons/warning.png";
    pub const ERROR: &str = "icons/error.png";
    pub const BLACKLIST: &str = "icons/blacklist.png";
}

/// Alternate behaviour of an item while a modifier key is held.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifier {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg: Option<String>,

    pub valid: bool,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, String>,
}

impl Modifier {
    /// Create a valid modifier with a subtitle.
    pub fn new(subtitle: impl Into<String>) -> Self {
        Self {
            subtitle: Some(subtitle.into()),
            valid: true,
            ..Default::default()
        }
    }

    /// Set a workflow variable.
    pub fn var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }
}

/// A single row in Alfred's results list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    /// Primary display text.
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    /// Value passed to the next workflow object when actioned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,

    pub valid: bool,

    /// Text Alfred (and `Feedback::filter`) matches against instead of the title.
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub match_text: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, String>,

    /// Modifier overrides keyed by `cmd`, `alt`, `ctrl`, `shift` or `fn`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub mods: BTreeMap<String, Modifier>,
}

impl Item {
    /// Create a new (invalid) item with a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.arg = Some(arg.into());
        self
    }

    pub fn icon(mut self, icon: impl Into<Icon>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn valid(mut self, valid: bool) -> Self {
        self.valid = valid;
        self
    }

    pub fn match_text(mut self, text: impl Into<String>) -> Self {
        self.match_text = Some(text.into());
        self
    }

    /// Set a workflow variable passed downstream when the item is actioned.
    pub fn var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// Attach a modifier (`cmd`, `alt`, ...).
    pub fn modifier(mut self, key: impl Into<String>, modifier: Modifier) -> Self {
        self.mods.insert(key.into(), modifier);
        self
    }

    /// Check whether every word of `query` occurs in the item's match text.
    ///
    /// Case-insensitive. An empty query matches everything.
    pub fn matches(&self, query: &str) -> bool {
        let haystack = self
            .match_text
            .as_deref()
            .unwrap_or(&self.title)
            .to_lowercase();
        query
            .split_whitespace()
            .all(|word| haystack.contains(&word.to_lowercase()))
    }
}

/// The complete response to a Script Filter invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub items: Vec<Item>,
}

impl Feedback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item.
    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Drop items that don't match `query`. Returns the number kept.
    pub fn filter(&mut self, query: &str) -> usize {
        self.items.retain(|item| item.matches(query));
        self.items.len()
    }

    /// Show a warning item if there are no results.
    pub fn warn_empty(&mut self, title: &str, subtitle: &str) {
        if self.items.is_empty() {
            self.items
                .push(Item::new(title).subtitle(subtitle).icon(icons::WARNING));
        }
    }

    /// Replace the feedback with a single error item.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            items: vec![Item::new(message)
                .subtitle("Check the workflow debugger for details")
                .icon(icons::ERROR)],
        }
    }

    /// Serialize to Alfred JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Arg and variables emitted by a Run Script action.
///
/// Serializes as `{"alfredworkflow": {"arg": ..., "variables": {...}}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgVars {
    pub arg: Option<String>,
    pub variables: BTreeMap<String, String>,
}

impl ArgVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.arg = Some(arg.into());
        self
    }

    pub fn var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// Serialize to Alfred JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        #[derive(Serialize)]
        struct Inner<'a> {
            #[serde(skip_serializing_if = "Option::is_none")]
            arg: Option<&'a str>,
            variables: &'a BTreeMap<String, String>,
        }

        #[derive(Serialize)]
        struct Outer<'a> {
            alfredworkflow: Inner<'a>,
        }

        serde_json::to_string(&Outer {
            alfredworkflow: Inner {
                arg: self.arg.as_deref(),
                variables: &self.variables,
            },
        })
    }
}
