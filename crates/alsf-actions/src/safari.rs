//! Safari scripting bridge.
//!
//! Safari is driven through small JXA programs run by `/usr/bin/osascript`.
//! Programs that return data print JSON on stdout, which is decoded here.
//! The `Browser` trait is the seam the dispatcher and executor depend on.

use std::path::PathBuf;
use std::process::Command;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ActionError, ActionResult};

const JXA_TABS: &str = include_str!("jxa/tabs.js");
const JXA_ACTIVE_TAB: &str = include_str!("jxa/active_tab.js");
const JXA_ACTIVATE: &str = include_str!("jxa/activate.js");
const JXA_CLOSE: &str = include_str!("jxa/close.js");

/// Default location of the OSA script runner.
pub const OSASCRIPT: &str = "/usr/bin/osascript";

/// Program used to open URLs in the user's default browser.
pub const OPEN: &str = "/usr/bin/open";

// =============================================================================
// Data
// =============================================================================

/// A Safari tab. Indices are 1-based, as in Safari's scripting dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub index: usize,
    pub window_index: usize,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub active: bool,
}

impl Tab {
    /// The tab's URL, parsed.
    pub fn parsed_url(&self) -> ActionResult<Url> {
        Url::parse(&self.url).map_err(|source| ActionError::InvalidUrl {
            url: self.url.clone(),
            source,
        })
    }
}

/// A Safari browser window and its tabs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Window {
    pub index: usize,
    #[serde(default)]
    pub active_tab: usize,
    #[serde(default)]
    pub tabs: Vec<Tab>,
}

/// Find a tab by window and tab index in a snapshot.
pub fn find_tab(windows: &[Window], window: usize, tab: usize) -> Option<&Tab> {
    windows
        .iter()
        .find(|w| w.index == window)
        .and_then(|w| w.tabs.iter().find(|t| t.index == tab))
}

/// Which tabs a close command applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseScope {
    /// The given tab.
    Tab,
    /// Every tab in the window except the given one.
    OtherTabs,
    /// Tabs left of the given one.
    TabsLeft,
    /// Tabs right of the given one.
    TabsRight,
    /// The whole window.
    Window,
}

impl CloseScope {
    /// Command understood by the close program.
    pub fn as_arg(self) -> &'static str {
        match self {
            CloseScope::Tab => "tab",
            CloseScope::OtherTabs => "tabs-other",
            CloseScope::TabsLeft => "tabs-left",
            CloseScope::TabsRight => "tabs-right",
            CloseScope::Window => "win",
        }
    }

    /// Scope for the `--left`/`--right` flags of the close command.
    pub fn from_flags(left: bool, right: bool) -> Self {
        match (left, right) {
            (true, true) => CloseScope::OtherTabs,
            (true, false) => CloseScope::TabsLeft,
            (false, true) => CloseScope::TabsRight,
            (false, false) => CloseScope::Tab,
        }
    }
}

// =============================================================================
// Browser trait
// =============================================================================

/// Operations on the running browser.
#[cfg_attr(test, mockall::automock)]
pub trait Browser {
    /// All browser windows with their tabs.
    fn windows(&self) -> ActionResult<Vec<Window>>;

    /// The current tab of the frontmost window.
    fn active_tab(&self) -> ActionResult<Tab>;

    /// Bring a window (and tab) to the front.
    fn activate(&self, window: usize, tab: usize) -> ActionResult<()>;

    /// Close tab(s) or a window.
    fn close(&self, scope: CloseScope, window: usize, tab: usize) -> ActionResult<()>;

    /// Open a URL in the user's default browser.
    fn open_url(&self, url: &Url) -> ActionResult<()>;

    /// Forget any saved window listing. Called after anything that may have
    /// changed Safari's windows or tabs.
    fn invalidate_windows(&self) {}
}

/// `Browser` implementation that talks to Safari via osascript.
#[derive(Debug, Clone)]
pub struct OsaScriptBrowser {
    osascript: PathBuf,
}

impl OsaScriptBrowser {
    pub fn new() -> Self {
        Self {
            osascript: PathBuf::from(OSASCRIPT),
        }
    }

    /// Run a JXA program and return its stdout.
    fn run_jxa(&self, source: &str, args: &[String]) -> ActionResult<String> {
        let output = Command::new(&self.osascript)
            .args(["-l", "JavaScript", "-e", source])
            .args(args)
            .output()
            .map_err(|source| ActionError::Launch {
                program: self.osascript.display().to_string(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            tracing::debug!("osascript stderr: {}", stderr.trim());
        }

        if !output.status.success() {
            return Err(ActionError::Bridge(stderr.trim().to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for OsaScriptBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl Browser for OsaScriptBrowser {
    fn windows(&self) -> ActionResult<Vec<Window>> {
        let out = self.run_jxa(JXA_TABS, &[])?;
        let windows: Vec<Window> = serde_json::from_str(out.trim())?;
        tracing::debug!("Loaded {} Safari window(s)", windows.len());
        Ok(windows)
    }

    fn active_tab(&self) -> ActionResult<Tab> {
        let out = self.run_jxa(JXA_ACTIVE_TAB, &[])?;
        Ok(serde_json::from_str(out.trim())?)
    }

    fn activate(&self, window: usize, tab: usize) -> ActionResult<()> {
        tracing::info!("Activating {}x{}", window, tab);
        let mut args = vec![window.to_string()];
        if tab > 0 {
            args.push(tab.to_string());
        }
        self.run_jxa(JXA_ACTIVATE, &args).map(|_| ())
    }

    fn close(&self, scope: CloseScope, window: usize, tab: usize) -> ActionResult<()> {
        tracing::info!("Closing {} (window {}, tab {})", scope.as_arg(), window, tab);
        let mut args = vec![scope.as_arg().to_string(), window.max(1).to_string()];
        if scope != CloseScope::Window && tab > 0 {
            args.push(tab.to_string());
        }
        self.run_jxa(JXA_CLOSE, &args).map(|_| ())
    }

    fn open_url(&self, url: &Url) -> ActionResult<()> {
        tracing::info!("Opening {} in default browser", url);
        let output = Command::new(OPEN)
            .arg(url.as_str())
            .output()
            .map_err(|source| ActionError::Launch {
                program: OPEN.to_string(),
                source,
            })?;
        if !output.status.success() {
            return Err(ActionError::Bridge(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"[
        {"index": 1, "activeTab": 2, "tabs": [
            {"title": "One", "url": "https://one.example/", "index": 1, "windowIndex": 1, "active": false},
            {"title": "Two", "url": "https://two.example/", "index": 2, "windowIndex": 1, "active": true}
        ]},
        {"index": 2, "activeTab": 1, "tabs": [
            {"title": "Three", "url": "favorites://", "index": 1, "windowIndex": 2, "active": true}
        ]}
    ]"#;

    #[test]
    fn test_decode_windows() {
        let windows: Vec<Window> = serde_json::from_str(SNAPSHOT).unwrap();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].active_tab, 2);
        assert_eq!(windows[0].tabs[1].window_index, 1);
        assert!(windows[0].tabs[1].active);
    }

    #[test]
    fn test_find_tab() {
        let windows: Vec<Window> = serde_json::from_str(SNAPSHOT).unwrap();

        let tab = find_tab(&windows, 2, 1).unwrap();
        assert_eq!(tab.title, "Three");

        assert!(find_tab(&windows, 1, 3).is_none());
        assert!(find_tab(&windows, 3, 1).is_none());
    }

    #[test]
    fn test_close_scope_from_flags() {
        assert_eq!(CloseScope::from_flags(false, false), CloseScope::Tab);
        assert_eq!(CloseScope::from_flags(true, false), CloseScope::TabsLeft);
        assert_eq!(CloseScope::from_flags(false, true), CloseScope::TabsRight);
        assert_eq!(CloseScope::from_flags(true, true), CloseScope::OtherTabs);
        assert_eq!(CloseScope::Window.as_arg(), "win");
    }

    #[test]
    fn test_tab_parsed_url() {
        let mut tab = Tab {
            index: 1,
            window_index: 1,
            title: "x".to_string(),
            url: "https://example.com/a".to_string(),
            active: false,
        };
        assert_eq!(tab.parsed_url().unwrap().host_str(), Some("example.com"));

        tab.url = "not a url".to_string();
        assert!(matches!(
            tab.parsed_url(),
            Err(ActionError::InvalidUrl { .. })
        ));
    }
}
