//! Action types.
//!
//! An action is either a built-in (compiled behaviour that talks to the
//! Safari bridge) or a script found on disk. Each action belongs to exactly
//! one capability class, fixed when it is constructed.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use alsf_core::{icons, Icon};
use url::Url;

use crate::safari::{CloseScope, Tab};

// =============================================================================
// Capability
// =============================================================================

/// What kind of target an action operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// Operates on a Safari tab (window + tab index).
    Tab,
    /// Operates on a URL.
    Url,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Tab => "tab",
            Capability::Url => "url",
        }
    }

    /// Parse a script directory name (`tab` or `url`).
    pub fn from_dir_name(name: &str) -> Option<Self> {
        match name {
            "tab" => Some(Capability::Tab),
            "url" => Some(Capability::Url),
            _ => None,
        }
    }

    /// Default icon for actions of this class.
    pub fn default_icon(self) -> Icon {
        match self {
            Capability::Tab => Icon::new(icons::TAB),
            Capability::Url => Icon::new(icons::URL),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which class(es) to search when resolving an action by name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActionType {
    Tab,
    Url,
    /// Unspecified: tab actions first, then URL actions.
    #[default]
    Any,
}

impl From<Capability> for ActionType {
    fn from(c: Capability) -> Self {
        match c {
            Capability::Tab => ActionType::Tab,
            Capability::Url => ActionType::Url,
        }
    }
}

impl FromStr for ActionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "tab" => Ok(ActionType::Tab),
            "url" => Ok(ActionType::Url),
            "" | "any" => Ok(ActionType::Any),
            other => Err(format!("invalid action type: {}", other)),
        }
    }
}

// =============================================================================
// Built-in actions
// =============================================================================

/// Actions implemented in code, registered before any script discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    CloseTab,
    CloseOtherTabs,
    CloseTabsLeft,
    CloseTabsRight,
    CloseWindow,
    OpenInDefaultBrowser,
}

impl Builtin {
    /// Every built-in, in registration order.
    pub const ALL: [Builtin; 6] = [
        Builtin::CloseTab,
        Builtin::CloseOtherTabs,
        Builtin::CloseTabsLeft,
        Builtin::CloseTabsRight,
        Builtin::CloseWindow,
        Builtin::OpenInDefaultBrowser,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Builtin::CloseTab => "Close Tab",
            Builtin::CloseOtherTabs => "Close Other Tabs",
            Builtin::CloseTabsLeft => "Close Tabs to Left",
            Builtin::CloseTabsRight => "Close Tabs to Right",
            Builtin::CloseWindow => "Close Window",
            Builtin::OpenInDefaultBrowser => "Open in Default Browser",
        }
    }

    pub fn capability(self) -> Capability {
        match self {
            Builtin::OpenInDefaultBrowser => Capability::Url,
            _ => Capability::Tab,
        }
    }

    /// Close scope for the tab-closing built-ins.
    pub fn close_scope(self) -> Option<CloseScope> {
        match self {
            Builtin::CloseTab => Some(CloseScope::Tab),
            Builtin::CloseOtherTabs => Some(CloseScope::OtherTabs),
            Builtin::CloseTabsLeft => Some(CloseScope::TabsLeft),
            Builtin::CloseTabsRight => Some(CloseScope::TabsRight),
            Builtin::CloseWindow => Some(CloseScope::Window),
            Builtin::OpenInDefaultBrowser => None,
        }
    }
}

// =============================================================================
// Script actions
// =============================================================================

/// Shells used for shell-script actions that aren't executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Sh,
    Bash,
    Zsh,
}

impl Shell {
    pub fn program(self) -> &'static str {
        match self {
            Shell::Sh => "/bin/sh",
            Shell::Bash => "/bin/bash",
            Shell::Zsh => "/bin/zsh",
        }
    }
}

/// Script language, inferred from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptType {
    /// `.scpt`, `.scptd`, `.applescript`: run with osascript.
    AppleScript,
    /// `.js`: run with `osascript -l JavaScript`.
    JavaScript,
    /// `.sh`, `.bash`, `.zsh`.
    Shell(Shell),
}

impl ScriptType {
    /// Recognised script type for `path`, if any.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        match ext {
            "scpt" | "scptd" | "applescript" => Some(ScriptType::AppleScript),
            "js" => Some(ScriptType::JavaScript),
            "sh" => Some(ScriptType::Shell(Shell::Sh)),
            "bash" => Some(ScriptType::Shell(Shell::Bash)),
            "zsh" => Some(ScriptType::Shell(Shell::Zsh)),
            _ => None,
        }
    }
}

/// An action backed by a file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptAction {
    pub path: PathBuf,
    pub icon: Icon,
    pub capability: Capability,
}

impl ScriptAction {
    pub fn new(path: impl Into<PathBuf>, icon: Icon, capability: Capability) -> Self {
        Self {
            path: path.into(),
            icon,
            capability,
        }
    }

    /// File name without extension.
    pub fn title(&self) -> String {
        script_title(&self.path)
    }
}

/// Basename of `path` with the extension removed.
pub fn script_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// =============================================================================
// Action
// =============================================================================

/// What runs when an action is invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    Builtin(Builtin),
    Script(ScriptAction),
}

/// A named, invokable behaviour bound to one capability class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    title: String,
    icon: Icon,
    capability: Capability,
    kind: ActionKind,
}

impl Action {
    /// Wrap a built-in.
    pub fn builtin(builtin: Builtin) -> Self {
        let capability = builtin.capability();
        Self {
            title: builtin.title().to_string(),
            icon: capability.default_icon(),
            capability,
            kind: ActionKind::Builtin(builtin),
        }
    }

    /// Wrap a discovered script.
    pub fn script(script: ScriptAction) -> Self {
        Self {
            title: script.title(),
            icon: script.icon.clone(),
            capability: script.capability,
            kind: ActionKind::Script(script),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn icon(&self) -> &Icon {
        &self.icon
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self.kind, ActionKind::Builtin(_))
    }
}

// =============================================================================
// Target
// =============================================================================

/// The concrete subject of an action invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Tab(Tab),
    Url(Url),
}

impl Target {
    /// URL of the target. For tabs, the tab's current URL.
    pub fn url(&self) -> crate::ActionResult<Url> {
        match self {
            Target::Url(url) => Ok(url.clone()),
            Target::Tab(tab) => tab.parsed_url(),
        }
    }

    /// Positional arguments passed to a script of class `capability`.
    ///
    /// Tab scripts get `(window, tab)`, URL scripts get `(url)`. A URL
    /// script run against a tab receives the tab's URL.
    pub fn script_args(&self, title: &str, capability: Capability) -> crate::ActionResult<Vec<String>> {
        match (capability, self) {
            (Capability::Tab, Target::Tab(tab)) => {
                Ok(vec![tab.window_index.to_string(), tab.index.to_string()])
            }
            (Capability::Tab, Target::Url(_)) => Err(crate::ActionError::TargetMismatch {
                title: title.to_string(),
                expected: Capability::Tab,
            }),
            (Capability::Url, target) => Ok(vec![target.url()?.to_string()]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tab(window: usize, index: usize, url: &str) -> Tab {
        Tab {
            index,
            window_index: window,
            title: "Example".to_string(),
            url: url.to_string(),
            active: false,
        }
    }

    #[test]
    fn test_builtin_capabilities() {
        let tab_builtins: Vec<_> = Builtin::ALL
            .iter()
            .filter(|b| b.capability() == Capability::Tab)
            .collect();
        assert_eq!(tab_builtins.len(), 5);
        assert_eq!(
            Builtin::OpenInDefaultBrowser.capability(),
            Capability::Url
        );
        assert!(Builtin::OpenInDefaultBrowser.close_scope().is_none());
    }

    #[test]
    fn test_script_title_strips_extension() {
        assert_eq!(script_title(Path::new("/x/tab/Copy URL.js")), "Copy URL");
        assert_eq!(script_title(Path::new("/x/tab/CloseAll")), "CloseAll");
        assert_eq!(
            script_title(Path::new("/x/url/Open.in.Chrome.scpt")),
            "Open.in.Chrome"
        );
    }

    #[test]
    fn test_script_type_from_extension() {
        assert_eq!(
            ScriptType::from_path(Path::new("a.js")),
            Some(ScriptType::JavaScript)
        );
        assert_eq!(
            ScriptType::from_path(Path::new("a.applescript")),
            Some(ScriptType::AppleScript)
        );
        assert_eq!(
            ScriptType::from_path(Path::new("a.zsh")),
            Some(ScriptType::Shell(Shell::Zsh))
        );
        assert_eq!(ScriptType::from_path(Path::new("a.py")), None);
        assert_eq!(ScriptType::from_path(Path::new("README")), None);
    }

    #[test]
    fn test_action_type_parse() {
        assert_eq!("tab".parse::<ActionType>(), Ok(ActionType::Tab));
        assert_eq!("url".parse::<ActionType>(), Ok(ActionType::Url));
        assert_eq!("".parse::<ActionType>(), Ok(ActionType::Any));
        assert!("bookmark".parse::<ActionType>().is_err());
    }

    #[test]
    fn test_script_args_for_tab_target() {
        let target = Target::Tab(tab(2, 3, "https://example.com/"));
        assert_eq!(
            target.script_args("Copy URL", Capability::Tab).unwrap(),
            vec!["2", "3"]
        );
        // URL scripts get the tab's URL
        assert_eq!(
            target.script_args("Open", Capability::Url).unwrap(),
            vec!["https://example.com/"]
        );
    }

    #[test]
    fn test_script_args_tab_action_on_url_fails() {
        let target = Target::Url(Url::parse("https://example.com").unwrap());
        let result = target.script_args("Copy URL", Capability::Tab);
        assert!(matches!(
            result,
            Err(crate::ActionError::TargetMismatch { .. })
        ));
    }
}
