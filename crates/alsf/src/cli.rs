//! Command-line interface.
//!
//! Alfred passes state between workflow objects as environment variables,
//! so most flags can also be set through the `ALSF_*` variables emitted by
//! earlier steps.

use alsf_actions::ActionType;
use clap::{Args, Parser, Subcommand};
use url::Url;

#[derive(Debug, Parser)]
#[command(name = "alsf")]
#[command(version, about = "Safari tab and URL actions for Alfred", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the actions available for a tab or URL (Script Filter).
    Actions {
        #[command(subcommand)]
        target: ListTarget,
    },

    /// Run an action on a tab or URL.
    Action {
        #[command(subcommand)]
        target: RunTarget,
    },

    /// Add action names to the blacklist.
    Blacklist {
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,
    },

    /// Bring a window and tab to the front.
    Activate {
        #[command(flatten)]
        tab: TabArgs,
    },

    /// Close a tab, or the tabs to its left and/or right.
    Close {
        #[command(flatten)]
        tab: TabArgs,

        /// Close tabs to the left of the tab.
        #[arg(long, short)]
        left: bool,

        /// Close tabs to the right of the tab.
        #[arg(long, short)]
        right: bool,
    },

    /// Print workflow variables for the frontmost tab.
    ActiveTab,

    /// List open tabs (Script Filter).
    Tabs {
        #[command(flatten)]
        query: QueryArgs,

        #[command(flatten)]
        modifiers: ModifierArgs,
    },

    /// Show workflow configuration entries (Script Filter).
    Config {
        #[command(flatten)]
        query: QueryArgs,
    },
}

impl Commands {
    /// Whether the command's output is read by an Alfred Script Filter.
    ///
    /// Errors from these commands are shown as a result item instead of
    /// plain text.
    pub fn is_script_filter(&self) -> bool {
        matches!(
            self,
            Commands::Actions { .. } | Commands::Tabs { .. } | Commands::Config { .. }
        )
    }
}

#[derive(Debug, Subcommand)]
pub enum ListTarget {
    /// Actions for a tab: tab actions, plus URL actions for web pages.
    Tab {
        #[command(flatten)]
        tab: TabArgs,

        /// The tab's URL.
        #[arg(long, short, env = "ALSF_URL")]
        url: String,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Actions for a URL.
    Url {
        #[arg(long, short, env = "ALSF_URL")]
        url: Url,

        #[command(flatten)]
        query: QueryArgs,
    },
}

#[derive(Debug, Subcommand)]
pub enum RunTarget {
    /// Run a tab or URL action on a tab.
    Tab {
        #[command(flatten)]
        action: ActionArgs,

        /// Which class of action to look in (tab, url). Both if unset.
        #[arg(long = "action-type", env = "ALSF_ACTION_TYPE", value_name = "TYPE")]
        action_type: Option<ActionType>,

        #[command(flatten)]
        tab: TabArgs,
    },

    /// Run a URL action on a URL.
    Url {
        #[command(flatten)]
        action: ActionArgs,

        #[arg(long, short, env = "ALSF_URL")]
        url: Url,
    },
}

#[derive(Debug, Args)]
pub struct ActionArgs {
    /// Action name.
    #[arg(long, short, env = "ALSF_ACTION", value_name = "NAME")]
    pub action: String,
}

#[derive(Debug, Clone, Copy, Args)]
pub struct TabArgs {
    /// Window number.
    #[arg(long, short, env = "ALSF_WINDOW", default_value_t = 1)]
    pub window: usize,

    /// Tab number.
    #[arg(long, short, env = "ALSF_TAB")]
    pub tab: usize,
}

#[derive(Debug, Clone, Default, Args)]
pub struct QueryArgs {
    /// Search query.
    #[arg(long, short, default_value = "")]
    pub query: String,
}

/// Actions bound to modifier keys on tab results.
#[derive(Debug, Clone, Default, Args)]
pub struct ModifierArgs {
    /// Action for ⌃↩ on a tab.
    #[arg(long = "tab-ctrl", env = "ALSF_TAB_CTRL", value_name = "NAME")]
    pub ctrl: Option<String>,

    /// Action for ⇧↩ on a tab.
    #[arg(long = "tab-shift", env = "ALSF_TAB_SHIFT", value_name = "NAME")]
    pub shift: Option<String>,

    /// Action for ⌥↩ on a tab.
    #[arg(long = "tab-alt", env = "ALSF_TAB_ALT", value_name = "NAME")]
    pub alt: Option<String>,

    /// Action for fn↩ on a tab.
    #[arg(long = "tab-fn", env = "ALSF_TAB_FN", value_name = "NAME")]
    pub fn_key: Option<String>,
}

impl ModifierArgs {
    /// `(modifier key, action name)` pairs for the actions that are set.
    pub fn bindings(&self) -> Vec<(&'static str, &str)> {
        [
            ("ctrl", &self.ctrl),
            ("shift", &self.shift),
            ("alt", &self.alt),
            ("fn", &self.fn_key),
        ]
        .into_iter()
        .filter_map(|(key, name)| {
            name.as_deref()
                .filter(|n| !n.is_empty())
                .map(|n| (key, n))
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_tab_action() {
        let cli = Cli::try_parse_from([
            "alsf", "action", "tab", "-a", "Close Tab", "--action-type", "tab", "-w", "2", "-t",
            "3",
        ])
        .unwrap();

        match cli.command {
            Commands::Action {
                target: RunTarget::Tab {
                    action,
                    action_type,
                    tab,
                },
            } => {
                assert_eq!(action.action, "Close Tab");
                assert_eq!(action_type, Some(ActionType::Tab));
                assert_eq!((tab.window, tab.tab), (2, 3));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_close_flags() {
        let cli = Cli::try_parse_from(["alsf", "close", "-t", "4", "--left", "--right"]).unwrap();
        match cli.command {
            Commands::Close { tab, left, right } => {
                assert_eq!(tab.window, 1);
                assert_eq!(tab.tab, 4);
                assert!(left && right);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_blacklist_requires_names() {
        assert!(Cli::try_parse_from(["alsf", "blacklist"]).is_err());
    }

    #[test]
    fn test_modifier_bindings_skip_unset() {
        let mods = ModifierArgs {
            ctrl: Some("Close Tab".to_string()),
            shift: None,
            alt: Some(String::new()),
            fn_key: Some("Copy URL".to_string()),
        };
        assert_eq!(
            mods.bindings(),
            vec![("ctrl", "Close Tab"), ("fn", "Copy URL")]
        );
    }

    #[test]
    fn test_script_filter_commands() {
        let cli = Cli::try_parse_from(["alsf", "config"]).unwrap();
        assert!(cli.command.is_script_filter());

        let cli = Cli::try_parse_from(["alsf", "active-tab"]).unwrap();
        assert!(!cli.command.is_script_filter());
    }
}
