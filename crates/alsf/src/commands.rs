//! Command handlers.
//!
//! Each handler returns the text to print on stdout (Alfred JSON for
//! Script Filters and variables, nothing for actions).

use std::time::Duration;

use alsf_actions::{
    ActionRequest, BlacklistStore, Browser, CachingBrowser, CloseScope, Dispatcher,
    OsaScriptBrowser,
};
use alsf_core::{ArgVars, Feedback, Paths, Settings};

use crate::cli::{Commands, ListTarget, RunTarget};
use crate::error::{AppError, AppResult};
use crate::feedback;

type SafariBrowser = CachingBrowser<OsaScriptBrowser>;

/// Paths and settings for one invocation.
pub struct Context {
    pub paths: Paths,
    pub settings: Settings,
}

impl Context {
    /// Resolve paths from the environment, create the user script
    /// directories and read `settings.toml`.
    pub fn load() -> AppResult<Self> {
        let paths = Paths::from_env()?;
        paths.ensure_dirs()?;
        let settings = Settings::load(&paths.settings_path())?;
        Ok(Self { paths, settings })
    }

    fn browser(&self) -> SafariBrowser {
        CachingBrowser::new(
            OsaScriptBrowser::new(),
            &self.paths.cache_dir,
            Duration::from_secs(self.settings.cache.windows_max_age_secs),
        )
    }

    fn dispatcher(&self) -> Dispatcher<SafariBrowser> {
        Dispatcher::prepare(&self.paths, &self.settings, self.browser())
    }
}

/// Run `command` and return its stdout output, if any.
pub fn execute(ctx: &Context, command: Commands) -> AppResult<Option<String>> {
    match command {
        Commands::Actions { target } => list_actions(ctx, target).map(Some),
        Commands::Action { target } => run_action(ctx, target).map(|_| None),
        Commands::Blacklist { names } => {
            BlacklistStore::new(ctx.paths.blacklist_path()).add(&names)?;
            Ok(None)
        }
        Commands::Activate { tab } => {
            ctx.browser().activate(tab.window, tab.tab)?;
            Ok(None)
        }
        Commands::Close { tab, left, right } => {
            let scope = CloseScope::from_flags(left, right);
            ctx.browser().close(scope, tab.window, tab.tab)?;
            Ok(None)
        }
        Commands::ActiveTab => active_tab(ctx).map(Some),
        Commands::Tabs { query, modifiers } => {
            let dispatcher = ctx.dispatcher();
            let mods = feedback::action_modifiers(dispatcher.registry(), &modifiers.bindings());

            let mut items = Feedback::new();
            for window in dispatcher.browser().windows()? {
                for tab in &window.tabs {
                    items.push(feedback::tab_item(tab, &mods));
                }
            }
            let items = feedback::finish(items, &query.query, "No tabs found");
            Ok(Some(items.to_json()?))
        }
        Commands::Config { query } => {
            let blacklist = BlacklistStore::new(ctx.paths.blacklist_path()).ensure()?;
            let items = feedback::config_items(&blacklist, &ctx.paths.user_scripts_dir());
            let items = feedback::finish(items, &query.query, "No matching items");
            Ok(Some(items.to_json()?))
        }
    }
}

fn list_actions(ctx: &Context, target: ListTarget) -> AppResult<String> {
    let dispatcher = ctx.dispatcher();
    let (actions, query) = match &target {
        ListTarget::Tab { url, query, .. } => {
            tracing::debug!("Listing actions for tab with URL {}", url);
            (dispatcher.actions_for_tab(url), &query.query)
        }
        ListTarget::Url { url, query } => {
            tracing::debug!("Listing actions for {}", url);
            (dispatcher.actions_for_url(), &query.query)
        }
    };

    let items = feedback::finish(feedback::action_items(&actions), query, "No actions found");
    Ok(items.to_json()?)
}

fn run_action(ctx: &Context, target: RunTarget) -> AppResult<()> {
    let request = match target {
        RunTarget::Tab {
            action,
            action_type,
            tab,
        } => ActionRequest::tab(action.action, tab.window, tab.tab)
            .with_type(action_type.unwrap_or_default()),
        RunTarget::Url { action, url } => ActionRequest::url(action.action, url),
    };
    tracing::debug!("{:?}", request);

    ctx.dispatcher().run(&request)?;
    Ok(())
}

fn active_tab(ctx: &Context) -> AppResult<String> {
    let tab = ctx.browser().active_tab().map_err(AppError::ActiveTab)?;
    tracing::debug!("Active tab: {:?}", tab);

    let vars = ArgVars::new()
        .var("ALSF_WINDOW", tab.window_index.to_string())
        .var("ALSF_TAB", tab.index.to_string())
        .var("ALSF_URL", tab.url);
    Ok(vars.to_json()?)
}

/// Output for a failed command.
///
/// Script Filters get a single error item; other commands print nothing on
/// stdout and report the message on stderr.
pub fn error_output(script_filter: bool, err: &AppError) -> Option<String> {
    if !script_filter {
        return None;
    }
    Feedback::error(err.to_string()).to_json().ok()
}
