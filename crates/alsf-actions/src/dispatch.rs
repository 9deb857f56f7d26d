//! Dispatch
//!
//! Builds the registry for one invocation and turns requests into action
//! runs: resolve the target, resolve the action, execute it.

use std::time::Duration;

use alsf_core::{Paths, Settings};
use url::Url;

use crate::action::{Action, ActionType};
use crate::blacklist::BlacklistStore;
use crate::discovery::discover_scripts;
use crate::error::{ActionError, ActionResult};
use crate::exec::Executor;
use crate::registry::Registry;
use crate::safari::{find_tab, Browser};
use crate::Target;

// =============================================================================
// Requests
// =============================================================================

/// What an action should be run on.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetRequest {
    /// A tab, by 1-based window and tab index.
    Tab { window: usize, tab: usize },
    /// A bare URL.
    Url(Url),
}

/// A request to run one named action.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    pub action: String,
    pub action_type: ActionType,
    pub target: TargetRequest,
}

impl ActionRequest {
    pub fn tab(action: impl Into<String>, window: usize, tab: usize) -> Self {
        Self {
            action: action.into(),
            action_type: ActionType::Any,
            target: TargetRequest::Tab { window, tab },
        }
    }

    pub fn url(action: impl Into<String>, url: Url) -> Self {
        Self {
            action: action.into(),
            action_type: ActionType::Url,
            target: TargetRequest::Url(url),
        }
    }

    pub fn with_type(mut self, action_type: ActionType) -> Self {
        self.action_type = action_type;
        self
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Owns the registry and browser for one workflow invocation.
pub struct Dispatcher<B> {
    registry: Registry,
    browser: B,
    timeout: Option<Duration>,
}

impl<B: Browser> Dispatcher<B> {
    /// Register built-ins, load the blacklist and discover scripts.
    ///
    /// Blacklist and discovery failures are logged; built-in actions stay
    /// available either way.
    pub fn prepare(paths: &Paths, settings: &Settings, browser: B) -> Self {
        let mut registry = Registry::with_builtins();

        match BlacklistStore::new(paths.blacklist_path()).load() {
            Ok(blacklist) => registry.set_blacklist(blacklist),
            Err(e) => tracing::warn!("Couldn't load blacklist: {}", e),
        }

        let mut roots = paths.script_dirs();
        roots.extend(settings.extra_script_dirs());
        if let Err(e) = discover_scripts(&mut registry, &roots) {
            tracing::warn!("Script discovery incomplete: {}", e);
        }
        tracing::debug!("{} action(s) registered", registry.count());

        Self::from_registry(registry, browser)
            .with_timeout(settings.scripts.timeout_secs.map(Duration::from_secs))
    }

    pub fn from_registry(registry: Registry, browser: B) -> Self {
        Self {
            registry,
            browser,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn browser(&self) -> &B {
        &self.browser
    }

    /// Turn a target request into a concrete target.
    ///
    /// Tab targets are looked up in a fresh window listing.
    pub fn resolve_target(&self, request: &TargetRequest) -> ActionResult<Target> {
        match request {
            TargetRequest::Url(url) => Ok(Target::Url(url.clone())),
            TargetRequest::Tab { window, tab } => {
                let windows = self.browser.windows()?;
                find_tab(&windows, *window, *tab)
                    .cloned()
                    .map(Target::Tab)
                    .ok_or(ActionError::TabNotFound {
                        window: *window,
                        tab: *tab,
                    })
            }
        }
    }

    /// Find an action by title, including blacklisted ones.
    pub fn resolve_action(&self, name: &str, action_type: ActionType) -> ActionResult<&Action> {
        self.registry
            .find(name, action_type)
            .ok_or_else(|| ActionError::UnknownAction(name.to_string()))
    }

    /// Run the requested action.
    pub fn run(&self, request: &ActionRequest) -> ActionResult<()> {
        let target = self.resolve_target(&request.target)?;
        let action = self.resolve_action(&request.action, request.action_type)?;

        Executor::new(&self.browser)
            .with_timeout(self.timeout)
            .run(action, &target)
    }

    /// Actions offered for a tab showing `url`.
    ///
    /// URL actions are only included for web pages.
    pub fn actions_for_tab(&self, url: &str) -> Vec<&Action> {
        let mut actions = self.registry.tab_actions();
        if is_web_url(url) {
            actions.extend(self.registry.url_actions());
        }
        actions
    }

    /// Actions offered for a bare URL.
    pub fn actions_for_url(&self) -> Vec<&Action> {
        self.registry.url_actions()
    }
}

/// Whether `url` has an http or https scheme.
pub fn is_web_url(url: &str) -> bool {
    Url::parse(url)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}
