//! Action Registry
//!
//! Stores tab actions and URL actions in two independent maps keyed by
//! title. Registering a title that already exists in the same class
//! replaces the earlier action, so scripts discovered after the built-ins
//! can shadow them.
//!
//! The blacklist only affects `tab_actions()` / `url_actions()`. Lookup by
//! title always sees every registered action.

use std::collections::HashMap;

use crate::action::{Action, ActionType, Builtin, Capability};
use crate::blacklist::Blacklist;

/// Catalogue of the actions available to one workflow invocation.
#[derive(Debug, Default)]
pub struct Registry {
    tab_actions: HashMap<String, Action>,
    url_actions: HashMap<String, Action>,
    blacklist: Blacklist,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry containing every built-in action.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for builtin in Builtin::ALL {
            registry.register(Action::builtin(builtin));
        }
        registry
    }

    /// Replace the blacklist used when listing actions.
    pub fn set_blacklist(&mut self, blacklist: Blacklist) {
        self.blacklist = blacklist;
    }

    pub fn blacklist(&self) -> &Blacklist {
        &self.blacklist
    }

    fn map(&self, capability: Capability) -> &HashMap<String, Action> {
        match capability {
            Capability::Tab => &self.tab_actions,
            Capability::Url => &self.url_actions,
        }
    }

    /// Add an action to its class. Returns the action it replaced, if any.
    pub fn register(&mut self, action: Action) -> Option<Action> {
        let capability = action.capability();
        let title = action.title().to_string();
        let map = match capability {
            Capability::Tab => &mut self.tab_actions,
            Capability::Url => &mut self.url_actions,
        };
        let replaced = map.insert(title.clone(), action);
        if replaced.is_some() {
            tracing::debug!("Replaced {} action {:?}", capability, title);
        }
        replaced
    }

    /// Listable actions of one class, sorted by title.
    pub fn actions(&self, capability: Capability) -> Vec<&Action> {
        let mut actions: Vec<&Action> = self
            .map(capability)
            .values()
            .filter(|a| !self.blacklist.contains(a.title()))
            .collect();
        actions.sort_by(|a, b| a.title().cmp(b.title()));
        actions
    }

    /// Tab actions that aren't blacklisted.
    pub fn tab_actions(&self) -> Vec<&Action> {
        self.actions(Capability::Tab)
    }

    /// URL actions that aren't blacklisted.
    pub fn url_actions(&self) -> Vec<&Action> {
        self.actions(Capability::Url)
    }

    /// Tab action by exact title, including blacklisted ones.
    pub fn find_tab_action(&self, title: &str) -> Option<&Action> {
        self.tab_actions.get(title)
    }

    /// URL action by exact title, including blacklisted ones.
    pub fn find_url_action(&self, title: &str) -> Option<&Action> {
        self.url_actions.get(title)
    }

    /// Resolve a title in the class(es) selected by `action_type`.
    ///
    /// `ActionType::Any` tries tab actions before URL actions.
    pub fn find(&self, title: &str, action_type: ActionType) -> Option<&Action> {
        match action_type {
            ActionType::Tab => self.find_tab_action(title),
            ActionType::Url => self.find_url_action(title),
            ActionType::Any => self
                .find_tab_action(title)
                .or_else(|| self.find_url_action(title)),
        }
    }

    /// Number of registered actions (blacklisted included).
    pub fn count(&self) -> usize {
        self.tab_actions.len() + self.url_actions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ScriptAction;
    use alsf_core::Icon;

    fn script(path: &str, capability: Capability) -> Action {
        Action::script(ScriptAction::new(
            path,
            capability.default_icon(),
            capability,
        ))
    }

    fn titles(actions: Vec<&Action>) -> Vec<String> {
        actions.iter().map(|a| a.title().to_string()).collect()
    }

    #[test]
    fn test_builtins_registered() {
        let registry = Registry::with_builtins();
        assert_eq!(
            titles(registry.tab_actions()),
            vec![
                "Close Other Tabs",
                "Close Tab",
                "Close Tabs to Left",
                "Close Tabs to Right",
                "Close Window",
            ]
        );
        assert_eq!(titles(registry.url_actions()), vec!["Open in Default Browser"]);
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = Registry::new();
        registry.register(script("/a/tab/Copy.js", Capability::Tab));
        let replaced = registry.register(script("/b/tab/Copy.sh", Capability::Tab));

        assert!(replaced.is_some());
        let found = registry.find_tab_action("Copy").unwrap();
        match found.kind() {
            crate::action::ActionKind::Script(s) => {
                assert_eq!(s.path, std::path::PathBuf::from("/b/tab/Copy.sh"))
            }
            other => panic!("expected script, got {:?}", other),
        }
        assert_eq!(registry.tab_actions().len(), 1);
    }

    #[test]
    fn test_classes_are_independent() {
        let mut registry = Registry::new();
        registry.register(script("/s/tab/Share.js", Capability::Tab));

        assert!(registry.find_tab_action("Share").is_some());
        assert!(registry.find_url_action("Share").is_none());

        registry.register(script("/s/url/Share.js", Capability::Url));
        assert_eq!(
            registry.find_tab_action("Share").unwrap().capability(),
            Capability::Tab
        );
        assert_eq!(
            registry.find_url_action("Share").unwrap().capability(),
            Capability::Url
        );
        assert_eq!(registry.count(), 2);
    }

    #[test]
    fn test_blacklist_hides_from_listing_only() {
        let mut registry = Registry::with_builtins();
        registry.register(script("/s/tab/CloseAll", Capability::Tab));
        registry.set_blacklist(["CloseAll", "Open in Default Browser"].into_iter().collect());

        assert!(!titles(registry.tab_actions()).contains(&"CloseAll".to_string()));
        assert!(registry.url_actions().is_empty());

        assert!(registry.find_tab_action("CloseAll").is_some());
        assert!(registry.find_url_action("Open in Default Browser").is_some());
    }

    #[test]
    fn test_set_blacklist_replaces() {
        let mut registry = Registry::with_builtins();
        registry.set_blacklist(["Close Tab"].into_iter().collect());
        assert_eq!(registry.tab_actions().len(), 4);

        registry.set_blacklist(Blacklist::new());
        assert_eq!(registry.tab_actions().len(), 5);
    }

    #[test]
    fn test_script_shadows_builtin() {
        let mut registry = Registry::with_builtins();
        let custom = Action::script(ScriptAction::new(
            "/s/tab/Close Tab.js",
            Icon::new("/s/tab/Close Tab.png"),
            Capability::Tab,
        ));
        registry.register(custom);

        let found = registry.find_tab_action("Close Tab").unwrap();
        assert!(!found.is_builtin());
        assert_eq!(found.icon(), &Icon::new("/s/tab/Close Tab.png"));
        assert_eq!(registry.tab_actions().len(), 5);
    }

    #[test]
    fn test_find_any_prefers_tab() {
        let mut registry = Registry::new();
        registry.register(script("/s/url/Share.js", Capability::Url));
        assert_eq!(
            registry.find("Share", ActionType::Any).unwrap().capability(),
            Capability::Url
        );

        registry.register(script("/s/tab/Share.js", Capability::Tab));
        assert_eq!(
            registry.find("Share", ActionType::Any).unwrap().capability(),
            Capability::Tab
        );
        assert_eq!(
            registry.find("Share", ActionType::Url).unwrap().capability(),
            Capability::Url
        );
        assert!(registry.find("Nope", ActionType::Any).is_none());
    }
}
