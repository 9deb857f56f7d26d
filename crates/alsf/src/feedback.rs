//! Builders for the result items the workflow shows in Alfred.

use std::path::Path;

use alsf_actions::{Action, ActionType, Registry, Tab};
use alsf_core::{icons, Feedback, Item, Modifier};
use url::Url;

/// Hostname fragments that only add noise when matching tabs by URL.
const URL_NOISE: [&str; 5] = ["www.", ".com", ".net", ".org", ".co.uk"];

/// One item per action, valid and tagged with the variables the "run
/// action" step reads.
pub fn action_items(actions: &[&Action]) -> Feedback {
    let mut feedback = Feedback::new();
    for action in actions {
        feedback.push(
            Item::new(action.title())
                .arg(action.title())
                .icon(action.icon().clone())
                .valid(true)
                .var("action", "tab-action")
                .var("ALSF_ACTION", action.title())
                .var("ALSF_ACTION_TYPE", action.capability().as_str()),
        );
    }
    feedback
}

/// Host of `url` stripped of common prefixes and suffixes, for matching.
pub fn url_keywords(url: &str) -> String {
    let Some(host) = Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_string)) else {
        return String::new();
    };
    URL_NOISE
        .iter()
        .fold(host, |host, noise| host.replace(noise, ""))
}

/// Modifiers that run a named action on a tab.
///
/// Names that don't resolve to a registered action are skipped.
pub fn action_modifiers(registry: &Registry, bindings: &[(&str, &str)]) -> Vec<(String, Modifier)> {
    bindings
        .iter()
        .filter_map(|(key, name)| {
            let Some(action) = registry.find(name, ActionType::Any) else {
                tracing::warn!("Unknown action for {} modifier: {}", key, name);
                return None;
            };
            let modifier = Modifier::new(action.title())
                .var("action", "tab-action")
                .var("ALSF_ACTION", action.title())
                .var("ALSF_ACTION_TYPE", action.capability().as_str());
            Some((key.to_string(), modifier))
        })
        .collect()
}

/// Item for an open tab. Actioning it activates the tab; ⌘ lists its actions.
pub fn tab_item(tab: &Tab, modifiers: &[(String, Modifier)]) -> Item {
    let icon = if tab.active {
        icons::TAB_ACTIVE
    } else {
        icons::TAB
    };

    let mut item = Item::new(&tab.title)
        .subtitle(&tab.url)
        .valid(true)
        .match_text(format!("{} {}", tab.title, url_keywords(&tab.url)))
        .icon(icon)
        .var("ALSF_WINDOW", tab.window_index.to_string())
        .var("ALSF_TAB", tab.index.to_string())
        .var("ALSF_URL", &tab.url)
        .var("action", "activate")
        .modifier(
            "cmd",
            Modifier::new("Other actions…").var("action", "tab-actions"),
        );

    for (key, modifier) in modifiers {
        item = item.modifier(key.clone(), modifier.clone());
    }
    item
}

/// Configuration entries: the blacklist file and the user scripts folder.
pub fn config_items(blacklist: &Path, user_scripts: &Path) -> Feedback {
    let mut feedback = Feedback::new();
    feedback.push(
        Item::new("Edit Action Blacklist")
            .subtitle("Open action blacklist in your editor")
            .arg(blacklist.to_string_lossy())
            .valid(true)
            .icon(icons::BLACKLIST)
            .var("action", "open"),
    );
    feedback.push(
        Item::new("User Scripts")
            .subtitle("Open user scripts directory in Finder")
            .arg(user_scripts.to_string_lossy())
            .valid(true)
            .icon(icons::FOLDER)
            .var("action", "open"),
    );
    feedback
}

/// Apply `query` and add a warning item if nothing is left.
pub fn finish(mut feedback: Feedback, query: &str, empty_title: &str) -> Feedback {
    if !query.trim().is_empty() {
        let kept = feedback.filter(query);
        tracing::debug!("{} result(s) for {:?}", kept, query);
    }
    feedback.warn_empty(empty_title, "Try a different query?");
    feedback
}
