//! Action blacklist.
//!
//! A plain text file listing action titles the user doesn't want to see in
//! action lists. Blacklisting only hides an action from listings; it can
//! still be run by name (e.g. when bound to a modifier key).

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::ActionResult;

/// Contents written to a new blacklist file.
pub const TEMPLATE: &str = "\
#
# Action blacklist
# ----------------
#
# Titles of actions to hide from action lists, one per line, without any
# file extension. For example, adding the line
#
# Open in Firefox
#
# hides the \"Open in Firefox\" action.
#
# Hidden actions can still be run directly, so you can blacklist actions
# you have bound to a modifier key in the workflow configuration.
#
# Empty lines and lines starting with # are ignored.
#

";

/// Set of blacklisted action titles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blacklist {
    titles: HashSet<String>,
}

impl Blacklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse blacklist file contents.
    ///
    /// Every trimmed line that is neither empty nor a `#` comment is a title.
    pub fn parse(text: &str) -> Self {
        let titles = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        Self { titles }
    }

    pub fn contains(&self, title: &str) -> bool {
        self.titles.contains(title)
    }

    pub fn insert(&mut self, title: impl Into<String>) {
        self.titles.insert(title.into());
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Blacklist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            titles: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// The blacklist file on disk.
#[derive(Debug, Clone)]
pub struct BlacklistStore {
    path: PathBuf,
}

impl BlacklistStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the file path, creating the file from the template if missing.
    pub fn ensure(&self) -> ActionResult<PathBuf> {
        if !self.path.exists() {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&self.path, TEMPLATE)?;
            tracing::info!("Created blacklist at {:?}", self.path);
        }
        Ok(self.path.clone())
    }

    /// Read the blacklist from disk.
    pub fn load(&self) -> ActionResult<Blacklist> {
        let path = self.ensure()?;
        let text = std::fs::read_to_string(&path)?;
        let blacklist = Blacklist::parse(&text);
        tracing::debug!("{} blacklisted action(s)", blacklist.len());
        Ok(blacklist)
    }

    /// Append titles to the blacklist file, one per line.
    ///
    /// Existing entries are not checked, so repeated names produce
    /// duplicate lines.
    pub fn add<S: AsRef<str>>(&self, names: &[S]) -> ActionResult<()> {
        let path = self.ensure()?;
        let mut file = OpenOptions::new().append(true).open(&path)?;
        for name in names {
            writeln!(file, "{}", name.as_ref())?;
            tracing::info!("Blacklisted {:?}", name.as_ref());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, BlacklistStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = BlacklistStore::new(tmp.path().join("data").join("blacklist.txt"));
        (tmp, store)
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let bl = Blacklist::parse("# comment\n\n  CloseAll  \n   # indented comment\nOpen in Firefox\n");
        assert_eq!(bl.len(), 2);
        assert!(bl.contains("CloseAll"));
        assert!(bl.contains("Open in Firefox"));
        assert!(!bl.contains("# comment"));
    }

    #[test]
    fn test_template_has_no_titles() {
        assert!(Blacklist::parse(TEMPLATE).is_empty());
    }

    #[test]
    fn test_ensure_creates_template() {
        let (_tmp, store) = store();
        let path = store.ensure().unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), TEMPLATE);
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let (_tmp, store) = store();
        let path = store.ensure().unwrap();
        let first = std::fs::read_to_string(&path).unwrap();

        store.ensure().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
    }

    #[test]
    fn test_ensure_keeps_existing_file() {
        let (_tmp, store) = store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "Mine\n").unwrap();

        store.ensure().unwrap();
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "Mine\n");
    }

    #[test]
    fn test_add_appends_duplicates_and_load_dedupes() {
        let (_tmp, store) = store();
        store.add(&["Foo", "Foo"]).unwrap();

        let text = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(text.lines().filter(|l| *l == "Foo").count(), 2);
        assert!(text.ends_with("Foo\nFoo\n"));

        let bl = store.load().unwrap();
        assert_eq!(bl.len(), 1);
        assert!(bl.contains("Foo"));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let (_tmp, store) = store();
        assert!(store.load().unwrap().is_empty());
        assert!(store.path().exists());
    }
}
