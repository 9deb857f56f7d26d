//! Window snapshot cache.
//!
//! Enumerating Safari windows is the slowest bridge call, and a single
//! Alfred session asks for it repeatedly while the user types. The snapshot
//! is kept in the workflow cache directory for a few seconds and dropped
//! whenever a command changes Safari's state.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ActionResult;
use crate::safari::{Browser, CloseScope, Tab, Window};

/// Filename of the snapshot inside the cache directory.
pub const WINDOWS_CACHE_FILENAME: &str = "windows.json";

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    /// Seconds since the Unix epoch.
    saved_at: u64,
    windows: Vec<Window>,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// `Browser` wrapper that caches `windows()` on disk.
#[derive(Debug)]
pub struct CachingBrowser<B> {
    inner: B,
    path: PathBuf,
    max_age: Duration,
}

impl<B: Browser> CachingBrowser<B> {
    /// Cache `inner`'s window list in `cache_dir` for up to `max_age`.
    pub fn new(inner: B, cache_dir: &Path, max_age: Duration) -> Self {
        Self {
            inner,
            path: cache_dir.join(WINDOWS_CACHE_FILENAME),
            max_age,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Option<Vec<Window>> {
        let text = std::fs::read_to_string(&self.path).ok()?;
        let snapshot: Snapshot = match serde_json::from_str(&text) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::debug!("Ignoring corrupt cache {:?}: {}", self.path, e);
                return None;
            }
        };

        let age = now_secs().saturating_sub(snapshot.saved_at);
        if age > self.max_age.as_secs() {
            tracing::debug!("Window cache expired ({}s old)", age);
            return None;
        }
        Some(snapshot.windows)
    }

    fn store(&self, windows: &[Window]) {
        let snapshot = Snapshot {
            saved_at: now_secs(),
            windows: windows.to_vec(),
        };
        let result = serde_json::to_string(&snapshot)
            .map_err(std::io::Error::from)
            .and_then(|json| {
                if let Some(parent) = self.path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&self.path, json)
            });
        if let Err(e) = result {
            tracing::warn!("Couldn't write window cache {:?}: {}", self.path, e);
        }
    }

    /// Remove the snapshot.
    fn invalidate(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("Cleared window cache"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Couldn't remove window cache {:?}: {}", self.path, e),
        }
    }
}

impl<B: Browser> Browser for CachingBrowser<B> {
    fn windows(&self) -> ActionResult<Vec<Window>> {
        if let Some(windows) = self.load() {
            tracing::debug!("Using cached window list");
            return Ok(windows);
        }
        let windows = self.inner.windows()?;
        self.store(&windows);
        Ok(windows)
    }

    fn active_tab(&self) -> ActionResult<Tab> {
        self.inner.active_tab()
    }

    fn activate(&self, window: usize, tab: usize) -> ActionResult<()> {
        let result = self.inner.activate(window, tab);
        self.invalidate();
        result
    }

    fn close(&self, scope: CloseScope, window: usize, tab: usize) -> ActionResult<()> {
        let result = self.inner.close(scope, window, tab);
        self.invalidate();
        result
    }

    fn open_url(&self, url: &Url) -> ActionResult<()> {
        let result = self.inner.open_url(url);
        self.invalidate();
        result
    }

    fn invalidate_windows(&self) {
        self.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::safari::MockBrowser;

    fn windows() -> Vec<Window> {
        vec![Window {
            index: 1,
            active_tab: 1,
            tabs: vec![Tab {
                index: 1,
                window_index: 1,
                title: "Example".to_string(),
                url: "https://example.com/".to_string(),
                active: true,
            }],
        }]
    }

    fn mock_fetching(times: usize) -> MockBrowser {
        let mut mock = MockBrowser::new();
        mock.expect_windows().times(times).returning(|| Ok(windows()));
        mock
    }

    #[test]
    fn test_fresh_snapshot_is_reused() {
        let tmp = tempfile::tempdir().unwrap();
        let browser = CachingBrowser::new(mock_fetching(1), tmp.path(), Duration::from_secs(60));

        assert_eq!(browser.windows().unwrap(), windows());
        assert!(browser.path().exists());
        assert_eq!(browser.windows().unwrap(), windows());
    }

    #[test]
    fn test_stale_snapshot_is_refetched() {
        let tmp = tempfile::tempdir().unwrap();
        let stale = Snapshot {
            saved_at: now_secs() - 120,
            windows: Vec::new(),
        };
        std::fs::write(
            tmp.path().join(WINDOWS_CACHE_FILENAME),
            serde_json::to_string(&stale).unwrap(),
        )
        .unwrap();

        let browser = CachingBrowser::new(mock_fetching(1), tmp.path(), Duration::from_secs(5));
        assert_eq!(browser.windows().unwrap(), windows());
    }

    #[test]
    fn test_corrupt_snapshot_is_a_miss() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(WINDOWS_CACHE_FILENAME), "{not json").unwrap();

        let browser = CachingBrowser::new(mock_fetching(1), tmp.path(), Duration::from_secs(5));
        assert_eq!(browser.windows().unwrap(), windows());
    }

    #[test]
    fn test_close_invalidates() {
        let tmp = tempfile::tempdir().unwrap();
        let mut mock = mock_fetching(2);
        mock.expect_close().times(1).returning(|_, _, _| Ok(()));

        let browser = CachingBrowser::new(mock, tmp.path(), Duration::from_secs(60));
        browser.windows().unwrap();
        browser.close(CloseScope::Tab, 1, 1).unwrap();
        assert!(!browser.path().exists());
        browser.windows().unwrap();
    }

    #[test]
    fn test_invalidate_windows_clears_snapshot() {
        let tmp = tempfile::tempdir().unwrap();
        let browser = CachingBrowser::new(mock_fetching(2), tmp.path(), Duration::from_secs(60));
        browser.windows().unwrap();
        browser.invalidate_windows();
        assert!(!browser.path().exists());
        browser.windows().unwrap();
    }

    #[test]
    fn test_failed_activate_still_invalidates() {
        let tmp = tempfile::tempdir().unwrap();
        let mut mock = mock_fetching(1);
        mock.expect_activate()
            .times(1)
            .returning(|_, _| Err(crate::ActionError::Bridge("no window".to_string())));

        let browser = CachingBrowser::new(mock, tmp.path(), Duration::from_secs(60));
        browser.windows().unwrap();
        assert!(browser.activate(9, 1).is_err());
        assert!(!browser.path().exists());
    }
}
