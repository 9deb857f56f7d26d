//! Configuration types.
//!
//! Directory locations come from the environment Alfred sets up for a
//! workflow run. Optional user settings live in `settings.toml` inside the
//! workflow's data directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Bundle ID used for fallback directories when not running under Alfred.
pub const BUNDLE_ID: &str = "net.deanishe.alfred-safari-assistant";

/// Name of the action blacklist file in the data directory.
pub const BLACKLIST_FILENAME: &str = "blacklist.txt";

/// Name of the optional settings file in the data directory.
pub const SETTINGS_FILENAME: &str = "settings.toml";

/// Environment variables read when resolving paths.
pub mod env {
    pub const WORKFLOW_DATA: &str = "alfred_workflow_data";
    pub const WORKFLOW_CACHE: &str = "alfred_workflow_cache";
    pub const WORKFLOW_DIR: &str = "ALSF_WORKFLOW_DIR";
    pub const DEBUG: &str = "alfred_debug";
}

// =============================================================================
// Paths
// =============================================================================

/// Directories used by a single workflow invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    /// Installed workflow directory (bundled scripts and icons).
    pub workflow_dir: PathBuf,

    /// Per-user persistent data (blacklist, user scripts, settings).
    pub data_dir: PathBuf,

    /// Per-user cache (window snapshots).
    pub cache_dir: PathBuf,
}

impl Paths {
    /// Build paths from explicit directories.
    pub fn new(
        workflow_dir: impl Into<PathBuf>,
        data_dir: impl Into<PathBuf>,
        cache_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            workflow_dir: workflow_dir.into(),
            data_dir: data_dir.into(),
            cache_dir: cache_dir.into(),
        }
    }

    /// Resolve paths from Alfred's environment variables.
    ///
    /// Falls back to the platform data/cache directories and the current
    /// working directory (Alfred runs scripts from the workflow directory).
    pub fn from_env() -> Result<Self, ConfigError> {
        let workflow_dir = match std::env::var_os(env::WORKFLOW_DIR) {
            Some(dir) => PathBuf::from(dir),
            None => std::env::current_dir().map_err(|source| ConfigError::Io {
                path: PathBuf::from("."),
                source,
            })?,
        };

        let data_dir = match std::env::var_os(env::WORKFLOW_DATA) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .ok_or(ConfigError::NoDataDir)?
                .join("Alfred/Workflow Data")
                .join(BUNDLE_ID),
        };

        let cache_dir = match std::env::var_os(env::WORKFLOW_CACHE) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::cache_dir()
                .ok_or(ConfigError::NoDataDir)?
                .join("com.runningwithcrayons.Alfred/Workflow Data")
                .join(BUNDLE_ID),
        };

        Ok(Self::new(workflow_dir, data_dir, cache_dir))
    }

    /// Path to the action blacklist.
    pub fn blacklist_path(&self) -> PathBuf {
        self.data_dir.join(BLACKLIST_FILENAME)
    }

    /// Path to the optional settings file.
    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILENAME)
    }

    /// Root of the user-writable script tree.
    pub fn user_scripts_dir(&self) -> PathBuf {
        self.data_dir.join("scripts")
    }

    /// All script directories, bundled first, then the user's.
    ///
    /// Each tree contributes its `tab` and `url` subdirectories.
    pub fn script_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = Vec::with_capacity(4);
        for root in [self.workflow_dir.join("scripts"), self.user_scripts_dir()] {
            dirs.push(root.join("tab"));
            dirs.push(root.join("url"));
        }
        dirs
    }

    /// Create the data and cache directories plus the user script tree.
    pub fn ensure_dirs(&self) -> Result<(), ConfigError> {
        let user_scripts = self.user_scripts_dir();
        for dir in [
            self.data_dir.clone(),
            self.cache_dir.clone(),
            user_scripts.join("tab"),
            user_scripts.join("url"),
        ] {
            std::fs::create_dir_all(&dir)
                .map_err(|source| ConfigError::Io { path: dir, source })?;
        }
        Ok(())
    }
}

// =============================================================================
// Settings
// =============================================================================

/// User settings from `settings.toml`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub scripts: ScriptSettings,

    #[serde(default)]
    pub cache: CacheSettings,
}

/// Settings for script actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptSettings {
    /// Kill scripts that run longer than this. No limit when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Additional directories searched for scripts (containing `tab`/`url`).
    #[serde(default)]
    pub extra_dirs: Vec<PathBuf>,
}

/// Settings for the window snapshot cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSettings {
    /// How long a snapshot of Safari's windows stays fresh.
    #[serde(default = "default_windows_max_age")]
    pub windows_max_age_secs: u64,
}

fn default_windows_max_age() -> u64 {
    5
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            windows_max_age_secs: default_windows_max_age(),
        }
    }
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load settings from `path`, returning defaults if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No settings file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml(&text, path)?;
        tracing::debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Extra script directories expanded to their `tab`/`url` subdirectories.
    pub fn extra_script_dirs(&self) -> Vec<PathBuf> {
        self.scripts
            .extra_dirs
            .iter()
            .flat_map(|root| [root.join("tab"), root.join("url")])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_dirs_order() {
        let paths = Paths::new("/wf", "/data", "/cache");
        assert_eq!(
            paths.script_dirs(),
            vec![
                PathBuf::from("/wf/scripts/tab"),
                PathBuf::from("/wf/scripts/url"),
                PathBuf::from("/data/scripts/tab"),
                PathBuf::from("/data/scripts/url"),
            ]
        );
        assert_eq!(paths.blacklist_path(), PathBuf::from("/data/blacklist.txt"));
    }

    #[test]
    fn test_ensure_dirs_creates_user_tree() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = Paths::new(
            tmp.path().join("wf"),
            tmp.path().join("data"),
            tmp.path().join("cache"),
        );

        paths.ensure_dirs().unwrap();

        assert!(tmp.path().join("data/scripts/tab").is_dir());
        assert!(tmp.path().join("data/scripts/url").is_dir());
        assert!(tmp.path().join("cache").is_dir());
    }

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::from_toml("", Path::new("settings.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.cache.windows_max_age_secs, 5);
        assert_eq!(settings.scripts.timeout_secs, None);
    }

    #[test]
    fn test_settings_parse() {
        let text = r#"
            [scripts]
            timeout_secs = 10
            extra_dirs = ["/opt/alsf"]

            [cache]
            windows_max_age_secs = 2
        "#;
        let settings = Settings::from_toml(text, Path::new("settings.toml")).unwrap();
        assert_eq!(settings.scripts.timeout_secs, Some(10));
        assert_eq!(settings.cache.windows_max_age_secs, 2);
        assert_eq!(
            settings.extra_script_dirs(),
            vec![PathBuf::from("/opt/alsf/tab"), PathBuf::from("/opt/alsf/url")]
        );
    }

    #[test]
    fn test_settings_parse_error() {
        let result = Settings::from_toml("scripts = 3", Path::new("settings.toml"));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_settings_load_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = Settings::load(&tmp.path().join("settings.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }
}
