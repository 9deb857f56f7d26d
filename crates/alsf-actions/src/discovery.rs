//! Script discovery.
//!
//! Walks script directories and turns runnable files into script actions.
//! A file's capability class comes from the name of the directory that
//! directly contains it (`tab` or `url`); files anywhere else are ignored.
//!
//! ```text
//! scripts/
//! ├── tab/
//! │   ├── Copy URL.js        -> tab action "Copy URL"
//! │   └── Copy URL.png       -> its icon
//! └── url/
//!     └── Open in Chrome     -> url action "Open in Chrome" (executable)
//! ```

use std::path::{Path, PathBuf};

use alsf_core::Icon;
use walkdir::WalkDir;

use crate::action::{Action, Capability, ScriptAction, ScriptType};
use crate::error::{ActionError, ActionResult};
use crate::registry::Registry;

/// Image extensions checked (in order) for a script's icon.
pub const ICON_EXTENSIONS: [&str; 5] = ["png", "icns", "jpg", "jpeg", "gif"];

/// Whether `path` is a file with any executable bit set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    match std::fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(e) => {
            tracing::debug!("Couldn't stat {:?}: {}", path, e);
            false
        }
    }
}

#[cfg(not(unix))]
pub fn is_executable(_path: &Path) -> bool {
    false
}

/// Whether `path` is an image that can serve as a script's icon.
fn is_icon(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ICON_EXTENSIONS.contains(&ext))
}

/// Whether `path` can be run as an action: executable, or a known script type.
/// Icon images never are, whatever their permissions.
pub fn is_candidate(path: &Path) -> bool {
    !is_icon(path) && (is_executable(path) || ScriptType::from_path(path).is_some())
}

/// Whether `path` is a compiled AppleScript bundle (a `.scptd` directory).
fn is_script_bundle(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("scptd")
}

/// Icon for a script: a sibling image with the same stem, else `fallback`.
pub fn script_icon(path: &Path, fallback: Capability) -> Icon {
    ICON_EXTENSIONS
        .iter()
        .map(|ext| path.with_extension(ext))
        .find(|candidate| candidate != path && candidate.is_file())
        .map(|p| Icon::new(p.to_string_lossy()))
        .unwrap_or_else(|| fallback.default_icon())
}

/// Result of walking a set of script directories.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Scripts found, in walk order.
    pub scripts: Vec<ScriptAction>,

    /// Errors encountered, in the order they occurred.
    pub errors: Vec<ActionError>,
}

impl Discovery {
    /// The first error, if any.
    pub fn first_error(self) -> Option<ActionError> {
        self.errors.into_iter().next()
    }
}

/// Finds script actions beneath a list of root directories.
#[derive(Debug, Clone, Default)]
pub struct Discoverer {
    roots: Vec<PathBuf>,
}

impl Discoverer {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// Walk every root. A failing root doesn't stop the others.
    pub fn discover(&self) -> Discovery {
        let mut discovery = Discovery::default();
        for root in &self.roots {
            self.walk_root(root, &mut discovery);
        }
        discovery
    }

    fn walk_root(&self, root: &Path, discovery: &mut Discovery) {
        if !root.is_dir() {
            discovery
                .errors
                .push(ActionError::MissingDirectory(root.to_path_buf()));
            return;
        }

        let mut walker = WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter();
        while let Some(entry) = walker.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(root).to_path_buf();
                    discovery.errors.push(ActionError::Walk {
                        path,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            let path = entry.path();
            if entry.file_type().is_dir() {
                // Bundles are single scripts; don't descend into them
                if entry.depth() == 0 || !is_script_bundle(path) {
                    continue;
                }
                walker.skip_current_dir();
            } else if !is_candidate(path) {
                continue;
            }

            let parent = path
                .parent()
                .and_then(Path::file_name)
                .and_then(|n| n.to_str())
                .unwrap_or_default();
            let Some(capability) = Capability::from_dir_name(parent) else {
                tracing::debug!("Ignoring {:?}: not in a tab/ or url/ directory", path);
                continue;
            };

            let icon = script_icon(path, capability);
            discovery
                .scripts
                .push(ScriptAction::new(path, icon, capability));
        }
    }
}

/// Discover scripts under `roots` and register them.
///
/// Every root is walked even if an earlier one fails; the first error is
/// returned once all scripts that could be found have been registered.
pub fn discover_scripts(registry: &mut Registry, roots: &[PathBuf]) -> ActionResult<()> {
    let discovery = Discoverer::new(roots.iter().cloned()).discover();

    for script in &discovery.scripts {
        let title = script.title();
        if registry.blacklist().contains(&title) {
            tracing::debug!("Hidden by blacklist: {}", title);
        }
        tracing::debug!(
            "{} script {:?} from {:?}",
            script.capability,
            title,
            script.path
        );
        registry.register(Action::script(script.clone()));
    }

    for err in &discovery.errors {
        tracing::warn!("Script discovery: {}", err);
    }

    match discovery.first_error() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
