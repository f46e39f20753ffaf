//! Search-path collaborators.
//!
//! Configuration, localization and view lookups each keep an ordered list of
//! search paths. While a request runs, the base path of the namespace that
//! served it is pushed onto those lists and popped again afterwards.

use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

/// A collaborator that searches an ordered list of paths.
pub trait PathAware: Send + Sync + Debug {
    /// Append a search path.
    fn add_path(&self, path: &Path);

    /// Remove the most recently added occurrence of `path`.
    ///
    /// Returns `false` when the path was not registered.
    fn remove_path(&self, path: &Path) -> bool;

    /// Snapshot of the current search paths, oldest first.
    fn paths(&self) -> Vec<PathBuf>;
}

/// Interior-mutable, ordered list of search paths.
#[derive(Debug, Default)]
pub struct SearchPaths {
    paths: RwLock<Vec<PathBuf>>,
}

impl SearchPaths {
    /// Create an empty path list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a path list seeded with `paths`.
    pub fn with_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: RwLock::new(paths.into_iter().map(Into::into).collect()),
        }
    }

    /// Number of registered paths.
    pub fn len(&self) -> usize {
        self.paths.read().len()
    }

    /// Whether no path is registered.
    pub fn is_empty(&self) -> bool {
        self.paths.read().is_empty()
    }
}

impl PathAware for SearchPaths {
    fn add_path(&self, path: &Path) {
        self.paths.write().push(path.to_path_buf());
    }

    fn remove_path(&self, path: &Path) -> bool {
        let mut paths = self.paths.write();
        match paths.iter().rposition(|p| p == path) {
            Some(index) => {
                paths.remove(index);
                true
            }
            None => false,
        }
    }

    fn paths(&self) -> Vec<PathBuf> {
        self.paths.read().clone()
    }
}

macro_rules! search_path_service {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Default)]
        pub struct $name {
            paths: SearchPaths,
        }

        impl $name {
            /// Create the service with no search paths.
            pub fn new() -> Self {
                Self::default()
            }
        }

        impl PathAware for $name {
            fn add_path(&self, path: &Path) {
                self.paths.add_path(path)
            }

            fn remove_path(&self, path: &Path) -> bool {
                self.paths.remove_path(path)
            }

            fn paths(&self) -> Vec<PathBuf> {
                self.paths.paths()
            }
        }
    };
}

search_path_service! {
    /// Localization loader search paths.
    Language
}

search_path_service! {
    /// View/template finder search paths.
    ViewFinder
}

/// Drop guard holding the paths pushed for one dispatch.
///
/// Paths are removed in reverse push order when the guard is dropped, which
/// also happens when the handler fails or its future is cancelled.
#[derive(Debug)]
pub struct TransientPaths {
    pushed: Vec<(Arc<dyn PathAware>, PathBuf)>,
}

impl TransientPaths {
    /// A guard that pushed nothing.
    pub fn none() -> Self {
        Self { pushed: Vec::new() }
    }

    /// Push `base` onto the view finder, `base/config` onto the config and
    /// `base/lang/<fallback>` onto the localization loader.
    pub fn extend(
        base: &Path,
        views: Arc<dyn PathAware>,
        config: Arc<dyn PathAware>,
        language: Arc<dyn PathAware>,
        lang_fallback: &str,
    ) -> Self {
        let mut guard = Self::none();
        guard.push(views, base.to_path_buf());
        guard.push(config, base.join("config"));
        guard.push(language, base.join("lang").join(lang_fallback));
        guard
    }

    fn push(&mut self, target: Arc<dyn PathAware>, path: PathBuf) {
        target.add_path(&path);
        self.pushed.push((target, path));
    }

    /// Paths currently held, in push order.
    pub fn pushed(&self) -> Vec<&Path> {
        self.pushed.iter().map(|(_, p)| p.as_path()).collect()
    }
}

impl Drop for TransientPaths {
    fn drop(&mut self) {
        while let Some((target, path)) = self.pushed.pop() {
            if !target.remove_path(&path) {
                tracing::warn!(path = %path.display(), "transient search path already removed");
            }
        }
    }
}
