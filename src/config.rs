//! Application configuration.
//!
//! Every [`Application`](crate::Application) owns one [`Config`]. It is a
//! request-scoped service: code running inside a nested dispatch sees the
//! configuration of the application that dispatch belongs to.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::paths::{PathAware, SearchPaths};

/// Key holding the localization fallback language.
pub const LANG_FALLBACK_KEY: &str = "lang.fallback";

/// Language used when [`LANG_FALLBACK_KEY`] is not configured.
pub const DEFAULT_LANG_FALLBACK: &str = "en";

/// Key holding the externally visible base URL of the application.
pub const BASE_URL_KEY: &str = "base_url";

/// Dotted-key configuration store with its own search paths.
///
/// # Example
///
/// ```rust
/// use hmvc_dispatch::Config;
///
/// let config = Config::new()
///     .with_value("lang.fallback", "nl")
///     .with_value("app.name", "blog");
///
/// assert_eq!(config.lang_fallback(), "nl");
/// assert_eq!(config.get("app.name").as_deref(), Some("blog"));
/// assert_eq!(config.get_or("app.debug", "false"), "false");
/// ```
#[derive(Debug, Default)]
pub struct Config {
    values: RwLock<BTreeMap<String, String>>,
    paths: SearchPaths,
}

impl Config {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, builder style.
    pub fn with_value(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Add a search path, builder style.
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        self.paths.add_path(&path.into());
        self
    }

    /// Set a value.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.values.write().insert(key.into(), value.into());
    }

    /// Get a value.
    pub fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    /// Get a value, or `default` when the key is not set.
    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Whether a key is set.
    pub fn contains(&self, key: &str) -> bool {
        self.values.read().contains_key(key)
    }

    /// The localization fallback language.
    pub fn lang_fallback(&self) -> String {
        self.get_or(LANG_FALLBACK_KEY, DEFAULT_LANG_FALLBACK)
    }

    /// The configured base URL, if any.
    pub fn base_url(&self) -> Option<String> {
        self.get(BASE_URL_KEY)
    }

    /// Validates the configuration.
    ///
    /// Returns Ok(()) if valid, or an error message describing the issue.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(fallback) = self.get(LANG_FALLBACK_KEY) {
            if fallback.is_empty() || fallback.contains('/') {
                return Err(format!("invalid {LANG_FALLBACK_KEY}: {fallback:?}"));
            }
        }
        if let Some(base_url) = self.base_url() {
            if !base_url.contains("://") {
                return Err(format!("{BASE_URL_KEY} must be an absolute URL: {base_url}"));
            }
        }
        Ok(())
    }
}

impl PathAware for Config {
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
