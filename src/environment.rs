//! Application environment: named paths, variables and the base URL.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;

use crate::error::EnvironmentError;

/// Environment used when none is given.
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Per-application environment.
#[derive(Debug)]
pub struct Environment {
    name: String,
    base_url: Option<String>,
    vars: RwLock<BTreeMap<String, String>>,
    paths: RwLock<BTreeMap<String, PathBuf>>,
}

impl Environment {
    /// Create an environment with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let env = Self {
            name: if name.is_empty() {
                DEFAULT_ENVIRONMENT.to_string()
            } else {
                name
            },
            base_url: None,
            vars: RwLock::new(BTreeMap::new()),
            paths: RwLock::new(BTreeMap::new()),
        };
        let init_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();
        env.set_var("init_time", init_time.to_string());
        env
    }

    /// Set the base URL, builder style.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Name of the environment.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Externally visible base URL, if known.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Set a variable.
    pub fn set_var(&self, name: impl Into<String>, value: impl Into<String>) -> &Self {
        self.vars.write().insert(name.into(), value.into());
        self
    }

    /// Get a variable.
    pub fn var(&self, name: &str) -> Option<String> {
        self.vars.read().get(name).cloned()
    }

    /// All variables.
    pub fn vars(&self) -> BTreeMap<String, String> {
        self.vars.read().clone()
    }

    /// Register a named path.
    ///
    /// Fails with [`EnvironmentError::PathExists`] when the name is taken and
    /// `overwrite` is false.
    pub fn add_path(
        &self,
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        overwrite: bool,
    ) -> Result<&Self, EnvironmentError> {
        let name = name.into();
        let mut paths = self.paths.write();
        if !overwrite && paths.contains_key(&name) {
            return Err(EnvironmentError::PathExists(name));
        }
        paths.insert(name, path.into());
        Ok(self)
    }

    /// Look up a named path.
    pub fn path(&self, name: &str) -> Result<PathBuf, EnvironmentError> {
        self.paths
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| EnvironmentError::UnknownPath(name.to_string()))
    }

    /// Rewrite `path` relative to the first registered path containing it,
    /// as `name::relative`. Paths outside every registered root are returned
    /// unchanged.
    pub fn clean_path(&self, path: &Path) -> String {
        for (name, root) in self.paths.read().iter() {
            if let Ok(relative) = path.strip_prefix(root) {
                return format!("{}::{}", name, relative.display());
            }
        }
        path.display().to_string()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(DEFAULT_ENVIRONMENT)
    }
}
