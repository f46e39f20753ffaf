//! Namespace registry.
//!
//! Namespaces scope which handlers a target may resolve to. They are searched
//! in registration order and the first one yielding a handler wins, so the
//! order in which applications and libraries register them is observable.

use std::path::{Path, PathBuf};

use crate::error::{RegistryError, RegistryResult};

/// A registered namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceEntry {
    prefix: String,
    root: String,
    path: PathBuf,
    routeable: bool,
}

impl NamespaceEntry {
    /// Create a routeable namespace with the global identifier root.
    ///
    /// An empty `prefix` matches every target.
    pub fn new(prefix: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
            root: String::new(),
            path: path.into(),
            routeable: true,
        }
    }

    /// Set the identifier root handlers of this namespace live under.
    ///
    /// The root is normalized to end with a single `\`.
    pub fn with_root(mut self, root: &str) -> Self {
        let trimmed = root.trim_matches('\\');
        self.root = if trimmed.is_empty() {
            String::new()
        } else {
            format!("{trimmed}\\")
        };
        self
    }

    /// Only reachable from nested dispatches.
    pub fn non_routeable(mut self) -> Self {
        self.routeable = false;
        self
    }

    /// Target prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Identifier root.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Base path, `None` when empty.
    pub fn path(&self) -> Option<&Path> {
        if self.path.as_os_str().is_empty() {
            None
        } else {
            Some(&self.path)
        }
    }

    /// Whether the outermost dispatch may search this namespace.
    pub fn is_routeable(&self) -> bool {
        self.routeable
    }

    /// Whether `translation` falls under this namespace.
    pub fn matches(&self, translation: &str) -> bool {
        self.prefix.is_empty() || translation.starts_with(&self.prefix)
    }
}

/// Ordered list of namespaces with unique prefixes.
///
/// # Example
///
/// ```rust
/// use hmvc_dispatch::{NamespaceEntry, NamespaceRegistry};
///
/// let mut namespaces = NamespaceRegistry::new();
/// namespaces.register(NamespaceEntry::new("/admin", "/srv/admin").with_root("Admin"));
/// namespaces.register(NamespaceEntry::new("", "/srv/app"));
///
/// let prefixes: Vec<&str> = namespaces.iter().map(|n| n.prefix()).collect();
/// assert_eq!(prefixes, vec!["/admin", ""]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct NamespaceRegistry {
    entries: Vec<NamespaceEntry>,
}

impl NamespaceRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a namespace.
    ///
    /// An entry with the same prefix is replaced in place, keeping its position.
    pub fn register(&mut self, entry: NamespaceEntry) {
        match self.position(entry.prefix()) {
            Some(index) => self.entries[index] = entry,
            None => self.entries.push(entry),
        }
    }

    /// Register a namespace, returning an error if the prefix is taken or malformed.
    pub fn register_unique(&mut self, entry: NamespaceEntry) -> RegistryResult<()> {
        if !entry.prefix().is_empty() && !entry.prefix().starts_with('/') {
            return Err(RegistryError::InvalidName(entry.prefix().to_string()));
        }
        if self.position(entry.prefix()).is_some() {
            return Err(RegistryError::AlreadyRegistered(entry.prefix().to_string()));
        }
        self.entries.push(entry);
        Ok(())
    }

    fn position(&self, prefix: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.prefix() == prefix)
    }

    /// Get a namespace by prefix.
    pub fn get(&self, prefix: &str) -> Option<&NamespaceEntry> {
        self.entries.iter().find(|e| e.prefix() == prefix)
    }

    /// Iterate in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &NamespaceEntry> {
        self.entries.iter()
    }

    /// Get the number of registered namespaces.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<NamespaceEntry> for NamespaceRegistry {
    fn from_iter<I: IntoIterator<Item = NamespaceEntry>>(iter: I) -> Self {
        let mut registry = NamespaceRegistry::new();
        for entry in iter {
            registry.register(entry);
        }
        registry
    }
}
