//! Handler lookup table.
//!
//! The `HandlerRegistry` maps handler identifiers (`Task\Blog\Show`,
//! `Admin\Controller\Users`) to the factories producing them. It is built at
//! application setup and read-only during dispatch.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::application::Application;
use crate::error::{FrameworkError, RegistryError, RegistryResult};
use crate::handler::{Handler, HandlerFactory, SharedHandler};

/// A registry of handler factories keyed by identifier.
///
/// # Example
///
/// ```rust
/// use hmvc_dispatch::{handler_fn, HandlerRegistry, Response};
///
/// let mut registry = HandlerRegistry::new();
/// registry.register_handler(
///     "Task\\Blog\\Show",
///     handler_fn("show", |_route, _args| Ok(Response::ok("post"))),
/// );
///
/// assert!(registry.contains("Task\\Blog\\Show"));
/// assert!(!registry.contains("Task\\Blog"));
/// ```
#[derive(Default)]
pub struct HandlerRegistry {
    factories: HashMap<String, Arc<dyn HandlerFactory>>,
    ordered: Vec<String>,
}

impl HandlerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory.
    ///
    /// If a factory with the same identifier already exists, it will be replaced.
    pub fn register(&mut self, identifier: impl Into<String>, factory: Arc<dyn HandlerFactory>) {
        let identifier = identifier.into();
        if !self.factories.contains_key(&identifier) {
            self.ordered.push(identifier.clone());
        }
        self.factories.insert(identifier, factory);
    }

    /// Register a factory, returning an error if already registered or if
    /// the identifier is malformed.
    pub fn register_unique(
        &mut self,
        identifier: impl Into<String>,
        factory: Arc<dyn HandlerFactory>,
    ) -> RegistryResult<()> {
        let identifier = identifier.into();
        if identifier.is_empty() || identifier.contains('/') || identifier.ends_with('\\') {
            return Err(RegistryError::InvalidName(identifier));
        }
        if self.factories.contains_key(&identifier) {
            return Err(RegistryError::AlreadyRegistered(identifier));
        }
        self.register(identifier, factory);
        Ok(())
    }

    /// Register a closure factory.
    pub fn register_fn<F>(&mut self, identifier: impl Into<String>, factory: F)
    where
        F: Fn(&Arc<Application>) -> Result<Arc<dyn Handler>, FrameworkError>
            + Send
            + Sync
            + 'static,
    {
        self.register(identifier, Arc::new(factory));
    }

    /// Register a handler instance shared by every dispatch.
    pub fn register_handler(&mut self, identifier: impl Into<String>, handler: Arc<dyn Handler>) {
        self.register(identifier, Arc::new(SharedHandler(handler)));
    }

    /// Get a factory by identifier.
    pub fn get(&self, identifier: &str) -> Option<&Arc<dyn HandlerFactory>> {
        self.factories.get(identifier)
    }

    /// Check if an identifier is registered.
    pub fn contains(&self, identifier: &str) -> bool {
        self.factories.contains_key(identifier)
    }

    /// Create the handler registered under `identifier`.
    pub fn create(
        &self,
        identifier: &str,
        app: &Arc<Application>,
    ) -> Result<Arc<dyn Handler>, FrameworkError> {
        match self.factories.get(identifier) {
            Some(factory) => factory.create(app),
            None => Err(FrameworkError::NotFound(identifier.to_string())),
        }
    }

    /// Remove a factory by identifier.
    pub fn remove(&mut self, identifier: &str) -> Option<Arc<dyn HandlerFactory>> {
        self.ordered.retain(|id| id != identifier);
        self.factories.remove(identifier)
    }

    /// Registered identifiers, in registration order.
    pub fn identifiers(&self) -> Vec<&str> {
        self.ordered.iter().map(|s| s.as_str()).collect()
    }

    /// Get the number of registered factories.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("identifiers", &self.ordered)
            .finish()
    }
}
