//! Applications and their request-scoped services.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::environment::Environment;
use crate::input::Input;
use crate::log::AppLog;
use crate::namespace::{NamespaceEntry, NamespaceRegistry};
use crate::paths::{Language, ViewFinder};
use crate::registry::HandlerRegistry;
use crate::router::{PassthroughRouter, Router};

/// An application: the owner of one set of scoped services, its namespaces
/// and its handler table.
///
/// Applications are immutable once built and shared behind an `Arc`; the
/// services they own use interior mutability where dispatch needs it.
#[derive(Debug)]
pub struct Application {
    name: String,
    path: PathBuf,
    namespaces: NamespaceRegistry,
    handlers: HandlerRegistry,
    config: Arc<Config>,
    log: Arc<AppLog>,
    router: Arc<dyn Router>,
    environment: Arc<Environment>,
    input: Arc<Input>,
    language: Arc<Language>,
    views: Arc<ViewFinder>,
}

impl Application {
    /// Start building an application.
    pub fn builder(name: impl Into<String>) -> ApplicationBuilder {
        ApplicationBuilder::new(name)
    }

    /// Application name, also the `app` field of its log events.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root path of the application.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Namespaces searched when resolving requests of this application.
    pub fn namespaces(&self) -> &NamespaceRegistry {
        &self.namespaces
    }

    /// Handler lookup table.
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Configuration of this application.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Logger tagged with the application name.
    pub fn log(&self) -> &Arc<AppLog> {
        &self.log
    }

    /// Router translating this application's URIs.
    pub fn router(&self) -> &Arc<dyn Router> {
        &self.router
    }

    /// Environment of this application.
    pub fn environment(&self) -> &Arc<Environment> {
        &self.environment
    }

    /// Input of the request that started the application.
    pub fn input(&self) -> &Arc<Input> {
        &self.input
    }

    /// Localization loader.
    pub fn language(&self) -> &Arc<Language> {
        &self.language
    }

    /// View finder.
    pub fn views(&self) -> &Arc<ViewFinder> {
        &self.views
    }
}

/// Builder for [`Application`].
///
/// # Example
///
/// ```rust
/// use hmvc_dispatch::{Application, NamespaceEntry, TableRouter};
///
/// let app = Application::builder("blog")
///     .path("/srv/blog")
///     .environment("production")
///     .namespace(NamespaceEntry::new("", "/srv/blog"))
///     .router(TableRouter::new().alias("/", "/welcome"))
///     .build();
///
/// assert_eq!(app.name(), "blog");
/// assert_eq!(app.environment().name(), "production");
/// assert_eq!(app.namespaces().len(), 1);
/// ```
pub struct ApplicationBuilder {
    name: String,
    path: PathBuf,
    environment: String,
    namespaces: NamespaceRegistry,
    handlers: HandlerRegistry,
    config: Config,
    router: Arc<dyn Router>,
    input: Input,
}

impl ApplicationBuilder {
    /// Create a builder with default services.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: PathBuf::new(),
            environment: String::new(),
            namespaces: NamespaceRegistry::new(),
            handlers: HandlerRegistry::new(),
            config: Config::new(),
            router: Arc::new(PassthroughRouter),
            input: Input::default(),
        }
    }

    /// Set the application root path.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the environment name.
    pub fn environment(mut self, name: impl Into<String>) -> Self {
        self.environment = name.into();
        self
    }

    /// Register a namespace.
    pub fn namespace(mut self, entry: NamespaceEntry) -> Self {
        self.namespaces.register(entry);
        self
    }

    /// Replace the handler table.
    pub fn handlers(mut self, handlers: HandlerRegistry) -> Self {
        self.handlers = handlers;
        self
    }

    /// Mutate the handler table in place.
    pub fn with_handlers(mut self, f: impl FnOnce(&mut HandlerRegistry)) -> Self {
        f(&mut self.handlers);
        self
    }

    /// Set the configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set the router.
    pub fn router(mut self, router: impl Router + 'static) -> Self {
        self.router = Arc::new(router);
        self
    }

    /// Set the input of the request that started the application.
    pub fn input(mut self, input: Input) -> Self {
        self.input = input;
        self
    }

    /// Build the application.
    pub fn build(self) -> Application {
        if let Err(err) = self.config.validate() {
            tracing::warn!(app = %self.name, "invalid configuration: {err}");
        }

        let mut environment = Environment::new(self.environment);
        if let Some(base_url) = self.config.base_url() {
            environment = environment.with_base_url(base_url);
        }
        if !self.path.as_os_str().is_empty() {
            // overwrite is set, so this cannot fail
            let _ = environment.add_path(self.name.clone(), self.path.clone(), true);
        }

        Application {
            log: Arc::new(AppLog::new(self.name.clone())),
            name: self.name,
            path: self.path,
            namespaces: self.namespaces,
            handlers: self.handlers,
            config: Arc::new(self.config),
            router: self.router,
            environment: Arc::new(environment),
            input: Arc::new(self.input),
            language: Arc::new(Language::new()),
            views: Arc::new(ViewFinder::new()),
        }
    }
}
