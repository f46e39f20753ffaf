//! Route model produced by resolution.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::handler::Handler;
use crate::input::Method;

/// What the router mapped a URI to.
#[derive(Clone)]
pub enum Translation {
    /// A path to be resolved against the namespace registry
    Literal(String),
    /// A handler to invoke directly, bypassing namespace resolution
    Callable(Arc<dyn Handler>),
}

impl Translation {
    /// The literal path, if this is not a callable.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Translation::Literal(path) => Some(path),
            Translation::Callable(_) => None,
        }
    }

    /// Whether the translation is a callable.
    pub fn is_callable(&self) -> bool {
        matches!(self, Translation::Callable(_))
    }
}

impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Translation::Literal(path) => f.write_str(path),
            Translation::Callable(_) => f.write_str("Closure"),
        }
    }
}

impl fmt::Debug for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Translation::Literal(path) => f.debug_tuple("Literal").field(path).finish(),
            Translation::Callable(handler) => f.debug_tuple("Callable").field(&handler.name()).finish(),
        }
    }
}

impl From<&str> for Translation {
    fn from(path: &str) -> Self {
        Translation::Literal(path.to_string())
    }
}

impl From<String> for Translation {
    fn from(path: String) -> Self {
        Translation::Literal(path)
    }
}

/// The resolved handler of a route.
#[derive(Clone)]
pub enum Controller {
    /// Identifier registered in the application's handler registry
    Identifier(String),
    /// Handler supplied directly by the router
    Callable(Arc<dyn Handler>),
}

impl Controller {
    /// The registry identifier, if any.
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Controller::Identifier(id) => Some(id),
            Controller::Callable(_) => None,
        }
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Controller::Identifier(id) => f.debug_tuple("Identifier").field(id).finish(),
            Controller::Callable(handler) => f.debug_tuple("Callable").field(&handler.name()).finish(),
        }
    }
}

/// A resolved request target.
///
/// `controller` is set if and only if resolution succeeded. When two or more
/// path parts are left over after the handler match, the first becomes the
/// `action` and the rest are kept in `segments`; a single leftover stays in
/// `segments`. Order is preserved.
#[derive(Debug, Clone)]
pub struct Route {
    /// Normalized target
    pub uri: String,
    /// Request method
    pub method: Method,
    /// Router output
    pub translation: Translation,
    /// Prefix of the namespace selected during resolution
    pub namespace: Option<String>,
    /// Resolved handler
    pub controller: Option<Controller>,
    /// Base path of the matched namespace
    pub path: Option<PathBuf>,
    /// Title-cased first leftover segment, set when two or more are left over
    pub action: Option<String>,
    /// Route parameters, followed by the leftover segments once dispatched
    pub parameters: Vec<String>,
    /// Leftover segments
    pub segments: Vec<String>,
}

impl Route {
    /// Create an unresolved route.
    pub fn new(uri: impl Into<String>, method: Method, translation: Translation) -> Self {
        Self {
            uri: uri.into(),
            method,
            translation,
            namespace: None,
            controller: None,
            path: None,
            action: None,
            parameters: Vec::new(),
            segments: Vec::new(),
        }
    }

    /// Whether a handler was resolved.
    pub fn is_resolved(&self) -> bool {
        self.controller.is_some()
    }
}
