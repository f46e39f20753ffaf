//! Router collaborator.
//!
//! A router maps a URI and method to a [`Translation`]. It does not resolve
//! handlers; that is the job of the [`RouteResolver`](crate::RouteResolver).

use std::fmt::Debug;
use std::sync::Arc;

use crate::handler::Handler;
use crate::input::Method;
use crate::route::Translation;

/// Router output.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// Normalized URI
    pub uri: String,
    /// Literal path or callable
    pub translation: Translation,
    /// Named parameters captured by the router, in order
    pub parameters: Vec<(String, String)>,
}

impl RouteMatch {
    /// A match that translates `uri` to itself.
    pub fn passthrough(uri: &str) -> Self {
        Self {
            uri: uri.to_string(),
            translation: Translation::Literal(uri.to_string()),
            parameters: Vec::new(),
        }
    }
}

/// Maps a URI and method to a translation.
pub trait Router: Send + Sync + Debug {
    /// Translate a normalized URI.
    fn translate(&self, uri: &str, method: &Method) -> RouteMatch;
}

/// Router translating every URI to itself.
#[derive(Debug, Clone, Default)]
pub struct PassthroughRouter;

impl Router for PassthroughRouter {
    fn translate(&self, uri: &str, _method: &Method) -> RouteMatch {
        RouteMatch::passthrough(uri)
    }
}

#[derive(Debug, Clone)]
struct TableEntry {
    uri: String,
    method: Option<Method>,
    target: Translation,
    parameters: Vec<(String, String)>,
}

/// Exact-match routing table with pass-through fallback.
///
/// Entries are checked in insertion order; an entry without a method matches
/// every method.
///
/// # Example
///
/// ```rust
/// use hmvc_dispatch::{Method, Router, TableRouter};
///
/// let router = TableRouter::new()
///     .alias("/", "/welcome/index")
///     .alias_for(Method::Post, "/login", "/auth/login");
///
/// assert_eq!(router.translate("/", &Method::Get).translation.to_string(), "/welcome/index");
/// assert_eq!(router.translate("/login", &Method::Get).translation.to_string(), "/login");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TableRouter {
    entries: Vec<TableEntry>,
}

impl TableRouter {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `uri` to a literal path for every method.
    pub fn alias(self, uri: impl Into<String>, target: impl Into<String>) -> Self {
        self.entry(uri.into(), None, Translation::Literal(target.into()), Vec::new())
    }

    /// Map `uri` to a literal path for one method.
    pub fn alias_for(
        self,
        method: Method,
        uri: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        self.entry(
            uri.into(),
            Some(method),
            Translation::Literal(target.into()),
            Vec::new(),
        )
    }

    /// Map `uri` to a literal path and attach named parameters.
    pub fn alias_with_params<I, K, V>(
        self,
        uri: impl Into<String>,
        target: impl Into<String>,
        parameters: I,
    ) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let parameters = parameters
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.entry(uri.into(), None, Translation::Literal(target.into()), parameters)
    }

    /// Map `uri` directly to a handler.
    pub fn callable(self, uri: impl Into<String>, handler: Arc<dyn Handler>) -> Self {
        self.entry(uri.into(), None, Translation::Callable(handler), Vec::new())
    }

    fn entry(
        mut self,
        uri: String,
        method: Option<Method>,
        target: Translation,
        parameters: Vec<(String, String)>,
    ) -> Self {
        self.entries.push(TableEntry {
            uri,
            method,
            target,
            parameters,
        });
        self
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Router for TableRouter {
    fn translate(&self, uri: &str, method: &Method) -> RouteMatch {
        self.entries
            .iter()
            .find(|e| e.uri == uri && e.method.as_ref().map_or(true, |m| m == method))
            .map(|e| RouteMatch {
                uri: uri.to_string(),
                translation: e.target.clone(),
                parameters: e.parameters.clone(),
            })
            .unwrap_or_else(|| RouteMatch::passthrough(uri))
    }
}
