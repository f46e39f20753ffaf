//! Route resolution.
//!
//! Turns a router translation into a [`Route`] with a concrete controller by
//! walking the namespace registry in order and, inside each namespace,
//! trying the longest run of path segments first.

use tracing::debug;

use crate::input::Method;
use crate::namespace::NamespaceRegistry;
use crate::registry::HandlerRegistry;
use crate::route::{Controller, Route, Translation};
use crate::router::RouteMatch;

/// Kind of request being dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// In-process request for a local URI
    Local,
    /// Command-line task
    Cli,
}

impl RequestKind {
    /// Identifier segment that handlers of this kind live under.
    pub fn infix(&self) -> &'static str {
        match self {
            RequestKind::Local => "Controller",
            RequestKind::Cli => "Task",
        }
    }
}

/// Upper-case the first character of a segment.
pub fn title_case(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Build the handler identifier for a run of segments.
///
/// ```rust
/// use hmvc_dispatch::{handler_identifier, RequestKind};
///
/// assert_eq!(
///     handler_identifier("Admin\\", RequestKind::Cli, &["blog", "show"]),
///     "Admin\\Task\\Blog\\Show"
/// );
/// ```
pub fn handler_identifier<S: AsRef<str>>(root: &str, kind: RequestKind, segments: &[S]) -> String {
    let mut identifier = format!("{root}{}", kind.infix());
    for segment in segments {
        identifier.push('\\');
        identifier.push_str(&title_case(segment.as_ref()));
    }
    identifier
}

/// Resolves translations against a namespace registry and handler table.
#[derive(Debug, Clone, Copy)]
pub struct RouteResolver<'a> {
    namespaces: &'a NamespaceRegistry,
    handlers: &'a HandlerRegistry,
}

impl<'a> RouteResolver<'a> {
    /// Create a resolver over the given registries.
    pub fn new(namespaces: &'a NamespaceRegistry, handlers: &'a HandlerRegistry) -> Self {
        Self {
            namespaces,
            handlers,
        }
    }

    /// Resolve a router match into a route.
    ///
    /// `is_main` is true for the outermost dispatch of a chain; such a
    /// dispatch skips non-routeable namespaces. When nothing matches, the
    /// returned route has no controller.
    pub fn resolve(
        &self,
        matched: RouteMatch,
        method: Method,
        kind: RequestKind,
        is_main: bool,
    ) -> Route {
        let mut route = Route::new(matched.uri, method, matched.translation);
        route.parameters = matched.parameters.into_iter().map(|(_, v)| v).collect();

        let translation = match &route.translation {
            Translation::Callable(handler) => {
                route.controller = Some(Controller::Callable(handler.clone()));
                return route;
            }
            Translation::Literal(path) => path.clone(),
        };

        for namespace in self.namespaces.iter() {
            if !namespace.is_routeable() && is_main {
                debug!(prefix = namespace.prefix(), "skipping non-routeable namespace");
                continue;
            }
            if !namespace.matches(&translation) {
                continue;
            }

            route.namespace = Some(namespace.prefix().to_string());

            let mut segments: Vec<&str> = translation[namespace.prefix().len()..]
                .split('/')
                .filter(|s| !s.is_empty())
                .collect();
            let mut leftovers: Vec<String> = Vec::new();

            while !segments.is_empty() {
                let identifier = handler_identifier(namespace.root(), kind, &segments);
                debug!(%identifier, "trying handler");
                if self.handlers.contains(&identifier) {
                    route.path = namespace.path().map(|p| p.to_path_buf());
                    route.controller = Some(Controller::Identifier(identifier));
                    break;
                }
                if let Some(last) = segments.pop() {
                    leftovers.insert(0, last.to_string());
                }
            }

            if route.controller.is_some() {
                if leftovers.len() > 1 {
                    let action = leftovers.remove(0);
                    route.action = Some(title_case(&action));
                }
                route.segments = leftovers;
                break;
            }
        }

        route
    }
}
