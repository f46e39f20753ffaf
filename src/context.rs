//! Context stack of the requests executing in one dispatch chain.
//!
//! The top of the stack is the innermost `execute()` currently running and is
//! the single source of truth for "current" service lookups. A stack belongs
//! to exactly one chain; unrelated chains each get their own.

use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracing::{trace, warn};

use crate::application::Application;
use crate::input::Input;
use crate::route::Route;

/// One in-flight dispatch.
pub struct RequestContext {
    resource: String,
    application: Arc<Application>,
    input: Arc<Input>,
    route: OnceLock<Route>,
}

impl RequestContext {
    /// Create a context for a request about to execute.
    pub fn new(resource: impl Into<String>, application: Arc<Application>, input: Arc<Input>) -> Self {
        Self {
            resource: resource.into(),
            application,
            input,
            route: OnceLock::new(),
        }
    }

    /// Normalized resource being dispatched.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Application the request runs in.
    pub fn application(&self) -> &Arc<Application> {
        &self.application
    }

    /// Input of the request.
    pub fn input(&self) -> &Arc<Input> {
        &self.input
    }

    /// Resolved route, once resolution succeeded.
    pub fn route(&self) -> Option<&Route> {
        self.route.get()
    }

    pub(crate) fn set_route(&self, route: Route) {
        if self.route.set(route).is_err() {
            warn!(resource = %self.resource, "route already set for request context");
        }
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("resource", &self.resource)
            .field("application", &self.application.name())
            .field("route", &self.route.get().map(|r| &r.uri))
            .finish()
    }
}

/// Handle to the context stack of one dispatch chain.
///
/// Clones share the same stack.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use hmvc_dispatch::{Application, ContextStack, Input, RequestContext};
///
/// let app = Arc::new(Application::builder("main").build());
/// let stack = ContextStack::new();
///
/// {
///     let _guard = stack.enter(Arc::new(RequestContext::new(
///         "/welcome",
///         app.clone(),
///         Arc::new(Input::default()),
///     )));
///     assert_eq!(stack.depth(), 1);
///     assert_eq!(stack.top().unwrap().resource(), "/welcome");
/// }
///
/// assert!(stack.top().is_none());
/// ```
#[derive(Clone, Default)]
pub struct ContextStack {
    entries: Arc<Mutex<Vec<Arc<RequestContext>>>>,
}

impl ContextStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a context on top.
    pub fn push(&self, context: Arc<RequestContext>) {
        let mut entries = self.entries.lock();
        entries.push(context);
        trace!(depth = entries.len(), "request context pushed");
    }

    /// Remove the top context.
    pub fn pop(&self) {
        let mut entries = self.entries.lock();
        if entries.pop().is_some() {
            trace!(depth = entries.len(), "request context popped");
        }
    }

    /// The current top, or `None` when no request is executing.
    pub fn top(&self) -> Option<Arc<RequestContext>> {
        self.entries.lock().last().cloned()
    }

    /// Number of requests currently executing.
    pub fn depth(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether no request is executing.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Push `context` and return a guard popping it when dropped.
    pub fn enter(&self, context: Arc<RequestContext>) -> ContextGuard {
        self.push(context.clone());
        ContextGuard {
            stack: self.clone(),
            context,
        }
    }
}

impl fmt::Debug for ContextStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextStack")
            .field("depth", &self.depth())
            .finish()
    }
}

/// Pops its context off the stack when dropped.
///
/// Dropping happens on normal return, on error propagation and when the
/// owning future is cancelled.
#[must_use = "the context is popped as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ContextGuard {
    stack: ContextStack,
    context: Arc<RequestContext>,
}

impl ContextGuard {
    /// The guarded context.
    pub fn context(&self) -> &Arc<RequestContext> {
        &self.context
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let mut entries = self.stack.entries.lock();
        match entries.last() {
            Some(top) if Arc::ptr_eq(top, &self.context) => {
                entries.pop();
            }
            _ => {
                // guards dropped out of order; remove ours wherever it is
                warn!(resource = %self.context.resource(), "request context is not on top of the stack");
                if let Some(index) = entries.iter().rposition(|c| Arc::ptr_eq(c, &self.context)) {
                    entries.remove(index);
                }
            }
        }
        trace!(depth = entries.len(), "request context popped");
    }
}
