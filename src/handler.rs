//! Handlers, handler factories and responses.
//!
//! A [`Handler`] is the invocable end of a dispatch. Handlers are either
//! produced by a [`HandlerFactory`] registered under an identifier, or handed
//! to the router directly as a [`Translation::Callable`](crate::Translation).

use std::collections::BTreeMap;
use std::fmt::{self, Debug};
use std::sync::Arc;

use async_trait::async_trait;

use crate::application::Application;
use crate::dispatch::DispatchChain;
use crate::error::{DispatchResult, FrameworkError, HandlerResult};
use crate::route::Route;

/// Response produced by a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: u16,
    /// Response body
    pub body: String,
    /// Response headers
    pub headers: BTreeMap<String, String>,
}

impl Response {
    /// Create a response with the given status.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            headers: BTreeMap::new(),
        }
    }

    /// A `200` response.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    /// Add a header, builder style.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The invocable end of a dispatch.
///
/// The route is always passed first so handlers can inspect routing
/// metadata; `args` are the route parameters followed by the leftover path
/// segments. `chain` gives access to the scoped services of the running
/// dispatch and lets the handler issue nested requests.
///
/// # Example
///
/// ```rust
/// use hmvc_dispatch::prelude::*;
///
/// #[derive(Debug)]
/// struct Show;
///
/// #[async_trait]
/// impl Handler for Show {
///     async fn handle(
///         &self,
///         route: &Route,
///         args: Vec<String>,
///         _chain: &DispatchChain,
///     ) -> HandlerResult<Response> {
///         Ok(Response::ok(format!("{} {:?}", route.uri, args)))
///     }
/// }
/// ```
#[async_trait]
pub trait Handler: Send + Sync + Debug {
    /// Name used in log output.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Handle a request.
    async fn handle(
        &self,
        route: &Route,
        args: Vec<String>,
        chain: &DispatchChain,
    ) -> HandlerResult<Response>;
}

type HandlerFn = dyn Fn(&Route, Vec<String>) -> HandlerResult<Response> + Send + Sync;

/// Handler backed by a synchronous closure.
#[derive(Clone)]
pub struct FnHandler {
    name: String,
    f: Arc<HandlerFn>,
}

impl FnHandler {
    /// Wrap a closure.
    pub fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Route, Vec<String>) -> HandlerResult<Response> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            f: Arc::new(f),
        }
    }
}

impl Debug for FnHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").field("name", &self.name).finish()
    }
}

#[async_trait]
impl Handler for FnHandler {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(
        &self,
        route: &Route,
        args: Vec<String>,
        _chain: &DispatchChain,
    ) -> HandlerResult<Response> {
        (self.f)(route, args)
    }
}

/// Wrap a closure as a shareable handler.
pub fn handler_fn<F>(name: impl Into<String>, f: F) -> Arc<dyn Handler>
where
    F: Fn(&Route, Vec<String>) -> HandlerResult<Response> + Send + Sync + 'static,
{
    Arc::new(FnHandler::new(name, f))
}

/// Produces a handler instance for a resolved identifier.
///
/// Any `Fn(&Arc<Application>) -> Result<Arc<dyn Handler>, FrameworkError>`
/// closure is a factory.
pub trait HandlerFactory: Send + Sync {
    /// Create the handler for a dispatch running in `app`.
    fn create(&self, app: &Arc<Application>) -> Result<Arc<dyn Handler>, FrameworkError>;
}

impl<F> HandlerFactory for F
where
    F: Fn(&Arc<Application>) -> Result<Arc<dyn Handler>, FrameworkError> + Send + Sync,
{
    fn create(&self, app: &Arc<Application>) -> Result<Arc<dyn Handler>, FrameworkError> {
        self(app)
    }
}

/// Factory returning the same handler instance every time.
#[derive(Debug, Clone)]
pub struct SharedHandler(pub Arc<dyn Handler>);

impl HandlerFactory for SharedHandler {
    fn create(&self, _app: &Arc<Application>) -> Result<Arc<dyn Handler>, FrameworkError> {
        Ok(self.0.clone())
    }
}

/// Converts recognized handler failures into responses.
pub trait ErrorResponder: Send + Sync + Debug {
    /// Build the response for `err`, or fail the dispatch.
    fn error_response(&self, err: FrameworkError) -> DispatchResult<Response>;
}

/// Renders the error status and message as a plain response.
#[derive(Debug, Clone, Default)]
pub struct DefaultErrorResponder;

impl ErrorResponder for DefaultErrorResponder {
    fn error_response(&self, err: FrameworkError) -> DispatchResult<Response> {
        Ok(Response::new(err.status(), err.message()))
    }
}
