//! Request lifecycle orchestration.
//!
//! A [`Kernel`] holds the root application. Each incoming request gets its
//! own [`DispatchChain`], which owns the context stack for that request and
//! every nested request it triggers. Executing a request walks these states:
//!
//! ```text
//! Created -> ContextPushed -> RouteResolved -> PathsExtended -> HandlerInvoked
//!         -> PathsRestored -> ContextPopped -> Done
//! ```
//!
//! with `ErrorCaught` reachable from any state after `ContextPushed`. Path
//! restoration and the context pop are tied to drop guards, so they also run
//! when the handler fails or the dispatch future is cancelled.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info_span, trace, Instrument};

use crate::application::Application;
use crate::context::{ContextStack, RequestContext};
use crate::error::{DispatchError, DispatchResult, HandlerError};
use crate::events::{DispatchEvent, DispatchState, EventSender};
use crate::handler::{DefaultErrorResponder, ErrorResponder, Handler, Response};
use crate::input::{Input, Method};
use crate::paths::TransientPaths;
use crate::resolver::{RequestKind, RouteResolver};
use crate::route::{Controller, Route};
use crate::scope::ScopedService;

/// Normalize a resource to `/` followed by its trimmed path.
pub fn normalize_resource(resource: &str) -> String {
    format!("/{}", resource.trim_matches('/'))
}

/// A request and, once executed, its route and response.
#[derive(Debug)]
pub struct Request {
    kind: RequestKind,
    resource: String,
    application: Arc<Application>,
    input: Arc<Input>,
    params: BTreeMap<String, String>,
    route: Option<Route>,
    response: Option<Response>,
}

impl Request {
    /// Create a request; the resource is normalized.
    pub fn new(
        kind: RequestKind,
        application: Arc<Application>,
        resource: &str,
        input: Arc<Input>,
    ) -> Self {
        Self {
            kind,
            resource: normalize_resource(resource),
            application,
            input,
            params: BTreeMap::new(),
            route: None,
            response: None,
        }
    }

    /// Local request or CLI task.
    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// Normalized resource.
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

    /// Method taken from the input.
    pub fn method(&self) -> &Method {
        self.input.method()
    }

    /// Named parameter captured by the router.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// All named parameters captured by the router.
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Resolved route, after execution.
    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    /// Response, after execution.
    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    /// Take the response out of an executed request.
    pub fn into_response(self) -> Option<Response> {
        self.response
    }
}

/// Entry point holding the root application.
///
/// # Example
///
/// ```rust
/// use hmvc_dispatch::prelude::*;
///
/// # async fn example() -> DispatchResult<()> {
/// let app = Application::builder("main")
///     .namespace(NamespaceEntry::new("", "/srv/app"))
///     .with_handlers(|handlers| {
///         handlers.register_handler(
///             "Controller\\Welcome",
///             handler_fn("welcome", |_route, _args| Ok(Response::ok("hello"))),
///         );
///     })
///     .build();
///
/// let kernel = Kernel::new(app);
/// let request = kernel.dispatch("/welcome").await?;
/// assert_eq!(request.response().map(|r| r.body.as_str()), Some("hello"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Kernel {
    root: Arc<Application>,
    responder: Arc<dyn ErrorResponder>,
    kind: RequestKind,
}

impl Kernel {
    /// Create a kernel dispatching local requests.
    pub fn new(root: impl Into<Arc<Application>>) -> Self {
        Self {
            root: root.into(),
            responder: Arc::new(DefaultErrorResponder),
            kind: RequestKind::Local,
        }
    }

    /// Dispatch command-line tasks instead of local requests.
    pub fn cli(mut self) -> Self {
        self.kind = RequestKind::Cli;
        self
    }

    /// Replace the error responder.
    pub fn with_error_responder(mut self, responder: impl ErrorResponder + 'static) -> Self {
        self.responder = Arc::new(responder);
        self
    }

    /// The root application.
    pub fn root(&self) -> &Arc<Application> {
        &self.root
    }

    /// Start an independent dispatch chain.
    pub fn chain(&self) -> DispatchChain {
        DispatchChain {
            root: self.root.clone(),
            responder: self.responder.clone(),
            kind: self.kind,
            stack: ContextStack::new(),
            events: None,
        }
    }

    /// Create and execute a request on a fresh chain.
    pub async fn dispatch(&self, resource: &str) -> DispatchResult<Request> {
        let chain = self.chain();
        let request = chain.request(resource)?;
        chain.execute(request).await
    }
}

/// One incoming request and every nested request it triggers.
///
/// Handlers receive the chain they run in, so they can look up the current
/// scoped services and issue nested requests.
#[derive(Debug, Clone)]
pub struct DispatchChain {
    root: Arc<Application>,
    responder: Arc<dyn ErrorResponder>,
    kind: RequestKind,
    stack: ContextStack,
    events: Option<EventSender>,
}

impl DispatchChain {
    /// Report lifecycle transitions on `events`.
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// The chain's context stack.
    pub fn stack(&self) -> &ContextStack {
        &self.stack
    }

    /// Number of requests currently executing on this chain.
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// The root application.
    pub fn root(&self) -> &Arc<Application> {
        &self.root
    }

    /// Resolve a scoped service for the innermost executing request.
    ///
    /// ```rust
    /// # use hmvc_dispatch::prelude::*;
    /// let kernel = Kernel::new(Application::builder("main").build());
    /// let chain = kernel.chain();
    ///
    /// assert_eq!(chain.current::<Application>().name(), "main");
    /// assert_eq!(chain.current::<Config>().lang_fallback(), "en");
    /// ```
    pub fn current<T: ScopedService + ?Sized>(&self) -> Arc<T> {
        T::resolve_current(&self.stack, &self.root)
    }

    /// Create a request in the current application, inheriting the method
    /// and, as parent, the input of the innermost executing request.
    ///
    /// The outermost request of a CLI chain uses [`Method::Cli`].
    pub fn request(&self, resource: &str) -> DispatchResult<Request> {
        let method = match self.kind {
            RequestKind::Cli if self.stack.is_empty() => Method::Cli,
            _ => self.current::<Input>().method().clone(),
        };
        self.request_with(resource, Input::new(method))
    }

    /// Create a request with an explicit input.
    ///
    /// The input is chained to the current input unless it has a parent
    /// already. Query parameters in `resource` are added to the input.
    pub fn request_with(&self, resource: &str, input: Input) -> DispatchResult<Request> {
        let app = self.current::<Application>();
        let input = match input.parent() {
            Some(_) => input,
            None => input.with_parent(self.current::<Input>()),
        };

        let (path, query) = split_query(resource);
        let kind = self.kind;
        let path = match kind {
            RequestKind::Cli => path.to_string(),
            RequestKind::Local => local_path(&app, path)?,
        };

        Ok(Request::new(
            kind,
            app,
            &path,
            Arc::new(input.with_params(query)),
        ))
    }

    /// Execute a request.
    ///
    /// Returns the request carrying its route and response. Fails with
    /// [`DispatchError::NotFound`] when no handler resolves and with
    /// [`DispatchError::Unrecognized`] when the handler fails with an error
    /// that is not a [`FrameworkError`](crate::FrameworkError). In every case
    /// the stack depth after the call equals the depth before it.
    pub async fn execute(&self, mut request: Request) -> DispatchResult<Request> {
        self.emit(DispatchState::Created, &request);

        let context = Arc::new(RequestContext::new(
            request.resource(),
            request.application.clone(),
            request.input.clone(),
        ));
        let guard = self.stack.enter(context.clone());
        self.emit(DispatchState::ContextPushed, &request);

        let log = request.application.log().clone();
        log.info(format_args!("Executing request {}", request.resource));

        let span = info_span!(
            "dispatch",
            app = %request.application.name(),
            resource = %request.resource,
            depth = self.stack.depth()
        );
        let outcome = self.run(&mut request, &context).instrument(span).await;

        drop(guard);
        self.emit(DispatchState::ContextPopped, &request);

        match outcome {
            Ok(()) => {
                log.info("Request executed");
                self.emit(DispatchState::Done, &request);
                Ok(request)
            }
            Err(err) => {
                log.info(format_args!("Request executed, but failed: {err}"));
                Err(err)
            }
        }
    }

    async fn run(&self, request: &mut Request, context: &RequestContext) -> DispatchResult<()> {
        let app = request.application.clone();
        let method = request.input.method().clone();

        let matched = app.router().translate(&request.resource, &method);
        let named = matched.parameters.clone();
        let is_main = self.stack.depth() == 1;
        let mut route = RouteResolver::new(app.namespaces(), app.handlers()).resolve(
            matched,
            method,
            request.kind,
            is_main,
        );
        app.log().info(format_args!(
            "{} request routed to {}",
            route.method, route.translation
        ));

        request.params.extend(named);
        route.parameters.extend(route.segments.iter().cloned());

        let handler = match self.instantiate(&app, &route) {
            Ok(handler) => handler,
            Err(err) => {
                self.emit(DispatchState::ErrorCaught, request);
                return Err(err);
            }
        };
        context.set_route(route.clone());
        self.emit(DispatchState::RouteResolved, request);

        let paths = match route.path.as_deref() {
            Some(base) => TransientPaths::extend(
                base,
                app.views().clone(),
                app.config().clone(),
                app.language().clone(),
                &app.config().lang_fallback(),
            ),
            None => TransientPaths::none(),
        };
        self.emit(DispatchState::PathsExtended, request);

        let outcome = handler.handle(&route, route.parameters.clone(), self).await;
        self.emit(DispatchState::HandlerInvoked, request);

        let response = match outcome {
            Ok(response) => Ok(response),
            Err(HandlerError::Framework(err)) => {
                self.emit(DispatchState::ErrorCaught, request);
                app.log().warn(format_args!("Handler failed: {err}"));
                self.responder.error_response(err)
            }
            Err(HandlerError::Other(err)) => {
                self.emit(DispatchState::ErrorCaught, request);
                Err(DispatchError::Unrecognized(err))
            }
        };

        drop(paths);
        self.emit(DispatchState::PathsRestored, request);

        request.route = Some(route);
        request.response = Some(response?);
        Ok(())
    }

    fn instantiate(&self, app: &Arc<Application>, route: &Route) -> DispatchResult<Arc<dyn Handler>> {
        match &route.controller {
            None => Err(DispatchError::NotFound(format!(
                "No route match has been found for {}",
                route.uri
            ))),
            Some(Controller::Callable(handler)) => Ok(handler.clone()),
            Some(Controller::Identifier(identifier)) => {
                app.handlers().create(identifier, app).map_err(|err| {
                    DispatchError::NotFound(format!(
                        "The handler {identifier} returned by routing is not invocable: {err}"
                    ))
                })
            }
        }
    }

    fn emit(&self, state: DispatchState, request: &Request) {
        let Some(events) = self.events.as_ref().filter(|e| !e.is_closed()) else {
            return;
        };
        let event = DispatchEvent {
            state,
            resource: request.resource.clone(),
            depth: self.stack.depth(),
        };
        if events.try_send(event).is_err() {
            trace!(?state, "dispatch event dropped");
        }
    }
}

fn split_query(resource: &str) -> (&str, Vec<(String, String)>) {
    let resource = resource.split('#').next().unwrap_or_default();
    match resource.split_once('?') {
        Some((path, query)) => {
            let params = query
                .split('&')
                .filter(|pair| !pair.is_empty())
                .map(|pair| match pair.split_once('=') {
                    Some((k, v)) => (k.to_string(), v.to_string()),
                    None => (pair.to_string(), String::new()),
                })
                .collect();
            (path, params)
        }
        None => (resource, Vec::new()),
    }
}

fn local_path(app: &Application, resource: &str) -> DispatchResult<String> {
    if !resource.contains("://") {
        return Ok(resource.to_string());
    }
    let base_url = app
        .environment()
        .base_url()
        .map(|b| b.trim_end_matches('/'))
        .filter(|b| !b.is_empty());
    match base_url.and_then(|base| resource.strip_prefix(base)) {
        Some(path) if path.is_empty() || path.starts_with('/') => Ok(path.to_string()),
        _ => Err(DispatchError::UnsupportedRequest(resource.to_string())),
    }
}
