//! # hmvc-dispatch
//!
//! A dispatch engine for hierarchical applications, where a request handler
//! may itself issue nested requests into the same or another application.
//!
//! ## Overview
//!
//! Every dispatch runs on a [`DispatchChain`]. The chain keeps a stack of
//! [`RequestContext`]s, one per executing request, and the top of that stack
//! decides which application's services are "current":
//!
//! - **Scoped services**: [`DispatchChain::current`] resolves the config,
//!   log, router, environment, input, language and view finder of the
//!   innermost executing request
//! - **Route resolution**: translated paths are matched against the
//!   application's namespaces in registration order, taking the longest
//!   segment prefix that names a registered handler
//! - **Transient paths**: a resolved namespace path is added to the view,
//!   config and language search paths for the duration of the handler call
//! - **Balanced unwinding**: contexts and paths are restored by drop guards,
//!   so failures and cancellation leave the chain as they found it
//!
//! ## Lifecycle
//!
//! ```text
//! Created -> ContextPushed -> RouteResolved -> PathsExtended -> HandlerInvoked
//!         -> PathsRestored -> ContextPopped -> Done
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hmvc_dispatch::prelude::*;
//!
//! let app = Application::builder("main")
//!     .namespace(NamespaceEntry::new("", "/srv/app"))
//!     .with_handlers(|handlers| {
//!         handlers.register_handler("Controller\\Blog", Arc::new(Blog));
//!     })
//!     .build();
//!
//! let kernel = Kernel::new(app);
//! let request = kernel.dispatch("/blog/show/42").await?;
//! ```

mod application;
mod config;
mod context;
mod dispatch;
mod environment;
mod error;
mod handler;
mod input;
mod log;
mod namespace;
mod paths;
mod registry;
mod resolver;
mod route;
mod router;
mod scope;
pub mod events;

pub mod prelude;

// Re-export core types
pub use application::{Application, ApplicationBuilder};
pub use config::{Config, BASE_URL_KEY, DEFAULT_LANG_FALLBACK, LANG_FALLBACK_KEY};
pub use context::{ContextGuard, ContextStack, RequestContext};
pub use dispatch::{normalize_resource, DispatchChain, Kernel, Request};
pub use environment::{Environment, DEFAULT_ENVIRONMENT};
pub use error::{
    BoxError, DispatchError, DispatchResult, EnvironmentError, FrameworkError, HandlerError,
    HandlerResult, RegistryError, RegistryResult,
};
pub use events::{
    create_stream, DispatchEvent, DispatchState, EventSender, EventStream, DEFAULT_EVENT_BUFFER,
};
pub use handler::{
    handler_fn, DefaultErrorResponder, ErrorResponder, FnHandler, Handler, HandlerFactory,
    Response, SharedHandler,
};
pub use input::{Input, Method};
pub use log::AppLog;
pub use namespace::{NamespaceEntry, NamespaceRegistry};
pub use paths::{Language, PathAware, SearchPaths, TransientPaths, ViewFinder};
pub use registry::HandlerRegistry;
pub use resolver::{handler_identifier, title_case, RequestKind, RouteResolver};
pub use route::{Controller, Route, Translation};
pub use router::{PassthroughRouter, RouteMatch, Router, TableRouter};
pub use scope::{current_application, ScopedService};

// Re-export async-trait for convenience
pub use async_trait::async_trait;
