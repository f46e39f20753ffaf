//! Prelude module for convenient imports.
//!
//! This module re-exports the types and traits needed to build applications,
//! write handlers and dispatch requests.
//!
//! # Example
//!
//! ```rust
//! use hmvc_dispatch::prelude::*;
//! ```

// Applications and services
pub use crate::application::{Application, ApplicationBuilder};
pub use crate::config::Config;
pub use crate::environment::Environment;
pub use crate::input::{Input, Method};
pub use crate::log::AppLog;
pub use crate::paths::{Language, PathAware, ViewFinder};

// Routing
pub use crate::namespace::{NamespaceEntry, NamespaceRegistry};
pub use crate::registry::HandlerRegistry;
pub use crate::resolver::RequestKind;
pub use crate::route::{Controller, Route, Translation};
pub use crate::router::{PassthroughRouter, RouteMatch, Router, TableRouter};

// Handlers
pub use crate::handler::{
    handler_fn, DefaultErrorResponder, ErrorResponder, Handler, HandlerFactory, Response,
    SharedHandler,
};

// Dispatch
pub use crate::context::ContextStack;
pub use crate::dispatch::{DispatchChain, Kernel, Request};
pub use crate::scope::ScopedService;

// Streams
pub use crate::events::{
    create_stream, DispatchEvent, DispatchState, EventSender, EventStream, DEFAULT_EVENT_BUFFER,
};

// Errors
pub use crate::error::{
    DispatchError, DispatchResult, FrameworkError, HandlerError, HandlerResult, RegistryError,
};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
