//! Scoped service binding.
//!
//! A scoped service is one whose "current" instance depends on which request
//! is executing: the one owned by the application of the top context, or the
//! root application's when the stack is empty. Resolution only reads, so it
//! may be called any number of times without affecting dispatch state.

use std::sync::Arc;

use crate::application::Application;
use crate::config::Config;
use crate::context::ContextStack;
use crate::environment::Environment;
use crate::input::Input;
use crate::log::AppLog;
use crate::paths::{Language, ViewFinder};
use crate::router::Router;

/// A service resolvable for the currently executing request.
pub trait ScopedService: Send + Sync {
    /// Resolve the instance belonging to the top of `stack`, falling back to `root`.
    fn resolve_current(stack: &ContextStack, root: &Arc<Application>) -> Arc<Self>;
}

/// The application owning the innermost executing request.
pub fn current_application(stack: &ContextStack, root: &Arc<Application>) -> Arc<Application> {
    match stack.top() {
        Some(context) => context.application().clone(),
        None => root.clone(),
    }
}

impl ScopedService for Application {
    fn resolve_current(stack: &ContextStack, root: &Arc<Application>) -> Arc<Self> {
        current_application(stack, root)
    }
}

macro_rules! app_scoped {
    ($service:ty, $accessor:ident) => {
        impl ScopedService for $service {
            fn resolve_current(stack: &ContextStack, root: &Arc<Application>) -> Arc<Self> {
                current_application(stack, root).$accessor().clone()
            }
        }
    };
}

app_scoped!(Config, config);
app_scoped!(AppLog, log);
app_scoped!(dyn Router, router);
app_scoped!(Environment, environment);
app_scoped!(Language, language);
app_scoped!(ViewFinder, views);

/// Input comes from the request itself rather than its application.
impl ScopedService for Input {
    fn resolve_current(stack: &ContextStack, root: &Arc<Application>) -> Arc<Self> {
        match stack.top() {
            Some(context) => context.input().clone(),
            None => root.input().clone(),
        }
    }
}
