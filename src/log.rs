//! Per-application logger.

use std::fmt::Display;

/// Logger scoped to one application.
///
/// Events go through `tracing` with the application name attached as the
/// `app` field; installing a subscriber is left to the host.
#[derive(Debug, Clone)]
pub struct AppLog {
    app: String,
}

impl AppLog {
    /// Create a logger for the named application.
    pub fn new(app: impl Into<String>) -> Self {
        Self { app: app.into() }
    }

    /// Name of the owning application.
    pub fn app(&self) -> &str {
        &self.app
    }

    /// Log at debug level.
    pub fn debug(&self, message: impl Display) {
        tracing::debug!(app = %self.app, "{}", message);
    }

    /// Log at info level.
    pub fn info(&self, message: impl Display) {
        tracing::info!(app = %self.app, "{}", message);
    }

    /// Log at warn level.
    pub fn warn(&self, message: impl Display) {
        tracing::warn!(app = %self.app, "{}", message);
    }

    /// Log at error level.
    pub fn error(&self, message: impl Display) {
        tracing::error!(app = %self.app, "{}", message);
    }
}
