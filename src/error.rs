//! Error types for the dispatch engine.

use thiserror::Error;

/// Boxed error type carried by unrecognized handler failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Root error type returned by [`DispatchChain::execute`](crate::DispatchChain::execute).
#[derive(Error, Debug)]
pub enum DispatchError {
    /// No handler could be resolved for the request, or it was not invocable
    #[error("Not found: {0}")]
    NotFound(String),

    /// A handler failed with an error the framework does not recognize.
    ///
    /// The original error is kept as the source and never converted into a response.
    #[error("Request failed: {0}")]
    Unrecognized(#[source] BoxError),

    /// The resource cannot be dispatched in-process
    #[error("Unsupported request: {0}")]
    UnsupportedRequest(String),

    /// Registry-related errors
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Environment-related errors
    #[error("Environment error: {0}")]
    Environment(#[from] EnvironmentError),
}

/// Well-formed, application-level failures raised by handlers.
///
/// These are turned into a response by the chain's
/// [`ErrorResponder`](crate::ErrorResponder) instead of aborting the dispatch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameworkError {
    /// The requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request was malformed
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The caller is not authenticated
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The caller may not access the resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The handler failed in a controlled way
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FrameworkError {
    /// Returns the status code this error maps to.
    pub fn status(&self) -> u16 {
        match self {
            FrameworkError::NotFound(_) => 404,
            FrameworkError::BadRequest(_) => 400,
            FrameworkError::Unauthorized(_) => 401,
            FrameworkError::Forbidden(_) => 403,
            FrameworkError::Internal(_) => 500,
        }
    }

    /// Returns the message carried by the error.
    pub fn message(&self) -> &str {
        match self {
            FrameworkError::NotFound(msg)
            | FrameworkError::BadRequest(msg)
            | FrameworkError::Unauthorized(msg)
            | FrameworkError::Forbidden(msg)
            | FrameworkError::Internal(msg) => msg,
        }
    }
}

/// Errors a [`Handler`](crate::Handler) may return.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// Recognized failure, converted into an error response
    #[error(transparent)]
    Framework(#[from] FrameworkError),

    /// Anything else, propagated to the caller unchanged
    #[error(transparent)]
    Other(BoxError),
}

impl HandlerError {
    /// Wraps an arbitrary error as an unrecognized failure.
    pub fn other<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        HandlerError::Other(Box::new(err))
    }
}

impl From<DispatchError> for HandlerError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::NotFound(msg) => HandlerError::Framework(FrameworkError::NotFound(msg)),
            DispatchError::Unrecognized(source) => HandlerError::Other(source),
            other => HandlerError::Other(Box::new(other)),
        }
    }
}

impl From<std::io::Error> for HandlerError {
    fn from(err: std::io::Error) -> Self {
        HandlerError::other(err)
    }
}

/// Errors that can occur while registering namespaces or handlers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Entry already registered under this key
    #[error("Already registered: {0}")]
    AlreadyRegistered(String),

    /// Invalid identifier or prefix
    #[error("Invalid name: {0}")]
    InvalidName(String),
}

/// Errors raised by the [`Environment`](crate::Environment) service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    /// No path registered under this name
    #[error("Unknown path requested: {0}")]
    UnknownPath(String),

    /// A path is already registered under this name
    #[error("A path is already registered for name: {0}")]
    PathExists(String),
}

/// Result type alias for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Result type alias for handler invocations.
pub type HandlerResult<T> = Result<T, HandlerError>;

/// Result type alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framework_error_status() {
        assert_eq!(FrameworkError::NotFound("x".into()).status(), 404);
        assert_eq!(FrameworkError::Forbidden("x".into()).status(), 403);
        assert_eq!(FrameworkError::Internal("boom".into()).message(), "boom");
    }

    #[test]
    fn test_nested_not_found_becomes_framework_error() {
        let err: HandlerError = DispatchError::NotFound("/missing".into()).into();
        assert!(matches!(
            err,
            HandlerError::Framework(FrameworkError::NotFound(ref msg)) if msg == "/missing"
        ));
    }

    #[test]
    fn test_unrecognized_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err: HandlerError = DispatchError::Unrecognized(Box::new(io)).into();
        match err {
            HandlerError::Other(source) => assert_eq!(source.to_string(), "disk on fire"),
            HandlerError::Framework(_) => panic!("expected unrecognized failure"),
        }
    }
}
