use std::fmt;
use std::path::PathBuf;

use http::Method;

/// Errors raised while registering, dispatching or invoking routes
///
/// Lookup misses (unknown route name or identifier, empty group stack,
/// unmatched path) are not errors; they surface as `Option` or as
/// [`DispatchResult::NotFound`](crate::dispatcher::DispatchResult::NotFound).
#[derive(Debug)]
pub enum RouteError {
    /// The cache file directory is not writable, or the target exists and is
    /// not a regular file
    InvalidCacheTarget {
        /// The rejected path
        path: PathBuf,
        /// Why it was rejected
        reason: String,
    },
    /// A method name could not be parsed as an HTTP method
    InvalidMethod {
        /// The method string as supplied
        method: String,
    },
    /// The matching engine rejected a route pattern
    InvalidPattern {
        /// The rejected pattern
        pattern: String,
        /// Why it was rejected
        reason: String,
    },
    /// Two routes resolve to the same method and pattern
    DuplicateRoute {
        /// The method registered twice
        method: Method,
        /// The pattern registered twice
        pattern: String,
    },
    /// A route callback or group body did not resolve to something invokable
    NotCallable {
        /// Description of the callback reference that failed to resolve
        reference: String,
    },
    /// A route handler strategy produced a value that is not a valid response
    InvalidHandlerResult {
        /// The status code the handler returned
        status: u16,
    },
    /// Reading, writing or decoding the dispatcher cache file failed
    Cache {
        /// The cache file
        path: PathBuf,
        /// Underlying failure
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl RouteError {
    pub(crate) fn not_callable(reference: impl Into<String>) -> Self {
        RouteError::NotCallable {
            reference: reference.into(),
        }
    }

    pub(crate) fn cache(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        RouteError::Cache {
            path: path.into(),
            source: source.into(),
        }
    }
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::InvalidCacheTarget { path, reason } => {
                write!(f, "Invalid cache file {}: {}", path.display(), reason)
            }
            RouteError::InvalidMethod { method } => {
                write!(f, "Invalid HTTP method '{}'", method)
            }
            RouteError::InvalidPattern { pattern, reason } => {
                write!(f, "Invalid route pattern '{}': {}", pattern, reason)
            }
            RouteError::DuplicateRoute { method, pattern } => {
                write!(
                    f,
                    "Cannot register two routes matching '{}' for method '{}'",
                    pattern, method
                )
            }
            RouteError::NotCallable { reference } => {
                write!(f, "Callback {} is not callable", reference)
            }
            RouteError::InvalidHandlerResult { status } => {
                write!(
                    f,
                    "Route handler must return a valid response, got status {}",
                    status
                )
            }
            RouteError::Cache { path, source } => {
                write!(f, "Route cache file {} failed: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for RouteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RouteError::Cache { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
