use http::Method;
use serde_json::Value;
use std::sync::Arc;

use super::{find_header, HeaderVec};

/// Incoming request as seen by the router
///
/// Only `method` and `path` take part in dispatch; headers and body are carried
/// for middleware and handlers.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method (GET, POST, etc.)
    pub method: Method,
    /// Request path without the query string
    pub path: String,
    /// Raw query string (without the leading `?`), if any
    pub query: Option<String>,
    /// HTTP headers
    pub headers: HeaderVec,
    /// Request body parsed as JSON (if present)
    pub body: Option<Value>,
}

impl Request {
    /// Create a request for `method` and `target`
    ///
    /// `target` may carry a query string; it is split off into [`Request::query`].
    #[must_use]
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (target.to_string(), None),
        };
        Self {
            method,
            path,
            query,
            headers: HeaderVec::new(),
            body: None,
        }
    }

    /// Build a request from an `http::Request`, keeping UTF-8 headers only
    #[must_use]
    pub fn from_http<T>(req: &http::Request<T>) -> Self {
        let mut request = Self::new(req.method().clone(), req.uri().path());
        request.query = req.uri().query().map(str::to_string);
        for (name, value) in req.headers() {
            if let Ok(value) = value.to_str() {
                request
                    .headers
                    .push((Arc::from(name.as_str()), value.to_string()));
            }
        }
        request
    }

    /// Add a header, keeping any existing value with the same name
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((Arc::from(name), value.into()));
        self
    }

    /// Attach a JSON body
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}
