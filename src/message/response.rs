use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use super::{find_header, HeaderVec};

/// Response produced by route handlers and middleware
///
/// A response is considered valid when its status is a real HTTP status code
/// (see [`Response::is_valid`]); routes reject anything else.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    /// HTTP status code (200, 404, 500, etc.)
    pub status: u16,
    /// HTTP response headers
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    /// Response body as JSON
    pub body: Value,
}

impl Default for Response {
    fn default() -> Self {
        Self::new(200, HeaderVec::new(), Value::Null)
    }
}

impl Response {
    /// Create a new response with the given status, headers, and body
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create a JSON response with a content-type header
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create an error response
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    /// Replace the status, keeping headers and body
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Replace the body, keeping status and headers
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// Get a header by name
    #[inline]
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Add or update a header
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }

    /// Whether the status is a valid HTTP status code (100-999)
    #[must_use]
    pub fn is_valid(&self) -> bool {
        http::StatusCode::from_u16(self.status).is_ok()
    }
}
