use std::time::Duration;

use crate::message::{Request, Response};

/// Hook pair run around route invocation
///
/// Returning `Some` from [`before`](Middleware::before) short-circuits everything
/// inside this middleware, including the route handler.
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &Request) -> Option<Response> {
        None
    }
    fn after(&self, _req: &Request, _res: &mut Response, _latency: Duration) {}
}
