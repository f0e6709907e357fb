use std::time::Duration;

use tracing::{debug, info};

use super::Middleware;
use crate::message::{Request, Response};

/// Logs each request on entry and its status and latency on exit
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn before(&self, req: &Request) -> Option<Response> {
        debug!(method = %req.method, path = %req.path, "Request start");
        None
    }

    fn after(&self, req: &Request, res: &mut Response, latency: Duration) {
        info!(
            method = %req.method,
            path = %req.path,
            status = res.status,
            latency_us = latency.as_micros() as u64,
            "Request complete"
        );
    }
}
