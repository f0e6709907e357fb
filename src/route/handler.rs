use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::error;

use super::RouteArguments;
use crate::message::{Request, Response};
use crate::resolver::HandlerFn;

/// Strategy that calls a resolved route handler
pub trait RouteHandler: Send + Sync {
    fn invoke(
        &self,
        callable: &HandlerFn,
        request: &Request,
        response: Response,
        arguments: &RouteArguments,
    ) -> Response;
}

/// Calls the handler with the request, response and route arguments
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRouteHandler;

impl RouteHandler for DefaultRouteHandler {
    fn invoke(
        &self,
        callable: &HandlerFn,
        request: &Request,
        response: Response,
        arguments: &RouteArguments,
    ) -> Response {
        callable(request, response, arguments)
    }
}

/// Like [`DefaultRouteHandler`], but a panicking handler yields a 500 response
///
/// Has no effect in builds with `panic = "abort"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecoveringRouteHandler;

impl RouteHandler for RecoveringRouteHandler {
    fn invoke(
        &self,
        callable: &HandlerFn,
        request: &Request,
        response: Response,
        arguments: &RouteArguments,
    ) -> Response {
        match catch_unwind(AssertUnwindSafe(|| callable(request, response, arguments))) {
            Ok(response) => response,
            Err(panic) => {
                let panic_message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!(
                    method = %request.method,
                    path = %request.path,
                    panic_message = %panic_message,
                    "Route handler panicked"
                );
                Response::error(500, &format!("Handler panicked: {}", panic_message))
            }
        }
    }
}
