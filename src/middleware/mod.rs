//! # Middleware Module
//!
//! Middleware wraps route invocation. Routes and groups each own a
//! [`MiddlewareStack`]; when a route is finalized its groups' middleware is appended to
//! the route's own stack, and [`Route::process`](crate::route::Route::process) runs the
//! stack around the route's handler.
//!
//! ## Ordering
//!
//! The most recently added middleware is the outermost:
//!
//! ```text
//! add(A); add(B); add(C)
//!
//! C.before -> B.before -> A.before -> handler -> A.after -> B.after -> C.after
//! ```
//!
//! Because finalize appends group middleware after the route's own middleware, group
//! middleware always runs outside middleware added directly on the route.
//!
//! ## Stock middleware
//!
//! - [`MetricsMiddleware`] - request counts and latency
//! - [`TracingMiddleware`] - structured request logging

mod core;
mod metrics;
mod stack;
mod tracing;

pub use core::Middleware;
pub use metrics::MetricsMiddleware;
pub use stack::MiddlewareStack;
pub use tracing::TracingMiddleware;
