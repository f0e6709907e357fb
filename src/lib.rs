//! # routekit
//!
//! **routekit** is the route registration and dispatch layer of an HTTP router: nested
//! route groups with prefix concatenation, group middleware inherited by routes,
//! callback resolution, and a pluggable path-matching engine built lazily from the
//! whole route table.
//!
//! ## Overview
//!
//! A host application declares routes on a [`Router`], optionally inside groups, and
//! hands it requests. The router resolves each request to a route through a
//! [`Dispatcher`](dispatcher::Dispatcher) and drives the route's invocation: middleware
//! chain, callback resolution, handler call and response validation. Transport is out
//! of scope; [`Request`] and [`Response`] are plain values.
//!
//! ## Architecture
//!
//! - **[`router`]** - route table, group stack, lazy dispatcher
//! - **[`route`]** - [`Route`], [`RouteGroup`] and the handler invocation strategy
//! - **[`routable`]** - pattern and resolver accessors shared by routes and groups
//! - **[`resolver`]** - [`Callback`] references and their resolution
//! - **[`middleware`]** - middleware capability, ordered stack and stock middleware
//! - **[`dispatcher`]** - matching engine boundary, radix engine and cache file
//! - **[`message`]** - request and response values
//! - **[`manifest`]** - YAML route tables
//! - **[`config`]**, **[`logging`]** - environment configuration and tracing setup
//! - **[`cli`]** - the `routekit` binary
//!
//! ## Request flow
//!
//! ```text
//! Router::handle(request)
//!   └─ Router::dispatch ──► Dispatcher (built once from all routes)
//!        ├─ NotFound          → 404
//!        ├─ MethodNotAllowed  → 405 + allow
//!        └─ Found { id, args }
//!             └─ Route::prepare(args)
//!             └─ Route::process
//!                  ├─ finalize: inherit group middleware (first call)
//!                  └─ middleware.before ... Route::invoke ... middleware.after
//! ```
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use http::Method;
//! use routekit::middleware::Middleware;
//! use routekit::{Callback, Request, Response, Router};
//!
//! struct RequireTenant;
//!
//! impl Middleware for RequireTenant {
//!     fn before(&self, req: &Request) -> Option<Response> {
//!         match req.header("x-tenant") {
//!             Some(_) => None,
//!             None => Some(Response::error(400, "missing tenant")),
//!         }
//!     }
//! }
//!
//! # fn main() -> Result<(), routekit::RouteError> {
//! let mut router = Router::new();
//! let admin = router.group("/admin", Callback::group(|router, _group, _binding| {
//!     router.get("/stats/{day}", Callback::handler(|_req, res, args| {
//!         res.with_body(serde_json::json!({ "day": args.get("day") }))
//!     }))?;
//!     Ok(())
//! }))?;
//! admin.add_middleware(Arc::new(RequireTenant));
//!
//! let request = Request::new(Method::GET, "/admin/stats/monday");
//! let response = router.handle(&request, Response::default())?;
//! assert_eq!(response.status, 400);
//!
//! let request = request.with_header("x-tenant", "acme");
//! let response = router.handle(&request, Response::default())?;
//! assert_eq!(response.body, serde_json::json!({ "day": "monday" }));
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod message;
pub mod middleware;
pub mod resolver;
pub mod routable;
pub mod route;
pub mod router;

pub use dispatcher::{DispatchResult, Dispatcher, RadixDispatcher};
pub use error::RouteError;
pub use message::{Request, Response};
pub use resolver::{Callback, CallbackResolver, RegistryResolver};
pub use routable::Routable;
pub use route::{Route, RouteArguments, RouteGroup, RouteId};
pub use router::Router;
