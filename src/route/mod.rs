//! # Route Module
//!
//! A [`Route`] binds a method set and a pattern to a [`Callback`](crate::resolver::Callback).
//! A [`RouteGroup`] is a pattern prefix with a deferred body that declares nested routes.
//!
//! ## Lifecycle
//!
//! ```text
//! Router::map ──► Route (finalized = false)
//!                   │ prepare(request, path arguments)
//!                   │ process(request, response)
//!                   │   ├─ finalize (first call only): append group middleware,
//!                   │   │  groups outer → inner
//!                   │   └─ middleware chain ──► invoke
//!                   │                            ├─ resolve callback
//!                   │                            ├─ RouteHandler::invoke
//!                   │                            └─ validate response
//!                   ▼
//!                 Route (finalized = true)
//! ```
//!
//! Groups are shared by `Arc`: every route registered while a group was active holds
//! the same group, so middleware added to the group later is still inherited when the
//! route is finalized.

mod core;
mod group;
mod handler;

pub use core::Route;
pub use group::RouteGroup;
pub use handler::{DefaultRouteHandler, RecoveringRouteHandler, RouteHandler};

use std::collections::HashMap;

/// Stable route identifier assigned by the router
pub type RouteId = usize;

/// Named route arguments, usually the path parameters of the match
pub type RouteArguments = HashMap<String, String>;
