//! # Dispatcher Module
//!
//! The dispatcher is the path-matching engine behind [`Router::dispatch`](crate::router::Router::dispatch).
//! The router hands it every registered route once, through a [`RouteCollector`], and
//! afterwards only asks it to resolve `(method, path)` pairs.
//!
//! ## Contract
//!
//! - [`RouteCollector::add_route`] receives `(methods, pattern, identifier)` per route
//! - [`Dispatcher::dispatch`] answers with a [`DispatchResult`]: found (identifier and
//!   path arguments), not found, or method not allowed (with the allowed methods)
//!
//! A different engine is plugged in with
//! [`Router::set_dispatcher_factory`](crate::router::Router::set_dispatcher_factory): the
//! factory returns a [`DispatcherBuilder`] that receives every route and is then turned
//! into the [`Dispatcher`]. The factory is called again on every rebuild, and the cache
//! file replays its definitions into the same kind of builder. A ready-made
//! [`Dispatcher`] can also be installed directly with
//! [`Router::set_dispatcher`](crate::router::Router::set_dispatcher), bypassing route
//! collection.
//!
//! ## Default engine
//!
//! [`RadixDispatcher`] stores patterns in a segment tree:
//!
//! - static segments (`users`) match exactly and win over parameters
//! - `{id}` captures one segment
//! - `{id:\d+}` captures one segment that matches the regex
//! - empty segments are ignored, so `/users/` and `/users` are the same pattern
//! - `HEAD` requests fall back to `GET` routes
//!
//! ## Cache file
//!
//! [`cached_dispatcher`] persists the collected route definitions as JSON and, when
//! the file already exists, replays them into the builder without running the
//! registration callback. Delete the file to pick up route changes.

mod cache;
mod core;
mod radix;

pub use cache::{cached_dispatcher, simple_dispatcher};
pub use core::{
    DispatchResult, Dispatcher, DispatcherBuilder, DispatcherFactory, RouteCollector,
    RouteDefinition, RouteDefinitions,
};
pub use radix::RadixDispatcher;
