//! # Router Module
//!
//! The [`Router`] owns the route table, the stack of active route groups and the
//! dispatcher built from them.
//!
//! ## Overview
//!
//! Registration and dispatch are two separate phases:
//!
//! 1. **Registration**: [`Router::map`] (and the `get`/`post`/... shorthands) add routes.
//!    While groups are active (see [`Router::group`]), their patterns are concatenated
//!    in front of the route pattern and the groups are recorded on the route, so their
//!    middleware is inherited when the route is finalized.
//!
//! 2. **Dispatch**: the first [`Router::dispatch`] builds the dispatcher from the
//!    whole route table and memoizes it. Routes registered or removed afterwards are
//!    not seen until [`Router::reset_dispatcher`] is called.
//!
//! ## Example
//!
//! ```rust
//! use http::Method;
//! use routekit::{Callback, DispatchResult, Request, Router};
//!
//! # fn main() -> Result<(), routekit::RouteError> {
//! let mut router = Router::new();
//! router.group("/api", Callback::group(|router, _group, _binding| {
//!     router.get("/users/{id}", "UserController::show")?.set_name("user.show");
//!     Ok(())
//! }))?;
//!
//! let result = router.dispatch(&Request::new(Method::GET, "/api/users/42"))?;
//! assert!(matches!(result, DispatchResult::Found { identifier: 0, .. }));
//! # Ok(())
//! # }
//! ```

mod core;
#[cfg(test)]
mod tests;

pub use core::Router;
