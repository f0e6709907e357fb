//! # Resolver Module
//!
//! Routes and groups hold an abstract [`Callback`]: either a closure or a name such as
//! `"UserController::show"`. Before a callback is invoked it is passed through a
//! [`CallbackResolver`], which maps it to something invokable and may expose a
//! [`Binding`] (for example a service container) to the code it resolved.
//!
//! ## Resolvers
//!
//! - [`IdentityResolver`] returns callbacks unchanged, so closures work without setup
//! - [`RegistryResolver`] maps callback names to registered closures and carries a
//!   shared binding
//!
//! ## Cloning
//!
//! Resolution goes through [`CallbackResolver::clone_resolver`]: every invocation works on
//! an independent copy so binding state recorded while resolving one invocation never
//! leaks into the next.
//!
//! ## Example
//!
//! ```rust
//! use routekit::resolver::{Callback, RegistryResolver};
//! use routekit::Router;
//! use std::sync::Arc;
//!
//! let mut registry = RegistryResolver::new();
//! registry.register(
//!     "PingController::ping",
//!     Callback::handler(|_req, res, _args| res.with_body(serde_json::json!("pong"))),
//! );
//!
//! let mut router = Router::new();
//! router.set_callback_resolver(Arc::new(registry));
//! router.get("/ping", "PingController::ping").unwrap();
//! ```

mod core;

pub use core::{
    Binding, Callback, CallbackResolver, GroupFn, HandlerFn, IdentityResolver, RegistryResolver,
};
