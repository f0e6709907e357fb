//! # CLI Module
//!
//! Command-line access to a route manifest (see [`crate::manifest`]).
//!
//! ## Commands
//!
//! ### `routes`
//!
//! Print the route table a manifest produces:
//!
//! ```bash
//! routekit routes --manifest routes.yaml
//! ```
//!
//! ### `match`
//!
//! Dispatch a method and path against the manifest's routes:
//!
//! ```bash
//! routekit match --manifest routes.yaml --method GET --path /api/users/42
//! ```
//!
//! ### `warm-cache`
//!
//! Build the dispatcher once so its cache file exists before the first request:
//!
//! ```bash
//! routekit warm-cache --manifest routes.yaml --cache-file /var/cache/app/routes.json
//! ```
//!
//! Logging is configured through the `ROUTEKIT_LOG_*` environment variables and goes to
//! stderr; command output goes to stdout.

mod commands;


pub use commands::{run_cli, Cli, Commands};
