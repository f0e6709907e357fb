//! Dispatcher factories
//!
//! [`simple_dispatcher`] collects routes straight into an engine builder.
//! [`cached_dispatcher`] does the same once and persists the collected definitions as
//! JSON, so later builds replay the file and skip route collection entirely.

use std::fs;
use std::path::Path;
use std::time::Instant;

use http::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::core::{RouteCollector, RouteDefinition, RouteDefinitions};
use crate::error::RouteError;
use crate::route::RouteId;

const CACHE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct CacheDocument {
    version: u32,
    routes: Vec<CachedRoute>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedRoute {
    methods: Vec<String>,
    pattern: String,
    identifier: RouteId,
}

impl From<&RouteDefinition> for CachedRoute {
    fn from(def: &RouteDefinition) -> Self {
        Self {
            methods: def.methods.iter().map(|m| m.as_str().to_string()).collect(),
            pattern: def.pattern.clone(),
            identifier: def.identifier,
        }
    }
}

/// Collect routes through `define` into `builder`
pub fn simple_dispatcher<B, F>(mut builder: B, define: F) -> Result<B, RouteError>
where
    B: RouteCollector,
    F: FnOnce(&mut dyn RouteCollector) -> Result<(), RouteError>,
{
    let start = Instant::now();
    define(&mut builder)?;
    debug!(
        source = "collector",
        build_time_us = start.elapsed().as_micros() as u64,
        "Dispatcher build complete"
    );
    Ok(builder)
}

/// Fill `builder` from the cache file at `path`
///
/// When `path` exists its definitions are replayed into `builder` and `define` is
/// never called. Otherwise `define` collects the routes, they are replayed into
/// `builder` and the definitions are written to `path`.
pub fn cached_dispatcher<B, F>(mut builder: B, define: F, path: &Path) -> Result<B, RouteError>
where
    B: RouteCollector,
    F: FnOnce(&mut dyn RouteCollector) -> Result<(), RouteError>,
{
    let start = Instant::now();
    if path.exists() {
        let definitions = load_definitions(path)?;
        definitions.replay(&mut builder)?;
        debug!(
            source = "cache_file",
            build_time_us = start.elapsed().as_micros() as u64,
            "Dispatcher build complete"
        );
        return Ok(builder);
    }

    let mut definitions = RouteDefinitions::new();
    define(&mut definitions)?;
    definitions.replay(&mut builder)?;
    store_definitions(path, &definitions)?;
    debug!(
        source = "collector",
        build_time_us = start.elapsed().as_micros() as u64,
        "Dispatcher build complete"
    );
    Ok(builder)
}

fn load_definitions(path: &Path) -> Result<RouteDefinitions, RouteError> {
    let raw = fs::read_to_string(path).map_err(|e| RouteError::cache(path, e))?;
    let document: CacheDocument =
        serde_json::from_str(&raw).map_err(|e| RouteError::cache(path, e))?;

    if document.version != CACHE_VERSION {
        return Err(RouteError::cache(
            path,
            format!(
                "unsupported cache version {} (expected {})",
                document.version, CACHE_VERSION
            ),
        ));
    }

    let mut definitions = RouteDefinitions::new();
    for cached in document.routes {
        let methods = cached
            .methods
            .iter()
            .map(|m| Method::from_bytes(m.as_bytes()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RouteError::cache(path, e))?;
        definitions.add_route(&methods, &cached.pattern, cached.identifier)?;
    }

    info!(
        path = %path.display(),
        routes_count = definitions.len(),
        "Loaded route definitions from cache file"
    );
    Ok(definitions)
}

fn store_definitions(path: &Path, definitions: &RouteDefinitions) -> Result<(), RouteError> {
    let document = CacheDocument {
        version: CACHE_VERSION,
        routes: definitions.iter().map(CachedRoute::from).collect(),
    };
    let json = serde_json::to_string_pretty(&document).map_err(|e| RouteError::cache(path, e))?;

    if let Err(e) = fs::write(path, json) {
        warn!(path = %path.display(), error = %e, "Failed to write route cache file");
        return Err(RouteError::cache(path, e));
    }

    info!(
        path = %path.display(),
        routes_count = definitions.len(),
        "Wrote route cache file"
    );
    Ok(())
}
