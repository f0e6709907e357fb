//! # Route Manifest
//!
//! A YAML description of a route table. Applying a manifest registers its routes and
//! groups on a [`Router`] through the regular registration API, so group prefixes,
//! identifiers and nesting follow the same rules as hand-written registrations.
//!
//! ```yaml
//! cache_file: /var/cache/app/routes.json
//! routes:
//!   - methods: [GET]
//!     pattern: /health
//!     handler: HealthController::check
//! groups:
//!   - pattern: /api
//!     routes:
//!       - methods: [GET, HEAD]
//!         pattern: /users/{id:\d+}
//!         handler: UserController::show
//!         name: users.show
//!     groups:
//!       - pattern: /admin
//!         routes:
//!           - pattern: /stats
//!             handler: AdminController::stats
//! ```
//!
//! Handlers are stored as named callbacks; a resolver installed on the router maps
//! them to closures when the routes are invoked.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::RouteError;
use crate::resolver::Callback;
use crate::router::Router;

/// Top-level manifest document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteManifest {
    /// Dispatcher cache file
    #[serde(default)]
    pub cache_file: Option<PathBuf>,
    /// Routes outside any group
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
    /// Top-level groups
    #[serde(default)]
    pub groups: Vec<GroupEntry>,
}

/// One route declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteEntry {
    /// HTTP methods, `[GET]` when omitted
    #[serde(default = "default_methods")]
    pub methods: Vec<String>,
    pub pattern: String,
    /// Callback name, e.g. `UserController::show`
    pub handler: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Static route arguments
    #[serde(default)]
    pub arguments: BTreeMap<String, String>,
}

/// One group declaration with its nested routes and groups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupEntry {
    pub pattern: String,
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
    #[serde(default)]
    pub groups: Vec<GroupEntry>,
}

fn default_methods() -> Vec<String> {
    vec!["GET".to_string()]
}

impl RouteManifest {
    /// Parse a manifest from YAML text
    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse route manifest")
    }

    /// Number of routes declared, groups included
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len() + self.groups.iter().map(GroupEntry::route_count).sum::<usize>()
    }

    /// Register the manifest's routes and groups on `router`
    ///
    /// Top-level routes are registered first, then each group in order. A `cache_file`
    /// entry is applied with [`Router::set_cache_file`].
    pub fn apply(&self, router: &mut Router) -> Result<(), RouteError> {
        if let Some(path) = &self.cache_file {
            router.set_cache_file(path)?;
        }
        for route in &self.routes {
            route.register(router)?;
        }
        for group in &self.groups {
            group.register(router)?;
        }
        Ok(())
    }

    /// Build a fresh router from the manifest
    pub fn build_router(&self) -> Result<Router, RouteError> {
        let mut router = Router::new();
        self.apply(&mut router)?;
        info!(
            routes_count = router.routes().count(),
            groups_count = self.groups.len(),
            "Route manifest applied"
        );
        Ok(router)
    }
}

impl RouteEntry {
    fn register(&self, router: &mut Router) -> Result<(), RouteError> {
        let route = router.map(&self.methods, &self.pattern, Callback::named(&self.handler))?;
        if let Some(name) = &self.name {
            route.set_name(name);
        }
        for (key, value) in &self.arguments {
            route.set_argument(key, value);
        }
        Ok(())
    }
}

impl GroupEntry {
    fn route_count(&self) -> usize {
        self.routes.len() + self.groups.iter().map(GroupEntry::route_count).sum::<usize>()
    }

    fn register(&self, router: &mut Router) -> Result<(), RouteError> {
        let entry = self.clone();
        router.group(
            self.pattern.clone(),
            Callback::group(move |router, _group, _binding| {
                for route in &entry.routes {
                    route.register(router)?;
                }
                for group in &entry.groups {
                    group.register(router)?;
                }
                Ok(())
            }),
        )?;
        Ok(())
    }
}

/// Read and parse the manifest at `path`
pub fn load_manifest(path: &Path) -> anyhow::Result<RouteManifest> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read route manifest {}", path.display()))?;
    let manifest = RouteManifest::from_yaml(&content)
        .with_context(|| format!("Invalid route manifest {}", path.display()))?;
    info!(
        path = %path.display(),
        routes_count = manifest.route_count(),
        "Loaded route manifest"
    );
    Ok(manifest)
}
