//! # Router Configuration Module
//!
//! Environment variable based configuration for [`Router`](crate::router::Router).
//!
//! ## Environment Variables
//!
//! ### `ROUTEKIT_CACHE_FILE`
//!
//! Path of the dispatcher cache file. When set, the first dispatch persists the route
//! definitions there and later processes load them instead of collecting routes.
//! Empty or unset disables caching.
//!
//! ## Usage
//!
//! ```rust
//! use routekit::config::RouterConfig;
//! use routekit::Router;
//!
//! let config = RouterConfig::from_env();
//! let router = Router::from_config(&config).expect("valid cache file");
//! # let _ = router;
//! ```

use std::env;
use std::path::PathBuf;

/// Router configuration loaded from environment variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouterConfig {
    /// Dispatcher cache file, `None` for in-memory dispatch
    pub cache_file: Option<PathBuf>,
}

impl RouterConfig {
    /// Load configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let cache_file = lookup("ROUTEKIT_CACHE_FILE")
            .map(|val| val.trim().to_string())
            .filter(|val| !val.is_empty())
            .map(PathBuf::from);
        RouterConfig { cache_file }
    }

    /// Replace the cache file; an empty path disables caching
    #[must_use]
    pub fn with_cache_file(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.cache_file = (!path.as_os_str().is_empty()).then_some(path);
        self
    }
}
