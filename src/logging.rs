//! Structured logging bootstrap
//!
//! Installs a `tracing-subscriber` registry with an [`EnvFilter`] and a JSON or pretty
//! fmt layer writing to stderr. Configuration comes from environment variables:
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `ROUTEKIT_LOG_LEVEL` | `info` | trace/debug/info/warn/error |
//! | `ROUTEKIT_LOG_FORMAT` | `json` | json/pretty |
//! | `ROUTEKIT_LOG_TARGET_FILTER` | unset | extra comma-separated filter directives |
//! | `ROUTEKIT_LOG_INCLUDE_LOCATION` | `false` | include file and line |
//!
//! `RUST_LOG`, when set, takes precedence over `ROUTEKIT_LOG_LEVEL`.

use anyhow::{Context, Result};
use std::env;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for production, pretty-print for development
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level: trace/debug/info/warn/error
    pub log_level: String,
    /// Log format: json/pretty
    pub format: LogFormat,
    /// Extra filter directives (comma-separated, e.g. `routekit::router=debug`)
    pub target_filter: Option<String>,
    /// Include file:line location
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Json,
            target_filter: None,
            include_location: false,
        }
    }
}

impl LogConfig {
    /// Parse configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_level: env::var("ROUTEKIT_LOG_LEVEL").unwrap_or(defaults.log_level),
            format: env::var("ROUTEKIT_LOG_FORMAT")
                .map(|s| LogFormat::parse(&s))
                .unwrap_or(defaults.format),
            target_filter: env::var("ROUTEKIT_LOG_TARGET_FILTER")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            include_location: env::var("ROUTEKIT_LOG_INCLUDE_LOCATION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.include_location),
        }
    }

    /// Development preset: debug level, pretty output with locations
    #[must_use]
    pub fn default_dev() -> Self {
        Self {
            log_level: "debug".to_string(),
            format: LogFormat::Pretty,
            target_filter: None,
            include_location: true,
        }
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    /// Build the filter: `RUST_LOG` if set, else the level, plus target directives
    pub fn env_filter(&self) -> Result<EnvFilter> {
        let mut env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level().as_str()));

        if let Some(target_filter) = &self.target_filter {
            for filter in target_filter.split(',').map(str::trim) {
                if filter.is_empty() {
                    continue;
                }
                let directive = filter
                    .parse()
                    .with_context(|| format!("Invalid log filter directive: {}", filter))?;
                env_filter = env_filter.add_directive(directive);
            }
        }

        Ok(env_filter)
    }
}

/// Initialize logging from `ROUTEKIT_LOG_*` environment variables
pub fn init_logging() -> Result<()> {
    init_logging_with_config(&LogConfig::from_env())
}

/// Initialize logging with an explicit configuration
///
/// Fails if the filter directives are invalid or a global subscriber is already set.
///
/// ```no_run
/// use routekit::logging::{init_logging_with_config, LogConfig};
///
/// init_logging_with_config(&LogConfig::default_dev()).expect("logging");
/// ```
pub fn init_logging_with_config(config: &LogConfig) -> Result<()> {
    let env_filter = config.env_filter()?;

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}
