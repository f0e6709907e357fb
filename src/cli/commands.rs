use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use http::Method;

use crate::dispatcher::DispatchResult;
use crate::manifest::load_manifest;
use crate::message::Request;
use crate::routable::Routable;

/// Command-line interface for routekit
#[derive(Parser, Debug)]
#[command(name = "routekit")]
#[command(about = "Inspect and dispatch route manifests", long_about = None)]
pub struct Cli {
    /// Override ROUTEKIT_LOG_LEVEL
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the route table built from a manifest
    Routes {
        /// Path to the route manifest (YAML)
        #[arg(short, long)]
        manifest: PathBuf,
    },
    /// Dispatch a method and path against a manifest
    Match {
        /// Path to the route manifest (YAML)
        #[arg(short, long)]
        manifest: PathBuf,

        /// HTTP method, case-insensitive
        #[arg(long, default_value = "GET")]
        method: String,

        /// Request path
        #[arg(short, long)]
        path: String,
    },
    /// Build the dispatcher and write its cache file
    WarmCache {
        /// Path to the route manifest (YAML)
        #[arg(short, long)]
        manifest: PathBuf,

        /// Cache file to write; overrides the manifest's cache_file
        #[arg(short, long, env = "ROUTEKIT_CACHE_FILE")]
        cache_file: PathBuf,

        /// Replace an existing cache file
        #[arg(short, long, default_value_t = false)]
        force: bool,
    },
}

/// Run `cli`, writing command output to `out`
pub fn run_cli(cli: &Cli, out: &mut dyn Write) -> Result<()> {
    match &cli.command {
        Commands::Routes { manifest } => {
            let router = load_manifest(manifest)?
                .build_router()
                .context("Failed to register manifest routes")?;
            writeln!(out, "[routes] count={}", router.routes().count())?;
            for line in router.dump_routes() {
                writeln!(out, "{}", line)?;
            }
            Ok(())
        }
        Commands::Match {
            manifest,
            method,
            path,
        } => {
            let method = Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
                .with_context(|| format!("Invalid HTTP method '{}'", method))?;
            let router = load_manifest(manifest)?
                .build_router()
                .context("Failed to register manifest routes")?;

            let result = router
                .dispatch(&Request::new(method, path))
                .context("Dispatch failed")?;
            match result {
                DispatchResult::Found {
                    identifier,
                    arguments,
                } => {
                    let route = router
                        .route_by_identifier(identifier)
                        .with_context(|| format!("Dispatcher returned unknown route #{}", identifier))?;
                    writeln!(
                        out,
                        "200 #{} {} -> {}",
                        identifier,
                        route.pattern(),
                        route.callback().describe()
                    )?;
                    let mut arguments: Vec<_> = arguments.into_iter().collect();
                    arguments.sort();
                    for (name, value) in arguments {
                        writeln!(out, "  {}={}", name, value)?;
                    }
                }
                DispatchResult::NotFound => writeln!(out, "404 Not Found")?,
                DispatchResult::MethodNotAllowed { allowed_methods } => {
                    let allow: Vec<&str> = allowed_methods.iter().map(Method::as_str).collect();
                    writeln!(out, "405 Method Not Allowed (allow: {})", allow.join(", "))?;
                }
            }
            Ok(())
        }
        Commands::WarmCache {
            manifest,
            cache_file,
            force,
        } => {
            let mut manifest = load_manifest(manifest)?;
            manifest.cache_file = Some(cache_file.clone());

            if cache_file.exists() {
                if !*force {
                    writeln!(out, "cache file {} already exists", cache_file.display())?;
                    return Ok(());
                }
                fs::remove_file(cache_file).with_context(|| {
                    format!("Failed to remove cache file {}", cache_file.display())
                })?;
            }

            let router = manifest
                .build_router()
                .context("Failed to register manifest routes")?;
            router
                .create_dispatcher()
                .context("Failed to build dispatcher")?;
            writeln!(
                out,
                "wrote {} routes to {}",
                router.routes().count(),
                cache_file.display()
            )?;
            Ok(())
        }
    }
}
