use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use http::Method;
use once_cell::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::config::RouterConfig;
use crate::dispatcher::{
    cached_dispatcher, simple_dispatcher, DispatchResult, Dispatcher, DispatcherBuilder,
    DispatcherFactory, RadixDispatcher, RouteCollector,
};
use crate::error::RouteError;
use crate::message::{Request, Response};
use crate::resolver::{Callback, CallbackResolver};
use crate::routable::Routable;
use crate::route::{Route, RouteGroup, RouteHandler, RouteId};

/// Matches slower than this are logged as warnings
const SLOW_MATCH_THRESHOLD: Duration = Duration::from_millis(1);

/// Methods registered by [`Router::any`]
const ANY_METHODS: [&str; 6] = ["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"];

/// Route table, group stack and lazily built dispatcher
///
/// # Stale dispatcher
///
/// The dispatcher is built once, on the first [`Router::dispatch`] or
/// [`Router::create_dispatcher`], from the route table as it is at that moment. It is
/// never rebuilt implicitly: routes mapped or removed afterwards are invisible to
/// dispatch (or dispatch to an identifier that no longer exists) until
/// [`Router::reset_dispatcher`] is called.
#[derive(Default)]
pub struct Router {
    routes: BTreeMap<RouteId, Route>,
    route_counter: RouteId,
    active_groups: Vec<Arc<RouteGroup>>,
    dispatcher: OnceCell<Arc<dyn Dispatcher>>,
    dispatcher_factory: Option<DispatcherFactory>,
    cache_file: Option<PathBuf>,
    resolver: Option<Arc<dyn CallbackResolver>>,
    route_handler: Option<Arc<dyn RouteHandler>>,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a router configured from `config`
    pub fn from_config(config: &RouterConfig) -> Result<Self, RouteError> {
        let mut router = Self::new();
        if let Some(path) = &config.cache_file {
            router.set_cache_file(path)?;
        }
        Ok(router)
    }

    // ------------------------------------------------------------------
    // Groups
    // ------------------------------------------------------------------

    /// Create a group and make it the innermost active group
    ///
    /// The router's callback resolver, if any, is installed on the group.
    pub fn push_group(&mut self, pattern: impl Into<String>, body: impl Into<Callback>) -> Arc<RouteGroup> {
        let mut group = RouteGroup::new(pattern, body.into());
        if let Some(resolver) = &self.resolver {
            group.set_callback_resolver(Arc::clone(resolver));
        }
        let group = Arc::new(group);
        self.active_groups.push(Arc::clone(&group));
        debug!(
            pattern = %group.pattern(),
            depth = self.active_groups.len(),
            "Route group pushed"
        );
        group
    }

    /// Remove the innermost active group; `None` when no group is active
    pub fn pop_group(&mut self) -> Option<Arc<RouteGroup>> {
        self.active_groups.pop()
    }

    /// Push a group, run its body, then pop it
    ///
    /// The group stack is restored to its depth before the push, even when the body
    /// fails or pushes groups it never pops.
    pub fn group(
        &mut self,
        pattern: impl Into<String>,
        body: impl Into<Callback>,
    ) -> Result<Arc<RouteGroup>, RouteError> {
        let depth = self.active_groups.len();
        let group = self.push_group(pattern, body);
        let result = group.invoke(self).map(|_| ());
        if self.active_groups.len() > depth + 1 {
            warn!(
                pattern = %group.pattern(),
                unbalanced = self.active_groups.len() - depth - 1,
                "Group body left groups pushed; dropping them"
            );
        }
        self.active_groups.truncate(depth);
        result?;
        Ok(group)
    }

    /// Groups currently active, outer to inner
    #[must_use]
    pub fn active_groups(&self) -> &[Arc<RouteGroup>] {
        &self.active_groups
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register a route for `methods` at `pattern`, prefixed by the active groups
    ///
    /// Method names are case-insensitive; a name that is not a valid HTTP method fails
    /// with [`RouteError::InvalidMethod`]. The route receives the next identifier, the
    /// router's callback resolver and the router's default route handler.
    pub fn map<M>(
        &mut self,
        methods: M,
        pattern: impl AsRef<str>,
        callback: impl Into<Callback>,
    ) -> Result<&mut Route, RouteError>
    where
        M: IntoIterator,
        M::Item: AsRef<str>,
    {
        let methods = parse_methods(methods)?;

        let mut full_pattern: String = self
            .active_groups
            .iter()
            .map(|group| group.pattern())
            .collect();
        full_pattern.push_str(pattern.as_ref());

        let identifier = self.route_counter;
        let mut route = Route::new(
            methods,
            full_pattern,
            callback.into(),
            self.active_groups.clone(),
            identifier,
        );
        if let Some(resolver) = &self.resolver {
            route.set_callback_resolver(Arc::clone(resolver));
        }
        if let Some(handler) = &self.route_handler {
            route.set_route_handler(Arc::clone(handler));
        }
        self.route_counter += 1;

        debug!(
            route_id = identifier,
            methods = ?route.methods(),
            pattern = %route.pattern(),
            callback = %route.callback().describe(),
            groups = route.groups().len(),
            "Route registered"
        );
        if self.dispatcher.get().is_some() {
            warn!(
                route_id = identifier,
                pattern = %route.pattern(),
                "Route registered after the dispatcher was built; it is not dispatchable until reset_dispatcher"
            );
        }

        Ok(self.routes.entry(identifier).or_insert(route))
    }

    pub fn get(&mut self, pattern: impl AsRef<str>, callback: impl Into<Callback>) -> Result<&mut Route, RouteError> {
        self.map(["GET"], pattern, callback)
    }

    pub fn post(&mut self, pattern: impl AsRef<str>, callback: impl Into<Callback>) -> Result<&mut Route, RouteError> {
        self.map(["POST"], pattern, callback)
    }

    pub fn put(&mut self, pattern: impl AsRef<str>, callback: impl Into<Callback>) -> Result<&mut Route, RouteError> {
        self.map(["PUT"], pattern, callback)
    }

    pub fn patch(&mut self, pattern: impl AsRef<str>, callback: impl Into<Callback>) -> Result<&mut Route, RouteError> {
        self.map(["PATCH"], pattern, callback)
    }

    pub fn delete(&mut self, pattern: impl AsRef<str>, callback: impl Into<Callback>) -> Result<&mut Route, RouteError> {
        self.map(["DELETE"], pattern, callback)
    }

    pub fn options(&mut self, pattern: impl AsRef<str>, callback: impl Into<Callback>) -> Result<&mut Route, RouteError> {
        self.map(["OPTIONS"], pattern, callback)
    }

    /// Register a route for GET, POST, PUT, PATCH, DELETE and OPTIONS
    pub fn any(&mut self, pattern: impl AsRef<str>, callback: impl Into<Callback>) -> Result<&mut Route, RouteError> {
        self.map(ANY_METHODS, pattern, callback)
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Routes in identifier order
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.values()
    }

    #[must_use]
    pub fn route_by_identifier(&self, identifier: RouteId) -> Option<&Route> {
        self.routes.get(&identifier)
    }

    pub fn route_by_identifier_mut(&mut self, identifier: RouteId) -> Option<&mut Route> {
        self.routes.get_mut(&identifier)
    }

    /// First route, in identifier order, named `name`
    #[must_use]
    pub fn route_by_name(&self, name: &str) -> Option<&Route> {
        self.routes.values().find(|route| route.name() == Some(name))
    }

    /// Remove the first route named `name`
    ///
    /// Identifiers are never reused and an already built dispatcher is left as is.
    pub fn remove_route_by_name(&mut self, name: &str) -> bool {
        let Some(identifier) = self.route_by_name(name).map(Route::identifier) else {
            return false;
        };
        self.routes.remove(&identifier);
        debug!(route_id = identifier, name = name, "Route removed");
        true
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Resolver installed on every group and route created from now on
    pub fn set_callback_resolver(&mut self, resolver: Arc<dyn CallbackResolver>) -> &mut Self {
        self.resolver = Some(resolver);
        self
    }

    #[must_use]
    pub fn callback_resolver(&self) -> Option<&Arc<dyn CallbackResolver>> {
        self.resolver.as_ref()
    }

    /// Handler strategy installed on every route mapped from now on
    pub fn set_route_handler(&mut self, handler: Arc<dyn RouteHandler>) -> &mut Self {
        self.route_handler = Some(handler);
        self
    }

    /// Persist the dispatcher's route definitions at `path`
    ///
    /// An empty path disables caching. Otherwise the parent directory must exist and be
    /// writable by this process, and an existing target must be a regular file. The
    /// stored path is the canonical parent directory joined with the file name.
    pub fn set_cache_file(&mut self, path: impl AsRef<Path>) -> Result<&mut Self, RouteError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            self.cache_file = None;
            return Ok(self);
        }

        let file_name = path
            .file_name()
            .ok_or_else(|| invalid_cache_target(path, "path has no file name"))?;
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let parent = fs::canonicalize(parent)
            .map_err(|e| invalid_cache_target(path, format!("cache directory: {}", e)))?;
        if !parent.is_dir() {
            return Err(invalid_cache_target(path, "cache directory is not a directory"));
        }
        let absolute = parent.join(file_name);

        if absolute.exists() && !absolute.is_file() {
            return Err(invalid_cache_target(&absolute, "cache file is not a regular file"));
        }
        // permission bits alone do not say whether this process may create files here
        tempfile::NamedTempFile::new_in(&parent).map_err(|e| {
            invalid_cache_target(&absolute, format!("cache directory is not writable: {}", e))
        })?;

        debug!(path = %absolute.display(), "Route cache file set");
        self.cache_file = Some(absolute);
        Ok(self)
    }

    #[must_use]
    pub fn cache_file(&self) -> Option<&Path> {
        self.cache_file.as_deref()
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Return the dispatcher, building it from the route table on first use
    ///
    /// Every route is submitted in identifier order. With a cache file set the
    /// definitions are loaded from or written to it.
    pub fn create_dispatcher(&self) -> Result<Arc<dyn Dispatcher>, RouteError> {
        self.dispatcher
            .get_or_try_init(|| self.build_dispatcher())
            .map(Arc::clone)
    }

    /// Matching engine used by every future dispatcher build
    ///
    /// Each build calls `factory` for a fresh builder, feeds it every route (or the
    /// cache file's definitions) and memoizes the resulting dispatcher. Without a
    /// factory the router builds a [`RadixDispatcher`]. An already built dispatcher is
    /// kept until [`Router::reset_dispatcher`].
    pub fn set_dispatcher_factory(&mut self, factory: DispatcherFactory) -> &mut Self {
        self.dispatcher_factory = Some(factory);
        self
    }

    /// Install a dispatcher, replacing any built one
    pub fn set_dispatcher(&mut self, dispatcher: Arc<dyn Dispatcher>) -> &mut Self {
        self.dispatcher = OnceCell::with_value(dispatcher);
        self
    }

    /// The current dispatcher without building one
    #[must_use]
    pub fn dispatcher(&self) -> Option<Arc<dyn Dispatcher>> {
        self.dispatcher.get().map(Arc::clone)
    }

    /// Drop the memoized dispatcher so the next dispatch rebuilds it
    pub fn reset_dispatcher(&mut self) -> Option<Arc<dyn Dispatcher>> {
        self.dispatcher.take()
    }

    /// Resolve a request's method and path to a route
    ///
    /// A path without a leading `/` is treated as if it had one. The matched route is
    /// neither prepared nor processed.
    pub fn dispatch(&self, request: &Request) -> Result<DispatchResult, RouteError> {
        let path: Cow<'_, str> = if request.path.starts_with('/') {
            Cow::Borrowed(request.path.as_str())
        } else {
            Cow::Owned(format!("/{}", request.path))
        };

        debug!(method = %request.method, path = %path, "Route match attempt");

        let dispatcher = self.create_dispatcher()?;
        let match_start = Instant::now();
        let result = dispatcher.dispatch(&request.method, &path);
        let match_duration = match_start.elapsed();

        match &result {
            DispatchResult::Found {
                identifier,
                arguments,
            } => {
                if match_duration > SLOW_MATCH_THRESHOLD {
                    warn!(
                        method = %request.method,
                        path = %path,
                        route_id = identifier,
                        path_params = ?arguments,
                        duration_us = match_duration.as_micros() as u64,
                        "Slow route matching detected"
                    );
                } else {
                    debug!(
                        method = %request.method,
                        path = %path,
                        route_id = identifier,
                        path_params = ?arguments,
                        duration_us = match_duration.as_micros() as u64,
                        "Route matched"
                    );
                }
            }
            DispatchResult::NotFound => {
                debug!(
                    method = %request.method,
                    path = %path,
                    duration_us = match_duration.as_micros() as u64,
                    "No route matched"
                );
            }
            DispatchResult::MethodNotAllowed { allowed_methods } => {
                debug!(
                    method = %request.method,
                    path = %path,
                    allowed = ?allowed_methods,
                    "Method not allowed"
                );
            }
        }

        Ok(result)
    }

    /// Dispatch `request` and run the matched route
    ///
    /// Unmatched paths produce a 404 response and unmatched methods a 405 response with
    /// an `allow` header. Errors raised while processing the route propagate.
    pub fn handle(&mut self, request: &Request, response: Response) -> Result<Response, RouteError> {
        match self.dispatch(request)? {
            DispatchResult::Found {
                identifier,
                arguments,
            } => {
                let Some(route) = self.routes.get_mut(&identifier) else {
                    warn!(
                        route_id = identifier,
                        "Dispatcher matched a removed route; reset the dispatcher after removing routes"
                    );
                    return Ok(Response::error(404, "Not Found"));
                };
                route.prepare(request, arguments);
                route.process(request, response)
            }
            DispatchResult::NotFound => Ok(Response::error(404, "Not Found")),
            DispatchResult::MethodNotAllowed { allowed_methods } => {
                let allow = allowed_methods
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                let mut res = Response::error(405, "Method Not Allowed");
                res.set_header("allow", allow);
                Ok(res)
            }
        }
    }

    /// One summary line per route, in identifier order
    #[must_use]
    pub fn dump_routes(&self) -> Vec<String> {
        self.routes
            .values()
            .map(|route| {
                let methods = route
                    .methods()
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join("|");
                let mut line = format!(
                    "[route] #{} {} {} -> {}",
                    route.identifier(),
                    methods,
                    route.pattern(),
                    route.callback().describe()
                );
                if let Some(name) = route.name() {
                    line.push_str(" (");
                    line.push_str(name);
                    line.push(')');
                }
                line
            })
            .collect()
    }

    fn build_dispatcher(&self) -> Result<Arc<dyn Dispatcher>, RouteError> {
        let routes = &self.routes;
        let define = |collector: &mut dyn RouteCollector| -> Result<(), RouteError> {
            for route in routes.values() {
                collector.add_route(route.methods(), route.pattern(), route.identifier())?;
            }
            Ok(())
        };

        let builder: Box<dyn DispatcherBuilder> = match &self.dispatcher_factory {
            Some(factory) => factory(),
            None => Box::new(RadixDispatcher::new()),
        };
        let builder = match &self.cache_file {
            Some(path) => cached_dispatcher(builder, define, path)?,
            None => simple_dispatcher(builder, define)?,
        };
        info!(
            routes_count = routes.len(),
            routing_algorithm = builder.engine(),
            cached = self.cache_file.is_some(),
            "Router dispatcher ready"
        );

        Ok(builder.into_dispatcher())
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes.len())
            .field("route_counter", &self.route_counter)
            .field("active_groups", &self.active_groups.len())
            .field("dispatcher_built", &self.dispatcher.get().is_some())
            .field("custom_engine", &self.dispatcher_factory.is_some())
            .field("cache_file", &self.cache_file)
            .finish()
    }
}

fn parse_methods<M>(methods: M) -> Result<Vec<Method>, RouteError>
where
    M: IntoIterator,
    M::Item: AsRef<str>,
{
    let mut parsed: Vec<Method> = Vec::new();
    for raw in methods {
        let raw = raw.as_ref();
        let upper = raw.trim().to_ascii_uppercase();
        let method = Method::from_bytes(upper.as_bytes()).map_err(|_| RouteError::InvalidMethod {
            method: raw.to_string(),
        })?;
        if !parsed.contains(&method) {
            parsed.push(method);
        }
    }
    Ok(parsed)
}

fn invalid_cache_target(path: &Path, reason: impl Into<String>) -> RouteError {
    RouteError::InvalidCacheTarget {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}
