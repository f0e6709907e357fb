use std::fmt;
use std::sync::Arc;

use http::Method;
use tracing::debug;

use super::{DefaultRouteHandler, RouteArguments, RouteGroup, RouteHandler, RouteId};
use crate::error::RouteError;
use crate::message::{Request, Response};
use crate::middleware::{Middleware, MiddlewareStack};
use crate::resolver::Callback;
use crate::routable::{Routable, RoutableBase};

/// A method set and pattern bound to a callback
///
/// Routes are created by [`Router::map`](crate::router::Router::map), which prefixes the
/// pattern with the active group patterns and assigns the identifier.
pub struct Route {
    base: RoutableBase,
    methods: Vec<Method>,
    callback: Callback,
    /// Enclosing groups, outer to inner
    groups: Vec<Arc<RouteGroup>>,
    identifier: RouteId,
    name: Option<String>,
    arguments: RouteArguments,
    handler: Arc<dyn RouteHandler>,
    middleware: MiddlewareStack,
    finalized: bool,
}

impl Route {
    /// Create a route
    ///
    /// Methods are stored as given; [`Router::map`](crate::router::Router::map) is
    /// responsible for normalising them.
    pub fn new(
        methods: Vec<Method>,
        pattern: impl Into<String>,
        callback: Callback,
        groups: Vec<Arc<RouteGroup>>,
        identifier: RouteId,
    ) -> Self {
        Self {
            base: RoutableBase::new(pattern),
            methods,
            callback,
            groups,
            identifier,
            name: None,
            arguments: RouteArguments::new(),
            handler: Arc::new(DefaultRouteHandler),
            middleware: MiddlewareStack::new(),
            finalized: false,
        }
    }

    #[must_use]
    pub fn identifier(&self) -> RouteId {
        self.identifier
    }

    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    #[must_use]
    pub fn callback(&self) -> &Callback {
        &self.callback
    }

    /// Groups that were active when the route was registered, outer to inner
    #[must_use]
    pub fn groups(&self) -> &[Arc<RouteGroup>] {
        &self.groups
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    /// Replace the handler invocation strategy
    pub fn set_route_handler(&mut self, handler: Arc<dyn RouteHandler>) -> &mut Self {
        self.handler = handler;
        self
    }

    pub fn set_argument(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn argument(&self, name: &str) -> Option<&str> {
        self.arguments.get(name).map(String::as_str)
    }

    /// Argument `name`, or `default` when it is not set
    #[must_use]
    pub fn argument_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.argument(name).unwrap_or(default)
    }

    pub fn set_arguments(&mut self, arguments: RouteArguments) -> &mut Self {
        self.arguments = arguments;
        self
    }

    #[must_use]
    pub fn arguments(&self) -> &RouteArguments {
        &self.arguments
    }

    /// Add middleware directly on this route
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) -> &mut Self {
        self.middleware.add(mw);
        self
    }

    #[must_use]
    pub fn middleware(&self) -> &MiddlewareStack {
        &self.middleware
    }

    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Bind the path arguments produced by a dispatch match
    ///
    /// Existing arguments with other names are kept.
    pub fn prepare(&mut self, _request: &Request, arguments: RouteArguments) {
        for (name, value) in arguments {
            self.set_argument(name, value);
        }
    }

    /// Merge the enclosing groups' middleware into this route's stack
    ///
    /// Groups are walked outer to inner and each group's middleware in insertion order.
    /// Only the first call has an effect.
    pub fn finalize(&mut self) -> &mut Self {
        if self.finalized {
            return self;
        }

        for group in &self.groups {
            for mw in group.middleware() {
                self.middleware.add(mw);
            }
        }

        debug!(
            route_id = self.identifier,
            pattern = %self.pattern(),
            middleware_count = self.middleware.len(),
            "Route finalized"
        );

        self.finalized = true;
        self
    }

    /// Finalize, then run the middleware chain with [`Route::invoke`] innermost
    pub fn process(&mut self, request: &Request, response: Response) -> Result<Response, RouteError> {
        self.finalize();
        let route: &Route = self;
        route
            .middleware
            .call(request, response, |req, res| route.invoke(req, res))
    }

    /// Resolve the callback and run it through the route handler strategy
    ///
    /// Fails with [`RouteError::NotCallable`] when the callback does not resolve to a
    /// route handler and with [`RouteError::InvalidHandlerResult`] when the handler
    /// returns a response with an invalid status.
    pub fn invoke(&self, request: &Request, response: Response) -> Result<Response, RouteError> {
        let resolved = match self.callback_resolver() {
            Some(resolver) => resolver.clone_resolver().resolve(&self.callback)?,
            None => self.callback.clone(),
        };

        let callable = match resolved {
            Callback::Handler(callable) => callable,
            Callback::Group(_) | Callback::Named(_) => {
                return Err(RouteError::not_callable(self.callback.describe()));
            }
        };

        let response = self
            .handler
            .invoke(&callable, request, response, &self.arguments);

        if !response.is_valid() {
            return Err(RouteError::InvalidHandlerResult {
                status: response.status,
            });
        }

        Ok(response)
    }
}

impl Routable for Route {
    fn routable(&self) -> &RoutableBase {
        &self.base
    }

    fn routable_mut(&mut self) -> &mut RoutableBase {
        &mut self.base
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("identifier", &self.identifier)
            .field("methods", &self.methods)
            .field("pattern", &self.pattern())
            .field("name", &self.name)
            .field("callback", &self.callback)
            .field("groups", &self.groups.len())
            .field("arguments", &self.arguments)
            .field("finalized", &self.finalized)
            .finish()
    }
}
