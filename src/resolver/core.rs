use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::RouteError;
use crate::message::{Request, Response};
use crate::route::{RouteArguments, RouteGroup};
use crate::router::Router;

/// Opaque context a resolver hands to the code it resolved (e.g. a container)
pub type Binding = Arc<dyn Any + Send + Sync>;

/// Invokable route handler: `(request, response, arguments) -> response`
pub type HandlerFn = Arc<dyn Fn(&Request, Response, &RouteArguments) -> Response + Send + Sync>;

/// Invokable group body: `(router, group, binding)`
///
/// The router is passed explicitly as the registration context, so the body can call
/// [`Router::map`] and [`Router::group`] for nested declarations.
pub type GroupFn =
    Arc<dyn Fn(&mut Router, &RouteGroup, Option<&Binding>) -> Result<(), RouteError> + Send + Sync>;

/// Callable reference held by routes and groups
#[derive(Clone)]
pub enum Callback {
    /// A route handler closure
    Handler(HandlerFn),
    /// A group body closure
    Group(GroupFn),
    /// A symbolic reference that a resolver must map to a closure
    Named(String),
}

impl Callback {
    /// Wrap a route handler closure
    pub fn handler<F>(f: F) -> Self
    where
        F: Fn(&Request, Response, &RouteArguments) -> Response + Send + Sync + 'static,
    {
        Callback::Handler(Arc::new(f))
    }

    /// Wrap a group body closure
    pub fn group<F>(f: F) -> Self
    where
        F: Fn(&mut Router, &RouteGroup, Option<&Binding>) -> Result<(), RouteError>
            + Send
            + Sync
            + 'static,
    {
        Callback::Group(Arc::new(f))
    }

    /// Symbolic reference such as `"UserController::show"`
    pub fn named(name: impl Into<String>) -> Self {
        Callback::Named(name.into())
    }

    /// Human-readable description used in errors and logs
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Callback::Handler(_) => "<route handler>".to_string(),
            Callback::Group(_) => "<group body>".to_string(),
            Callback::Named(name) => format!("'{}'", name),
        }
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callback::Handler(_) => f.write_str("Callback::Handler(..)"),
            Callback::Group(_) => f.write_str("Callback::Group(..)"),
            Callback::Named(name) => f.debug_tuple("Callback::Named").field(name).finish(),
        }
    }
}

impl From<&str> for Callback {
    fn from(name: &str) -> Self {
        Callback::Named(name.to_string())
    }
}

impl From<String> for Callback {
    fn from(name: String) -> Self {
        Callback::Named(name)
    }
}

impl From<HandlerFn> for Callback {
    fn from(f: HandlerFn) -> Self {
        Callback::Handler(f)
    }
}

impl From<GroupFn> for Callback {
    fn from(f: GroupFn) -> Self {
        Callback::Group(f)
    }
}

/// Strategy that maps an abstract [`Callback`] to an invokable one
pub trait CallbackResolver: Send + Sync {
    /// Resolve `callback`; the result should be `Handler` or `Group`
    fn resolve(&mut self, callback: &Callback) -> Result<Callback, RouteError>;

    /// Context exposed to resolved group bodies
    fn binding(&self) -> Option<Binding> {
        None
    }

    /// Independent copy with its own binding state
    fn clone_resolver(&self) -> Box<dyn CallbackResolver>;
}

/// Resolver that returns every callback unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

impl CallbackResolver for IdentityResolver {
    fn resolve(&mut self, callback: &Callback) -> Result<Callback, RouteError> {
        Ok(callback.clone())
    }

    fn clone_resolver(&self) -> Box<dyn CallbackResolver> {
        Box::new(*self)
    }
}

/// Resolver backed by a table of named callbacks
///
/// Closures pass through untouched; names are looked up in the table and fail with
/// [`RouteError::NotCallable`] when absent.
#[derive(Clone, Default)]
pub struct RegistryResolver {
    callbacks: HashMap<String, Callback>,
    binding: Option<Binding>,
}

impl RegistryResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` under `name`, replacing any previous entry
    pub fn register(&mut self, name: impl Into<String>, callback: Callback) -> &mut Self {
        let name = name.into();
        debug!(callback_name = %name, "Callback registered");
        self.callbacks.insert(name, callback);
        self
    }

    /// Set the binding handed to resolved group bodies
    #[must_use]
    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.binding = Some(binding);
        self
    }

    /// Whether a callback is registered under `name`
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.callbacks.contains_key(name)
    }

    /// Number of registered callbacks
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl CallbackResolver for RegistryResolver {
    fn resolve(&mut self, callback: &Callback) -> Result<Callback, RouteError> {
        match callback {
            Callback::Named(name) => match self.callbacks.get(name) {
                // a registered entry that is itself a name is not followed further
                Some(Callback::Named(_)) | None => Err(RouteError::not_callable(callback.describe())),
                Some(resolved) => Ok(resolved.clone()),
            },
            other => Ok(other.clone()),
        }
    }

    fn binding(&self) -> Option<Binding> {
        self.binding.as_ref().map(Arc::clone)
    }

    fn clone_resolver(&self) -> Box<dyn CallbackResolver> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_resolver_keeps_names() {
        let mut resolver = IdentityResolver;
        let resolved = resolver.resolve(&Callback::named("Home::index")).unwrap();
        assert!(matches!(resolved, Callback::Named(ref n) if n == "Home::index"));
        assert!(resolver.binding().is_none());
    }

    #[test]
    fn test_registry_resolves_registered_names() {
        let mut registry = RegistryResolver::new();
        registry.register("Home::index", Callback::handler(|_req, res, _args| res));
        assert!(registry.contains("Home::index"));

        let resolved = registry.resolve(&Callback::named("Home::index")).unwrap();
        assert!(matches!(resolved, Callback::Handler(_)));
    }

    #[test]
    fn test_registry_rejects_unknown_names() {
        let mut registry = RegistryResolver::new();
        let err = registry
            .resolve(&Callback::named("Missing::action"))
            .unwrap_err();
        assert!(matches!(err, RouteError::NotCallable { ref reference } if reference == "'Missing::action'"));
    }

    #[test]
    fn test_registry_binding_is_shared_by_clones() {
        let container: Binding = Arc::new(String::from("container"));
        let registry = RegistryResolver::new().with_binding(Arc::clone(&container));
        let copy = registry.clone_resolver();
        let binding = copy.binding().unwrap();
        assert_eq!(binding.downcast_ref::<String>().unwrap(), "container");
    }
}
