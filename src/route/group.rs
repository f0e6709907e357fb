use std::fmt;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::error::RouteError;
use crate::middleware::{Middleware, MiddlewareStack};
use crate::resolver::Callback;
use crate::routable::{Routable, RoutableBase};
use crate::router::Router;

/// A pattern prefix with a deferred body that declares nested routes
///
/// Groups are created by [`Router::push_group`] and shared by every route registered
/// while they are active. Middleware added to a group is inherited by those routes when
/// they are finalized.
pub struct RouteGroup {
    base: RoutableBase,
    body: Callback,
    middleware: RwLock<MiddlewareStack>,
}

impl RouteGroup {
    pub fn new(pattern: impl Into<String>, body: Callback) -> Self {
        Self {
            base: RoutableBase::new(pattern),
            body,
            middleware: RwLock::new(MiddlewareStack::new()),
        }
    }

    #[must_use]
    pub fn body(&self) -> &Callback {
        &self.body
    }

    /// Add middleware inherited by every route of this group
    pub fn add_middleware(&self, mw: Arc<dyn Middleware>) -> &Self {
        self.middleware
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .add(mw);
        self
    }

    /// Snapshot of this group's middleware in insertion order
    #[must_use]
    pub fn middleware(&self) -> Vec<Arc<dyn Middleware>> {
        self.middleware
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(Arc::clone)
            .collect()
    }

    /// Run the group body with `router` as its registration context
    ///
    /// With a resolver set, the body is resolved through an independent copy of it and
    /// the copy's binding is passed to the body. The body must resolve to a group body,
    /// otherwise [`RouteError::NotCallable`] is returned. Errors from the body propagate.
    pub fn invoke(&self, router: &mut Router) -> Result<&Self, RouteError> {
        let (body, binding) = match self.callback_resolver() {
            Some(resolver) => {
                let mut resolver = resolver.clone_resolver();
                let body = resolver.resolve(&self.body)?;
                (body, resolver.binding())
            }
            None => (self.body.clone(), None),
        };

        let body = match body {
            Callback::Group(body) => body,
            Callback::Handler(_) | Callback::Named(_) => {
                return Err(RouteError::not_callable(self.body.describe()));
            }
        };

        debug!(
            pattern = %self.pattern(),
            has_binding = binding.is_some(),
            "Route group body start"
        );

        body(router, self, binding.as_ref())?;
        Ok(self)
    }
}

impl Routable for RouteGroup {
    fn routable(&self) -> &RoutableBase {
        &self.base
    }

    fn routable_mut(&mut self) -> &mut RoutableBase {
        &mut self.base
    }
}

impl fmt::Debug for RouteGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteGroup")
            .field("pattern", &self.pattern())
            .field("body", &self.body)
            .finish()
    }
}
