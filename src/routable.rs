//! Pattern and resolver state shared by [`Route`](crate::route::Route) and
//! [`RouteGroup`](crate::route::RouteGroup).

use std::sync::Arc;

use crate::resolver::CallbackResolver;

/// Fields every routable item carries
#[derive(Clone, Default)]
pub struct RoutableBase {
    pattern: String,
    resolver: Option<Arc<dyn CallbackResolver>>,
}

impl RoutableBase {
    pub(crate) fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            resolver: None,
        }
    }
}

/// Accessors for a URL pattern and an optional callback resolver
///
/// The pattern is opaque here; only the matching engine interprets it.
pub trait Routable {
    fn routable(&self) -> &RoutableBase;
    fn routable_mut(&mut self) -> &mut RoutableBase;

    fn pattern(&self) -> &str {
        &self.routable().pattern
    }

    fn set_pattern(&mut self, pattern: impl Into<String>) -> &mut Self
    where
        Self: Sized,
    {
        self.routable_mut().pattern = pattern.into();
        self
    }

    fn callback_resolver(&self) -> Option<&Arc<dyn CallbackResolver>> {
        self.routable().resolver.as_ref()
    }

    fn set_callback_resolver(&mut self, resolver: Arc<dyn CallbackResolver>) -> &mut Self
    where
        Self: Sized,
    {
        self.routable_mut().resolver = Some(resolver);
        self
    }
}
