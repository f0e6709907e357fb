use std::sync::Arc;

use http::Method;

use crate::error::RouteError;
use crate::route::{RouteArguments, RouteId};

/// Outcome of matching a method and path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult {
    /// A route matched
    Found {
        /// Identifier of the matched route
        identifier: RouteId,
        /// Values captured by the pattern's parameters
        arguments: RouteArguments,
    },
    /// No route pattern matches the path
    NotFound,
    /// The path matches, but not for this method
    MethodNotAllowed {
        /// Methods registered for the matching patterns, sorted
        allowed_methods: Vec<Method>,
    },
}

impl DispatchResult {
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, DispatchResult::Found { .. })
    }
}

/// Path-matching engine queried at dispatch time
pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, method: &Method, path: &str) -> DispatchResult;
}

/// Receives route registrations while a dispatcher is being built
pub trait RouteCollector {
    fn add_route(
        &mut self,
        methods: &[Method],
        pattern: &str,
        identifier: RouteId,
    ) -> Result<(), RouteError>;
}

/// Matching engine under construction
///
/// The router feeds every route through [`RouteCollector::add_route`], then turns the
/// builder into the [`Dispatcher`] it memoizes.
pub trait DispatcherBuilder: RouteCollector + Send {
    fn into_dispatcher(self: Box<Self>) -> Arc<dyn Dispatcher>;

    /// Engine name for logs
    fn engine(&self) -> &'static str {
        "custom"
    }
}

/// Creates a fresh [`DispatcherBuilder`] for every dispatcher build
pub type DispatcherFactory = Arc<dyn Fn() -> Box<dyn DispatcherBuilder> + Send + Sync>;

impl<T: RouteCollector + ?Sized> RouteCollector for Box<T> {
    fn add_route(
        &mut self,
        methods: &[Method],
        pattern: &str,
        identifier: RouteId,
    ) -> Result<(), RouteError> {
        (**self).add_route(methods, pattern, identifier)
    }
}

/// One registration as submitted to a [`RouteCollector`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDefinition {
    pub methods: Vec<Method>,
    pub pattern: String,
    pub identifier: RouteId,
}

/// Collector that only records registrations, in submission order
#[derive(Debug, Clone, Default)]
pub struct RouteDefinitions {
    definitions: Vec<RouteDefinition>,
}

impl RouteDefinitions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteDefinition> {
        self.definitions.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Replay every registration into `collector`
    pub fn replay(&self, collector: &mut dyn RouteCollector) -> Result<(), RouteError> {
        for def in &self.definitions {
            collector.add_route(&def.methods, &def.pattern, def.identifier)?;
        }
        Ok(())
    }
}

impl RouteCollector for RouteDefinitions {
    fn add_route(
        &mut self,
        methods: &[Method],
        pattern: &str,
        identifier: RouteId,
    ) -> Result<(), RouteError> {
        self.definitions.push(RouteDefinition {
            methods: methods.to_vec(),
            pattern: pattern.to_string(),
            identifier,
        });
        Ok(())
    }
}

impl FromIterator<RouteDefinition> for RouteDefinitions {
    fn from_iter<I: IntoIterator<Item = RouteDefinition>>(iter: I) -> Self {
        Self {
            definitions: iter.into_iter().collect(),
        }
    }
}
