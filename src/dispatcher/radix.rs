//! Radix tree matching engine
//!
//! Each node represents one path segment. Static segments are stored as ordinary
//! children and parameter segments (`{id}`, `{id:\d+}`) as parameter children, so a
//! lookup walks the tree once per request segment instead of testing every route.
//!
//! Lookup order at each node: static children first, then parameter children in
//! registration order, backtracking when a branch dead-ends.

use std::sync::Arc;

use http::Method;
use regex::Regex;

use super::core::{DispatchResult, Dispatcher, DispatcherBuilder, RouteCollector};
use crate::error::RouteError;
use crate::route::{RouteArguments, RouteId};

/// Node in the radix tree
#[derive(Debug, Clone, Default)]
struct RadixNode {
    /// The path segment this node represents (without `/`); empty for parameter nodes
    segment: String,
    /// Routes terminating at this node, per HTTP method
    routes: Vec<(Method, RouteId)>,
    /// Parameter segment, if this node captures one
    param: Option<ParamSegment>,
    /// Static child nodes
    children: Vec<RadixNode>,
    /// Parameter child nodes; several may coexist with different names or constraints
    param_children: Vec<RadixNode>,
}

#[derive(Debug, Clone)]
struct ParamSegment {
    /// Raw segment text (`{id:\d+}`), used to merge identical parameters
    raw: String,
    name: String,
    constraint: Option<Regex>,
}

impl ParamSegment {
    /// Parse `{name}` or `{name:regex}`; `None` for static segments
    ///
    /// A parameter must span exactly one segment. Patterns are split on `/` before
    /// parsing, so a constraint containing `/` shows up here as an unbalanced brace.
    fn parse(segment: &str, pattern: &str) -> Result<Option<Self>, RouteError> {
        let inner = match segment
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
        {
            Some(inner) => inner,
            None if segment.contains(['{', '}']) => {
                return Err(RouteError::InvalidPattern {
                    pattern: pattern.to_string(),
                    reason: format!(
                        "segment '{}' is not a whole parameter; parameters and their constraints cannot contain '/'",
                        segment
                    ),
                });
            }
            None => return Ok(None),
        };

        let (name, constraint) = match inner.split_once(':') {
            Some((name, expr)) => {
                let regex = Regex::new(&format!("^(?:{})$", expr)).map_err(|e| {
                    RouteError::InvalidPattern {
                        pattern: pattern.to_string(),
                        reason: format!("invalid constraint for '{}': {}", name, e),
                    }
                })?;
                (name, Some(regex))
            }
            None => (inner, None),
        };

        if name.is_empty() || name.contains(['{', '}']) {
            return Err(RouteError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: format!("invalid parameter name '{}'", name),
            });
        }

        Ok(Some(Self {
            raw: segment.to_string(),
            name: name.to_string(),
            constraint,
        }))
    }

    fn accepts(&self, value: &str) -> bool {
        self.constraint
            .as_ref()
            .map_or(true, |regex| regex.is_match(value))
    }
}

impl RadixNode {
    fn new(segment: &str) -> Self {
        Self {
            segment: segment.to_string(),
            ..Self::default()
        }
    }

    fn new_param(param: ParamSegment) -> Self {
        Self {
            param: Some(param),
            ..Self::default()
        }
    }

    fn insert(
        &mut self,
        segments: &[&str],
        methods: &[Method],
        identifier: RouteId,
        pattern: &str,
    ) -> Result<(), RouteError> {
        let Some((&segment, remaining)) = segments.split_first() else {
            for method in methods {
                if self.routes.iter().any(|(m, _)| m == method) {
                    return Err(RouteError::DuplicateRoute {
                        method: method.clone(),
                        pattern: pattern.to_string(),
                    });
                }
                self.routes.push((method.clone(), identifier));
            }
            return Ok(());
        };

        if let Some(param) = ParamSegment::parse(segment, pattern)? {
            if let Some(child) = self
                .param_children
                .iter_mut()
                .find(|child| child.param.as_ref().is_some_and(|p| p.raw == param.raw))
            {
                return child.insert(remaining, methods, identifier, pattern);
            }

            let mut child = RadixNode::new_param(param);
            child.insert(remaining, methods, identifier, pattern)?;
            self.param_children.push(child);
            return Ok(());
        }

        if let Some(child) = self.children.iter_mut().find(|c| c.segment == segment) {
            return child.insert(remaining, methods, identifier, pattern);
        }

        let mut child = RadixNode::new(segment);
        child.insert(remaining, methods, identifier, pattern)?;
        self.children.push(child);
        Ok(())
    }

    fn search(
        &self,
        segments: &[&str],
        method: &Method,
        params: &mut RouteArguments,
    ) -> Option<RouteId> {
        let Some((&segment, remaining)) = segments.split_first() else {
            return self
                .routes
                .iter()
                .find(|(m, _)| m == method)
                .map(|(_, id)| *id);
        };

        for child in &self.children {
            if child.segment == segment {
                if let Some(id) = child.search(remaining, method, params) {
                    return Some(id);
                }
            }
        }

        for child in &self.param_children {
            if let Some(param) = &child.param {
                if !param.accepts(segment) {
                    continue;
                }
                let previous = params.insert(param.name.clone(), segment.to_string());
                if let Some(id) = child.search(remaining, method, params) {
                    return Some(id);
                }
                // backtrack
                match previous {
                    Some(value) => params.insert(param.name.clone(), value),
                    None => params.remove(&param.name),
                };
            }
        }

        None
    }

    /// Methods of every route whose pattern matches `segments`
    fn allowed_methods(&self, segments: &[&str], allowed: &mut Vec<Method>) {
        let Some((&segment, remaining)) = segments.split_first() else {
            for (method, _) in &self.routes {
                if !allowed.contains(method) {
                    allowed.push(method.clone());
                }
            }
            return;
        };

        for child in self.children.iter().filter(|c| c.segment == segment) {
            child.allowed_methods(remaining, allowed);
        }
        for child in &self.param_children {
            if child.param.as_ref().is_some_and(|p| p.accepts(segment)) {
                child.allowed_methods(remaining, allowed);
            }
        }
    }
}

fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Segment radix tree implementing [`Dispatcher`]
///
/// Routes are added through [`RouteCollector::add_route`]; afterwards the tree is
/// only read.
#[derive(Debug, Clone, Default)]
pub struct RadixDispatcher {
    root: RadixNode,
    route_count: usize,
}

impl RadixDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of routes added
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.route_count
    }

}

impl DispatcherBuilder for RadixDispatcher {
    fn into_dispatcher(self: Box<Self>) -> Arc<dyn Dispatcher> {
        Arc::new(*self)
    }

    fn engine(&self) -> &'static str {
        "radix_tree"
    }
}

impl RouteCollector for RadixDispatcher {
    fn add_route(
        &mut self,
        methods: &[Method],
        pattern: &str,
        identifier: RouteId,
    ) -> Result<(), RouteError> {
        let segments = split_segments(pattern);
        self.root.insert(&segments, methods, identifier, pattern)?;
        self.route_count += 1;
        Ok(())
    }
}

impl Dispatcher for RadixDispatcher {
    fn dispatch(&self, method: &Method, path: &str) -> DispatchResult {
        let segments = split_segments(path);

        let mut arguments = RouteArguments::new();
        if let Some(identifier) = self.root.search(&segments, method, &mut arguments) {
            return DispatchResult::Found {
                identifier,
                arguments,
            };
        }

        if method == Method::HEAD {
            let mut arguments = RouteArguments::new();
            if let Some(identifier) = self.root.search(&segments, &Method::GET, &mut arguments) {
                return DispatchResult::Found {
                    identifier,
                    arguments,
                };
            }
        }

        let mut allowed_methods = Vec::new();
        self.root.allowed_methods(&segments, &mut allowed_methods);
        if allowed_methods.is_empty() {
            return DispatchResult::NotFound;
        }
        allowed_methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        DispatchResult::MethodNotAllowed { allowed_methods }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher(routes: &[(&[Method], &str)]) -> RadixDispatcher {
        let mut d = RadixDispatcher::new();
        for (id, (methods, pattern)) in routes.iter().enumerate() {
            d.add_route(methods, pattern, id).unwrap();
        }
        d
    }

    fn found(result: DispatchResult) -> (RouteId, RouteArguments) {
        match result {
            DispatchResult::Found {
                identifier,
                arguments,
            } => (identifier, arguments),
            other => panic!("expected a match, got {:?}", other),
        }
    }

    #[test]
    fn test_simple_route() {
        let d = dispatcher(&[(&[Method::GET], "/health")]);
        let (id, params) = found(d.dispatch(&Method::GET, "/health"));
        assert_eq!(id, 0);
        assert!(params.is_empty());
    }

    #[test]
    fn test_root_route() {
        let d = dispatcher(&[(&[Method::GET], "/"), (&[Method::GET], "/about")]);
        assert_eq!(found(d.dispatch(&Method::GET, "/")).0, 0);
        assert_eq!(found(d.dispatch(&Method::GET, "/about")).0, 1);
    }

    #[test]
    fn test_multiple_parameters() {
        let d = dispatcher(&[(&[Method::GET], "/users/{user_id}/posts/{post_id}")]);
        let (_, params) = found(d.dispatch(&Method::GET, "/users/123/posts/456"));
        assert_eq!(params.get("user_id"), Some(&"123".to_string()));
        assert_eq!(params.get("post_id"), Some(&"456".to_string()));
    }

    #[test]
    fn test_static_segment_beats_parameter() {
        let d = dispatcher(&[(&[Method::GET], "/users/{id}"), (&[Method::GET], "/users/me")]);
        assert_eq!(found(d.dispatch(&Method::GET, "/users/me")).0, 1);
        assert_eq!(found(d.dispatch(&Method::GET, "/users/7")).0, 0);
    }

    #[test]
    fn test_different_param_names_same_position() {
        let d = dispatcher(&[
            (&[Method::GET], "/users/{user_id}/posts"),
            (&[Method::GET], "/users/{id}/comments"),
        ]);

        let (id, params) = found(d.dispatch(&Method::GET, "/users/123/posts"));
        assert_eq!(id, 0);
        assert_eq!(params.get("user_id"), Some(&"123".to_string()));
        assert!(params.get("id").is_none());

        let (id, params) = found(d.dispatch(&Method::GET, "/users/456/comments"));
        assert_eq!(id, 1);
        assert_eq!(params.get("id"), Some(&"456".to_string()));
        assert!(params.get("user_id").is_none());
    }

    #[test]
    fn test_regex_constraint() {
        let d = dispatcher(&[
            (&[Method::GET], r"/items/{id:\d+}"),
            (&[Method::GET], "/items/{slug}"),
        ]);
        let (id, params) = found(d.dispatch(&Method::GET, "/items/42"));
        assert_eq!(id, 0);
        assert_eq!(params.get("id"), Some(&"42".to_string()));

        let (id, params) = found(d.dispatch(&Method::GET, "/items/blue-shirt"));
        assert_eq!(id, 1);
        assert_eq!(params.get("slug"), Some(&"blue-shirt".to_string()));
    }

    #[test]
    fn test_invalid_constraint_is_rejected() {
        let mut d = RadixDispatcher::new();
        let err = d.add_route(&[Method::GET], "/items/{id:[}", 0).unwrap_err();
        assert!(matches!(err, RouteError::InvalidPattern { .. }));
    }

    #[test]
    fn test_constraint_spanning_segments_is_rejected() {
        let mut d = RadixDispatcher::new();
        let err = d
            .add_route(&[Method::GET], "/files/{path:.+/.+}", 0)
            .unwrap_err();
        assert!(matches!(err, RouteError::InvalidPattern { .. }));
        assert!(err.to_string().contains("cannot contain '/'"));
        assert_eq!(d.route_count(), 0);

        let err = d.add_route(&[Method::GET], "/files/{}", 0).unwrap_err();
        assert!(matches!(err, RouteError::InvalidPattern { .. }));
    }

    #[test]
    fn test_repetition_braces_in_constraint_are_allowed() {
        let d = dispatcher(&[(&[Method::GET], r"/codes/{code:[A-Z]{3}}")]);
        let (_, params) = found(d.dispatch(&Method::GET, "/codes/EUR"));
        assert_eq!(params.get("code"), Some(&"EUR".to_string()));
        assert_eq!(d.dispatch(&Method::GET, "/codes/EURO"), DispatchResult::NotFound);
    }

    #[test]
    fn test_duplicate_route_is_rejected() {
        let mut d = RadixDispatcher::new();
        d.add_route(&[Method::GET], "/users/{id}", 0).unwrap();
        let err = d.add_route(&[Method::GET], "/users/{id}/", 1).unwrap_err();
        assert!(matches!(err, RouteError::DuplicateRoute { .. }));
        d.add_route(&[Method::POST], "/users/{id}", 2).unwrap();
    }

    #[test]
    fn test_method_not_allowed_lists_sorted_methods() {
        let d = dispatcher(&[
            (&[Method::PUT], "/items/{id}"),
            (&[Method::GET, Method::DELETE], "/items/{slug}"),
        ]);
        assert_eq!(
            d.dispatch(&Method::POST, "/items/9"),
            DispatchResult::MethodNotAllowed {
                allowed_methods: vec![Method::DELETE, Method::GET, Method::PUT]
            }
        );
    }

    #[test]
    fn test_head_falls_back_to_get() {
        let d = dispatcher(&[(&[Method::GET], "/status")]);
        assert_eq!(found(d.dispatch(&Method::HEAD, "/status")).0, 0);
    }

    #[test]
    fn test_no_match() {
        let d = dispatcher(&[(&[Method::GET], "/users/{id}")]);
        assert_eq!(d.dispatch(&Method::GET, "/posts/1"), DispatchResult::NotFound);
        assert_eq!(d.dispatch(&Method::GET, "/users/1/extra"), DispatchResult::NotFound);
    }
}
