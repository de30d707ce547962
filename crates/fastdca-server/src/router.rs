//! Request routing and path matching.
//!
//! Routes map a method and a `{param}`-style path template to an operation
//! ID. Matching is segment by segment: empty segments are ignored, so
//! `/blog/1` and `/blog/1/` resolve to the same route, and parameter
//! segments are percent-decoded before they reach extractors.
//!
//! # Example
//!
//! ```rust
//! use fastdca_server::Router;
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.add_route(Method::GET, "/blog/{id}", "getBlog");
//! router.add_route(Method::POST, "/users", "createUser");
//!
//! let m = router.match_route(&Method::GET, "/blog/2").unwrap();
//! assert_eq!(m.operation_id(), "getBlog");
//! assert_eq!(m.param("id"), Some("2"));
//! ```

use fastdca_extract::Params;
use http::Method;

/// A matched route with its extracted path parameters.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    operation_id: String,
    params: Params,
}

impl RouteMatch {
    /// Returns the operation ID for this route.
    #[must_use]
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// Returns the extracted path parameters.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Returns a single path parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// Consumes the match and returns the parameters.
    #[must_use]
    pub fn into_params(self) -> Params {
        self.params
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    Literal(String),
    Param(String),
}

#[derive(Debug, Clone)]
struct Route {
    method: Method,
    segments: Vec<PathSegment>,
    operation_id: String,
}

impl Route {
    fn new(method: Method, pattern: &str, operation_id: impl Into<String>) -> Self {
        Self {
            method,
            segments: parse_segments(pattern),
            operation_id: operation_id.into(),
        }
    }

    fn match_path(&self, path_segments: &[&str]) -> Option<Params> {
        if path_segments.len() != self.segments.len() {
            return None;
        }

        let mut params = Params::new();
        for (pattern, actual) in self.segments.iter().zip(path_segments) {
            match pattern {
                PathSegment::Literal(expected) => {
                    if expected != actual {
                        return None;
                    }
                }
                PathSegment::Param(name) => {
                    let value = urlencoding::decode(actual)
                        .map_or_else(|_| (*actual).to_string(), |v| v.into_owned());
                    params.push(name.clone(), value);
                }
            }
        }
        Some(params)
    }
}

fn parse_segments(pattern: &str) -> Vec<PathSegment> {
    split_path(pattern)
        .into_iter()
        .map(|s| match s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(name) => PathSegment::Param(name.to_string()),
            None => PathSegment::Literal(s.to_string()),
        })
        .collect()
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// HTTP request router.
///
/// Routes are tried in registration order and the first match wins.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a route.
    pub fn add_route(&mut self, method: Method, pattern: &str, operation_id: impl Into<String>) {
        self.routes.push(Route::new(method, pattern, operation_id));
    }

    /// Adds a route, returning the router for chaining.
    #[must_use]
    pub fn route(mut self, method: Method, pattern: &str, operation_id: impl Into<String>) -> Self {
        self.add_route(method, pattern, operation_id);
        self
    }

    /// Matches a request against the registered routes.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let segments = split_path(path);
        self.routes
            .iter()
            .filter(|route| route.method == *method)
            .find_map(|route| {
                route.match_path(&segments).map(|params| RouteMatch {
                    operation_id: route.operation_id.clone(),
                    params,
                })
            })
    }

    /// Methods registered for `path`, used to tell 405 apart from 404.
    #[must_use]
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let segments = split_path(path);
        let mut methods: Vec<Method> = Vec::new();
        for route in &self.routes {
            if route.match_path(&segments).is_some() && !methods.contains(&route.method) {
                methods.push(route.method.clone());
            }
        }
        methods
    }

    /// Returns `true` if some route maps to `operation_id`.
    #[must_use]
    pub fn has_operation(&self, operation_id: &str) -> bool {
        self.routes.iter().any(|r| r.operation_id == operation_id)
    }

    /// Returns the operation IDs in registration order.
    pub fn operation_ids(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|r| r.operation_id.as_str())
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }
}
