//! Extraction context providing access to request data.
//!
//! The [`ExtractionContext`] is everything an extractor or dependency may
//! read: method, URI, headers, body, captured path parameters and the shared
//! service [`Container`].

use crate::Params;
use bytes::Bytes;
use fastdca_core::Container;
use http::{HeaderMap, Method, Uri};
use std::sync::Arc;

/// Context providing access to all parts of an HTTP request.
///
/// # Example
///
/// ```rust
/// use fastdca_extract::{ExtractionContext, Params};
/// use http::{HeaderMap, Method, Uri};
/// use bytes::Bytes;
///
/// let mut params = Params::new();
/// params.push("id", "2");
///
/// let ctx = ExtractionContext::new(
///     Method::GET,
///     Uri::from_static("/blog/2"),
///     HeaderMap::new(),
///     Bytes::new(),
///     params,
/// );
///
/// assert_eq!(ctx.method(), &Method::GET);
/// assert_eq!(ctx.path_params().get("id"), Some("2"));
/// assert!(ctx.container().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    path_params: Params,
    container: Option<Arc<Container>>,
}

impl ExtractionContext {
    /// Creates a new extraction context without a service container.
    #[must_use]
    pub fn new(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
        path_params: Params,
    ) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
            path_params,
            container: None,
        }
    }

    /// Creates a new extraction context that can resolve injected services.
    #[must_use]
    pub fn with_container(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
        path_params: Params,
        container: Arc<Container>,
    ) -> Self {
        Self {
            container: Some(container),
            ..Self::new(method, uri, headers, body, path_params)
        }
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the path portion of the URI.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the query string if present.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a specific header value as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the Content-Type header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Returns the request body as bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the captured path parameters.
    #[must_use]
    pub fn path_params(&self) -> &Params {
        &self.path_params
    }

    /// Returns the service container, if the server attached one.
    #[must_use]
    pub fn container(&self) -> Option<&Container> {
        self.container.as_deref()
    }
}

/// Builder for constructing an `ExtractionContext`, mainly in tests.
#[derive(Debug, Default)]
pub struct ExtractionContextBuilder {
    method: Option<Method>,
    uri: Option<Uri>,
    headers: HeaderMap,
    body: Bytes,
    path_params: Params,
    container: Option<Arc<Container>>,
}

impl ExtractionContextBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the URI.
    #[must_use]
    pub fn uri(mut self, uri: Uri) -> Self {
        self.uri = Some(uri);
        self
    }

    /// Adds a single header. Invalid header values are ignored.
    #[must_use]
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = value.parse() {
            self.headers.insert(name, value);
        }
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Adds a single path parameter.
    #[must_use]
    pub fn path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.push(name, value);
        self
    }

    /// Attaches a service container.
    #[must_use]
    pub fn container(mut self, container: Arc<Container>) -> Self {
        self.container = Some(container);
        self
    }

    /// Builds the extraction context.
    ///
    /// # Panics
    ///
    /// Panics if method or uri were not set.
    #[must_use]
    pub fn build(self) -> ExtractionContext {
        ExtractionContext {
            method: self.method.expect("method is required"),
            uri: self.uri.expect("uri is required"),
            headers: self.headers,
            body: self.body,
            path_params: self.path_params,
            container: self.container,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_context_creation() {
        let mut params = Params::new();
        params.push("item_id", "5");

        let ctx = ExtractionContext::new(
            Method::GET,
            Uri::from_static("/items/5?q=somequery"),
            HeaderMap::new(),
            Bytes::new(),
            params,
        );

        assert_eq!(ctx.path(), "/items/5");
        assert_eq!(ctx.query_string(), Some("q=somequery"));
        assert_eq!(ctx.path_params().get("item_id"), Some("5"));
        assert!(ctx.container().is_none());
    }

    #[test]
    fn test_builder_with_container() {
        struct Marker;

        let container = Arc::new(Container::new().with(Arc::new(Marker)));
        let ctx = ExtractionContextBuilder::new()
            .method(Method::POST)
            .uri(Uri::from_static("/users"))
            .header("content-type", "application/json")
            .body(r#"{"id": 1}"#)
            .container(container)
            .build();

        assert_eq!(ctx.content_type(), Some("application/json"));
        assert_eq!(ctx.body().as_ref(), br#"{"id": 1}"#);
        assert!(ctx.container().is_some_and(Container::contains::<Marker>));
    }
}
