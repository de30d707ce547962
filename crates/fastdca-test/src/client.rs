//! Test client for in-memory HTTP testing.

use std::sync::Arc;

use fastdca_server::Server;
use http::Method;
use serde::Serialize;

use crate::error::TestError;
use crate::request::{TestRequest, TestRequestBuilder};
use crate::response::TestResponse;

/// Sends requests straight into a [`Server`] without binding a port.
///
/// Requests go through the same routing, dependency resolution, error
/// rendering and request-ID handling as requests arriving over TCP.
///
/// # Example
///
/// ```rust
/// use fastdca_server::{HandlerError, HandlerRegistry, Server};
/// use fastdca_test::TestClient;
/// use http::{Method, StatusCode};
///
/// # tokio_test::block_on(async {
/// let mut handlers = HandlerRegistry::new();
/// handlers.register("readRoot", |(): ()| async {
///     Ok::<_, HandlerError>(serde_json::json!({"Hello": "World"}))
/// });
///
/// let client = TestClient::new(
///     Server::builder()
///         .route(Method::GET, "/", "readRoot")
///         .handlers(handlers)
///         .build(),
/// );
///
/// let response = client.get("/").send().await;
/// response.assert_status(StatusCode::OK);
/// assert_eq!(response.json_value().unwrap()["Hello"], "World");
/// # });
/// ```
#[must_use]
#[derive(Debug, Clone)]
pub struct TestClient {
    server: Arc<Server>,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Wraps a server.
    pub fn new(server: Server) -> Self {
        Self::from_arc(Arc::new(server))
    }

    /// Wraps a shared server.
    pub fn from_arc(server: Arc<Server>) -> Self {
        Self {
            server,
            default_headers: Vec::new(),
        }
    }

    /// The wrapped server.
    #[must_use]
    pub fn server(&self) -> &Server {
        &self.server
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Creates a GET request builder.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::get(uri))
    }

    /// Creates a POST request builder.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::post(uri))
    }

    /// Creates a PUT request builder.
    pub fn put(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::put(uri))
    }

    /// Creates a DELETE request builder.
    pub fn delete(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::delete(uri))
    }

    /// Creates a request builder with a custom method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequestBuilder::new(method, uri))
    }

    async fn send_internal(&self, request: TestRequest) -> Result<TestResponse, TestError> {
        let response = self.server.dispatch(request.into_http_request()?).await;
        TestResponse::from_http(response).await
    }
}

/// A request builder bound to a test client.
#[must_use]
#[derive(Debug)]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl<'a> TestClientRequest<'a> {
    fn new(client: &'a TestClient, mut builder: TestRequestBuilder) -> Self {
        for (name, value) in &client.default_headers {
            builder = builder.header(name, value);
        }
        Self { client, builder }
    }

    /// Appends a query parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.query(name, value);
        self
    }

    /// Sets a header on the request.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(mut self, content_type: impl AsRef<str>) -> Self {
        self.builder = self.builder.content_type(content_type);
        self
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<bytes::Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets the request body as JSON.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Sends the request.
    ///
    /// # Panics
    ///
    /// Panics if the request could not be built or the body not read. Use
    /// [`try_send`](Self::try_send) to handle those cases.
    pub async fn send(self) -> TestResponse {
        match self.try_send().await {
            Ok(response) => response,
            Err(e) => panic!("test request failed: {e}"),
        }
    }

    /// Sends the request and returns a Result.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        let request = self.builder.build()?;
        self.client.send_internal(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastdca_extract::{Json, Path, Query, RawQuery};
    use fastdca_server::{HandlerError, HandlerRegistry, REQUEST_ID_HEADER};
    use http::StatusCode;
    use serde::Deserialize;
    use serde_json::{json, Value};

    #[derive(Deserialize)]
    struct ItemPath {
        item_id: i64,
    }

    #[derive(Deserialize)]
    struct Search {
        q: String,
    }

    fn client() -> TestClient {
        let mut handlers = HandlerRegistry::new();
        handlers.register("getItem", |Path(p): Path<ItemPath>| async move {
            Ok::<_, HandlerError>(json!({"item_id": p.item_id}))
        });
        handlers.register("search", |Query(s): Query<Search>| async move {
            Ok::<_, HandlerError>(s.q)
        });
        handlers.register("rawQuery", |RawQuery(raw): RawQuery| async move {
            Ok::<_, HandlerError>(raw)
        });
        handlers.register("echo", |Json(body): Json<Value>| async move {
            Ok::<_, HandlerError>(body)
        });

        TestClient::new(
            Server::builder()
                .route(Method::GET, "/items/{item_id}", "getItem")
                .route(Method::GET, "/search", "search")
                .route(Method::GET, "/raw", "rawQuery")
                .route(Method::POST, "/echo", "echo")
                .handlers(handlers)
                .build(),
        )
    }

    #[tokio::test]
    async fn test_path_param() {
        let response = client().get("/items/7").send().await;
        response
            .assert_status(StatusCode::OK)
            .assert_json_eq(&json!({"item_id": 7}));
    }

    #[tokio::test]
    async fn test_query_is_encoded_and_decoded() {
        let response = client().get("/search").query("q", "a & b").send().await;
        response.assert_status(StatusCode::OK);
        assert_eq!(response.json::<String>().unwrap(), "a & b");

        let response = client().get("/raw").query("x", "1").send().await;
        assert_eq!(response.json::<String>().unwrap(), "x=1");
    }

    #[tokio::test]
    async fn test_json_round_trip() {
        let response = client()
            .post("/echo")
            .json(&json!({"name": "Sara"}))
            .send()
            .await;
        response
            .assert_status(StatusCode::OK)
            .assert_json_field("name", &json!("Sara"));
    }

    #[tokio::test]
    async fn test_default_header_carries_request_id() {
        let request_id = "0191d2a4-3c5e-7b7a-9d2e-4f3a2b1c0d9e";
        let client = client().with_default_header(REQUEST_ID_HEADER, request_id);
        let response = client.get("/items/1").send().await;
        response.assert_header(REQUEST_ID_HEADER, request_id);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = client().get("/nope").send().await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert!(response.error_message().is_some());
    }

    #[tokio::test]
    async fn test_try_send_reports_build_errors() {
        let err = client()
            .get("/items/1")
            .header("bad header", "x")
            .try_send()
            .await
            .unwrap_err();
        assert!(matches!(err, TestError::RequestBuild(_)));
    }
}
