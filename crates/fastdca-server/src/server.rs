//! The HTTP server.
//!
//! [`Server`] owns the router, the handler registry and the shared service
//! container. Requests arrive either from a TCP listener ([`Server::run`],
//! [`Server::serve`]) or directly through [`Server::dispatch`], which runs
//! the same pipeline without a socket:
//!
//! 1. `GET /health` and `GET /ready` are answered before routing.
//! 2. The router resolves the operation ID and path parameters. An unknown
//!    path is a 404; a known path with another method is a 405.
//! 3. The handler's dependencies are resolved and the handler runs under the
//!    request timeout. Failures are rendered as JSON error envelopes.
//!
//! Every response carries an `x-request-id` header. A client-supplied UUID
//! in that header is reused; anything else is replaced by a fresh id.
//!
//! # Example
//!
//! ```rust
//! use fastdca_server::{HandlerError, HandlerRegistry, Server};
//! use http::{Method, Request, StatusCode};
//! use bytes::Bytes;
//!
//! let mut handlers = HandlerRegistry::new();
//! handlers.register("readRoot", |(): ()| async {
//!     Ok::<_, HandlerError>(serde_json::json!({"Hello": "World"}))
//! });
//!
//! let server = Server::builder()
//!     .route(Method::GET, "/", "readRoot")
//!     .handlers(handlers)
//!     .build();
//!
//! # tokio_test::block_on(async {
//! let request = Request::get("/").body(Bytes::new()).unwrap();
//! let response = server.dispatch(request).await;
//! assert_eq!(response.status(), StatusCode::OK);
//! # });
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use fastdca_core::{
    AppError, Container, ErrorCategory, ErrorDetail, ErrorEnvelope, RequestContext, RequestId,
};
use fastdca_extract::ExtractionContext;
use http::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use http::request::Parts;
use http::{Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{ServerConfig, ServerConfigBuilder};
use crate::handler::{HandlerRegistry, InvokeError};
use crate::health::{HealthCheck, ReadinessCheck};
use crate::router::Router;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// HTTP response type produced by the server.
pub type HttpResponse = Response<Full<Bytes>>;

/// Header carrying the request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Errors that stop the server from running.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured address is not a socket address.
    #[error("invalid bind address '{addr}': {source}")]
    InvalidAddress {
        /// The configured address.
        addr: String,
        /// Parse failure.
        #[source]
        source: std::net::AddrParseError,
    },

    /// The listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// The address that was tried.
        addr: SocketAddr,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The bound listener has no usable local address.
    #[error("listener error: {0}")]
    Listener(#[source] std::io::Error),
}

/// The HTTP server.
pub struct Server {
    config: ServerConfig,
    router: Router,
    handlers: HandlerRegistry,
    container: Arc<Container>,
    health: HealthCheck,
    readiness: ReadinessCheck,
}

impl Server {
    /// Creates a server with no routes.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let health = HealthCheck::new(config.service_name(), config.service_version());
        Self {
            config,
            router: Router::new(),
            handlers: HandlerRegistry::new(),
            container: Arc::new(Container::new()),
            health,
            readiness: ReadinessCheck::new(),
        }
    }

    /// Creates a server builder.
    #[must_use]
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the router.
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Returns the handler registry.
    #[must_use]
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Returns the shared service container.
    #[must_use]
    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    /// Returns the liveness reporter.
    #[must_use]
    pub fn health(&self) -> &HealthCheck {
        &self.health
    }

    /// Returns the readiness gate.
    #[must_use]
    pub fn readiness(&self) -> &ReadinessCheck {
        &self.readiness
    }

    /// Runs until SIGTERM or SIGINT.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_with_shutdown(ShutdownSignal::with_os_signals()).await
    }

    /// Binds the configured address and runs until `shutdown` fires.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self
            .config
            .socket_addr()
            .map_err(|source| ServerError::InvalidAddress {
                addr: self.config.http_addr().to_string(),
                source,
            })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        self.serve(listener, shutdown).await
    }

    /// Accepts connections on `listener` until `shutdown` fires, then drains.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), ServerError> {
        let local_addr = listener.local_addr().map_err(ServerError::Listener)?;
        tracing::info!(
            addr = %local_addr,
            service = self.health.service(),
            routes = self.router.route_count(),
            "server listening"
        );

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote_addr)) => {
                        let server = Arc::clone(&server);
                        let token = tracker.acquire();
                        let shutdown = shutdown.clone();
                        tokio::spawn(async move {
                            if let Err(e) = server.handle_connection(stream, shutdown).await {
                                tracing::debug!(remote = %remote_addr, error = %e, "connection closed with error");
                            }
                            drop(token);
                        });
                    }
                    Err(e) => tracing::error!(error = %e, "failed to accept connection"),
                },
                () = shutdown.recv() => {
                    tracing::info!("shutdown requested, no longer accepting connections");
                    break;
                }
            }
        }

        server.readiness.set_ready(false);

        let shutdown_timeout = server.config.shutdown_timeout();
        tokio::select! {
            () = tracker.wait_for_drain() => tracing::info!("all connections closed"),
            () = tokio::time::sleep(shutdown_timeout) => tracing::warn!(
                active = tracker.active_connections(),
                timeout_ms = duration_ms(shutdown_timeout),
                "shutdown timeout reached with connections still open"
            ),
        }

        tracing::info!("server stopped");
        Ok(())
    }

    async fn handle_connection(
        self: &Arc<Self>,
        stream: tokio::net::TcpStream,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let server = Arc::clone(self);
        let service = service_fn(move |req: Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { Ok::<_, Infallible>(server.handle_request(req).await) }
        });

        let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
        tokio::pin!(conn);

        tokio::select! {
            result = conn.as_mut() => result,
            () = shutdown.recv() => {
                conn.as_mut().graceful_shutdown();
                conn.await
            }
        }
    }

    async fn handle_request(&self, req: Request<Incoming>) -> HttpResponse {
        let (parts, body) = req.into_parts();

        match tokio::time::timeout(self.config.request_timeout(), body.collect()).await {
            Ok(Ok(collected)) => {
                self.dispatch(Request::from_parts(parts, collected.to_bytes()))
                    .await
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "failed to read request body");
                let envelope = plain_envelope(
                    "BODY_READ_ERROR",
                    format!("failed to read request body: {e}"),
                    ErrorCategory::BadRequest,
                    None,
                );
                envelope_response(StatusCode::BAD_REQUEST, &envelope)
            }
            Err(_) => {
                tracing::warn!(http.path = parts.uri.path(), "timed out reading request body");
                let envelope = plain_envelope(
                    "REQUEST_TIMEOUT",
                    "timed out reading request body",
                    ErrorCategory::Timeout,
                    None,
                );
                envelope_response(StatusCode::REQUEST_TIMEOUT, &envelope)
            }
        }
    }

    /// Runs one request through routing, dependency resolution and the
    /// handler, without touching the network.
    pub async fn dispatch(&self, req: Request<Bytes>) -> HttpResponse {
        let request_id = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(RequestId::parse)
            .unwrap_or_default();
        let mut ctx = RequestContext::with_request_id(request_id);

        let (parts, body) = req.into_parts();
        let method = parts.method.clone();
        let path = parts.uri.path().to_string();
        tracing::debug!(request_id = %request_id, http.method = %method, http.path = %path, "request received");

        let mut response = self.route(&mut ctx, parts, body).await;

        let status = response.status();
        let operation_id = ctx.operation_id().unwrap_or("-");
        let elapsed = duration_ms(ctx.elapsed());
        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                operation_id,
                http.method = %method,
                http.path = %path,
                http.status_code = status.as_u16(),
                duration_ms = elapsed,
                "request failed"
            );
        } else if status.is_client_error() {
            tracing::warn!(
                request_id = %request_id,
                operation_id,
                http.method = %method,
                http.path = %path,
                http.status_code = status.as_u16(),
                duration_ms = elapsed,
                "request rejected"
            );
        } else {
            tracing::info!(
                request_id = %request_id,
                operation_id,
                http.method = %method,
                http.path = %path,
                http.status_code = status.as_u16(),
                duration_ms = elapsed,
                "request completed"
            );
        }

        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }

    async fn route(&self, ctx: &mut RequestContext, parts: Parts, body: Bytes) -> HttpResponse {
        let request_id = ctx.request_id().to_string();
        let rid = Some(request_id.as_str());
        let path = parts.uri.path();

        if parts.method == Method::GET {
            match path {
                "/health" => return json_response(StatusCode::OK, to_json(&self.health.status())),
                "/ready" => {
                    let status = self.readiness.status();
                    let code = if status.ready {
                        StatusCode::OK
                    } else {
                        StatusCode::SERVICE_UNAVAILABLE
                    };
                    return json_response(code, to_json(&status));
                }
                _ => {}
            }
        }

        let Some(route_match) = self.router.match_route(&parts.method, path) else {
            return self.unmatched(&parts.method, path, rid);
        };

        let operation_id = route_match.operation_id().to_string();
        ctx.set_operation_id(operation_id.as_str());

        if !self.handlers.contains(&operation_id) {
            let envelope = plain_envelope(
                "HANDLER_NOT_IMPLEMENTED",
                format!("no handler registered for operation: {operation_id}"),
                ErrorCategory::Internal,
                rid,
            );
            return envelope_response(StatusCode::NOT_IMPLEMENTED, &envelope);
        }

        let extraction = ExtractionContext::with_container(
            parts.method,
            parts.uri,
            parts.headers,
            body,
            route_match.into_params(),
            Arc::clone(&self.container),
        );

        let invocation = self.handlers.invoke(&operation_id, extraction);
        match tokio::time::timeout(self.config.request_timeout(), invocation).await {
            Ok(Ok(body)) => json_response(StatusCode::OK, body),
            Ok(Err(InvokeError::Handler(e))) => {
                let status = e.status_code();
                if status.is_server_error() {
                    tracing::error!(request_id = %request_id, operation_id = %operation_id, error = %e, "handler error");
                }
                envelope_response(status, &e.to_envelope(rid))
            }
            Ok(Err(e @ InvokeError::HandlerNotFound(_))) => {
                let envelope = plain_envelope(
                    "HANDLER_NOT_IMPLEMENTED",
                    e.to_string(),
                    ErrorCategory::Internal,
                    rid,
                );
                envelope_response(StatusCode::NOT_IMPLEMENTED, &envelope)
            }
            Err(_) => {
                let err = AppError::timeout(format!(
                    "handler did not finish within {} ms",
                    duration_ms(self.config.request_timeout())
                ));
                envelope_response(err.status_code(), &err.to_envelope(rid))
            }
        }
    }

    fn unmatched(&self, method: &Method, path: &str, rid: Option<&str>) -> HttpResponse {
        let allowed = self.router.allowed_methods(path);
        if allowed.is_empty() {
            let envelope = plain_envelope(
                "ROUTE_NOT_FOUND",
                format!("no route for {method} {path}"),
                ErrorCategory::NotFound,
                rid,
            );
            return envelope_response(StatusCode::NOT_FOUND, &envelope);
        }

        let allow = allowed
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let envelope = plain_envelope(
            "METHOD_NOT_ALLOWED",
            format!("method {method} not allowed for {path}"),
            ErrorCategory::BadRequest,
            rid,
        );
        let mut response = envelope_response(StatusCode::METHOD_NOT_ALLOWED, &envelope);
        if let Ok(value) = HeaderValue::from_str(&allow) {
            response.headers_mut().insert(ALLOW, value);
        }
        response
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("routes", &self.router.route_count())
            .field("handlers", &self.handlers)
            .field("container", &self.container)
            .finish_non_exhaustive()
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn to_json<T: serde::Serialize>(value: &T) -> Bytes {
    serde_json::to_vec(value).map_or_else(|_| Bytes::from_static(b"{}"), Bytes::from)
}

fn json_response(status: StatusCode, body: Bytes) -> HttpResponse {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

fn envelope_response(status: StatusCode, envelope: &ErrorEnvelope) -> HttpResponse {
    json_response(status, to_json(envelope))
}

fn plain_envelope(
    code: &str,
    message: impl Into<String>,
    category: ErrorCategory,
    request_id: Option<&str>,
) -> ErrorEnvelope {
    ErrorEnvelope {
        error: ErrorDetail {
            code: code.to_string(),
            message: message.into(),
            category,
            details: None,
        },
        request_id: request_id.map(ToString::to_string),
    }
}

/// Builder for [`Server`].
#[derive(Debug, Default)]
pub struct ServerBuilder {
    config: ServerConfigBuilder,
    router: Router,
    handlers: HandlerRegistry,
    container: Container,
    readiness: ReadinessCheck,
}

impl ServerBuilder {
    /// Creates a builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the configuration wholesale.
    #[must_use]
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = ServerConfigBuilder::new()
            .http_addr(config.http_addr())
            .shutdown_timeout(config.shutdown_timeout())
            .request_timeout(config.request_timeout())
            .service_name(config.service_name())
            .service_version(config.service_version());
        self
    }

    /// Sets the HTTP bind address.
    #[must_use]
    pub fn http_addr(mut self, addr: impl Into<String>) -> Self {
        self.config = self.config.http_addr(addr);
        self
    }

    /// Sets the graceful shutdown timeout.
    #[must_use]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.shutdown_timeout(timeout);
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.request_timeout(timeout);
        self
    }

    /// Sets the service name reported by `/health`.
    #[must_use]
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.config = self.config.service_name(name);
        self
    }

    /// Sets the service version reported by `/health`.
    #[must_use]
    pub fn service_version(mut self, version: impl Into<String>) -> Self {
        self.config = self.config.service_version(version);
        self
    }

    /// Adds a route.
    #[must_use]
    pub fn route(mut self, method: Method, pattern: &str, operation_id: impl Into<String>) -> Self {
        self.router.add_route(method, pattern, operation_id);
        self
    }

    /// Replaces the router.
    #[must_use]
    pub fn router(mut self, router: Router) -> Self {
        self.router = router;
        self
    }

    /// Sets the handler registry.
    #[must_use]
    pub fn handlers(mut self, handlers: HandlerRegistry) -> Self {
        self.handlers = handlers;
        self
    }

    /// Sets the container shared by every request.
    #[must_use]
    pub fn container(mut self, container: Container) -> Self {
        self.container = container;
        self
    }

    /// Adds a readiness check reported by `/ready`.
    #[must_use]
    pub fn readiness_check(
        mut self,
        name: impl Into<String>,
        check: impl Fn() -> bool + Send + Sync + 'static,
    ) -> Self {
        self.readiness.add_check(name, check);
        self
    }

    /// Builds the server.
    #[must_use]
    pub fn build(self) -> Server {
        let config = self.config.build();
        let health = HealthCheck::new(config.service_name(), config.service_version());
        Server {
            config,
            router: self.router,
            handlers: self.handlers,
            container: Arc::new(self.container),
            health,
            readiness: self.readiness,
        }
    }
}
