//! # FastDCA Server
//!
//! HTTP serving for the FastDCA framework, on hyper and tokio.
//!
//! - [`Router`] maps method and `{param}` path templates to operation IDs.
//! - [`HandlerRegistry`] maps operation IDs to async handlers whose inputs
//!   are extractors or [`Dependency`](fastdca_extract::Dependency) values.
//! - [`Server`] ties both together with a shared service container,
//!   built-in `/health` and `/ready`, a request timeout and graceful
//!   shutdown. [`Server::dispatch`] runs a request without a socket.
//!
//! ## Example
//!
//! ```rust,no_run
//! use fastdca_server::{HandlerError, HandlerRegistry, Server};
//! use http::Method;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut handlers = HandlerRegistry::new();
//!     handlers.register("readRoot", |(): ()| async {
//!         Ok::<_, HandlerError>(serde_json::json!({"Hello": "World"}))
//!     });
//!
//!     Server::builder()
//!         .http_addr("127.0.0.1:8000")
//!         .route(Method::GET, "/", "readRoot")
//!         .handlers(handlers)
//!         .build()
//!         .run()
//!         .await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/fastdca-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod handler;
mod health;
mod router;
mod server;
mod shutdown;

pub use config::{
    ServerConfig, ServerConfigBuilder, DEFAULT_HTTP_ADDR, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SERVICE_NAME, DEFAULT_SHUTDOWN_TIMEOUT_SECS,
};
pub use handler::{BoxedHandlerResult, ErasedHandler, HandlerError, HandlerRegistry, InvokeError};
pub use health::{HealthCheck, HealthStatus, ReadinessCheck, ReadinessStatus};
pub use router::{RouteMatch, Router};
pub use server::{HttpResponse, Server, ServerBuilder, ServerError, REQUEST_ID_HEADER};
pub use shutdown::{ConnectionToken, ConnectionTracker, ShutdownReceiver, ShutdownSignal};
