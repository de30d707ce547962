//! # FastDCA
//!
//! An async HTTP framework built around request-scoped dependencies.
//!
//! Handlers declare their inputs as extractors ([`Path`](extract::Path),
//! [`Query`](extract::Query), [`Json`](extract::Json),
//! [`Valid`](extract::Valid), [`Inject`](extract::Inject)) or as
//! [`Dependency`](extract::Dependency) values such as
//! [`GetObjectOr404`](core::GetObjectOr404). Every dependency is resolved
//! before the handler runs, and any failure becomes a JSON error envelope.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use fastdca::prelude::*;
//! use http::Method;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let blogs = Catalog::new(HashMap::from([
//!         ("1".to_string(), "Generative AI Blog".to_string()),
//!     ]));
//!
//!     let mut handlers = HandlerRegistry::new();
//!     handlers.register_with("getBlog", GetObjectOr404::new(blogs), |blog: String| async move {
//!         Ok::<_, HandlerError>(blog)
//!     });
//!
//!     Server::builder()
//!         .http_addr("127.0.0.1:8000")
//!         .route(Method::GET, "/blog/{id}", "getBlog")
//!         .handlers(handlers)
//!         .build()
//!         .run()
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Request Flow
//!
//! ```text
//! Request → RequestId → Router → Dependencies → Handler
//!                                     ↓ (any failure)
//! Response ← Request log ← Error envelope
//! ```

#![doc(html_root_url = "https://docs.rs/fastdca/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use fastdca_core as core;

// Re-export extraction and dependency types
pub use fastdca_extract as extract;

// Re-export server types
pub use fastdca_server as server;

// Re-export logging setup
pub use fastdca_telemetry as telemetry;

// Re-export configuration
pub use fastdca_config as config;

/// Prelude module for convenient imports.
///
/// ```rust
/// use fastdca::prelude::*;
/// ```
pub mod prelude {
    pub use fastdca_core::{
        AppError, AppResult, Catalog, Container, FieldErrors, GetObjectOr404, LookupError,
        RequestContext, RequestId,
    };

    pub use fastdca_extract::{
        dependency_fn, extract, Dependency, DependencyError, FieldReader, FromRequest, Inject,
        Json, Model, Path, Query, RawQuery, Valid,
    };

    pub use fastdca_server::{HandlerError, HandlerRegistry, Router, Server, ShutdownSignal};

    pub use fastdca_telemetry::{init_logging, LogConfig, LogFormat};

    pub use fastdca_config::{AppConfig, ConfigLoader};
}
