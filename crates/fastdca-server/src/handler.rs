//! Handler registration and dispatch.
//!
//! Every handler is registered against an operation ID and stored
//! type-erased. Before the handler body runs, its inputs are resolved from
//! the request: either through a [`FromRequest`] extractor or through a
//! [`Dependency`] value such as a [`GetObjectOr404`] lookup. Whatever the
//! handler returns is JSON-encoded.
//!
//! [`GetObjectOr404`]: fastdca_core::GetObjectOr404
//!
//! # Example
//!
//! ```rust
//! use fastdca_core::{Catalog, GetObjectOr404};
//! use fastdca_extract::Query;
//! use fastdca_server::{HandlerError, HandlerRegistry};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct GoalQuery {
//!     username: String,
//! }
//!
//! let blogs: Catalog<String> = [("1", "Generative AI Blog".to_string())].into_iter().collect();
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register("getGoal", |Query(q): Query<GoalQuery>| async move {
//!     Ok::<_, HandlerError>(serde_json::json!({ "goal": "ship", "username": q.username }))
//! });
//! registry.register_with("getBlog", GetObjectOr404::new(blogs), |blog: String| async move {
//!     Ok::<_, HandlerError>(blog)
//! });
//!
//! assert!(registry.contains("getGoal"));
//! assert!(registry.contains("getBlog"));
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use fastdca_core::{AppError, ErrorEnvelope, LookupError};
use fastdca_extract::{
    extract, Dependency, DependencyError, ExtractionContext, ExtractionError, FromRequest,
    ModelValidationError,
};
use http::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Boxed future returned by an erased handler.
pub type BoxedHandlerResult = Pin<Box<dyn Future<Output = Result<Bytes, HandlerError>> + Send>>;

/// A type-erased handler function.
pub type ErasedHandler = Arc<dyn Fn(ExtractionContext) -> BoxedHandlerResult + Send + Sync>;

/// Error returned by a handler or by the resolution of its inputs.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// An extractor or dependency failed before the handler ran.
    #[error(transparent)]
    Dependency(#[from] DependencyError),

    /// The handler rejected the request.
    #[error(transparent)]
    App(#[from] AppError),

    /// The handler's output could not be encoded.
    #[error("failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HandlerError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Dependency(e) => e.status_code(),
            Self::App(e) => e.status_code(),
            Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Renders the error body sent to the client.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>) -> ErrorEnvelope {
        match self {
            Self::Dependency(DependencyError::Extraction(e)) => e.to_envelope(request_id),
            Self::Dependency(DependencyError::Rejected(e)) | Self::App(e) => {
                e.to_envelope(request_id)
            }
            Self::Serialization(_) => {
                AppError::internal("failed to serialize response").to_envelope(request_id)
            }
        }
    }
}

impl From<ExtractionError> for HandlerError {
    fn from(err: ExtractionError) -> Self {
        Self::Dependency(err.into())
    }
}

impl From<LookupError> for HandlerError {
    fn from(err: LookupError) -> Self {
        Self::App(err.into())
    }
}

impl From<ModelValidationError> for HandlerError {
    fn from(err: ModelValidationError) -> Self {
        Self::App(err.into())
    }
}

/// Registry mapping operation IDs to handlers.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, ErasedHandler>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler whose input is a [`FromRequest`] extractor.
    ///
    /// Tuples of extractors are accepted, so a handler may take several
    /// inputs at once. Registering the same operation twice replaces the
    /// earlier handler.
    pub fn register<E, Res, F, Fut>(&mut self, operation_id: impl Into<String>, handler: F)
    where
        E: FromRequest + Send + 'static,
        Res: Serialize + Send + 'static,
        F: Fn(E) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Res, HandlerError>> + Send + 'static,
    {
        self.register_with(operation_id, extract::<E>(), handler);
    }

    /// Registers a handler that receives the resolved output of `dependency`.
    ///
    /// The dependency is resolved anew for every request. If it fails, the
    /// handler does not run and the failure becomes the response.
    pub fn register_with<D, Res, F, Fut>(
        &mut self,
        operation_id: impl Into<String>,
        dependency: D,
        handler: F,
    ) where
        D: Dependency,
        Res: Serialize + Send + 'static,
        F: Fn(D::Output) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Res, HandlerError>> + Send + 'static,
    {
        let dependency = Arc::new(dependency);
        let handler = Arc::new(handler);

        let erased: ErasedHandler = Arc::new(move |ctx: ExtractionContext| -> BoxedHandlerResult {
            let resolved = dependency.resolve(&ctx);
            let handler = Arc::clone(&handler);
            Box::pin(async move {
                let input = resolved?;
                let response = handler(input).await?;
                Ok(Bytes::from(serde_json::to_vec(&response)?))
            })
        });

        self.handlers.insert(operation_id.into(), erased);
    }

    /// Returns the handler for an operation.
    #[must_use]
    pub fn get(&self, operation_id: &str) -> Option<&ErasedHandler> {
        self.handlers.get(operation_id)
    }

    /// Returns `true` if a handler is registered for the operation.
    #[must_use]
    pub fn contains(&self, operation_id: &str) -> bool {
        self.handlers.contains_key(operation_id)
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Returns the registered operation IDs in no particular order.
    pub fn operation_ids(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Runs the handler for `operation_id` against `ctx`.
    pub async fn invoke(
        &self,
        operation_id: &str,
        ctx: ExtractionContext,
    ) -> Result<Bytes, InvokeError> {
        let handler = self
            .handlers
            .get(operation_id)
            .ok_or_else(|| InvokeError::HandlerNotFound(operation_id.to_string()))?;

        handler(ctx).await.map_err(InvokeError::Handler)
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("operations", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Error from [`HandlerRegistry::invoke`].
#[derive(Debug, Error)]
pub enum InvokeError {
    /// No handler is registered for the operation.
    #[error("no handler registered for operation: {0}")]
    HandlerNotFound(String),

    /// The handler ran and failed.
    #[error(transparent)]
    Handler(HandlerError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastdca_core::{Catalog, GetObjectOr404};
    use fastdca_extract::{dependency_fn, path_param, ExtractionContextBuilder, Path, Query};
    use http::{Method, Uri};
    use serde::Deserialize;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn ctx(uri: &'static str, params: &[(&str, &str)]) -> ExtractionContext {
        params
            .iter()
            .fold(
                ExtractionContextBuilder::new()
                    .method(Method::GET)
                    .uri(Uri::from_static(uri)),
                |b, (k, v)| b.path_param(*k, *v),
            )
            .build()
    }

    fn users() -> GetObjectOr404<String> {
        GetObjectOr404::new(
            [("8", "Ahmed"), ("9", "Sara")]
                .into_iter()
                .map(|(k, v)| (k, v.to_string()))
                .collect::<Catalog<String>>(),
        )
    }

    #[tokio::test]
    async fn test_unit_extractor_handler() {
        let mut registry = HandlerRegistry::new();
        registry.register("readRoot", |(): ()| async {
            Ok::<_, HandlerError>(serde_json::json!({"Hello": "World"}))
        });

        let body = registry.invoke("readRoot", ctx("/", &[])).await.unwrap();
        assert_eq!(body, Bytes::from_static(br#"{"Hello":"World"}"#));
    }

    #[tokio::test]
    async fn test_tuple_extractor_handler() {
        #[derive(Deserialize)]
        struct Q {
            q: Option<String>,
        }

        let mut registry = HandlerRegistry::new();
        registry.register(
            "readItem",
            |(Path(item_id), Query(query)): (Path<i64>, Query<Q>)| async move {
                Ok::<_, HandlerError>(serde_json::json!({"item_id": item_id, "q": query.q}))
            },
        );

        let body = registry
            .invoke("readItem", ctx("/items/5?q=hi", &[("item_id", "5")]))
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, serde_json::json!({"item_id": 5, "q": "hi"}));
    }

    #[tokio::test]
    async fn test_string_result_is_json_string() {
        let mut registry = HandlerRegistry::new();
        registry.register_with("getUser", users(), |name: String| async move {
            Ok::<_, HandlerError>(name)
        });

        let body = registry
            .invoke("getUser", ctx("/user/9", &[("id", "9")]))
            .await
            .unwrap();
        assert_eq!(body, Bytes::from_static(b"\"Sara\""));
    }

    #[tokio::test]
    async fn test_dependency_rejection_skips_handler() {
        let mut registry = HandlerRegistry::new();
        let called = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&called);
        registry.register_with("getUser", users(), move |name: String| {
            let flag = Arc::clone(&flag);
            async move {
                flag.store(true, Ordering::SeqCst);
                Ok::<_, HandlerError>(name)
            }
        });

        let err = registry
            .invoke("getUser", ctx("/user/1", &[("id", "1")]))
            .await
            .unwrap_err();
        match err {
            InvokeError::Handler(e) => {
                assert_eq!(e.status_code(), StatusCode::NOT_FOUND);
                let envelope = e.to_envelope(None);
                assert_eq!(envelope.error.message, "Object ID 1 not found");
                assert_eq!(envelope.error.code, "RESOURCE_NOT_FOUND");
            }
            other => panic!("expected handler error, got {other:?}"),
        }
        assert!(!called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_dependency_tuple() {
        let plus_one = dependency_fn(|c| Ok(path_param::<i64>(c, "num")? + 1));
        let plus_two = dependency_fn(|c| Ok(path_param::<i64>(c, "num")? + 2));
        let num = dependency_fn(|c| Ok(path_param::<i64>(c, "num")?));

        let mut registry = HandlerRegistry::new();
        registry.register_with(
            "getMain",
            (num, plus_one, plus_two),
            |(n, a, b): (i64, i64, i64)| async move {
                Ok::<_, HandlerError>(format!("Pakistan {}", n + a + b))
            },
        );

        let body = registry
            .invoke("getMain", ctx("/main/5", &[("num", "5")]))
            .await
            .unwrap();
        assert_eq!(body, Bytes::from_static(b"\"Pakistan 18\""));
    }

    #[tokio::test]
    async fn test_extraction_failure_status() {
        let mut registry = HandlerRegistry::new();
        registry.register("readItem", |Path(id): Path<i64>| async move {
            Ok::<_, HandlerError>(id)
        });

        let err = registry
            .invoke("readItem", ctx("/items/abc", &[("item_id", "abc")]))
            .await
            .unwrap_err();
        let InvokeError::Handler(e) = err else {
            panic!("expected handler error");
        };
        assert_eq!(e.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_handler() {
        let registry = HandlerRegistry::new();
        let err = registry.invoke("nope", ctx("/", &[])).await.unwrap_err();
        assert!(matches!(err, InvokeError::HandlerNotFound(ref op) if op == "nope"));
    }

    #[test]
    fn test_registry_bookkeeping() {
        let mut registry = HandlerRegistry::new();
        assert!(registry.is_empty());

        registry.register("a", |(): ()| async { Ok::<_, HandlerError>(1) });
        registry.register("b", |(): ()| async { Ok::<_, HandlerError>(2) });
        registry.register("a", |(): ()| async { Ok::<_, HandlerError>(3) });

        assert_eq!(registry.len(), 2);
        assert!(registry.get("b").is_some());
        let mut ids: Vec<_> = registry.operation_ids().collect();
        ids.sort_unstable();
        assert_eq!(ids, ["a", "b"]);
        assert!(format!("{registry:?}").contains("HandlerRegistry"));
    }

    #[test]
    fn test_handler_error_conversions() {
        let lookup: HandlerError = LookupError::NotFound { id: "7".into() }.into();
        assert_eq!(lookup.status_code(), StatusCode::NOT_FOUND);

        let app: HandlerError = AppError::bad_request("bad").into();
        assert_eq!(app.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(app.to_envelope(Some("rid")).request_id.as_deref(), Some("rid"));
    }
}
