//! # FastDCA Extract
//!
//! Request extractors and dependencies for the FastDCA framework.
//!
//! ## Extractors
//!
//! | Extractor | Source | Description |
//! |-----------|--------|-------------|
//! | [`Path<T>`] | URL path | Typed path parameters with string coercion |
//! | [`Query<T>`] | Query string | Typed query parameters |
//! | [`Json<T>`] | Request body | Deserialize a JSON body |
//! | [`Valid<T>`] | Request body | Validate a JSON body against a [`Model`] |
//! | [`Inject<T>`] | Container | Shared service registered at startup |
//!
//! ## Dependencies
//!
//! A [`Dependency`] is a value resolved per request before the handler
//! runs. Closures become dependencies through [`dependency_fn`], extractors
//! through [`extract`], and tuples of dependencies resolve in order.
//! [`GetObjectOr404`](fastdca_core::GetObjectOr404) is a dependency that
//! reads the `id` path parameter.
//!
//! ## Errors
//!
//! Extractors fail with [`ExtractionError`], which maps onto 400, 413, 415,
//! 422 or 500. Dependencies may additionally reject a request with an
//! [`AppError`](fastdca_core::AppError), wrapped in [`DependencyError`].

#![doc(html_root_url = "https://docs.rs/fastdca-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod depends;
mod error;
mod extractor;
mod inject;
mod json;
mod params;
mod path;
mod query;
mod validate;

pub use context::{ExtractionContext, ExtractionContextBuilder};
pub use depends::{dependency_fn, extract, Dependency, DependencyError, Extract, FnDependency};
pub use error::{ExtractionError, ExtractionSource};
pub use extractor::FromRequest;
pub use inject::Inject;
pub use json::{Json, MAX_JSON_BODY_SIZE};
pub use params::Params;
pub use path::{path_param, Path};
pub use query::{Query, RawQuery};
pub use validate::{
    merge_validation_errors, FieldReader, Model, ModelValidationError, Valid, ROOT_FIELD,
};
