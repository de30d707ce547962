//! # FastDCA Core
//!
//! Core types shared by every FastDCA crate.
//!
//! - [`AppError`] - Standard application error with HTTP status mapping
//! - [`Container`] - Type-keyed dependency injection container
//! - [`RequestContext`] - Per-request id and operation metadata
//! - [`GetObjectOr404`] - Lookup-or-fail dependency over a [`Catalog`]

#![doc(html_root_url = "https://docs.rs/fastdca-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
pub mod di;
mod error;
pub mod lookup;

pub use context::{RequestContext, RequestId};
pub use di::{Container, InjectionError};
pub use error::{AppError, AppResult, ErrorCategory, ErrorDetail, ErrorEnvelope, FieldErrors};
pub use lookup::{Catalog, GetObjectOr404, LookupError};
