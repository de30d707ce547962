//! JSON body extractor.

use crate::{ExtractionContext, ExtractionError, ExtractionSource, FromRequest};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::ops::Deref;

/// Maximum body size accepted by the JSON extractors (1 MB).
pub const MAX_JSON_BODY_SIZE: usize = 1024 * 1024;

/// Extractor for JSON request bodies.
///
/// The body must be non-empty and at most [`MAX_JSON_BODY_SIZE`] bytes.
/// Content-Type is not checked.
///
/// # Example
///
/// ```rust
/// use fastdca_extract::{ExtractionContextBuilder, FromRequest, Json};
/// use http::{Method, Uri};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Login {
///     username: String,
/// }
///
/// let ctx = ExtractionContextBuilder::new()
///     .method(Method::POST)
///     .uri(Uri::from_static("/login"))
///     .body(r#"{"username": "admin"}"#)
///     .build();
///
/// let Json(login) = Json::<Login>::from_request(&ctx).unwrap();
/// assert_eq!(login.username, "admin");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Consumes the Json and returns the inner value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: DeserializeOwned> FromRequest for Json<T> {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        let body = checked_body(ctx)?;
        serde_json::from_slice(body).map(Json).map_err(|e| {
            ExtractionError::deserialization_failed(ExtractionSource::Body, e.to_string())
        })
    }
}

/// Returns the body after the size and emptiness checks shared by the JSON extractors.
pub(crate) fn checked_body(ctx: &ExtractionContext) -> Result<&Bytes, ExtractionError> {
    let body = ctx.body();

    if body.len() > MAX_JSON_BODY_SIZE {
        return Err(ExtractionError::payload_too_large(
            MAX_JSON_BODY_SIZE,
            body.len(),
        ));
    }

    if body.is_empty() {
        return Err(ExtractionError::deserialization_failed(
            ExtractionSource::Body,
            "empty request body",
        ));
    }

    Ok(body)
}
