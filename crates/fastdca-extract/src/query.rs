//! Query string extractor.

use crate::{ExtractionContext, ExtractionError, ExtractionSource, FromRequest};
use serde::de::DeserializeOwned;
use std::ops::Deref;

/// Extractor for URL query string parameters.
///
/// Use `Option<T>` fields for optional parameters and bare types for
/// required ones; a missing required field is a 400.
///
/// # Example
///
/// ```rust
/// use fastdca_extract::{ExtractionContextBuilder, FromRequest, Query};
/// use http::{Method, Uri};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct SigninParams {
///     username: Option<String>,
///     password: Option<String>,
/// }
///
/// let ctx = ExtractionContextBuilder::new()
///     .method(Method::GET)
///     .uri(Uri::from_static("/signin?username=admin"))
///     .build();
///
/// let Query(params) = Query::<SigninParams>::from_request(&ctx).unwrap();
/// assert_eq!(params.username.as_deref(), Some("admin"));
/// assert_eq!(params.password, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query<T>(pub T);

impl<T> Query<T> {
    /// Consumes the Query and returns the inner value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Query<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: DeserializeOwned> FromRequest for Query<T> {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        let query_string = ctx.query_string().unwrap_or("");

        let value: T = serde_urlencoded::from_str(query_string).map_err(|e| {
            ExtractionError::deserialization_failed(ExtractionSource::Query, e.to_string())
        })?;

        Ok(Query(value))
    }
}

/// Raw query string access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawQuery(pub Option<String>);

impl FromRequest for RawQuery {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        Ok(RawQuery(ctx.query_string().map(String::from)))
    }
}
