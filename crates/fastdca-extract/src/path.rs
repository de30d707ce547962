//! Path parameter extractor.

use crate::{ExtractionContext, ExtractionError, ExtractionSource, FromRequest};
use serde::de::DeserializeOwned;
use std::ops::Deref;

/// Extractor for URL path parameters.
///
/// The captured parameters are re-encoded as a form string and handed to
/// `serde_urlencoded`, which coerces `"5"` into integers, booleans and so on.
///
/// # Example
///
/// ```rust
/// use fastdca_extract::{ExtractionContextBuilder, FromRequest, Path};
/// use http::{Method, Uri};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct MainPath {
///     num: i64,
/// }
///
/// let ctx = ExtractionContextBuilder::new()
///     .method(Method::GET)
///     .uri(Uri::from_static("/main/5"))
///     .path_param("num", "5")
///     .build();
///
/// let Path(path) = Path::<MainPath>::from_request(&ctx).unwrap();
/// assert_eq!(path.num, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path<T>(pub T);

impl<T> Path<T> {
    /// Consumes the Path and returns the inner value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Path<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: DeserializeOwned> FromRequest for Path<T> {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        if ctx.path_params().is_empty() {
            return Err(ExtractionError::missing(
                ExtractionSource::Path,
                "<path parameters>",
            ));
        }

        // Encoding keeps values containing '&' or '=' intact.
        let pairs: Vec<(&str, &str)> = ctx.path_params().iter().collect();
        let encoded = serde_urlencoded::to_string(&pairs).map_err(|e| {
            ExtractionError::deserialization_failed(ExtractionSource::Path, e.to_string())
        })?;

        let value: T = serde_urlencoded::from_str(&encoded).map_err(|e| {
            ExtractionError::deserialization_failed(ExtractionSource::Path, e.to_string())
        })?;

        Ok(Path(value))
    }
}

/// Extracts and parses a single path parameter by name.
///
/// # Example
///
/// ```rust
/// use fastdca_extract::{path_param, ExtractionContextBuilder};
/// use http::{Method, Uri};
///
/// let ctx = ExtractionContextBuilder::new()
///     .method(Method::GET)
///     .uri(Uri::from_static("/items/42"))
///     .path_param("item_id", "42")
///     .build();
///
/// let item_id: i64 = path_param(&ctx, "item_id").unwrap();
/// assert_eq!(item_id, 42);
/// ```
pub fn path_param<T: std::str::FromStr>(
    ctx: &ExtractionContext,
    name: &str,
) -> Result<T, ExtractionError> {
    let value = ctx
        .path_params()
        .get(name)
        .ok_or_else(|| ExtractionError::missing(ExtractionSource::Path, name))?;

    value.parse().map_err(|_| {
        ExtractionError::invalid_type(
            ExtractionSource::Path,
            name,
            format!("failed to parse {value:?} as {}", std::any::type_name::<T>()),
        )
    })
}
