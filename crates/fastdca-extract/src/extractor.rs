//! Core extractor trait.

use crate::{ExtractionContext, ExtractionError};

/// Types that can be built from the parts of an HTTP request.
///
/// Extraction is synchronous: the server buffers the body before any
/// extractor runs.
///
/// # Example
///
/// ```rust
/// use fastdca_extract::{ExtractionContext, ExtractionError, ExtractionSource, FromRequest};
///
/// struct ObjectId(String);
///
/// impl FromRequest for ObjectId {
///     fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
///         ctx.path_params()
///             .get("id")
///             .map(|v| ObjectId(v.to_string()))
///             .ok_or_else(|| ExtractionError::missing(ExtractionSource::Path, "id"))
///     }
/// }
/// ```
///
/// Tuples of extractors are extractors too, so a handler can ask for
/// `(Path<ItemPath>, Query<ItemQuery>)` in one argument. The first failing
/// element aborts the whole tuple.
pub trait FromRequest: Sized {
    /// Extracts this type from the request context.
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError>;
}

// None instead of an error
impl<T: FromRequest> FromRequest for Option<T> {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        Ok(T::from_request(ctx).ok())
    }
}

// Lets the handler inspect the failure itself
impl<T: FromRequest> FromRequest for Result<T, ExtractionError> {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        Ok(T::from_request(ctx))
    }
}

macro_rules! impl_from_request_for_tuple {
    ($($T:ident),*) => {
        impl<$($T: FromRequest),*> FromRequest for ($($T,)*) {
            fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
                Ok(($($T::from_request(ctx)?,)*))
            }
        }
    };
}

impl_from_request_for_tuple!(T1);
impl_from_request_for_tuple!(T1, T2);
impl_from_request_for_tuple!(T1, T2, T3);
impl_from_request_for_tuple!(T1, T2, T3, T4);
impl_from_request_for_tuple!(T1, T2, T3, T4, T5);
impl_from_request_for_tuple!(T1, T2, T3, T4, T5, T6);

impl FromRequest for () {
    fn from_request(_ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        Ok(())
    }
}
