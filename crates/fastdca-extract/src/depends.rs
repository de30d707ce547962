//! Request-scoped dependencies.
//!
//! A [`Dependency`] computes a value from the request before the handler
//! runs. Unlike [`FromRequest`], a dependency is a *value*: it can own state
//! such as a catalog, and it may reject the request with an application
//! error (for instance a 404) instead of an extraction error.
//!
//! Dependencies compose as tuples: `(a, b, c)` resolves each in order and
//! yields `(a_out, b_out, c_out)`, stopping at the first failure.
//!
//! # Example
//!
//! ```rust
//! use fastdca_extract::{dependency_fn, path_param, Dependency, ExtractionContextBuilder};
//! use http::{Method, Uri};
//!
//! let plus_one = dependency_fn(|ctx| Ok(path_param::<i64>(ctx, "num")? + 1));
//! let plus_two = dependency_fn(|ctx| Ok(path_param::<i64>(ctx, "num")? + 2));
//!
//! let ctx = ExtractionContextBuilder::new()
//!     .method(Method::GET)
//!     .uri(Uri::from_static("/main/5"))
//!     .path_param("num", "5")
//!     .build();
//!
//! assert_eq!((plus_one, plus_two).resolve(&ctx).unwrap(), (6, 7));
//! ```

use crate::{ExtractionContext, ExtractionError, ExtractionSource, FromRequest};
use fastdca_core::{AppError, GetObjectOr404, LookupError};
use http::StatusCode;
use std::fmt;
use std::marker::PhantomData;
use thiserror::Error;

/// Error produced while resolving a [`Dependency`].
#[derive(Debug, Error)]
pub enum DependencyError {
    /// The request did not carry what the dependency needed.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// The dependency refused the request.
    #[error(transparent)]
    Rejected(#[from] AppError),
}

impl DependencyError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Extraction(e) => e.status_code(),
            Self::Rejected(e) => e.status_code(),
        }
    }
}

impl From<LookupError> for DependencyError {
    fn from(err: LookupError) -> Self {
        Self::Rejected(err.into())
    }
}

/// A value that can be resolved once per request.
pub trait Dependency: Send + Sync + 'static {
    /// The resolved value handed to the handler.
    type Output: Send + 'static;

    /// Resolves the dependency against the current request.
    fn resolve(&self, ctx: &ExtractionContext) -> Result<Self::Output, DependencyError>;
}

/// The lookup unit reads the `id` path parameter of the enclosing route.
impl<V> Dependency for GetObjectOr404<V>
where
    V: Clone + Send + Sync + 'static,
{
    type Output = V;

    fn resolve(&self, ctx: &ExtractionContext) -> Result<V, DependencyError> {
        let id = ctx
            .path_params()
            .get("id")
            .ok_or_else(|| ExtractionError::missing(ExtractionSource::Path, "id"))?;
        Ok(self.call(id)?)
    }
}

/// Dependency backed by a closure. Built with [`dependency_fn`].
pub struct FnDependency<F> {
    f: F,
}

impl<F> fmt::Debug for FnDependency<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnDependency")
            .field("fn", &std::any::type_name::<F>())
            .finish()
    }
}

/// Wraps a closure as a [`Dependency`].
pub fn dependency_fn<F, T>(f: F) -> FnDependency<F>
where
    F: Fn(&ExtractionContext) -> Result<T, DependencyError> + Send + Sync + 'static,
    T: Send + 'static,
{
    FnDependency { f }
}

impl<F, T> Dependency for FnDependency<F>
where
    F: Fn(&ExtractionContext) -> Result<T, DependencyError> + Send + Sync + 'static,
    T: Send + 'static,
{
    type Output = T;

    fn resolve(&self, ctx: &ExtractionContext) -> Result<T, DependencyError> {
        (self.f)(ctx)
    }
}

/// Dependency that runs a [`FromRequest`] extractor. Built with [`extract`].
pub struct Extract<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for Extract<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Extract<{}>", std::any::type_name::<T>())
    }
}

/// Lifts an extractor into a dependency so it can sit in a dependency tuple.
#[must_use]
pub fn extract<T: FromRequest>() -> Extract<T> {
    Extract {
        _marker: PhantomData,
    }
}

impl<T: FromRequest + Send + 'static> Dependency for Extract<T> {
    type Output = T;

    fn resolve(&self, ctx: &ExtractionContext) -> Result<T, DependencyError> {
        Ok(T::from_request(ctx)?)
    }
}

macro_rules! impl_dependency_for_tuple {
    ($($D:ident),*) => {
        #[allow(non_snake_case)]
        impl<$($D: Dependency),*> Dependency for ($($D,)*) {
            type Output = ($($D::Output,)*);

            fn resolve(&self, ctx: &ExtractionContext) -> Result<Self::Output, DependencyError> {
                let ($($D,)*) = self;
                Ok(($($D.resolve(ctx)?,)*))
            }
        }
    };
}

impl_dependency_for_tuple!(D1);
impl_dependency_for_tuple!(D1, D2);
impl_dependency_for_tuple!(D1, D2, D3);
impl_dependency_for_tuple!(D1, D2, D3, D4);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExtractionContextBuilder, Query};
    use fastdca_core::{Catalog, ErrorCategory};
    use http::{Method, Uri};
    use serde::Deserialize;

    fn blogs() -> GetObjectOr404<String> {
        GetObjectOr404::new(
            [("1", "Generative AI Blog"), ("2", "Machine Learning Blog")]
                .into_iter()
                .map(|(k, v)| (k, v.to_string()))
                .collect::<Catalog<String>>(),
        )
    }

    fn ctx_with_id(id: &str) -> ExtractionContext {
        ExtractionContextBuilder::new()
            .method(Method::GET)
            .uri(Uri::from_static("/blog/x"))
            .path_param("id", id)
            .build()
    }

    #[test]
    fn test_lookup_dependency_hit() {
        assert_eq!(blogs().resolve(&ctx_with_id("2")).unwrap(), "Machine Learning Blog");
    }

    #[test]
    fn test_lookup_dependency_miss_is_rejection() {
        let err = blogs().resolve(&ctx_with_id("99")).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        match err {
            DependencyError::Rejected(app) => {
                assert_eq!(app.category(), ErrorCategory::NotFound);
                assert_eq!(app.message(), "Object ID 99 not found");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_lookup_dependency_without_id_param() {
        let ctx = ExtractionContextBuilder::new()
            .method(Method::GET)
            .uri(Uri::from_static("/blog"))
            .build();
        let err = blogs().resolve(&ctx).unwrap_err();
        assert!(matches!(err, DependencyError::Extraction(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_extract_dependency() {
        #[derive(Deserialize)]
        struct GoalQuery {
            username: String,
        }

        let ctx = ExtractionContextBuilder::new()
            .method(Method::GET)
            .uri(Uri::from_static("/get-goal?username=sara"))
            .build();
        let Query(q) = extract::<Query<GoalQuery>>().resolve(&ctx).unwrap();
        assert_eq!(q.username, "sara");
    }

    #[test]
    fn test_tuple_stops_at_first_failure() {
        let fails = dependency_fn(|_| -> Result<i64, DependencyError> {
            Err(AppError::validation("nope").into())
        });
        let never = dependency_fn(|_| -> Result<i64, DependencyError> {
            panic!("must not run after a failure")
        });

        let err = (fails, never).resolve(&ctx_with_id("1")).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_two_lookups_stay_independent() {
        let users = GetObjectOr404::new(
            [("8", "Ahmed".to_string())].into_iter().collect::<Catalog<String>>(),
        );
        let ctx = ctx_with_id("8");
        assert_eq!(users.resolve(&ctx).unwrap(), "Ahmed");
        assert!(blogs().resolve(&ctx).is_err());
    }
}
