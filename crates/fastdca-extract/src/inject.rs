//! Dependency injection extractor.

use crate::{ExtractionContext, ExtractionError, FromRequest};
use fastdca_core::InjectionError;
use std::fmt;
use std::sync::Arc;

/// Extractor for services registered in the request's [`Container`].
///
/// A missing container or an unregistered service is a server-side
/// misconfiguration and maps to a 500.
///
/// [`Container`]: fastdca_core::Container
///
/// # Example
///
/// ```rust
/// use fastdca_core::Container;
/// use fastdca_extract::{ExtractionContextBuilder, FromRequest, Inject};
/// use http::{Method, Uri};
/// use std::sync::Arc;
///
/// struct Goal(&'static str);
///
/// let container = Arc::new(Container::new().with(Arc::new(Goal("ship it"))));
/// let ctx = ExtractionContextBuilder::new()
///     .method(Method::GET)
///     .uri(Uri::from_static("/get-simple-goal"))
///     .container(container)
///     .build();
///
/// let goal = Inject::<Goal>::from_request(&ctx).unwrap();
/// assert_eq!(goal.0, "ship it");
/// ```
#[derive(Clone)]
pub struct Inject<T>(pub Arc<T>);

impl<T> Inject<T> {
    /// Consumes the wrapper and returns the inner Arc.
    pub fn into_inner(self) -> Arc<T> {
        self.0
    }
}

impl<T> std::ops::Deref for Inject<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: fmt::Debug> fmt::Debug for Inject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Inject").field(&self.0).finish()
    }
}

impl<T: Send + Sync + 'static> FromRequest for Inject<T> {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        let container = ctx
            .container()
            .ok_or_else(InjectionError::no_container::<T>)?;

        Ok(Inject(container.resolve_required::<T>()?))
    }
}
