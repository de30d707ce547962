//! Lookup-or-fail dependency.
//!
//! A [`Catalog`] is an immutable id → value mapping built once at startup.
//! [`GetObjectOr404`] binds one catalog and turns every miss into a
//! [`LookupError::NotFound`], which the server renders as a 404 whose message
//! is `Object ID {id} not found`.
//!
//! # Example
//!
//! ```
//! use fastdca_core::{Catalog, GetObjectOr404};
//!
//! let blogs: Catalog<String> = [("1", "Generative AI Blog")]
//!     .into_iter()
//!     .map(|(k, v)| (k, v.to_string()))
//!     .collect();
//! let get_blog = GetObjectOr404::new(blogs);
//!
//! assert_eq!(get_blog.call("1").unwrap(), "Generative AI Blog");
//! assert_eq!(
//!     get_blog.call("99").unwrap_err().to_string(),
//!     "Object ID 99 not found"
//! );
//! ```

use crate::error::{AppError, ErrorCategory};
use http::StatusCode;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Error returned by [`GetObjectOr404::call`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The identifier is not a key of the bound catalog.
    #[error("Object ID {id} not found")]
    NotFound {
        /// The identifier exactly as supplied by the caller.
        id: String,
    },
}

impl LookupError {
    /// Returns the identifier that missed.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::NotFound { id } => id,
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        ErrorCategory::NotFound
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }
}

impl From<LookupError> for AppError {
    fn from(err: LookupError) -> Self {
        let message = err.to_string();
        match err {
            LookupError::NotFound { id } => AppError::not_found_id(message, id),
        }
    }
}

/// Immutable mapping from string identifier to value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog<V> {
    entries: HashMap<String, V>,
}

impl<V> Catalog<V> {
    /// Wraps an existing map.
    #[must_use]
    pub fn new(entries: HashMap<String, V>) -> Self {
        Self { entries }
    }

    /// Returns the value stored under `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&V> {
        self.entries.get(id)
    }

    /// Returns `true` if `id` is a key.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Iterates over the identifiers in unspecified order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for Catalog<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Dependency bound to one catalog that fetches an entry or fails with 404.
///
/// Cloning is cheap and every clone shares the same catalog.
#[derive(Debug)]
pub struct GetObjectOr404<V> {
    catalog: Arc<Catalog<V>>,
}

impl<V> Clone for GetObjectOr404<V> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
        }
    }
}

impl<V: Clone> GetObjectOr404<V> {
    /// Binds a catalog. Accepts either an owned [`Catalog`] or a shared `Arc`.
    #[must_use]
    pub fn new(catalog: impl Into<Arc<Catalog<V>>>) -> Self {
        Self {
            catalog: catalog.into(),
        }
    }

    /// Returns the bound catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog<V> {
        &self.catalog
    }

    /// Looks up `id`, returning a copy of the stored value.
    ///
    /// Empty or malformed identifiers are ordinary misses.
    pub fn call(&self, id: &str) -> Result<V, LookupError> {
        self.catalog
            .get(id)
            .cloned()
            .ok_or_else(|| LookupError::NotFound { id: id.to_string() })
    }
}
