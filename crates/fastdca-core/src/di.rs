//! Dependency injection container.
//!
//! Shared services (configuration, credentials, catalogs) are registered once
//! at startup and resolved by type while a request is being extracted.
//!
//! # Example
//!
//! ```rust
//! use fastdca_core::di::Container;
//! use std::sync::Arc;
//!
//! struct Credentials {
//!     username: String,
//! }
//!
//! let container = Container::new().with(Arc::new(Credentials {
//!     username: "admin".to_string(),
//! }));
//!
//! let creds: Arc<Credentials> = container.resolve().unwrap();
//! assert_eq!(creds.username, "admin");
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Error when a service cannot be resolved from the [`Container`].
#[derive(Debug, Clone, Error)]
#[error("Failed to inject {type_name}: {reason}")]
pub struct InjectionError {
    /// The type name that could not be resolved.
    pub type_name: &'static str,
    /// The reason for the failure.
    pub reason: String,
}

impl InjectionError {
    /// Creates an injection error for a service that was never registered.
    pub fn not_registered<T>() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            reason: "service not registered".to_string(),
        }
    }

    /// Creates an injection error for a request that carried no container.
    pub fn no_container<T>() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            reason: "no container attached to request".to_string(),
        }
    }
}

/// A type-keyed store of `Arc`-wrapped services.
///
/// The container is `Send + Sync`; the server wraps it in an `Arc` and hands
/// the same instance to every request.
#[derive(Default)]
pub struct Container {
    services: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Container {
    /// Creates a new empty container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            services: HashMap::new(),
        }
    }

    /// Registers a service, replacing any previous service of the same type.
    pub fn register<T: Send + Sync + 'static>(&mut self, service: Arc<T>) {
        self.services.insert(TypeId::of::<T>(), service);
    }

    /// Builder-style variant of [`register`](Self::register).
    #[must_use]
    pub fn with<T: Send + Sync + 'static>(mut self, service: Arc<T>) -> Self {
        self.register(service);
        self
    }

    /// Resolves a service, returning `None` if it is not registered.
    #[must_use]
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.services
            .get(&TypeId::of::<T>())
            .and_then(|s| s.clone().downcast::<T>().ok())
    }

    /// Resolves a service or returns an error.
    ///
    /// # Errors
    ///
    /// Returns [`InjectionError`] if the service is not registered.
    pub fn resolve_required<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, InjectionError> {
        self.resolve().ok_or_else(InjectionError::not_registered::<T>)
    }

    /// Checks if a service is registered.
    #[must_use]
    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.services.contains_key(&TypeId::of::<T>())
    }

    /// Returns the number of registered services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Returns `true` if no services are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("service_count", &self.services.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Greeting(&'static str);

    #[test]
    fn test_register_and_resolve() {
        let mut container = Container::new();
        container.register(Arc::new(Greeting("hello")));

        let service: Arc<Greeting> = container.resolve().expect("registered");
        assert_eq!(service.0, "hello");
    }

    #[test]
    fn test_register_replaces_previous() {
        let container = Container::new()
            .with(Arc::new(Greeting("first")))
            .with(Arc::new(Greeting("second")));

        assert_eq!(container.len(), 1);
        assert_eq!(container.resolve::<Greeting>().unwrap().0, "second");
    }

    #[test]
    fn test_resolve_required_missing() {
        let container = Container::new();
        let err = container.resolve_required::<Greeting>().unwrap_err();
        assert!(err.to_string().contains("Greeting"));
        assert!(err.to_string().contains("not registered"));
    }

    #[test]
    fn test_contains_and_len() {
        struct Other;

        let mut container = Container::new();
        assert!(container.is_empty());
        assert!(!container.contains::<Greeting>());

        container.register(Arc::new(Greeting("x")));
        container.register(Arc::new(Other));
        assert!(container.contains::<Greeting>());
        assert!(container.contains::<Other>());
        assert_eq!(container.len(), 2);
    }

    #[test]
    fn test_debug_hides_services() {
        let container = Container::new().with(Arc::new(Greeting("debug")));
        let debug = format!("{:?}", container);
        assert!(debug.contains("service_count: 1"));
    }
}
