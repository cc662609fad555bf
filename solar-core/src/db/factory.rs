use std::collections::HashMap;

use async_trait::async_trait;

use super::key_value::{KeyValueStore, StorageError};

/// Backend-agnostic storage configuration.
///
/// `backend` must match the [`StorageFactory::backend_name`] of a registered
/// factory. `connection_string` is passed through to that factory unchanged.
///
/// | backend  | connection_string examples            |
/// |----------|---------------------------------------|
/// | `memory` | ignored                               |
/// | `sqlite` | `octosolar.db`, `:memory:`            |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Lowercase identifier matching a registered factory (e.g. `"sqlite"`).
    pub backend: String,
    /// Opaque value forwarded to the factory's `create` method.
    pub connection_string: String,
}

impl StorageConfig {
    pub fn new(
        backend: impl Into<String>,
        connection_string: impl Into<String>,
    ) -> Self {
        Self {
            backend: backend.into(),
            connection_string: connection_string.into(),
        }
    }

    /// Configuration for the process-local `"memory"` backend.
    pub fn memory() -> Self {
        Self::new("memory", "")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new("sqlite", ":memory:")
    }
}

/// One implementation per storage backend. Each backend crate exports a
/// unit struct implementing this trait, registered with a
/// [`StorageRegistry`] at startup.
#[async_trait]
pub trait StorageFactory: Send + Sync {
    /// Unique, lowercase identifier for this backend.
    fn backend_name(&self) -> &'static str;

    /// Open (or create) the backing store. Implementations may run
    /// migrations inside this method.
    async fn create(&self, config: &StorageConfig) -> Result<Box<dyn KeyValueStore>, StorageError>;
}

/// Registry of [`StorageFactory`] instances, keyed by backend name.
pub struct StorageRegistry {
    factories: HashMap<&'static str, Box<dyn StorageFactory>>,
}

impl StorageRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a backend factory. A factory with the same name is replaced.
    pub fn register(&mut self, factory: Box<dyn StorageFactory>) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Names of every registered backend, sorted alphabetically.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Dispatch to the factory matching `config.backend`.
    ///
    /// # Errors
    /// * [`StorageError::Configuration`] when no factory is registered for
    ///   the requested backend.
    /// * Any error the chosen factory returns.
    pub async fn create(&self, config: &StorageConfig) -> Result<Box<dyn KeyValueStore>, StorageError> {
        let factory = self
            .factories
            .get(config.backend.as_str())
            .ok_or_else(|| {
                StorageError::Configuration(format!(
                    "unknown backend '{}'; available: {:?}",
                    config.backend,
                    self.available_backends()
                ))
            })?;

        factory.create(config).await
    }
}

impl Default for StorageRegistry {
    fn default() -> Self {
        Self::new()
    }
}
