use async_trait::async_trait;

use solar_core::db::{StorageConfig, StorageFactory};
use solar_core::{KeyValueStore, StorageError};

use crate::key_value::SqliteKeyValueStore;

/// [`StorageFactory`] for SQLite.
///
/// Register this with a [`solar_core::db::StorageRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use solar_core::db::StorageRegistry;
/// use solar_db_sqlite::SqliteStorageFactory;
///
/// let mut registry = StorageRegistry::new();
/// registry.register(Box::new(SqliteStorageFactory));
/// ```
pub struct SqliteStorageFactory;

#[async_trait]
impl StorageFactory for SqliteStorageFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string` and bring
    /// its schema up to date.
    ///
    /// Accepted connection-string values:
    /// * A bare file path, e.g. `"octosolar.db"`. Created if missing.
    /// * A sqlx URL, e.g. `"sqlite:octosolar.db?mode=rwc"`.
    /// * `":memory:"`, an ephemeral database (useful for tests).
    async fn create(&self, config: &StorageConfig) -> Result<Box<dyn KeyValueStore>, StorageError> {
        let store = SqliteKeyValueStore::new(&config.connection_string)
            .await
            .map_err(|e| StorageError::Connection(format!("{e:#}")))?;
        store
            .run_migrations()
            .await
            .map_err(|e| StorageError::Backend(format!("{e:#}")))?;
        Ok(Box::new(store))
    }
}
