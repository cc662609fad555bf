pub mod factory;
pub mod key_value;

pub use factory::SqliteStorageFactory;
pub use key_value::SqliteKeyValueStore;
