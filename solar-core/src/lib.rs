pub mod calculations;
pub mod db;
pub mod models;
pub mod store;

pub use db::key_value::{KeyValueStore, StorageError};
pub use models::*;
pub use store::{ProjectStore, StoreError, StorePhase, StoreState};
