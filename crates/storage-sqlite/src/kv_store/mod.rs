//! SQLite implementation of the catalog's key-value store.

mod model;
mod repository;

pub use model::KvEntryDB;
pub use repository::SqliteKeyValueStore;

// Re-export trait from core for convenience
pub use socialboost_core::storage::KeyValueStore;
