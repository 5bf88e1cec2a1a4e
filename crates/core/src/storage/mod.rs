//! Key-value persistence for the catalog.
//!
//! The catalog persists two JSON documents into a string-keyed store. The
//! store itself is abstracted behind [`KeyValueStore`] so the repository can
//! run against memory (tests, ephemeral sessions) or a durable backend such
//! as the `socialboost-storage-sqlite` crate.

mod memory_store;
mod storage_constants;
mod storage_json;
mod storage_traits;

pub use memory_store::MemoryKeyValueStore;
pub use storage_constants::*;
pub use storage_json::{load_collection, to_json, try_load_collection};
pub use storage_traits::KeyValueStore;
