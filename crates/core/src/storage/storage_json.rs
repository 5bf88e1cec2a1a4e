//! JSON encoding of stored collections.

use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::storage_traits::KeyValueStore;
use crate::errors::{Error, Result, StorageError};

/// Loads the JSON array stored under `key`.
///
/// Absent keys, an unreachable store and malformed JSON all yield an empty
/// collection. Reads never fail; the degraded cases are logged.
pub fn load_collection<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Vec<T> {
    match try_load_collection(store, key) {
        Ok(items) => items,
        Err(err) => {
            warn!("Reading '{}' failed, treating it as empty: {}", key, err);
            Vec::new()
        }
    }
}

/// Loads the JSON array stored under `key`, failing if the store cannot be
/// read.
///
/// Used before a write: a collection that could not be read must not be
/// replaced. Malformed JSON still decodes as empty, and records that do not
/// decode are skipped.
pub fn try_load_collection<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> std::result::Result<Vec<T>, StorageError> {
    match store.get(key)? {
        Some(raw) => Ok(decode_collection(key, &raw)),
        None => Ok(Vec::new()),
    }
}

fn decode_collection<T: DeserializeOwned>(key: &str, raw: &str) -> Vec<T> {
    let records = match serde_json::from_str::<Vec<Value>>(raw) {
        Ok(records) => records,
        Err(err) => {
            warn!("Stored '{}' is not valid JSON, treating it as empty: {}", key, err);
            return Vec::new();
        }
    };

    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(item) => Some(item),
            Err(err) => {
                warn!("Skipping record {} of '{}': {}", index, key, err);
                None
            }
        })
        .collect()
}

/// Encodes a collection for storage.
pub fn to_json<T: Serialize>(items: &[T]) -> Result<String> {
    serde_json::to_string(items)
        .map_err(|e| Error::invalid_input(format!("Failed to encode collection: {}", e)))
}
