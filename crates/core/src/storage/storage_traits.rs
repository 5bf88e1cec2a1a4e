//! Key-value store trait.

use log::warn;

use crate::errors::StorageError;

/// Synchronous, string-keyed, string-valued store.
///
/// Implementations must report an absent key as `Ok(None)`, never as an
/// error, and removing an absent key succeeds.
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key` from the store.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Writes several keys as one logical operation.
    ///
    /// The default implementation writes sequentially and, when a write
    /// fails, restores the keys already written to their previous values.
    /// If that restore fails as well the error is
    /// [`StorageError::PartialWrite`], listing the keys left in their new
    /// state so the caller can retry. Backends with native transactions
    /// should override this.
    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StorageError> {
        let mut previous: Vec<(&str, Option<String>)> = Vec::with_capacity(entries.len());
        for (key, _) in entries {
            previous.push((*key, self.get(key)?));
        }

        for (index, (key, value)) in entries.iter().enumerate() {
            if let Err(err) = self.set(key, value) {
                warn!(
                    "Write of '{}' failed, rolling back {} earlier key(s): {}",
                    key, index, err
                );
                let mut stuck = Vec::new();
                for (prev_key, prev_value) in previous.iter().take(index) {
                    let restored = match prev_value {
                        Some(v) => self.set(prev_key, v),
                        None => self.remove(prev_key),
                    };
                    if restored.is_err() {
                        stuck.push(prev_key.to_string());
                    }
                }
                if stuck.is_empty() {
                    return Err(err);
                }
                return Err(StorageError::PartialWrite {
                    written: stuck,
                    reason: err.to_string(),
                });
            }
        }
        Ok(())
    }
}
