//! In-memory key-value store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use super::storage_traits::KeyValueStore;
use crate::errors::StorageError;

/// Process-local [`KeyValueStore`] backed by a `HashMap`.
///
/// Besides serving ephemeral sessions it can emulate the two failure modes
/// of browser storage: a byte quota and a store that refuses all access.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
    quota_bytes: Option<usize>,
    unavailable: AtomicBool,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that rejects writes growing it beyond `quota_bytes`
    /// (keys and values counted together).
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::default()
        }
    }

    /// Makes every subsequent call fail with [`StorageError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(
                "in-memory store disabled".to_string(),
            ));
        }
        Ok(())
    }

    fn check_quota(
        &self,
        entries: &HashMap<String, String>,
        writes: &[(&str, &str)],
    ) -> Result<(), StorageError> {
        let Some(quota) = self.quota_bytes else {
            return Ok(());
        };
        let mut projected: usize = entries
            .iter()
            .filter(|(k, _)| !writes.iter().any(|(w, _)| *w == k.as_str()))
            .map(|(k, v)| k.len() + v.len())
            .sum();
        projected += writes.iter().map(|(k, v)| k.len() + v.len()).sum::<usize>();
        if projected > quota {
            return Err(StorageError::QuotaExceeded(format!(
                "{} bytes requested, quota is {}",
                projected, quota
            )));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_available()?;
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_available()?;
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        self.check_quota(&entries, &[(key, value)])?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_available()?;
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }

    /// Applies all entries under a single write lock, so the batch is either
    /// fully visible or not at all.
    fn set_many(&self, batch: &[(&str, String)]) -> Result<(), StorageError> {
        self.check_available()?;
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let writes: Vec<(&str, &str)> = batch.iter().map(|(k, v)| (*k, v.as_str())).collect();
        self.check_quota(&entries, &writes)?;
        for (key, value) in batch {
            entries.insert(key.to_string(), value.clone());
        }
        Ok(())
    }
}
