use diesel::prelude::*;
use diesel::result::Error as DieselError;
use log::debug;
use std::sync::Arc;

use super::model::KvEntryDB;
use crate::db::{DbConnection, DbPool};
use crate::errors::IntoCore;
use crate::schema::kv_store::dsl::*;
use socialboost_core::errors::StorageError;
use socialboost_core::storage::KeyValueStore;

/// [`KeyValueStore`] persisted in the `kv_store` table.
///
/// `set_many` runs in one `BEGIN IMMEDIATE` transaction, so multi-key
/// writes are all-or-nothing.
pub struct SqliteKeyValueStore {
    pool: Arc<DbPool>,
}

impl SqliteKeyValueStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        SqliteKeyValueStore { pool }
    }

    fn connection(&self) -> Result<DbConnection, StorageError> {
        self.pool.get().into_core()
    }

    /// Keys currently stored, in key order.
    pub fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut conn = self.connection()?;
        kv_store
            .select(store_key)
            .order(store_key.asc())
            .load::<String>(&mut conn)
            .into_core()
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut conn = self.connection()?;
        kv_store
            .find(key)
            .select(store_value)
            .first::<String>(&mut conn)
            .optional()
            .into_core()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut conn = self.connection()?;
        diesel::replace_into(kv_store)
            .values(&KvEntryDB::new(key, value))
            .execute(&mut conn)
            .into_core()?;
        debug!("Stored '{}' ({} bytes)", key, value.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut conn = self.connection()?;
        diesel::delete(kv_store.find(key))
            .execute(&mut conn)
            .into_core()?;
        Ok(())
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StorageError> {
        let mut conn = self.connection()?;
        conn.immediate_transaction::<_, DieselError, _>(|tx| {
            for (key, value) in entries {
                diesel::replace_into(kv_store)
                    .values(&KvEntryDB::new(key, value))
                    .execute(tx)?;
            }
            Ok(())
        })
        .into_core()?;
        debug!("Stored {} key(s) in one transaction", entries.len());
        Ok(())
    }
}
