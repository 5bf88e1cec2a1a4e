//! Database model for key-value entries.

use diesel::prelude::*;

/// One stored key and its JSON document.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::kv_store)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct KvEntryDB {
    pub store_key: String,
    pub store_value: String,
}

impl KvEntryDB {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            store_key: key.to_string(),
            store_value: value.to_string(),
        }
    }
}
