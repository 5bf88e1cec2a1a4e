//! SQLite storage implementation for the SocialBoost catalog.
//!
//! This crate provides the durable backend using Diesel ORM with SQLite.
//! It implements the `KeyValueStore` trait defined in `socialboost-core` and
//! contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - The `kv_store` table holding the catalog's JSON collections
//!
//! # Architecture
//!
//! This crate is the only place in the workspace where Diesel dependencies
//! exist. The core catalog is storage-agnostic and works with traits.
//!
//! ```text
//!   core (catalog repository)
//!              │
//!              ▼
//!   storage-sqlite (this crate)
//!              │
//!              ▼
//!          SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod kv_store;
pub mod schema;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, get_db_path, init, run_migrations, DbConnection, DbPool,
};

// Re-export the store
pub use kv_store::SqliteKeyValueStore;

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from socialboost-core for convenience
pub use socialboost_core::errors::{Error, Result};
