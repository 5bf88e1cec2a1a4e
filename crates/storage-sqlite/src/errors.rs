//! Storage-specific error types for SQLite operations.
//!
//! This module provides error types that wrap Diesel-specific errors and convert
//! them to the storage-agnostic error types defined in `socialboost_core`.

use diesel::result::Error as DieselError;
use thiserror::Error;
use socialboost_core::errors::{Error, StorageError as CoreStorageError};

/// Storage-specific errors that wrap Diesel and r2d2 types.
///
/// These errors are internal to the storage layer and are converted to
/// `socialboost_core` errors before being returned to callers.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[from] diesel::ConnectionError),

    #[error("Connection pool error: {0}")]
    PoolError(#[from] r2d2::Error),

    #[error("Query execution failed: {0}")]
    QueryFailed(#[from] DieselError),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Database directory error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// True when SQLite reported `SQLITE_FULL`.
    fn is_disk_full(&self) -> bool {
        match self {
            StorageError::QueryFailed(DieselError::DatabaseError(_, info)) => {
                info.message().contains("database or disk is full")
            }
            _ => false,
        }
    }
}

impl From<StorageError> for CoreStorageError {
    fn from(err: StorageError) -> Self {
        if err.is_disk_full() {
            CoreStorageError::QuotaExceeded(err.to_string())
        } else {
            CoreStorageError::Unavailable(err.to_string())
        }
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Error::StorageUnavailable(err.into())
    }
}

/// Extension trait for converting Diesel and r2d2 results into the
/// key-value store's error type.
pub trait IntoCore<T> {
    fn into_core(self) -> std::result::Result<T, CoreStorageError>;
}

impl<T> IntoCore<T> for std::result::Result<T, DieselError> {
    fn into_core(self) -> std::result::Result<T, CoreStorageError> {
        self.map_err(|e| StorageError::from(e).into())
    }
}

impl<T> IntoCore<T> for std::result::Result<T, r2d2::Error> {
    fn into_core(self) -> std::result::Result<T, CoreStorageError> {
        self.map_err(|e| StorageError::from(e).into())
    }
}
