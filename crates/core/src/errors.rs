//! Core error types for the catalog.
//!
//! Every repository operation reports failures through [`Error`]. Storage
//! backends convert their own failures into [`StorageError`] before handing
//! them to the core, so this module stays storage-agnostic.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for catalog operations.
///
/// All variants are recoverable by the caller. A failed mutation never
/// leaves a partial write behind.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("A platform named '{0}' already exists")]
    DuplicateName(String),

    #[error("Platform '{0}' does not exist")]
    InvalidPlatform(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),
}

impl Error {
    /// Shorthand for an `InvalidInput` validation failure.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::Validation(ValidationError::InvalidInput(msg.into()))
    }

    pub fn platform_not_found(id: &str) -> Self {
        Error::NotFound(format!("Platform '{}'", id))
    }

    pub fn service_not_found(id: &str) -> Self {
        Error::NotFound(format!("Service '{}'", id))
    }

    /// True for input validation failures.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

/// Validation errors for user input.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),
}

/// Storage-agnostic failures of the key-value substrate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The store could not be reached at all (private mode, locked file, ...).
    #[error("Store is not accessible: {0}")]
    Unavailable(String),

    /// The write would exceed the store's capacity.
    #[error("Storage quota exceeded: {0}")]
    QuotaExceeded(String),

    /// A multi-key write failed after some keys were written and the
    /// previous values could not be restored.
    #[error("Partial write ({reason}); keys written: {}", written.join(", "))]
    PartialWrite { written: Vec<String>, reason: String },
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
