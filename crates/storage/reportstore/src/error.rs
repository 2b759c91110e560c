//! Error types for the report store

use thiserror::Error;

/// Type alias for Results using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Main error type for report store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Report or resource not found in any tier
    #[error("Report not found: {0}")]
    NotFound(String),

    /// Attempted in-place change of a readonly report
    #[error("Report '{0}' is readonly, use 'Save As' with a new report name")]
    ReadOnly(String),

    /// Malformed report definition XML
    #[error("Invalid report content: {0}")]
    InvalidContent(String),

    /// Backend-specific error
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown report file extension
    #[error("Unknown report extension: {0}")]
    UnknownExtension(String),

    /// Report id is not acceptable as a storage key
    #[error("Invalid report id: {0}")]
    InvalidId(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Unsupported operation
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// Backend-specific errors
#[derive(Error, Debug)]
pub enum BackendError {
    /// SQLite error
    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Sled error
    #[cfg(feature = "sled")]
    #[error("Sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Generic backend error
    #[error("Backend error: {0}")]
    Other(String),
}

impl StoreError {
    /// Check if the error indicates a missing report or resource
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    /// Check if the error is a readonly violation
    pub fn is_read_only(&self) -> bool {
        matches!(self, StoreError::ReadOnly(_))
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Backend(BackendError::Sqlite(err))
    }
}

#[cfg(feature = "sled")]
impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        StoreError::Backend(BackendError::Sled(err))
    }
}
