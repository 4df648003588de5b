//! Common error types for ReleaseDesk

use thiserror::Error;

/// Common result type for ReleaseDesk operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the wizard and the API service
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding/decoding of list-valued columns or payloads
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Write rejected because the stored revision moved on
    #[error("Stale revision: submitted {submitted}, current {current}")]
    StaleRevision { submitted: i64, current: i64 },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
