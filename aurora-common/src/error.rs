//! Common error types for Aurora
//!
//! Startup failures (config, root folder) and persistence failures share this
//! type; request-level errors live in each service's own API error.

use thiserror::Error;

/// Common result type for Aurora operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Aurora services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Stored record could not be encoded or decoded
    #[error("Storage format error: {0}")]
    Storage(String),
}
