//! Common error types for lexd

use thiserror::Error;

/// Common result type for lexd operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the lexd tools
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error for stored documents
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found (unknown form, unknown change id)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation not valid in the current state (e.g. re-reviewing a
    /// change that already reached a terminal status)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Sense key failed to parse
    #[error("Invalid sense key: {0}")]
    InvalidKey(String),

    /// Invalid input or request parameter
    #[error("Validation error: {0}")]
    Validation(String),

    /// Oracle response did not match the expected shape
    #[error("Malformed oracle response: {0}")]
    MalformedOracleResponse(String),

    /// Write lock could not be acquired within the retry budget
    #[error("Database busy: {0}")]
    Busy(String),
}

impl Error {
    /// True when retrying the same operation may succeed (lock contention).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Busy(_))
    }
}
