//! Error types for jukeboxd
//!
//! Module-specific error types using thiserror for clear error propagation.

use thiserror::Error;

/// Main error type for jukeboxd
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote store (queue/pub-sub/status key) transport errors
    #[error("Store error: {0}")]
    Store(#[from] redis::RedisError),

    /// Media backend session or playback errors
    #[error("Backend error: {0}")]
    Backend(String),

    /// Malformed wire payload
    #[error("Payload error: {0}")]
    Payload(#[from] serde_json::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid state for operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using the jukeboxd Error
pub type Result<T> = std::result::Result<T, Error>;
