//! Error types for worklog-core

use thiserror::Error;

/// Main error type for the worklog-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Webhook delivery error
    #[error("webhook error: {0}")]
    Webhook(String),

    /// The store failed to open or migrate at startup and stays
    /// unavailable for the rest of the process lifetime.
    #[error("store unavailable for this process")]
    StoreUnavailable,
}

/// Result type alias for worklog-core
pub type Result<T> = std::result::Result<T, Error>;
