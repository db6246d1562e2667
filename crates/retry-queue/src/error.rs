//! Retry queue error types.

use thiserror::Error;

/// Errors that can occur when interacting with the queue store.
#[derive(Debug, Error)]
pub enum QueueError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for queue operations.
pub type Result<T> = std::result::Result<T, QueueError>;
