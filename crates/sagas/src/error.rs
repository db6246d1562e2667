//! Saga error types.

use clients::ClientError;
use retry_queue::QueueError;
use thiserror::Error;

/// Errors that can abort a saga.
#[derive(Debug, Error)]
pub enum SagaError {
    /// The request itself is malformed; no downstream call was made.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// A required downstream step failed or was denied by its breaker.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The retry queue store itself failed while deferring work.
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),
}

impl SagaError {
    /// The downstream status code to pass through, when one exists.
    pub fn downstream_status(&self) -> Option<u16> {
        match self {
            SagaError::Client(err) => err.downstream_status(),
            _ => None,
        }
    }
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;
