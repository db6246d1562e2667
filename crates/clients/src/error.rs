//! Client facade error types.

use thiserror::Error;

use crate::dependency::Dependency;

/// Errors produced by the dependency client facades.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The dependency's circuit breaker denied the call; no I/O was attempted.
    #[error("{dependency} service unavailable: circuit breaker is open")]
    Unavailable { dependency: Dependency },

    /// The call was attempted and failed: transport error, non-success
    /// status, or an undecodable response body.
    #[error("{dependency} service call failed: {message}")]
    Failed {
        dependency: Dependency,
        /// Downstream status code, if a response was received. Preserved so
        /// the gateway can pass through failures it did not originate.
        status: Option<u16>,
        message: String,
    },

    /// The dependency responded but the requested entity is absent.
    /// Does not count against the circuit breaker.
    #[error("{what} not found")]
    NotFound { what: String },
}

impl ClientError {
    /// Returns true when the breaker short-circuited the call.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ClientError::Unavailable { .. })
    }

    /// Returns true for absent-entity outcomes.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }

    /// The downstream status code to pass through, when one exists.
    pub fn downstream_status(&self) -> Option<u16> {
        match self {
            ClientError::Failed { status, .. } => *status,
            _ => None,
        }
    }
}

/// Convenience type alias for facade results.
pub type Result<T> = std::result::Result<T, ClientError>;
