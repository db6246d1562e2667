//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use clients::ClientError;
use sagas::SagaError;

/// API-level error type that maps to HTTP responses.
///
/// Status policy: 400 for invalid input, 404 for absent entities, 503 for
/// breaker denials and gateway-originated failures, and pass-through of the
/// downstream status code where the gateway did not originate the failure.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Resource not found.
    NotFound(String),
    /// A direct dependency call failed.
    Client(ClientError),
    /// Saga execution error.
    Saga(SagaError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Client(err) => client_error_to_response(err),
            ApiError::Saga(err) => saga_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn client_error_to_response(err: ClientError) -> (StatusCode, String) {
    match &err {
        ClientError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        ClientError::Unavailable { .. } => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
        ClientError::Failed { status, .. } => (pass_through(*status), err.to_string()),
    }
}

fn saga_error_to_response(err: SagaError) -> (StatusCode, String) {
    match err {
        SagaError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
        SagaError::Client(client_err) => client_error_to_response(client_err),
        SagaError::Queue(queue_err) => {
            tracing::error!(error = %queue_err, "retry queue store failure");
            (StatusCode::INTERNAL_SERVER_ERROR, queue_err.to_string())
        }
    }
}

/// Keeps a failing downstream's own error status; everything else is a 503.
fn pass_through(status: Option<u16>) -> StatusCode {
    status
        .filter(|s| *s >= 400)
        .and_then(|s| StatusCode::from_u16(s).ok())
        .unwrap_or(StatusCode::SERVICE_UNAVAILABLE)
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        ApiError::Client(err)
    }
}

impl From<SagaError> for ApiError {
    fn from(err: SagaError) -> Self {
        ApiError::Saga(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clients::Dependency;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn downstream_status_passes_through() {
        let err = ApiError::Client(ClientError::Failed {
            dependency: Dependency::Payment,
            status: Some(429),
            message: "too many requests".to_string(),
        });
        assert_eq!(status_of(err), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn transport_failure_maps_to_503() {
        let err = ApiError::Client(ClientError::Failed {
            dependency: Dependency::Payment,
            status: None,
            message: "connection refused".to_string(),
        });
        assert_eq!(status_of(err), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn breaker_denial_maps_to_503() {
        let err = ApiError::Client(ClientError::Unavailable {
            dependency: Dependency::Loyalty,
        });
        assert_eq!(status_of(err), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = ApiError::Client(ClientError::NotFound {
            what: "hotel".to_string(),
        });
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_maps_to_400() {
        let err = ApiError::Saga(SagaError::Validation("bad dates".to_string()));
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }
}
