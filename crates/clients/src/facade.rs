//! The breaker-gated dependency client facade.

use std::sync::Arc;

use resilience::CircuitBreaker;
use serde::de::DeserializeOwned;

use crate::backend::{BackendResponse, HttpBackend, Method};
use crate::dependency::Dependency;
use crate::error::{ClientError, Result};

/// One named downstream behind its circuit breaker.
///
/// Call protocol: the breaker must allow the request before any I/O is
/// attempted; afterwards, transport errors, non-success statuses and
/// undecodable bodies record a failure, while a decodable success records a
/// success. A success response whose body is empty or `null` where a payload
/// was required is reported as [`ClientError::NotFound`] without counting
/// against the breaker.
#[derive(Clone)]
pub struct DependencyClient<B> {
    dependency: Dependency,
    backend: B,
    breaker: Arc<CircuitBreaker>,
}

impl<B: HttpBackend> DependencyClient<B> {
    /// Creates a facade around a backend and its process-wide breaker.
    pub fn new(dependency: Dependency, backend: B, breaker: Arc<CircuitBreaker>) -> Self {
        Self {
            dependency,
            backend,
            breaker,
        }
    }

    /// Which downstream this facade fronts.
    pub fn dependency(&self) -> Dependency {
        self.dependency
    }

    /// The breaker guarding this dependency.
    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Issues a call whose response body must decode to `T`.
    ///
    /// `what` names the expected entity for not-found reporting.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        headers: &[(&str, &str)],
        body: Option<&serde_json::Value>,
        what: &str,
    ) -> Result<T> {
        let response = self.request_raw(method, path, headers, body).await?;

        let text = response.body.trim();
        if text.is_empty() || text == "null" {
            self.breaker.record_success();
            return Err(ClientError::NotFound {
                what: what.to_string(),
            });
        }

        match serde_json::from_str(text) {
            Ok(value) => {
                self.breaker.record_success();
                Ok(value)
            }
            Err(err) => {
                self.breaker.record_failure();
                Err(ClientError::Failed {
                    dependency: self.dependency,
                    status: Some(response.status),
                    message: format!("undecodable response body: {err}"),
                })
            }
        }
    }

    /// Issues a call where only the status code matters.
    pub async fn request_unit(
        &self,
        method: Method,
        path: &str,
        headers: &[(&str, &str)],
        body: Option<&serde_json::Value>,
    ) -> Result<()> {
        self.request_raw(method, path, headers, body).await?;
        self.breaker.record_success();
        Ok(())
    }

    /// Gate, send, classify. Returns only success-status responses.
    async fn request_raw(
        &self,
        method: Method,
        path: &str,
        headers: &[(&str, &str)],
        body: Option<&serde_json::Value>,
    ) -> Result<BackendResponse> {
        if !self.breaker.allow_request() {
            tracing::debug!(dependency = %self.dependency, %path, "circuit breaker denied call");
            return Err(ClientError::Unavailable {
                dependency: self.dependency,
            });
        }

        tracing::debug!(dependency = %self.dependency, %method, %path, "calling downstream");
        match self.backend.send(method, path, headers, body).await {
            Err(err) => {
                self.breaker.record_failure();
                tracing::warn!(dependency = %self.dependency, %path, error = %err, "downstream transport failure");
                Err(ClientError::Failed {
                    dependency: self.dependency,
                    status: None,
                    message: err.to_string(),
                })
            }
            Ok(response) if !response.is_success() => {
                self.breaker.record_failure();
                tracing::warn!(
                    dependency = %self.dependency,
                    %path,
                    status = response.status,
                    "downstream returned non-success status"
                );
                Err(ClientError::Failed {
                    dependency: self.dependency,
                    status: Some(response.status),
                    message: format!("unexpected status {}", response.status),
                })
            }
            Ok(response) => Ok(response),
        }
    }
}
