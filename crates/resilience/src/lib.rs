//! Circuit breaker primitives for downstream fault isolation.
//!
//! One [`CircuitBreaker`] guards one downstream dependency. The breaker is
//! purely reactive: state only changes inside [`CircuitBreaker::allow_request`],
//! [`CircuitBreaker::record_success`] and [`CircuitBreaker::record_failure`] —
//! there is no background timer.

pub mod breaker;

pub use breaker::{BreakerSnapshot, BreakerState, CircuitBreaker, CircuitBreakerConfig};
