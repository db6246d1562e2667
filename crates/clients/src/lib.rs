//! Breaker-gated client facades for the downstream services.
//!
//! Each downstream dependency (reservation, loyalty, payment) is reached
//! through a [`DependencyClient`]: a thin facade that consults the
//! dependency's circuit breaker before any network I/O and records the
//! call outcome afterwards. Typed API traits sit on top, each with an HTTP
//! implementation and an in-memory fake for tests.

pub mod backend;
pub mod dependency;
pub mod error;
pub mod facade;
pub mod loyalty;
pub mod payment;
pub mod reservation;

pub use backend::{BackendResponse, HttpBackend, Method, ReqwestBackend, TransportError};
pub use dependency::Dependency;
pub use error::{ClientError, Result};
pub use facade::DependencyClient;
pub use loyalty::{HttpLoyaltyClient, InMemoryLoyaltyClient, LoyaltyApi};
pub use payment::{HttpPaymentClient, InMemoryPaymentClient, PaymentApi};
pub use reservation::{HttpReservationClient, InMemoryReservationClient, ReservationApi};

/// Header carrying the caller's identity to the downstream services.
pub const USER_NAME_HEADER: &str = "X-User-Name";
