//! Route handlers for the gateway API.

pub mod health;
pub mod hotels;
pub mod loyalty;
pub mod metrics;
pub mod reservations;
pub mod user;

use axum::http::HeaderMap;
use clients::{LoyaltyApi, PaymentApi, ReservationApi, USER_NAME_HEADER};
use retry_queue::QueueStore;
use sagas::{BookingSaga, CancellationSaga, ReservationEnricher};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
///
/// Built once at startup: the sagas inside share the process-wide circuit
/// breakers through their dependency facades.
pub struct AppState<R, L, P, Q> {
    pub booking: BookingSaga<R, L, P>,
    pub cancellation: CancellationSaga<R, L, P, Q>,
    pub enricher: ReservationEnricher<R, P>,
    pub reservation: R,
    pub loyalty: L,
}

impl<R, L, P, Q> AppState<R, L, P, Q>
where
    R: ReservationApi + Clone,
    L: LoyaltyApi + Clone,
    P: PaymentApi + Clone,
    Q: QueueStore,
{
    /// Wires the sagas and enricher over shared dependency facades.
    pub fn new(reservation: R, loyalty: L, payment: P, queue: Q) -> Self {
        Self {
            booking: BookingSaga::new(reservation.clone(), loyalty.clone(), payment.clone()),
            cancellation: CancellationSaga::new(
                reservation.clone(),
                loyalty.clone(),
                payment.clone(),
                queue,
            ),
            enricher: ReservationEnricher::new(reservation.clone(), payment),
            reservation,
            loyalty,
        }
    }
}

/// Extracts the caller identity from the `X-User-Name` header.
pub(crate) fn username(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(USER_NAME_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("Missing {USER_NAME_HEADER} header")))
}
