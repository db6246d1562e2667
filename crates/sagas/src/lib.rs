//! Booking and cancellation sagas for the aggregation gateway.
//!
//! A saga sequences calls across the three downstream services. Required
//! steps abort the whole request on failure; best-effort steps are absorbed
//! locally, either by running a declared compensating action (booking) or by
//! deferring the work onto the retry queue (cancellation). There is no
//! distributed atomicity: consistency comes from compensation, and one
//! partial-failure window (a payment orphaned by a reservation-creation
//! failure) is accepted and documented rather than compensated.

pub mod booking;
pub mod cancellation;
pub mod enrichment;
pub mod error;
pub mod steps;

pub use booking::{BookingConfirmation, BookingRequest, BookingSaga};
pub use cancellation::CancellationSaga;
pub use enrichment::{HotelInfo, PaymentInfo, ReservationEnricher, ReservationView};
pub use error::SagaError;
