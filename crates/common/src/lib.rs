//! Shared identifiers and domain records for the booking gateway.

pub mod ids;
pub mod model;

pub use ids::{HotelUid, PaymentUid, ReservationUid};
pub use model::{
    Hotel, LoyaltyProfile, LoyaltyStatus, NewReservation, Payment, PaymentStatus, Reservation,
    ReservationStatus,
};
