//! Saga step names used in logs and compensation tracking.

/// Booking saga: fetch the hotel and price the stay.
pub const STEP_FETCH_HOTEL: &str = "fetch_hotel";

/// Booking saga: fetch the loyalty profile for the discount.
pub const STEP_FETCH_LOYALTY: &str = "fetch_loyalty";

/// Booking saga: create the payment record. Compensable.
pub const STEP_CREATE_PAYMENT: &str = "create_payment";

/// Booking saga: create the reservation record.
pub const STEP_CREATE_RESERVATION: &str = "create_reservation";

/// Booking saga: bump the loyalty tier. Best-effort with compensation.
pub const STEP_IMPROVE_LOYALTY: &str = "improve_loyalty";

/// Cancellation saga: load the reservation.
pub const STEP_FETCH_RESERVATION: &str = "fetch_reservation";

/// Cancellation saga: mark the reservation canceled.
pub const STEP_CANCEL_RESERVATION: &str = "cancel_reservation";

/// Cancellation saga: void the payment.
pub const STEP_CANCEL_PAYMENT: &str = "cancel_payment";

/// Cancellation saga: lower the loyalty tier. Best-effort with deferral.
pub const STEP_DEGRADE_LOYALTY: &str = "degrade_loyalty";
