//! The booking saga.

use chrono::NaiveDate;
use clients::{LoyaltyApi, PaymentApi, ReservationApi};
use common::ids::HotelUid;
use common::{NewReservation, PaymentUid, ReservationStatus, ReservationUid};
use serde::{Deserialize, Serialize};

use crate::enrichment::PaymentInfo;
use crate::error::{Result, SagaError};
use crate::steps;

/// Client request to book a hotel stay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub hotel_uid: HotelUid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Successful booking outcome returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    pub reservation_uid: ReservationUid,
    pub hotel_uid: HotelUid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub discount: u32,
    pub status: ReservationStatus,
    pub payment: PaymentInfo,
}

/// Compensation bookkeeping for a booking in flight.
///
/// Compensable steps are pushed as they complete; on a later best-effort
/// failure the registered undo actions run in reverse order.
#[derive(Debug, Default)]
struct BookingProgress {
    completed: Vec<&'static str>,
    payment_uid: Option<PaymentUid>,
}

/// Orchestrates the five-step booking flow.
///
/// Steps 1-4 are required: a failure (or a breaker denial) aborts the saga
/// and surfaces to the caller. Step 5 is best-effort with compensation: a
/// failed loyalty improvement deletes the payment created in step 3 and the
/// request fails, leaving no confirmed booking behind.
pub struct BookingSaga<R, L, P> {
    reservation: R,
    loyalty: L,
    payment: P,
}

impl<R, L, P> BookingSaga<R, L, P>
where
    R: ReservationApi,
    L: LoyaltyApi,
    P: PaymentApi,
{
    /// Creates a new booking saga over the three dependency facades.
    pub fn new(reservation: R, loyalty: L, payment: P) -> Self {
        Self {
            reservation,
            loyalty,
            payment,
        }
    }

    /// Executes the saga for one booking request.
    #[tracing::instrument(skip(self, request), fields(saga_type = "Booking"))]
    pub async fn execute(
        &self,
        username: &str,
        request: BookingRequest,
    ) -> Result<BookingConfirmation> {
        metrics::counter!("booking_saga_total").increment(1);
        let saga_start = std::time::Instant::now();

        let nights = (request.end_date - request.start_date).num_days();
        if nights < 1 {
            return Err(SagaError::Validation(
                "end date must be after start date".to_string(),
            ));
        }

        let mut progress = BookingProgress::default();

        // Step 1: price the stay.
        tracing::info!(step = steps::STEP_FETCH_HOTEL, "saga step started");
        let hotel = self.reservation.get_hotel(request.hotel_uid).await?;
        let cost = nights * hotel.price;

        // Step 2: apply the loyalty discount, truncating toward zero.
        tracing::info!(step = steps::STEP_FETCH_LOYALTY, "saga step started");
        let profile = self.loyalty.get_profile(username).await?;
        let discount = profile.discount.min(100);
        let discounted = cost * (100 - i64::from(discount)) / 100;

        // Step 3: capture the payment. Compensable from here on.
        tracing::info!(step = steps::STEP_CREATE_PAYMENT, "saga step started");
        let payment = self.payment.create_payment(discounted).await?;
        progress.payment_uid = Some(payment.payment_uid);
        progress.completed.push(steps::STEP_CREATE_PAYMENT);

        // Step 4: create the reservation record. A failure here leaves the
        // captured payment in place: an accepted partial-failure window.
        tracing::info!(step = steps::STEP_CREATE_RESERVATION, "saga step started");
        let reservation = self
            .reservation
            .create_reservation(NewReservation {
                username: username.to_string(),
                hotel_id: hotel.id,
                payment_uid: payment.payment_uid,
                start_date: request.start_date,
                end_date: request.end_date,
                status: ReservationStatus::Paid,
            })
            .await?;

        // Step 5: loyalty improvement. Any failure outcome, including a
        // breaker denial, compensates the payment and fails the booking.
        tracing::info!(step = steps::STEP_IMPROVE_LOYALTY, "saga step started");
        if let Err(err) = self.loyalty.improve(username).await {
            tracing::warn!(
                step = steps::STEP_IMPROVE_LOYALTY,
                error = %err,
                "saga step failed, compensating"
            );
            self.compensate(&progress).await;
            metrics::counter!("booking_saga_compensated").increment(1);
            return Err(err.into());
        }

        let duration = saga_start.elapsed().as_secs_f64();
        metrics::histogram!("saga_duration_seconds").record(duration);
        tracing::info!(
            reservation_uid = %reservation.reservation_uid,
            duration,
            "booking saga completed"
        );

        Ok(BookingConfirmation {
            reservation_uid: reservation.reservation_uid,
            hotel_uid: hotel.hotel_uid,
            start_date: request.start_date,
            end_date: request.end_date,
            discount,
            status: ReservationStatus::Paid,
            payment: PaymentInfo::from(payment),
        })
    }

    /// Runs undo actions for completed compensable steps in reverse order.
    ///
    /// Compensation failures are logged and swallowed; there is nothing
    /// further to unwind.
    async fn compensate(&self, progress: &BookingProgress) {
        for step in progress.completed.iter().rev() {
            match *step {
                steps::STEP_CREATE_PAYMENT => {
                    let Some(payment_uid) = progress.payment_uid else {
                        continue;
                    };
                    match self.payment.delete_payment(payment_uid).await {
                        Ok(()) => {
                            tracing::info!(step, %payment_uid, "compensation applied");
                        }
                        Err(err) => {
                            tracing::error!(step, %payment_uid, error = %err, "compensation failed");
                        }
                    }
                }
                _ => {}
            }
        }
    }
}
