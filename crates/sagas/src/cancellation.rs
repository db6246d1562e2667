//! The cancellation saga.

use clients::{LoyaltyApi, PaymentApi, ReservationApi};
use common::{PaymentStatus, ReservationStatus, ReservationUid};
use retry_queue::{LOYALTY_DEGRADE_CHANNEL, QueueStore};

use crate::error::Result;
use crate::steps;

/// Orchestrates the cancellation flow.
///
/// Steps 1-3 are required; once they complete, the cancellation is reported
/// successful regardless of step 4. The loyalty degrade is fire-and-defer:
/// any failure outcome pushes the username onto the retry queue for the
/// drain worker, and never blocks the caller's response.
pub struct CancellationSaga<R, L, P, Q> {
    reservation: R,
    loyalty: L,
    payment: P,
    queue: Q,
}

impl<R, L, P, Q> CancellationSaga<R, L, P, Q>
where
    R: ReservationApi,
    L: LoyaltyApi,
    P: PaymentApi,
    Q: QueueStore,
{
    /// Creates a new cancellation saga over the dependency facades and queue.
    pub fn new(reservation: R, loyalty: L, payment: P, queue: Q) -> Self {
        Self {
            reservation,
            loyalty,
            payment,
            queue,
        }
    }

    /// Executes the saga for one cancellation request.
    #[tracing::instrument(skip(self), fields(saga_type = "Cancellation"))]
    pub async fn execute(&self, username: &str, reservation_uid: ReservationUid) -> Result<()> {
        metrics::counter!("cancellation_saga_total").increment(1);

        // Step 1: load the reservation.
        tracing::info!(step = steps::STEP_FETCH_RESERVATION, "saga step started");
        let mut reservation = self
            .reservation
            .get_reservation(reservation_uid, username)
            .await?;

        // Step 2: mark it canceled.
        tracing::info!(step = steps::STEP_CANCEL_RESERVATION, "saga step started");
        reservation.status = ReservationStatus::Canceled;
        self.reservation.update_reservation(&reservation).await?;

        // Step 3: void the payment.
        tracing::info!(step = steps::STEP_CANCEL_PAYMENT, "saga step started");
        let mut payment = self.payment.get_payment(reservation.payment_uid).await?;
        payment.status = PaymentStatus::Canceled;
        self.payment.update_payment(&payment).await?;

        // Step 4: fire the degrade; on any failure outcome, enqueue instead.
        tracing::info!(step = steps::STEP_DEGRADE_LOYALTY, "saga step started");
        if let Err(err) = self.loyalty.degrade(username).await {
            tracing::warn!(
                step = steps::STEP_DEGRADE_LOYALTY,
                error = %err,
                "deferring loyalty degrade to the retry queue"
            );
            metrics::counter!("loyalty_degrade_deferred_total").increment(1);
            self.queue
                .push_tail(LOYALTY_DEGRADE_CHANNEL, username)
                .await?;
        }

        tracing::info!(%reservation_uid, "cancellation saga completed");
        Ok(())
    }
}
