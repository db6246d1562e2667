//! Best-effort enrichment of reservation records for responses.

use chrono::NaiveDate;
use clients::{PaymentApi, ReservationApi};
use common::ids::HotelUid;
use common::{Hotel, Payment, PaymentStatus, Reservation, ReservationStatus, ReservationUid};
use futures_util::future::{join, join_all};
use serde::{Deserialize, Serialize};

/// Hotel details embedded in a reservation response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelInfo {
    pub hotel_uid: HotelUid,
    pub name: String,
    pub full_address: String,
    pub stars: u8,
}

impl From<Hotel> for HotelInfo {
    fn from(hotel: Hotel) -> Self {
        Self {
            hotel_uid: hotel.hotel_uid,
            name: hotel.name,
            full_address: format!("{}, {}, {}", hotel.country, hotel.city, hotel.address),
            stars: hotel.stars,
        }
    }
}

/// Payment details embedded in a reservation response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    pub status: PaymentStatus,
    pub price: i64,
}

impl From<Payment> for PaymentInfo {
    fn from(payment: Payment) -> Self {
        Self {
            status: payment.status,
            price: payment.price,
        }
    }
}

/// A reservation assembled for a caller.
///
/// `hotel` and `payment` are `None` when the owning dependency was
/// unavailable at assembly time, not when the data does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationView {
    pub reservation_uid: ReservationUid,
    pub hotel: Option<HotelInfo>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ReservationStatus,
    pub payment: Option<PaymentInfo>,
}

/// Assembles reservation aggregates with best-effort detail lookups.
pub struct ReservationEnricher<R, P> {
    reservation: R,
    payment: P,
}

impl<R, P> ReservationEnricher<R, P>
where
    R: ReservationApi,
    P: PaymentApi,
{
    /// Creates an enricher over the reservation and payment facades.
    pub fn new(reservation: R, payment: P) -> Self {
        Self {
            reservation,
            payment,
        }
    }

    /// Builds the response aggregate for one reservation.
    ///
    /// Hotel and payment details are fetched concurrently; either lookup
    /// failing (or being denied by its breaker) leaves that field empty
    /// without failing the enclosing request.
    pub async fn enrich(&self, reservation: &Reservation) -> ReservationView {
        let (hotel, payment) = join(
            self.reservation.get_hotel_by_id(reservation.hotel_id),
            self.payment.get_payment(reservation.payment_uid),
        )
        .await;

        let hotel = match hotel {
            Ok(hotel) => Some(HotelInfo::from(hotel)),
            Err(err) => {
                tracing::debug!(
                    reservation_uid = %reservation.reservation_uid,
                    error = %err,
                    "hotel details unavailable"
                );
                None
            }
        };
        let payment = match payment {
            Ok(payment) => Some(PaymentInfo::from(payment)),
            Err(err) => {
                tracing::debug!(
                    reservation_uid = %reservation.reservation_uid,
                    error = %err,
                    "payment details unavailable"
                );
                None
            }
        };

        ReservationView {
            reservation_uid: reservation.reservation_uid,
            hotel,
            start_date: reservation.start_date,
            end_date: reservation.end_date,
            status: reservation.status,
            payment,
        }
    }

    /// Enriches a list of reservations, each independently of the others.
    pub async fn enrich_all(&self, reservations: &[Reservation]) -> Vec<ReservationView> {
        join_all(reservations.iter().map(|r| self.enrich(r))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clients::{InMemoryPaymentClient, InMemoryReservationClient};
    use common::PaymentUid;

    struct Setup {
        enricher: ReservationEnricher<InMemoryReservationClient, InMemoryPaymentClient>,
        reservation_client: InMemoryReservationClient,
        payment_client: InMemoryPaymentClient,
        reservation: Reservation,
    }

    fn setup() -> Setup {
        let reservation_client = InMemoryReservationClient::new();
        let payment_client = InMemoryPaymentClient::new();

        reservation_client.add_hotel(Hotel {
            id: 1,
            hotel_uid: HotelUid::new(),
            name: "Grand Budapest".to_string(),
            country: "Hungary".to_string(),
            city: "Budapest".to_string(),
            address: "1 Main Square".to_string(),
            stars: 5,
            price: 1000,
        });

        let payment_uid = PaymentUid::new();
        payment_client.add_payment(Payment {
            payment_uid,
            status: PaymentStatus::Paid,
            price: 2700,
        });

        let reservation = Reservation {
            reservation_uid: ReservationUid::new(),
            username: "alice".to_string(),
            hotel_id: 1,
            payment_uid,
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 4).unwrap(),
            status: ReservationStatus::Paid,
        };

        let enricher =
            ReservationEnricher::new(reservation_client.clone(), payment_client.clone());
        Setup {
            enricher,
            reservation_client,
            payment_client,
            reservation,
        }
    }

    #[tokio::test]
    async fn enriches_with_both_details() {
        let s = setup();

        let view = s.enricher.enrich(&s.reservation).await;
        let hotel = view.hotel.unwrap();
        assert_eq!(hotel.name, "Grand Budapest");
        assert_eq!(hotel.full_address, "Hungary, Budapest, 1 Main Square");
        assert_eq!(view.payment.unwrap().price, 2700);
    }

    #[tokio::test]
    async fn hotel_outage_leaves_hotel_absent() {
        let s = setup();
        s.reservation_client.set_fail_hotel_details(true);

        let view = s.enricher.enrich(&s.reservation).await;
        assert!(view.hotel.is_none());
        assert!(view.payment.is_some());
        assert_eq!(view.status, ReservationStatus::Paid);
    }

    #[tokio::test]
    async fn payment_outage_leaves_payment_absent() {
        let s = setup();
        s.payment_client.set_fail_get(true);

        let view = s.enricher.enrich(&s.reservation).await;
        assert!(view.hotel.is_some());
        assert!(view.payment.is_none());
    }

    #[tokio::test]
    async fn list_enrichment_is_independent_per_entry() {
        let s = setup();
        s.reservation_client.set_fail_hotel_details(true);

        let mut second = s.reservation.clone();
        second.reservation_uid = ReservationUid::new();

        let views = s
            .enricher
            .enrich_all(&[s.reservation.clone(), second])
            .await;
        assert_eq!(views.len(), 2);
        // Every entry is still returned with the reachable fields populated.
        assert!(views.iter().all(|v| v.hotel.is_none()));
        assert!(views.iter().all(|v| v.payment.is_some()));
    }
}
