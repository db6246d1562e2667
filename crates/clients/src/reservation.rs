//! Reservation service API: hotels and reservation records.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{Hotel, NewReservation, Reservation, ReservationUid};
use common::ids::HotelUid;

use crate::USER_NAME_HEADER;
use crate::backend::{HttpBackend, Method};
use crate::dependency::Dependency;
use crate::error::{ClientError, Result};
use crate::facade::DependencyClient;

/// Operations offered by the reservation service.
#[async_trait]
pub trait ReservationApi: Send + Sync {
    /// Lists hotels, paginated.
    async fn list_hotels(&self, page: u32, size: u32) -> Result<Vec<Hotel>>;

    /// Fetches a hotel by its public identifier.
    async fn get_hotel(&self, hotel_uid: HotelUid) -> Result<Hotel>;

    /// Fetches a hotel by the reservation service's internal identifier.
    async fn get_hotel_by_id(&self, hotel_id: i64) -> Result<Hotel>;

    /// Lists a user's reservations.
    async fn list_reservations(&self, username: &str) -> Result<Vec<Reservation>>;

    /// Fetches one reservation owned by the user.
    async fn get_reservation(
        &self,
        reservation_uid: ReservationUid,
        username: &str,
    ) -> Result<Reservation>;

    /// Creates a reservation record.
    async fn create_reservation(&self, new: NewReservation) -> Result<Reservation>;

    /// Persists an updated reservation record.
    async fn update_reservation(&self, reservation: &Reservation) -> Result<()>;
}

/// HTTP implementation over the breaker-gated facade.
#[derive(Clone)]
pub struct HttpReservationClient<B> {
    client: DependencyClient<B>,
}

impl<B: HttpBackend> HttpReservationClient<B> {
    /// Wraps a facade for the reservation dependency.
    pub fn new(client: DependencyClient<B>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<B: HttpBackend> ReservationApi for HttpReservationClient<B> {
    async fn list_hotels(&self, page: u32, size: u32) -> Result<Vec<Hotel>> {
        self.client
            .request_json(
                Method::Get,
                &format!("/api/v1/hotels?page={page}&size={size}"),
                &[],
                None,
                "hotel list",
            )
            .await
    }

    async fn get_hotel(&self, hotel_uid: HotelUid) -> Result<Hotel> {
        self.client
            .request_json(
                Method::Get,
                &format!("/api/v1/hotels/{hotel_uid}"),
                &[],
                None,
                &format!("hotel {hotel_uid}"),
            )
            .await
    }

    async fn get_hotel_by_id(&self, hotel_id: i64) -> Result<Hotel> {
        self.client
            .request_json(
                Method::Get,
                &format!("/api/v1/reservations/hotels/{hotel_id}"),
                &[],
                None,
                &format!("hotel #{hotel_id}"),
            )
            .await
    }

    async fn list_reservations(&self, username: &str) -> Result<Vec<Reservation>> {
        self.client
            .request_json(
                Method::Get,
                "/api/v1/reservations",
                &[(USER_NAME_HEADER, username)],
                None,
                "reservation list",
            )
            .await
    }

    async fn get_reservation(
        &self,
        reservation_uid: ReservationUid,
        username: &str,
    ) -> Result<Reservation> {
        self.client
            .request_json(
                Method::Get,
                &format!("/api/v1/reservations/{reservation_uid}"),
                &[(USER_NAME_HEADER, username)],
                None,
                &format!("reservation {reservation_uid}"),
            )
            .await
    }

    async fn create_reservation(&self, new: NewReservation) -> Result<Reservation> {
        let body = serde_json::to_value(&new).map_err(|e| ClientError::Failed {
            dependency: Dependency::Reservation,
            status: None,
            message: format!("unserializable request: {e}"),
        })?;
        self.client
            .request_json(
                Method::Post,
                "/api/v1/reservations",
                &[],
                Some(&body),
                "created reservation",
            )
            .await
    }

    async fn update_reservation(&self, reservation: &Reservation) -> Result<()> {
        let body = serde_json::to_value(reservation).map_err(|e| ClientError::Failed {
            dependency: Dependency::Reservation,
            status: None,
            message: format!("unserializable request: {e}"),
        })?;
        self.client
            .request_unit(Method::Put, "/api/v1/reservations", &[], Some(&body))
            .await
    }
}

#[derive(Debug, Default)]
struct InMemoryReservationState {
    hotels: Vec<Hotel>,
    reservations: HashMap<ReservationUid, Reservation>,
    fail_hotels: bool,
    fail_hotel_details: bool,
    fail_reservations: bool,
}

/// In-memory reservation service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReservationClient {
    state: Arc<RwLock<InMemoryReservationState>>,
}

impl InMemoryReservationClient {
    /// Creates an empty in-memory reservation service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a hotel.
    pub fn add_hotel(&self, hotel: Hotel) {
        self.state.write().unwrap().hotels.push(hotel);
    }

    /// Seeds a reservation record.
    pub fn add_reservation(&self, reservation: Reservation) {
        self.state
            .write()
            .unwrap()
            .reservations
            .insert(reservation.reservation_uid, reservation);
    }

    /// Makes hotel lookups fail.
    pub fn set_fail_hotels(&self, fail: bool) {
        self.state.write().unwrap().fail_hotels = fail;
    }

    /// Makes internal-id hotel lookups (enrichment path) fail.
    pub fn set_fail_hotel_details(&self, fail: bool) {
        self.state.write().unwrap().fail_hotel_details = fail;
    }

    /// Makes reservation operations fail.
    pub fn set_fail_reservations(&self, fail: bool) {
        self.state.write().unwrap().fail_reservations = fail;
    }

    /// Returns the number of stored reservations.
    pub fn reservation_count(&self) -> usize {
        self.state.read().unwrap().reservations.len()
    }

    /// Looks up a stored reservation.
    pub fn reservation(&self, uid: ReservationUid) -> Option<Reservation> {
        self.state.read().unwrap().reservations.get(&uid).cloned()
    }

    fn failed(&self) -> ClientError {
        ClientError::Failed {
            dependency: Dependency::Reservation,
            status: Some(503),
            message: "simulated failure".to_string(),
        }
    }
}

#[async_trait]
impl ReservationApi for InMemoryReservationClient {
    async fn list_hotels(&self, page: u32, size: u32) -> Result<Vec<Hotel>> {
        let state = self.state.read().unwrap();
        if state.fail_hotels {
            return Err(self.failed());
        }
        Ok(state
            .hotels
            .iter()
            .skip((page as usize).saturating_mul(size as usize))
            .take(size as usize)
            .cloned()
            .collect())
    }

    async fn get_hotel(&self, hotel_uid: HotelUid) -> Result<Hotel> {
        let state = self.state.read().unwrap();
        if state.fail_hotels {
            return Err(self.failed());
        }
        state
            .hotels
            .iter()
            .find(|h| h.hotel_uid == hotel_uid)
            .cloned()
            .ok_or_else(|| ClientError::NotFound {
                what: format!("hotel {hotel_uid}"),
            })
    }

    async fn get_hotel_by_id(&self, hotel_id: i64) -> Result<Hotel> {
        let state = self.state.read().unwrap();
        if state.fail_hotel_details {
            return Err(self.failed());
        }
        state
            .hotels
            .iter()
            .find(|h| h.id == hotel_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound {
                what: format!("hotel #{hotel_id}"),
            })
    }

    async fn list_reservations(&self, username: &str) -> Result<Vec<Reservation>> {
        let state = self.state.read().unwrap();
        if state.fail_reservations {
            return Err(self.failed());
        }
        Ok(state
            .reservations
            .values()
            .filter(|r| r.username == username)
            .cloned()
            .collect())
    }

    async fn get_reservation(
        &self,
        reservation_uid: ReservationUid,
        username: &str,
    ) -> Result<Reservation> {
        let state = self.state.read().unwrap();
        if state.fail_reservations {
            return Err(self.failed());
        }
        state
            .reservations
            .get(&reservation_uid)
            .filter(|r| r.username == username)
            .cloned()
            .ok_or_else(|| ClientError::NotFound {
                what: format!("reservation {reservation_uid}"),
            })
    }

    async fn create_reservation(&self, new: NewReservation) -> Result<Reservation> {
        let mut state = self.state.write().unwrap();
        if state.fail_reservations {
            return Err(self.failed());
        }
        let reservation = Reservation {
            reservation_uid: ReservationUid::new(),
            username: new.username,
            hotel_id: new.hotel_id,
            payment_uid: new.payment_uid,
            start_date: new.start_date,
            end_date: new.end_date,
            status: new.status,
        };
        state
            .reservations
            .insert(reservation.reservation_uid, reservation.clone());
        Ok(reservation)
    }

    async fn update_reservation(&self, reservation: &Reservation) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if state.fail_reservations {
            return Err(self.failed());
        }
        state
            .reservations
            .insert(reservation.reservation_uid, reservation.clone());
        Ok(())
    }
}
