//! Domain records exchanged with the downstream services.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ids::{HotelUid, PaymentUid, ReservationUid};

/// Lifecycle status of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReservationStatus {
    /// Reservation is active and paid for.
    #[serde(rename = "PAID")]
    Paid,

    /// Reservation has been canceled by the user.
    #[serde(rename = "CANCELED")]
    Canceled,
}

impl ReservationStatus {
    /// Returns the wire-format status name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Paid => "PAID",
            ReservationStatus::Canceled => "CANCELED",
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of a payment operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// Payment has been captured.
    #[serde(rename = "PAID")]
    Paid,

    /// Payment has been voided after cancellation.
    #[serde(rename = "CANCELED")]
    Canceled,
}

impl PaymentStatus {
    /// Returns the wire-format status name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Canceled => "CANCELED",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Loyalty tier of a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoyaltyStatus {
    #[serde(rename = "BRONZE")]
    Bronze,
    #[serde(rename = "SILVER")]
    Silver,
    #[serde(rename = "GOLD")]
    Gold,
}

impl LoyaltyStatus {
    /// Returns the wire-format tier name.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoyaltyStatus::Bronze => "BRONZE",
            LoyaltyStatus::Silver => "SILVER",
            LoyaltyStatus::Gold => "GOLD",
        }
    }
}

impl std::fmt::Display for LoyaltyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A hotel as served by the reservation service.
///
/// `id` is the reservation service's internal row identifier; `hotel_uid`
/// is the public identifier exposed to gateway clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: i64,
    pub hotel_uid: HotelUid,
    pub name: String,
    pub country: String,
    pub city: String,
    pub address: String,
    pub stars: u8,
    /// Nightly price in minor currency units.
    pub price: i64,
}

/// A customer's loyalty profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyProfile {
    pub status: LoyaltyStatus,
    /// Discount percentage applied to bookings.
    pub discount: u32,
    pub reservation_count: u32,
}

/// A payment record held by the payment service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub payment_uid: PaymentUid,
    pub status: PaymentStatus,
    pub price: i64,
}

/// A reservation record held by the reservation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub reservation_uid: ReservationUid,
    pub username: String,
    pub hotel_id: i64,
    pub payment_uid: PaymentUid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ReservationStatus,
}

/// Payload for creating a reservation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReservation {
    pub username: String,
    pub hotel_id: i64,
    pub payment_uid: PaymentUid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ReservationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_names() {
        assert_eq!(ReservationStatus::Paid.to_string(), "PAID");
        assert_eq!(ReservationStatus::Canceled.to_string(), "CANCELED");
        assert_eq!(PaymentStatus::Paid.to_string(), "PAID");
        assert_eq!(LoyaltyStatus::Gold.to_string(), "GOLD");
    }

    #[test]
    fn status_serializes_as_bare_string() {
        let json = serde_json::to_string(&ReservationStatus::Paid).unwrap();
        assert_eq!(json, "\"PAID\"");
        let back: ReservationStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ReservationStatus::Paid);
    }

    #[test]
    fn reservation_serialization_roundtrip() {
        let reservation = Reservation {
            reservation_uid: ReservationUid::new(),
            username: "alice".to_string(),
            hotel_id: 7,
            payment_uid: PaymentUid::new(),
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            status: ReservationStatus::Paid,
        };

        let json = serde_json::to_string(&reservation).unwrap();
        let back: Reservation = serde_json::from_str(&json).unwrap();
        assert_eq!(reservation, back);
    }

    #[test]
    fn hotel_uses_camel_case_fields() {
        let hotel = Hotel {
            id: 1,
            hotel_uid: HotelUid::new(),
            name: "Grand Budapest".to_string(),
            country: "Hungary".to_string(),
            city: "Budapest".to_string(),
            address: "1 Main Square".to_string(),
            stars: 5,
            price: 1000,
        };

        let value = serde_json::to_value(&hotel).unwrap();
        assert!(value.get("hotelUid").is_some());
        assert!(value.get("hotel_uid").is_none());
    }
}
