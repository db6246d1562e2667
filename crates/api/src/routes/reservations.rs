//! Booking, lookup and cancellation endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use clients::{LoyaltyApi, PaymentApi, ReservationApi};
use common::ReservationUid;
use retry_queue::QueueStore;
use sagas::{BookingConfirmation, BookingRequest, ReservationView};

use crate::error::ApiError;
use crate::routes::{AppState, username};

/// POST /api/v1/reservations — run the booking saga.
#[tracing::instrument(skip(state, headers, request))]
pub async fn book<R, L, P, Q>(
    State(state): State<Arc<AppState<R, L, P, Q>>>,
    headers: HeaderMap,
    Json(request): Json<BookingRequest>,
) -> Result<Json<BookingConfirmation>, ApiError>
where
    R: ReservationApi,
    L: LoyaltyApi,
    P: PaymentApi,
    Q: QueueStore,
{
    let username = username(&headers)?;
    let confirmation = state.booking.execute(username, request).await?;
    Ok(Json(confirmation))
}

/// GET /api/v1/reservations — the caller's reservations, enriched.
#[tracing::instrument(skip(state, headers))]
pub async fn list<R, L, P, Q>(
    State(state): State<Arc<AppState<R, L, P, Q>>>,
    headers: HeaderMap,
) -> Result<Json<Vec<ReservationView>>, ApiError>
where
    R: ReservationApi,
    L: LoyaltyApi,
    P: PaymentApi,
    Q: QueueStore,
{
    let username = username(&headers)?;
    let reservations = state.reservation.list_reservations(username).await?;
    Ok(Json(state.enricher.enrich_all(&reservations).await))
}

/// GET /api/v1/reservations/{uid} — one reservation, enriched.
#[tracing::instrument(skip(state, headers))]
pub async fn get<R, L, P, Q>(
    State(state): State<Arc<AppState<R, L, P, Q>>>,
    headers: HeaderMap,
    Path(reservation_uid): Path<ReservationUid>,
) -> Result<Json<ReservationView>, ApiError>
where
    R: ReservationApi,
    L: LoyaltyApi,
    P: PaymentApi,
    Q: QueueStore,
{
    let username = username(&headers)?;
    let reservation = state
        .reservation
        .get_reservation(reservation_uid, username)
        .await?;
    Ok(Json(state.enricher.enrich(&reservation).await))
}

/// DELETE /api/v1/reservations/{uid} — run the cancellation saga.
#[tracing::instrument(skip(state, headers))]
pub async fn cancel<R, L, P, Q>(
    State(state): State<Arc<AppState<R, L, P, Q>>>,
    headers: HeaderMap,
    Path(reservation_uid): Path<ReservationUid>,
) -> Result<StatusCode, ApiError>
where
    R: ReservationApi,
    L: LoyaltyApi,
    P: PaymentApi,
    Q: QueueStore,
{
    let username = username(&headers)?;
    state.cancellation.execute(username, reservation_uid).await?;
    Ok(StatusCode::NO_CONTENT)
}
