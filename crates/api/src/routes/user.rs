//! Aggregated user info endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use clients::{LoyaltyApi, PaymentApi, ReservationApi};
use common::LoyaltyProfile;
use retry_queue::QueueStore;
use sagas::ReservationView;
use serde::Serialize;

use crate::error::ApiError;
use crate::routes::{AppState, username};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoResponse {
    pub reservations: Vec<ReservationView>,
    /// Absent when the loyalty dependency is unavailable.
    pub loyalty: Option<LoyaltyProfile>,
}

/// GET /api/v1/me — the caller's reservations plus their loyalty profile.
///
/// Reservations are required; each one is enriched best-effort. The loyalty
/// profile is itself best-effort and omitted when its dependency is down.
#[tracing::instrument(skip(state, headers))]
pub async fn me<R, L, P, Q>(
    State(state): State<Arc<AppState<R, L, P, Q>>>,
    headers: HeaderMap,
) -> Result<Json<UserInfoResponse>, ApiError>
where
    R: ReservationApi,
    L: LoyaltyApi,
    P: PaymentApi,
    Q: QueueStore,
{
    let username = username(&headers)?;

    let reservations = state.reservation.list_reservations(username).await?;
    let reservations = state.enricher.enrich_all(&reservations).await;

    let loyalty = match state.loyalty.get_profile(username).await {
        Ok(profile) => Some(profile),
        Err(err) => {
            tracing::debug!(%username, error = %err, "loyalty profile unavailable");
            None
        }
    };

    Ok(Json(UserInfoResponse {
        reservations,
        loyalty,
    }))
}
