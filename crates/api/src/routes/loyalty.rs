//! Loyalty profile endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use clients::{LoyaltyApi, PaymentApi, ReservationApi};
use common::LoyaltyProfile;
use retry_queue::QueueStore;

use crate::error::ApiError;
use crate::routes::{AppState, username};

/// GET /api/v1/loyalty — the caller's loyalty profile.
#[tracing::instrument(skip(state, headers))]
pub async fn get<R, L, P, Q>(
    State(state): State<Arc<AppState<R, L, P, Q>>>,
    headers: HeaderMap,
) -> Result<Json<LoyaltyProfile>, ApiError>
where
    R: ReservationApi,
    L: LoyaltyApi,
    P: PaymentApi,
    Q: QueueStore,
{
    let username = username(&headers)?;
    let profile = state.loyalty.get_profile(username).await?;
    Ok(Json(profile))
}
