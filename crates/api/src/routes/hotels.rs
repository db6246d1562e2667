//! Hotel catalog endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use clients::{LoyaltyApi, PaymentApi, ReservationApi};
use common::Hotel;
use retry_queue::QueueStore;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::AppState;

fn default_size() -> u32 {
    10
}

#[derive(Deserialize)]
pub struct PaginationQuery {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResponse {
    pub page: u32,
    pub page_size: u32,
    pub total_elements: usize,
    pub items: Vec<Hotel>,
}

/// GET /api/v1/hotels — paginated hotel catalog.
#[tracing::instrument(skip(state, query))]
pub async fn list<R, L, P, Q>(
    State(state): State<Arc<AppState<R, L, P, Q>>>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<PaginationResponse>, ApiError>
where
    R: ReservationApi,
    L: LoyaltyApi,
    P: PaymentApi,
    Q: QueueStore,
{
    if query.size < 1 {
        return Err(ApiError::BadRequest(
            "Invalid pagination parameters".to_string(),
        ));
    }

    let hotels = state.reservation.list_hotels(query.page, query.size).await?;

    Ok(Json(PaginationResponse {
        page: query.page,
        page_size: query.size,
        total_elements: hotels.len(),
        items: hotels,
    }))
}
