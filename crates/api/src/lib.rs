//! HTTP surface of the booking aggregation gateway.
//!
//! Exposes the unified client API over axum, with structured logging
//! (tracing) and Prometheus metrics. All orchestration lives in the
//! `sagas` crate; handlers only translate between HTTP and saga calls.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use clients::{LoyaltyApi, PaymentApi, ReservationApi};
use metrics_exporter_prometheus::PrometheusHandle;
use retry_queue::QueueStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<R, L, P, Q>(
    state: Arc<AppState<R, L, P, Q>>,
    metrics_handle: PrometheusHandle,
) -> Router
where
    R: ReservationApi + 'static,
    L: LoyaltyApi + 'static,
    P: PaymentApi + 'static,
    Q: QueueStore + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/api/v1/hotels", get(routes::hotels::list::<R, L, P, Q>))
        .route("/api/v1/me", get(routes::user::me::<R, L, P, Q>))
        .route("/api/v1/loyalty", get(routes::loyalty::get::<R, L, P, Q>))
        .route(
            "/api/v1/reservations",
            get(routes::reservations::list::<R, L, P, Q>)
                .post(routes::reservations::book::<R, L, P, Q>),
        )
        .route(
            "/api/v1/reservations/{uid}",
            get(routes::reservations::get::<R, L, P, Q>)
                .delete(routes::reservations::cancel::<R, L, P, Q>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
