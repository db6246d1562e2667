//! Gateway server entry point.

use std::sync::Arc;

use api::config::Config;
use api::routes::AppState;
use clients::{
    Dependency, DependencyClient, HttpLoyaltyClient, HttpPaymentClient, HttpReservationClient,
    ReqwestBackend,
};
use metrics_exporter_prometheus::PrometheusHandle;
use resilience::{CircuitBreaker, CircuitBreakerConfig};
use retry_queue::{
    DrainWorker, InMemoryQueueStore, LOYALTY_DEGRADE_CHANNEL, PostgresQueueStore, QueueStore,
};
use tokio::signal;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

#[tokio::main]
async fn main() {
    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    let config = Config::from_env();

    // 3. Pick the retry queue store: PostgreSQL when configured, in-memory otherwise
    if let Some(database_url) = config.database_url.clone() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await
            .expect("failed to connect to the retry queue database");
        let queue = PostgresQueueStore::new(pool);
        queue
            .ensure_schema()
            .await
            .expect("failed to prepare the retry queue schema");
        run(config, metrics_handle, queue).await;
    } else {
        tracing::warn!("DATABASE_URL not set, retry queue entries will not survive restarts");
        run(config, metrics_handle, InMemoryQueueStore::new()).await;
    }
}

async fn run<Q>(config: Config, metrics_handle: PrometheusHandle, queue: Q)
where
    Q: QueueStore + Clone + 'static,
{
    let breaker_config = CircuitBreakerConfig::new()
        .with_failure_threshold(config.breaker_failure_threshold)
        .with_reset_timeout(config.breaker_reset_timeout);

    // 4. One circuit breaker per dependency, shared by every request for the
    // lifetime of the process.
    let reservation = HttpReservationClient::new(DependencyClient::new(
        Dependency::Reservation,
        ReqwestBackend::new(&config.reservation_url).expect("failed to build reservation client"),
        Arc::new(CircuitBreaker::new(
            Dependency::Reservation.as_str(),
            breaker_config.clone(),
        )),
    ));
    let loyalty = HttpLoyaltyClient::new(DependencyClient::new(
        Dependency::Loyalty,
        ReqwestBackend::new(&config.loyalty_url).expect("failed to build loyalty client"),
        Arc::new(CircuitBreaker::new(
            Dependency::Loyalty.as_str(),
            breaker_config.clone(),
        )),
    ));
    let payment = HttpPaymentClient::new(DependencyClient::new(
        Dependency::Payment,
        ReqwestBackend::new(&config.payment_url).expect("failed to build payment client"),
        Arc::new(CircuitBreaker::new(
            Dependency::Payment.as_str(),
            breaker_config,
        )),
    ));

    let state = Arc::new(AppState::new(
        reservation,
        loyalty.clone(),
        payment,
        queue.clone(),
    ));

    // 5. Single drain worker per process, sharing the loyalty facade (and
    // therefore its breaker) with the request path.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = DrainWorker::new(queue, loyalty, LOYALTY_DEGRADE_CHANNEL)
        .with_idle_wait(config.queue_idle_wait);
    let worker_handle = tokio::spawn(worker.run(shutdown_rx));

    // 6. Start the server
    let app = api::create_app(state, metrics_handle);
    let addr = config.addr();
    tracing::info!(%addr, "starting gateway");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    // 7. Stop the drain worker once the server has quiesced; an in-flight
    // retry is allowed to finish.
    let _ = shutdown_tx.send(true);
    let _ = worker_handle.await;

    tracing::info!("gateway shut down gracefully");
}
