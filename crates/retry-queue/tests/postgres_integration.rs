//! PostgreSQL integration tests for the queue store.
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p retry-queue --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use retry_queue::{PostgresQueueStore, QueueStore};
use serial_test::serial;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and a cleared table
async fn get_test_store() -> PostgresQueueStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    let store = PostgresQueueStore::new(pool);
    store.ensure_schema().await.unwrap();
    sqlx::query("TRUNCATE retry_queue")
        .execute(store.pool())
        .await
        .unwrap();
    store
}

#[tokio::test]
#[serial]
async fn fifo_order_roundtrip() {
    let store = get_test_store().await;

    store.push_tail("q", "alice").await.unwrap();
    store.push_tail("q", "bob").await.unwrap();
    store.push_tail("q", "carol").await.unwrap();
    assert_eq!(store.len("q").await.unwrap(), 3);

    assert_eq!(store.pop_head("q").await.unwrap(), Some("alice".to_string()));
    assert_eq!(store.pop_head("q").await.unwrap(), Some("bob".to_string()));
    assert_eq!(store.pop_head("q").await.unwrap(), Some("carol".to_string()));
    assert_eq!(store.pop_head("q").await.unwrap(), None);
}

#[tokio::test]
#[serial]
async fn pop_on_empty_channel_returns_none() {
    let store = get_test_store().await;
    assert_eq!(store.pop_head("missing").await.unwrap(), None);
}

#[tokio::test]
#[serial]
async fn channels_are_independent() {
    let store = get_test_store().await;

    store.push_tail("a", "alice").await.unwrap();
    store.push_tail("b", "bob").await.unwrap();

    assert_eq!(store.pop_head("a").await.unwrap(), Some("alice".to_string()));
    assert_eq!(store.pop_head("a").await.unwrap(), None);
    assert_eq!(store.len("b").await.unwrap(), 1);
}

#[tokio::test]
#[serial]
async fn requeued_duplicate_lands_at_the_tail() {
    let store = get_test_store().await;

    store.push_tail("q", "alice").await.unwrap();
    store.push_tail("q", "bob").await.unwrap();

    // Simulate a failed drain cycle: pop the head, push it back.
    let head = store.pop_head("q").await.unwrap().unwrap();
    store.push_tail("q", &head).await.unwrap();

    assert_eq!(store.pop_head("q").await.unwrap(), Some("bob".to_string()));
    assert_eq!(store.pop_head("q").await.unwrap(), Some("alice".to_string()));
}
