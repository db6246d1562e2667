//! PostgreSQL-backed queue store implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::Result;
use crate::store::QueueStore;

/// PostgreSQL-backed queue store.
///
/// Entries live in a single `retry_queue` table ordered by a serial id; the
/// pop uses `FOR UPDATE SKIP LOCKED` so concurrent poppers never hand out the
/// same row twice.
#[derive(Clone)]
pub struct PostgresQueueStore {
    pool: PgPool,
}

impl PostgresQueueStore {
    /// Creates a new PostgreSQL queue store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the queue table and index if they do not exist.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::raw_sql(
            r#"
            CREATE TABLE IF NOT EXISTS retry_queue (
                id BIGSERIAL PRIMARY KEY,
                channel TEXT NOT NULL,
                value TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS retry_queue_channel_id_idx
                ON retry_queue (channel, id);
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Returns the number of entries in the channel.
    pub async fn len(&self, channel: &str) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM retry_queue WHERE channel = $1")
                .bind(channel)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}

#[async_trait]
impl QueueStore for PostgresQueueStore {
    async fn push_tail(&self, channel: &str, value: &str) -> Result<()> {
        sqlx::query("INSERT INTO retry_queue (channel, value) VALUES ($1, $2)")
            .bind(channel)
            .bind(value)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn pop_head(&self, channel: &str) -> Result<Option<String>> {
        let value: Option<String> = sqlx::query_scalar(
            r#"
            DELETE FROM retry_queue
            WHERE id = (
                SELECT id FROM retry_queue
                WHERE channel = $1
                ORDER BY id
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING value
            "#,
        )
        .bind(channel)
        .fetch_optional(&self.pool)
        .await?;
        Ok(value)
    }
}
