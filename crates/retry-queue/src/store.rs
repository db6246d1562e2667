//! The durable FIFO store consumed by the retry queue.

use async_trait::async_trait;

use crate::error::Result;

/// A durable list-like store with per-channel FIFO semantics.
///
/// `push_tail` and `pop_head` must each be atomic at the store level so that
/// concurrent producers and a single drain loop never observe a torn entry.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Appends a value to the tail of the channel.
    async fn push_tail(&self, channel: &str, value: &str) -> Result<()>;

    /// Removes and returns the head of the channel, or `None` when empty.
    async fn pop_head(&self, channel: &str) -> Result<Option<String>>;
}
