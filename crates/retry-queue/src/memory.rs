//! In-memory queue store implementation for testing.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::store::QueueStore;

/// In-memory queue store.
///
/// Provides the same interface as the PostgreSQL implementation, minus
/// durability across restarts.
#[derive(Clone, Default)]
pub struct InMemoryQueueStore {
    channels: Arc<RwLock<HashMap<String, VecDeque<String>>>>,
}

impl InMemoryQueueStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entries in the channel.
    pub async fn len(&self, channel: &str) -> usize {
        self.channels
            .read()
            .await
            .get(channel)
            .map(VecDeque::len)
            .unwrap_or(0)
    }

    /// Returns true when the channel holds no entries.
    pub async fn is_empty(&self, channel: &str) -> bool {
        self.len(channel).await == 0
    }

    /// Returns a head-to-tail copy of the channel's entries.
    pub async fn entries(&self, channel: &str) -> Vec<String> {
        self.channels
            .read()
            .await
            .get(channel)
            .map(|queue| queue.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl QueueStore for InMemoryQueueStore {
    async fn push_tail(&self, channel: &str, value: &str) -> Result<()> {
        let mut channels = self.channels.write().await;
        channels
            .entry(channel.to_string())
            .or_default()
            .push_back(value.to_string());
        Ok(())
    }

    async fn pop_head(&self, channel: &str) -> Result<Option<String>> {
        let mut channels = self.channels.write().await;
        Ok(channels
            .get_mut(channel)
            .and_then(|queue| queue.pop_front()))
    }
}
