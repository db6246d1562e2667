//! Background drain worker for deferred loyalty adjustments.

use std::time::Duration;

use clients::LoyaltyApi;
use tokio::sync::watch;

use crate::error::Result;
use crate::store::QueueStore;

/// Channel holding usernames whose loyalty status awaits a degrade.
pub const LOYALTY_DEGRADE_CHANNEL: &str = "loyalty-degrade";

/// Long-lived loop that retries queued loyalty-degrade requests.
///
/// One instance runs per process. Each iteration pops the channel head and
/// calls the loyalty service through its breaker-gated facade; any failure
/// outcome re-appends the same username at the tail. An empty queue is polled
/// again after `idle_wait`. No batching, no deduplication, no backoff.
pub struct DrainWorker<Q, L> {
    queue: Q,
    loyalty: L,
    channel: String,
    idle_wait: Duration,
}

impl<Q: QueueStore, L: LoyaltyApi> DrainWorker<Q, L> {
    /// Creates a worker draining the given channel.
    pub fn new(queue: Q, loyalty: L, channel: impl Into<String>) -> Self {
        Self {
            queue,
            loyalty,
            channel: channel.into(),
            idle_wait: Duration::from_secs(1),
        }
    }

    /// Overrides the empty-queue wait interval.
    pub fn with_idle_wait(mut self, idle_wait: Duration) -> Self {
        self.idle_wait = idle_wait;
        self
    }

    /// Runs until `shutdown` turns true.
    ///
    /// Shutdown is cooperative: the flag is checked between iterations, so an
    /// in-flight downstream call is always allowed to finish.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(channel = %self.channel, "retry queue worker started");
        loop {
            if *shutdown.borrow() {
                break;
            }

            match self.drain_one().await {
                Ok(true) => {}
                Ok(false) => {
                    tokio::select! {
                        _ = tokio::time::sleep(self.idle_wait) => {}
                        _ = shutdown.changed() => {}
                    }
                }
                Err(err) => {
                    tracing::error!(channel = %self.channel, error = %err, "queue store error");
                    tokio::select! {
                        _ = tokio::time::sleep(self.idle_wait) => {}
                        _ = shutdown.changed() => {}
                    }
                }
            }
        }
        tracing::info!(channel = %self.channel, "retry queue worker stopped");
    }

    /// Pops and processes one entry. Returns false when the queue was empty.
    async fn drain_one(&self) -> Result<bool> {
        let Some(username) = self.queue.pop_head(&self.channel).await? else {
            return Ok(false);
        };

        match self.loyalty.degrade(&username).await {
            Ok(()) => {
                tracing::info!(%username, "deferred loyalty degrade applied");
                metrics::counter!("loyalty_retry_drained_total").increment(1);
            }
            Err(err) => {
                tracing::warn!(%username, error = %err, "loyalty degrade retry failed, requeueing");
                metrics::counter!("loyalty_retry_requeued_total").increment(1);
                self.queue.push_tail(&self.channel, &username).await?;
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clients::InMemoryLoyaltyClient;

    use crate::memory::InMemoryQueueStore;

    fn worker(
        queue: InMemoryQueueStore,
        loyalty: InMemoryLoyaltyClient,
    ) -> DrainWorker<InMemoryQueueStore, InMemoryLoyaltyClient> {
        DrainWorker::new(queue, loyalty, LOYALTY_DEGRADE_CHANNEL)
            .with_idle_wait(Duration::from_millis(10))
    }

    #[tokio::test]
    async fn drains_a_pending_entry() {
        let queue = InMemoryQueueStore::new();
        let loyalty = InMemoryLoyaltyClient::new();
        queue
            .push_tail(LOYALTY_DEGRADE_CHANNEL, "alice")
            .await
            .unwrap();

        let w = worker(queue.clone(), loyalty.clone());
        assert!(w.drain_one().await.unwrap());

        assert_eq!(loyalty.degrade_calls(), 1);
        assert!(queue.is_empty(LOYALTY_DEGRADE_CHANNEL).await);
    }

    #[tokio::test]
    async fn empty_queue_reports_idle() {
        let w = worker(InMemoryQueueStore::new(), InMemoryLoyaltyClient::new());
        assert!(!w.drain_one().await.unwrap());
    }

    #[tokio::test]
    async fn failure_requeues_with_constant_length() {
        let queue = InMemoryQueueStore::new();
        let loyalty = InMemoryLoyaltyClient::new();
        loyalty.set_fail_degrade(true);
        queue
            .push_tail(LOYALTY_DEGRADE_CHANNEL, "alice")
            .await
            .unwrap();

        let w = worker(queue.clone(), loyalty.clone());
        for _ in 0..3 {
            assert!(w.drain_one().await.unwrap());
            assert_eq!(queue.len(LOYALTY_DEGRADE_CHANNEL).await, 1);
            assert_eq!(
                queue.entries(LOYALTY_DEGRADE_CHANNEL).await,
                vec!["alice".to_string()]
            );
        }

        // Once the downstream recovers the entry drains for good.
        loyalty.set_fail_degrade(false);
        assert!(w.drain_one().await.unwrap());
        assert!(queue.is_empty(LOYALTY_DEGRADE_CHANNEL).await);
        assert_eq!(loyalty.degrade_calls(), 1);
    }

    #[tokio::test]
    async fn run_drains_in_background_and_stops_on_shutdown() {
        let queue = InMemoryQueueStore::new();
        let loyalty = InMemoryLoyaltyClient::new();
        queue
            .push_tail(LOYALTY_DEGRADE_CHANNEL, "alice")
            .await
            .unwrap();
        queue
            .push_tail(LOYALTY_DEGRADE_CHANNEL, "bob")
            .await
            .unwrap();

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(worker(queue.clone(), loyalty.clone()).run(rx));

        // Wait for the worker to drain both entries.
        for _ in 0..100 {
            if queue.is_empty(LOYALTY_DEGRADE_CHANNEL).await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(loyalty.degrade_calls(), 2);

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("worker did not stop after shutdown signal")
            .unwrap();
    }
}
