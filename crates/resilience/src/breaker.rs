//! Per-dependency circuit breaker state machine.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Observable state of a circuit breaker.
///
/// State transitions:
/// ```text
/// Closed ──failures ≥ threshold──► Open ──timeout elapsed & allow_request──► HalfOpen
///   ▲                                ▲                                          │
///   └────────── record_success ──────┼───────────── record_failure ────────────┘
///                                    └───────────── (re-arms timeout)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BreakerState {
    /// Requests flow normally.
    Closed,

    /// Requests are denied until the reset timeout elapses.
    Open,

    /// Trial requests are admitted; the next outcome decides the state.
    HalfOpen,
}

impl BreakerState {
    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakerState::Closed => "Closed",
            BreakerState::Open => "Open",
            BreakerState::HalfOpen => "HalfOpen",
        }
    }
}

impl std::fmt::Display for BreakerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Circuit breaker tuning parameters.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures after which the breaker opens.
    pub failure_threshold: u32,
    /// How long the breaker stays open before admitting a trial call.
    pub reset_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout: Duration::from_secs(60),
        }
    }
}

impl CircuitBreakerConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the failure threshold.
    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    /// Sets the reset timeout.
    pub fn with_reset_timeout(mut self, timeout: Duration) -> Self {
        self.reset_timeout = timeout;
        self
    }
}

/// Point-in-time view of a breaker, for logging and tests.
#[derive(Debug, Clone)]
pub struct BreakerSnapshot {
    pub state: BreakerState,
    pub failure_count: u32,
    pub failure_threshold: u32,
    /// Remaining open time, if currently open.
    pub open_remaining: Option<Duration>,
}

#[derive(Debug)]
struct Inner {
    state: BreakerState,
    failure_count: u32,
    opened_at: Instant,
}

/// Failure-tracking gate in front of one downstream dependency.
///
/// Shared process-wide: one instance per dependency, created at startup and
/// cloned by reference (`Arc`) into every concurrent request path. All
/// mutation happens under an internal mutex; no lock is held across I/O.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    /// Creates a closed breaker for the named dependency.
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                failure_count: 0,
                opened_at: Instant::now(),
            }),
        }
    }

    /// The dependency name this breaker guards.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns whether a call may be attempted right now.
    ///
    /// While `Open`, the first call at or after `opened_at + reset_timeout`
    /// is admitted and flips the state to `HalfOpen` as a side effect.
    /// `HalfOpen` admits every caller; concurrent trial calls are not limited.
    pub fn allow_request(&self) -> bool {
        let mut inner = self.lock();
        match inner.state {
            BreakerState::Closed | BreakerState::HalfOpen => true,
            BreakerState::Open => {
                if inner.opened_at.elapsed() >= self.config.reset_timeout {
                    inner.state = BreakerState::HalfOpen;
                    tracing::info!(breaker = %self.name, "circuit breaker half-open, admitting trial call");
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Records a successful call: closes the breaker and clears the count,
    /// regardless of the previous state.
    pub fn record_success(&self) {
        let mut inner = self.lock();
        if inner.state != BreakerState::Closed {
            tracing::info!(breaker = %self.name, from = %inner.state, "circuit breaker closed");
        }
        inner.failure_count = 0;
        inner.state = BreakerState::Closed;
    }

    /// Records a failed call.
    ///
    /// Opens the breaker once the threshold is reached; a failure while
    /// `HalfOpen` re-opens immediately and re-arms the timeout.
    pub fn record_failure(&self) {
        let mut inner = self.lock();
        inner.failure_count = inner.failure_count.saturating_add(1);
        if inner.failure_count >= self.config.failure_threshold {
            if inner.state != BreakerState::Open {
                tracing::warn!(
                    breaker = %self.name,
                    failures = inner.failure_count,
                    "circuit breaker opened"
                );
                metrics::counter!("circuit_breaker_opened_total", "dependency" => self.name.clone())
                    .increment(1);
            }
            inner.state = BreakerState::Open;
            inner.opened_at = Instant::now();
        }
    }

    /// Administrative hard reset to `Closed` with a zero failure count.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.failure_count = 0;
        inner.state = BreakerState::Closed;
    }

    /// Returns a point-in-time view of the breaker.
    pub fn snapshot(&self) -> BreakerSnapshot {
        let inner = self.lock();
        let open_remaining = match inner.state {
            BreakerState::Open => self
                .config
                .reset_timeout
                .checked_sub(inner.opened_at.elapsed()),
            _ => None,
        };
        BreakerSnapshot {
            state: inner.state,
            failure_count: inner.failure_count,
            failure_threshold: self.config.failure_threshold,
            open_remaining,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // The guarded section never panics, but recover from poisoning anyway:
        // a heuristic gate must not take the process down.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn breaker(threshold: u32, reset: Duration) -> CircuitBreaker {
        CircuitBreaker::new(
            "test",
            CircuitBreakerConfig::new()
                .with_failure_threshold(threshold)
                .with_reset_timeout(reset),
        )
    }

    #[test]
    fn config_defaults() {
        let config = CircuitBreakerConfig::default();
        assert_eq!(config.failure_threshold, 5);
        assert_eq!(config.reset_timeout, Duration::from_secs(60));
    }

    #[test]
    fn closed_allows_requests() {
        let cb = breaker(3, Duration::from_secs(60));
        assert!(cb.allow_request());
        assert_eq!(cb.snapshot().state, BreakerState::Closed);
    }

    #[test]
    fn opens_exactly_at_threshold() {
        let cb = breaker(3, Duration::from_secs(60));

        cb.record_failure();
        cb.record_failure();
        assert_eq!(cb.snapshot().state, BreakerState::Closed);
        assert!(cb.allow_request());

        cb.record_failure();
        assert_eq!(cb.snapshot().state, BreakerState::Open);
        assert!(!cb.allow_request());
    }

    #[test]
    fn success_resets_count_and_closes_from_any_state() {
        let cb = breaker(2, Duration::from_secs(60));

        cb.record_failure();
        cb.record_failure();
        assert_eq!(cb.snapshot().state, BreakerState::Open);

        cb.record_success();
        let snap = cb.snapshot();
        assert_eq!(snap.state, BreakerState::Closed);
        assert_eq!(snap.failure_count, 0);
    }

    #[test]
    fn denies_while_open_then_half_opens_after_timeout() {
        let cb = breaker(2, Duration::from_millis(50));

        cb.record_failure();
        cb.record_failure();
        assert!(!cb.allow_request());
        assert!(cb.snapshot().open_remaining.is_some());

        thread::sleep(Duration::from_millis(60));

        // First allow after the timeout flips to HalfOpen as a side effect.
        assert!(cb.allow_request());
        assert_eq!(cb.snapshot().state, BreakerState::HalfOpen);

        // HalfOpen keeps admitting callers.
        assert!(cb.allow_request());
    }

    #[test]
    fn half_open_failure_reopens_and_rearms() {
        let cb = breaker(2, Duration::from_millis(50));

        cb.record_failure();
        cb.record_failure();
        thread::sleep(Duration::from_millis(60));
        assert!(cb.allow_request());
        assert_eq!(cb.snapshot().state, BreakerState::HalfOpen);

        cb.record_failure();
        assert_eq!(cb.snapshot().state, BreakerState::Open);
        assert!(!cb.allow_request());
    }

    #[test]
    fn half_open_success_closes() {
        let cb = breaker(1, Duration::from_millis(50));

        cb.record_failure();
        thread::sleep(Duration::from_millis(60));
        assert!(cb.allow_request());

        cb.record_success();
        assert_eq!(cb.snapshot().state, BreakerState::Closed);
        assert_eq!(cb.snapshot().failure_count, 0);
    }

    #[test]
    fn reset_clears_open_state() {
        let cb = breaker(1, Duration::from_secs(60));

        cb.record_failure();
        assert!(!cb.allow_request());

        cb.reset();
        assert!(cb.allow_request());
        assert_eq!(cb.snapshot().failure_count, 0);
    }

    #[test]
    fn concurrent_failures_do_not_corrupt_the_count() {
        let cb = Arc::new(breaker(1000, Duration::from_secs(60)));

        let mut handles = vec![];
        for _ in 0..10 {
            let cb = Arc::clone(&cb);
            handles.push(thread::spawn(move || {
                for _ in 0..50 {
                    cb.record_failure();
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(cb.snapshot().failure_count, 500);
    }
}
