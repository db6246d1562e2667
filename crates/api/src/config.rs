//! Gateway configuration loaded from environment variables.

use std::time::Duration;

/// Gateway configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `8080`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `RESERVATION_SERVICE_URL` / `LOYALTY_SERVICE_URL` / `PAYMENT_SERVICE_URL`
///   — downstream base URLs
/// - `CB_FAILURE_THRESHOLD` — breaker failure threshold (default: `5`)
/// - `CB_RESET_TIMEOUT_SECS` — breaker reset timeout (default: `60`)
/// - `QUEUE_IDLE_WAIT_MS` — drain worker empty-queue wait (default: `1000`)
/// - `DATABASE_URL` — when set, the retry queue is stored in PostgreSQL
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub reservation_url: String,
    pub loyalty_url: String,
    pub payment_url: String,
    pub breaker_failure_threshold: u32,
    pub breaker_reset_timeout: Duration,
    pub queue_idle_wait: Duration,
    pub database_url: Option<String>,
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_parse("PORT", 8080),
            log_level: env_or("RUST_LOG", "info"),
            reservation_url: env_or("RESERVATION_SERVICE_URL", "http://localhost:8070"),
            loyalty_url: env_or("LOYALTY_SERVICE_URL", "http://localhost:8050"),
            payment_url: env_or("PAYMENT_SERVICE_URL", "http://localhost:8060"),
            breaker_failure_threshold: env_parse("CB_FAILURE_THRESHOLD", 5),
            breaker_reset_timeout: Duration::from_secs(env_parse("CB_RESET_TIMEOUT_SECS", 60)),
            queue_idle_wait: Duration::from_millis(env_parse("QUEUE_IDLE_WAIT_MS", 1000)),
            database_url: std::env::var("DATABASE_URL").ok(),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            reservation_url: "http://localhost:8070".to_string(),
            loyalty_url: "http://localhost:8050".to_string(),
            payment_url: "http://localhost:8060".to_string(),
            breaker_failure_threshold: 5,
            breaker_reset_timeout: Duration::from_secs(60),
            queue_idle_wait: Duration::from_millis(1000),
            database_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.breaker_failure_threshold, 5);
        assert_eq!(config.breaker_reset_timeout, Duration::from_secs(60));
        assert_eq!(config.queue_idle_wait, Duration::from_millis(1000));
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 9090,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:9090");
    }
}
