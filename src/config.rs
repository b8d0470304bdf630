//! Configuration Module
//!
//! Handles loading and managing configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{MarketError, Result};

/// Default upstream market data API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Runtime configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the upstream market data API
    pub api_base_url: String,
    /// Optional API credential appended to every outbound request
    pub api_key: Option<String>,
    /// HTTP server port
    pub server_port: u16,
    /// Default TTL in milliseconds for cache entries set without explicit TTL
    pub cache_default_ttl_ms: u64,
    /// TTL in milliseconds used by the typed endpoint helpers
    pub fetch_ttl_ms: u64,
    /// Token bucket capacity
    pub rate_limit_capacity: u32,
    /// Token bucket refill interval in milliseconds
    pub rate_limit_interval_ms: u64,
    /// Retries after an upstream 429 before giving up
    pub max_retries: u32,
    /// First backoff delay in milliseconds
    pub retry_base_delay_ms: u64,
    /// Upper bound on a single backoff delay in milliseconds
    pub retry_max_delay_ms: u64,
    /// Live price tick period in seconds
    pub tick_interval_secs: u64,
    /// Outbound request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `API_BASE_URL` - Upstream API base (default: CoinGecko v3)
    /// - `API_KEY` - Upstream credential (default: none)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_DEFAULT_TTL_MS` - Cache default TTL (default: 900000)
    /// - `FETCH_TTL_MS` - TTL for endpoint helpers (default: 60000)
    /// - `RATE_LIMIT_CAPACITY` - Tokens per bucket (default: 10)
    /// - `RATE_LIMIT_INTERVAL_MS` - Refill interval (default: 60000)
    /// - `MAX_RETRIES` - Retries on 429 (default: 3)
    /// - `RETRY_BASE_DELAY_MS` - First backoff delay (default: 1000)
    /// - `RETRY_MAX_DELAY_MS` - Backoff cap (default: 8000)
    /// - `TICK_INTERVAL_SECS` - Live price period (default: 60)
    /// - `REQUEST_TIMEOUT_SECS` - Outbound timeout (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            api_base_url: env::var("API_BASE_URL")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.api_base_url),
            api_key: env::var("API_KEY").ok().filter(|v| !v.is_empty()),
            server_port: parse_env("SERVER_PORT", defaults.server_port),
            cache_default_ttl_ms: parse_env("CACHE_DEFAULT_TTL_MS", defaults.cache_default_ttl_ms),
            fetch_ttl_ms: parse_env("FETCH_TTL_MS", defaults.fetch_ttl_ms),
            rate_limit_capacity: parse_env("RATE_LIMIT_CAPACITY", defaults.rate_limit_capacity),
            rate_limit_interval_ms: parse_env(
                "RATE_LIMIT_INTERVAL_MS",
                defaults.rate_limit_interval_ms,
            ),
            max_retries: parse_env("MAX_RETRIES", defaults.max_retries),
            retry_base_delay_ms: parse_env("RETRY_BASE_DELAY_MS", defaults.retry_base_delay_ms),
            retry_max_delay_ms: parse_env("RETRY_MAX_DELAY_MS", defaults.retry_max_delay_ms),
            tick_interval_secs: parse_env("TICK_INTERVAL_SECS", defaults.tick_interval_secs),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs),
        }
    }

    // == Validation ==
    /// Rejects zero TTLs, limiter settings and tick periods.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("CACHE_DEFAULT_TTL_MS", self.cache_default_ttl_ms),
            ("FETCH_TTL_MS", self.fetch_ttl_ms),
            ("RATE_LIMIT_CAPACITY", u64::from(self.rate_limit_capacity)),
            ("RATE_LIMIT_INTERVAL_MS", self.rate_limit_interval_ms),
            ("TICK_INTERVAL_SECS", self.tick_interval_secs),
        ];

        for (name, value) in positive {
            if value == 0 {
                return Err(MarketError::InvalidConfig(format!(
                    "{} must be positive",
                    name
                )));
            }
        }
        Ok(())
    }

    pub fn cache_default_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_default_ttl_ms)
    }

    pub fn fetch_ttl(&self) -> Duration {
        Duration::from_millis(self.fetch_ttl_ms)
    }

    pub fn rate_limit_interval(&self) -> Duration {
        Duration::from_millis(self.rate_limit_interval_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }
}

/// Reads and parses an environment variable, falling back on absence or parse failure.
fn parse_env<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_key: None,
            server_port: 3000,
            cache_default_ttl_ms: 15 * 60 * 1000,
            fetch_ttl_ms: 60_000,
            rate_limit_capacity: 10,
            rate_limit_interval_ms: 60_000,
            max_retries: 3,
            retry_base_delay_ms: 1000,
            retry_max_delay_ms: 8000,
            tick_interval_secs: 60,
            request_timeout_secs: 30,
        }
    }
}
