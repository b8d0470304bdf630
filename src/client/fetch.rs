//! Cached Fetch
//!
//! `MarketClient::fetch_with_cache` is the single path to the upstream API.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::{CacheStats, ResponseCache};
use crate::client::{fingerprint, QueryParams, RetryPolicy};
use crate::config::Config;
use crate::error::{MarketError, Result};
use crate::limiter::RateLimiter;

/// Query parameter carrying the API credential.
pub const API_KEY_PARAM: &str = "x_cg_demo_api_key";

// == Market Client ==
/// Client for the market data API with response caching and rate limiting.
///
/// Cloning is cheap; clones share the HTTP pool, cache and limiter.
#[derive(Debug, Clone)]
pub struct MarketClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    cache: Arc<RwLock<ResponseCache>>,
    limiter: RateLimiter,
    retry: RetryPolicy,
    default_ttl: Duration,
}

impl MarketClient {
    // == Constructor ==
    /// Creates a client from configuration with a fresh cache and limiter.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = Arc::new(RwLock::new(ResponseCache::new(config.cache_default_ttl())));
        let limiter = RateLimiter::new(config.rate_limit_capacity, config.rate_limit_interval());
        Self::new(config, cache, limiter)
    }

    /// Creates a client sharing the given cache and limiter.
    pub fn new(
        config: &Config,
        cache: Arc<RwLock<ResponseCache>>,
        limiter: RateLimiter,
    ) -> Result<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            cache,
            limiter,
            retry: RetryPolicy::from_config(config),
            default_ttl: config.fetch_ttl(),
        })
    }

    /// Replaces the 429 backoff policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    // == Fetch With Cache ==
    /// Returns the response for `endpoint` with `params`, from cache when fresh.
    ///
    /// On a miss this waits for a rate limiter token, performs the GET and
    /// caches the JSON body for `ttl` (the client's fetch TTL when `None`).
    /// Failed requests and bodies that do not decode as `T` are not cached.
    /// A zero `ttl` is rejected before the cache or limiter is touched.
    pub async fn fetch_with_cache<T>(
        &self,
        endpoint: &str,
        params: &QueryParams,
        ttl: Option<Duration>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let ttl = ttl.unwrap_or(self.default_ttl);
        if ttl.is_zero() {
            return Err(MarketError::InvalidRequest(
                "Cache TTL must be greater than zero".to_string(),
            ));
        }

        let key = fingerprint(endpoint, params);

        let cached = self.cache.write().await.get(&key);
        if let Some(value) = cached {
            return Ok(serde_json::from_value(value)?);
        }

        self.limiter.acquire().await;

        let value = self.get_json(endpoint, params).await?;
        let decoded: T = serde_json::from_value(value.clone())?;

        self.cache
            .write()
            .await
            .set(key, value, Some(ttl))?;

        Ok(decoded)
    }

    // == Get JSON ==
    /// Performs the GET, retrying only on HTTP 429.
    async fn get_json(&self, endpoint: &str, params: &QueryParams) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));

        let mut query = params.to_query_pairs();
        if let Some(api_key) = &self.api_key {
            query.push((API_KEY_PARAM.to_string(), api_key.clone()));
        }

        let mut attempt: u32 = 0;
        loop {
            debug!(endpoint = %endpoint, attempt, "requesting upstream");
            let response = self.http.get(&url).query(&query).send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempt >= self.retry.max_retries {
                    return Err(MarketError::RateLimited {
                        attempts: attempt + 1,
                    });
                }
                let delay = self.retry.delay_for(attempt);
                warn!(
                    endpoint = %endpoint,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "upstream rate limit hit, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(MarketError::Upstream {
                    status: status.as_u16(),
                    body,
                });
            }

            let bytes = response.bytes().await?;
            return Ok(serde_json::from_slice(&bytes)?);
        }
    }

    /// Shared response cache.
    pub fn cache(&self) -> &Arc<RwLock<ResponseCache>> {
        &self.cache
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}
