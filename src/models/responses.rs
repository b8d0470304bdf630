//! Response DTOs for the HTTP API
//!
//! Defines the structure of outgoing response bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body of `GET /api/live/:id`
#[derive(Debug, Clone, Serialize)]
pub struct LivePriceResponse {
    pub id: String,
    pub price: f64,
}

impl LivePriceResponse {
    pub fn new(id: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            price,
        }
    }
}

/// Response body of `POST /api/live/:id` and `DELETE /api/live/:id`
#[derive(Debug, Clone, Serialize)]
pub struct TrackingResponse {
    /// Human readable outcome
    pub message: String,
    pub id: String,
    /// Whether a feed is running for `id` after the call
    pub tracking: bool,
}

impl TrackingResponse {
    pub fn started(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            message: format!("Live updates for '{}' started", id),
            id,
            tracking: true,
        }
    }

    pub fn stopped(id: impl Into<String>, was_tracking: bool) -> Self {
        let id = id.into();
        let message = if was_tracking {
            format!("Live updates for '{}' stopped", id)
        } else {
            format!("'{}' was not tracked", id)
        };
        Self {
            message,
            id,
            tracking: false,
        }
    }
}

/// Response body of `GET /stats`
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Stale entries evicted on lookup
    pub expirations: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Rate limiter tokens left
    pub available_tokens: u32,
    /// Identifiers with a running live feed
    pub tracked: Vec<String>,
}

impl StatsResponse {
    pub fn new(cache: &CacheStats, available_tokens: u32, tracked: Vec<String>) -> Self {
        Self {
            hits: cache.hits,
            misses: cache.misses,
            expirations: cache.expirations,
            total_entries: cache.total_entries,
            hit_rate: cache.hit_rate(),
            available_tokens,
            tracked,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
