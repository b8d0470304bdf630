//! Token Bucket Module
//!
//! Refills are computed lazily when a token is requested: every whole
//! interval elapsed since the previous request grants a full bucket, capped
//! at capacity. The refill timestamp moves on every request, including the
//! ones that find the bucket empty, so the next refill boundary is always one
//! interval after the latest request. Under constant contention that
//! boundary keeps moving and waiters wait longer than one interval.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::limiter::{DEFAULT_CAPACITY, DEFAULT_REFILL_INTERVAL_MS};

// == Bucket State ==
/// Mutable state of a token bucket.
#[derive(Debug, Clone)]
pub struct BucketState {
    /// Tokens left, always within [0, capacity]
    pub available_tokens: u32,
    /// When the bucket was last refilled (or checked)
    pub last_refill: Instant,
    /// Maximum number of tokens
    pub capacity: u32,
    /// Interval after which a full bucket is granted
    pub refill_interval: Duration,
}

impl BucketState {
    fn new(capacity: u32, refill_interval: Duration) -> Self {
        Self {
            available_tokens: capacity,
            last_refill: Instant::now(),
            capacity,
            refill_interval,
        }
    }

    // == Try Take ==
    /// Refills from elapsed time, then takes a token if one is left.
    ///
    /// Returns `None` on success, or how long to wait before trying again.
    fn try_take(&mut self, now: Instant) -> Option<Duration> {
        let elapsed_ms = now.saturating_duration_since(self.last_refill).as_millis() as u64;
        let interval_ms = self.refill_interval.as_millis().max(1) as u64;

        let intervals = elapsed_ms / interval_ms;
        let refill = intervals.saturating_mul(self.capacity as u64);
        self.available_tokens = (self.available_tokens as u64)
            .saturating_add(refill)
            .min(self.capacity as u64) as u32;
        self.last_refill = now;

        if self.available_tokens > 0 {
            self.available_tokens -= 1;
            None
        } else {
            // Next boundary is one interval after the timestamp just set
            Some(Duration::from_millis(interval_ms))
        }
    }
}

// == Rate Limiter ==
/// Token bucket rate limiter.
///
/// Cloning is cheap and every clone shares the same bucket.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    state: Arc<Mutex<BucketState>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(
            DEFAULT_CAPACITY,
            Duration::from_millis(DEFAULT_REFILL_INTERVAL_MS),
        )
    }
}

impl RateLimiter {
    // == Constructor ==
    /// Creates a full bucket of `capacity` tokens refilled every `refill_interval`.
    pub fn new(capacity: u32, refill_interval: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(BucketState::new(capacity, refill_interval))),
        }
    }

    // == Acquire ==
    /// Waits until a token is available and takes it.
    ///
    /// Never fails; a starved caller keeps sleeping until the next refill
    /// boundary and retries.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
                state.try_take(Instant::now())
            };

            match wait {
                None => return,
                Some(wait) => {
                    debug!(wait_ms = wait.as_millis() as u64, "rate limiter empty, waiting");
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    /// Tokens currently left, without applying a refill.
    pub fn available_tokens(&self) -> u32 {
        self.snapshot().available_tokens
    }

    pub fn capacity(&self) -> u32 {
        self.snapshot().capacity
    }

    /// Copy of the current bucket state.
    pub fn snapshot(&self) -> BucketState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
