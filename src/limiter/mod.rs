//! Rate Limiter Module
//!
//! Token bucket gating outbound requests to the market data API.

mod bucket;

pub use bucket::{BucketState, RateLimiter};

// == Public Constants ==
/// Tokens per bucket for the public API tier
pub const DEFAULT_CAPACITY: u32 = 10;

/// Refill interval in milliseconds (one full bucket per minute)
pub const DEFAULT_REFILL_INTERVAL_MS: u64 = 60_000;
