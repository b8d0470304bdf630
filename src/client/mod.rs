//! Market Client Module
//!
//! Cached, rate-limited access to the upstream market data REST API.
//!
//! # Flow
//! 1. Derive the request fingerprint from endpoint and parameters
//! 2. Answer from the response cache when the fingerprint is fresh
//! 3. Otherwise wait for a rate limiter token and issue the GET
//! 4. Retry on HTTP 429 with capped exponential backoff
//! 5. Store the response under the fingerprint and return it

mod endpoints;
mod fetch;
mod fingerprint;
mod retry;

pub use endpoints::{
    validate_id, DEFAULT_HISTORY_COINS, MARKETS_PER_PAGE, SEARCH_RESULT_LIMIT, VS_CURRENCY,
};
pub use fetch::{MarketClient, API_KEY_PARAM};
pub use fingerprint::{fingerprint, QueryParams};
pub use retry::RetryPolicy;
