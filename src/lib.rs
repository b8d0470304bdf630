//! Market Pulse - cached, rate-limited market data for a crypto dashboard
//!
//! Fetches market data through a response cache and a token bucket, and
//! simulates live prices published on an in-process event bus.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod limiter;
pub mod models;
pub mod pubsub;
pub mod tasks;
pub mod ticker;

pub use api::AppState;
pub use client::{MarketClient, QueryParams};
pub use config::Config;
pub use error::{MarketError, Result};
pub use limiter::RateLimiter;
pub use pubsub::{Event, EventKind, PriceUpdate, PubSub, Subscription};
pub use ticker::LivePriceTicker;
