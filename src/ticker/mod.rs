//! Live Price Ticker Module
//!
//! Simulated live prices: a random walk per tracked identifier, published
//! on the pub/sub channel once immediately and then once per period.

mod service;

pub use service::LivePriceTicker;

// == Public Constants ==
/// Seconds between two simulated updates of the same identifier
pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 60;

/// Largest relative move of a single update (1%)
pub const MAX_STEP_FRACTION: f64 = 0.01;
