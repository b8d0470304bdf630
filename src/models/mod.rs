//! Data models
//!
//! Upstream market data DTOs plus the request/response bodies of the HTTP API.

pub mod market;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use market::{
    CoinDetails, CoinHistory, CoinMarket, GlobalData, MarketChart, PricePoint, SearchCoin, TrendingCoin,
};
pub use requests::{ChartQuery, HistoryQuery, MarketsQuery, SearchQuery, StartTrackingRequest};
pub use responses::{
    ErrorResponse, HealthResponse, LivePriceResponse, StatsResponse, TrackingResponse,
};
