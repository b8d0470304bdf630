//! Market data DTOs
//!
//! Shapes of the upstream API responses consumed by the dashboard. Only the
//! fields the dashboard reads are modelled; everything else is ignored.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One row of the `coins/markets` listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinMarket {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub total_volume: Option<f64>,
    #[serde(default)]
    pub high_24h: Option<f64>,
    #[serde(default)]
    pub low_24h: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
}

/// A single coin as returned by `coins/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinDetails {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub image: Option<CoinImage>,
    #[serde(default)]
    pub market_data: Option<MarketData>,
    #[serde(default)]
    pub description: Option<Description>,
    #[serde(default)]
    pub links: Option<Links>,
}

impl CoinDetails {
    /// Current price in `currency` (e.g. "usd"), if reported.
    pub fn price_in(&self, currency: &str) -> Option<f64> {
        self.market_data
            .as_ref()
            .and_then(|data| data.current_price.get(currency))
            .copied()
            .flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinImage {
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
}

/// Per-currency market figures of a coin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    #[serde(default)]
    pub current_price: HashMap<String, Option<f64>>,
    #[serde(default)]
    pub market_cap: HashMap<String, Option<f64>>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Description {
    #[serde(default)]
    pub en: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub homepage: Vec<String>,
    #[serde(default)]
    pub blockchain_site: Vec<String>,
    #[serde(default)]
    pub official_forum_url: Vec<String>,
    #[serde(default)]
    pub subreddit_url: Option<String>,
    #[serde(default)]
    pub repos_url: Option<ReposUrl>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReposUrl {
    #[serde(default)]
    pub github: Vec<String>,
}

/// A coin from `search/trending`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingCoin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
    #[serde(default)]
    pub price_btc: Option<f64>,
    #[serde(default)]
    pub score: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TrendingItem {
    pub item: TrendingCoin,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TrendingResponse {
    #[serde(default)]
    pub coins: Vec<TrendingItem>,
}

/// Price history from `coins/{id}/market_chart`, as `[timestamp_ms, value]` pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketChart {
    #[serde(default)]
    pub prices: Vec<[f64; 2]>,
    #[serde(default)]
    pub market_caps: Vec<[f64; 2]>,
    #[serde(default)]
    pub total_volumes: Vec<[f64; 2]>,
}

/// Price history of one coin within a combined history request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinHistory {
    /// Coin identifier
    pub name: String,
    pub prices: Vec<[f64; 2]>,
}

/// A dated price sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

impl MarketChart {
    /// Price samples with their timestamps decoded; malformed timestamps are skipped.
    pub fn price_points(&self) -> Vec<PricePoint> {
        self.prices
            .iter()
            .filter_map(|[ts, price]| {
                Utc.timestamp_millis_opt(*ts as i64)
                    .single()
                    .map(|timestamp| PricePoint {
                        timestamp,
                        price: *price,
                    })
            })
            .collect()
    }

    /// Latest sampled price, if any.
    pub fn last_price(&self) -> Option<f64> {
        self.prices.last().map(|[_, price]| *price)
    }
}

/// Whole-market summary from `global`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalData {
    #[serde(default)]
    pub active_cryptocurrencies: Option<u64>,
    #[serde(default)]
    pub markets: Option<u64>,
    #[serde(default)]
    pub total_market_cap: HashMap<String, f64>,
    #[serde(default)]
    pub total_volume: HashMap<String, f64>,
    #[serde(default)]
    pub market_cap_percentage: HashMap<String, f64>,
    #[serde(default)]
    pub market_cap_change_percentage_24h_usd: Option<f64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GlobalResponse {
    pub data: GlobalData,
}

/// A coin hit from `search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCoin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub coins: Vec<SearchCoin>,
}
