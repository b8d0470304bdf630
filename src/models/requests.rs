//! Request DTOs for the HTTP API
//!
//! Defines the structure of incoming request bodies and query strings.

use serde::Deserialize;

use crate::client::DEFAULT_HISTORY_COINS;

/// Body of `POST /api/live/:id`
#[derive(Debug, Clone, Deserialize)]
pub struct StartTrackingRequest {
    /// Price the simulated feed starts from
    pub initial_price: f64,
}

impl StartTrackingRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if !self.initial_price.is_finite() || self.initial_price <= 0.0 {
            return Some("initial_price must be a positive number".to_string());
        }
        None
    }
}

/// Query of `GET /api/coins/markets`
#[derive(Debug, Clone, Deserialize)]
pub struct MarketsQuery {
    #[serde(default = "default_page")]
    pub page: u32,
}

/// Query of `GET /api/coins/:id/market_chart`
#[derive(Debug, Clone, Deserialize)]
pub struct ChartQuery {
    #[serde(default = "default_days")]
    pub days: u32,
}

/// Query of `GET /api/search`
#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}

/// Query of `GET /api/history`
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryQuery {
    /// Comma separated coin identifiers
    #[serde(default)]
    pub ids: Option<String>,
    #[serde(default = "default_days")]
    pub days: u32,
}

impl HistoryQuery {
    /// Requested identifiers, or the default chart coins when `ids` is absent.
    pub fn coin_ids(&self) -> Vec<String> {
        match &self.ids {
            Some(ids) => ids
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(String::from)
                .collect(),
            None => DEFAULT_HISTORY_COINS.iter().map(|id| id.to_string()).collect(),
        }
    }
}

fn default_page() -> u32 {
    1
}

fn default_days() -> u32 {
    30
}
