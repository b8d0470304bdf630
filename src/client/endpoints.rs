//! Typed endpoints used by the dashboard.

use futures::future::try_join_all;
use tracing::debug;

use crate::client::{fingerprint, MarketClient, QueryParams};
use crate::error::{MarketError, Result};
use crate::models::market::{
    CoinDetails, CoinHistory, CoinMarket, GlobalData, GlobalResponse, MarketChart, SearchCoin, SearchResponse,
    TrendingCoin, TrendingResponse,
};

/// Quote currency for every listing and chart
pub const VS_CURRENCY: &str = "usd";

/// Rows per markets page
pub const MARKETS_PER_PAGE: u32 = 10;

/// Search hits kept per query
pub const SEARCH_RESULT_LIMIT: usize = 5;

/// Coins shown on the history chart when none are requested
pub const DEFAULT_HISTORY_COINS: [&str; 3] = ["bitcoin", "ethereum", "binancecoin"];

/// Cache slot prefix of combined history results
const HISTORY_KEY: &str = "history";

impl MarketClient {
    /// Top coins by market cap, `MARKETS_PER_PAGE` per page (pages start at 1).
    pub async fn markets(&self, page: u32) -> Result<Vec<CoinMarket>> {
        if page == 0 {
            return Err(MarketError::InvalidRequest(
                "Page numbers start at 1".to_string(),
            ));
        }

        let params = QueryParams::new()
            .with("vs_currency", VS_CURRENCY)
            .with("order", "market_cap_desc")
            .with("per_page", MARKETS_PER_PAGE)
            .with("page", page)
            .with("sparkline", false);

        self.fetch_with_cache("coins/markets", &params, None).await
    }

    /// Full details of one coin.
    pub async fn coin_details(&self, id: &str) -> Result<CoinDetails> {
        validate_id(id)?;
        self.fetch_with_cache(&format!("coins/{}", id), &QueryParams::new(), None)
            .await
    }

    /// Coins currently trending in searches.
    pub async fn trending(&self) -> Result<Vec<TrendingCoin>> {
        let response: TrendingResponse = self
            .fetch_with_cache("search/trending", &QueryParams::new(), None)
            .await?;
        Ok(response.coins.into_iter().map(|entry| entry.item).collect())
    }

    /// Price, market cap and volume history over the last `days` days.
    pub async fn market_chart(&self, id: &str, days: u32) -> Result<MarketChart> {
        validate_id(id)?;
        if days == 0 {
            return Err(MarketError::InvalidRequest(
                "Chart window must be at least one day".to_string(),
            ));
        }

        let params = QueryParams::new()
            .with("vs_currency", VS_CURRENCY)
            .with("days", days);

        self.fetch_with_cache(&format!("coins/{}/market_chart", id), &params, None)
            .await
    }

    // == Historical Prices ==
    /// Price histories of several coins over the last `days` days.
    ///
    /// Charts are fetched concurrently, each through its own cache slot and
    /// limiter token, and the combined result is cached under one key.
    /// Any failed chart fails the whole call and nothing combined is cached.
    pub async fn historical_prices<S: AsRef<str>>(
        &self,
        ids: &[S],
        days: u32,
    ) -> Result<Vec<CoinHistory>> {
        if ids.is_empty() {
            return Err(MarketError::InvalidRequest(
                "At least one coin is required".to_string(),
            ));
        }
        for id in ids {
            validate_id(id.as_ref())?;
        }
        if days == 0 {
            return Err(MarketError::InvalidRequest(
                "Chart window must be at least one day".to_string(),
            ));
        }

        let joined = ids
            .iter()
            .map(|id| id.as_ref())
            .collect::<Vec<&str>>()
            .join(",");
        let params = QueryParams::new()
            .with("ids", joined)
            .with("vs_currency", VS_CURRENCY)
            .with("days", days);
        let key = fingerprint(HISTORY_KEY, &params);

        let cached = self.cache().write().await.get(&key);
        if let Some(value) = cached {
            return Ok(serde_json::from_value(value)?);
        }

        let charts =
            try_join_all(ids.iter().map(|id| self.market_chart(id.as_ref(), days))).await?;
        let history: Vec<CoinHistory> = ids
            .iter()
            .zip(charts)
            .map(|(id, chart)| CoinHistory {
                name: id.as_ref().to_string(),
                prices: chart.prices,
            })
            .collect();

        debug!(coins = history.len(), days, "combined price history fetched");
        self.cache()
            .write()
            .await
            .set(key, serde_json::to_value(&history)?, Some(self.default_ttl()))?;

        Ok(history)
    }

    /// Whole-market summary.
    pub async fn global(&self) -> Result<GlobalData> {
        let response: GlobalResponse = self
            .fetch_with_cache("global", &QueryParams::new(), None)
            .await?;
        Ok(response.data)
    }

    /// Coins matching `query`, best `SEARCH_RESULT_LIMIT` hits.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchCoin>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(MarketError::InvalidRequest(
                "Search query cannot be empty".to_string(),
            ));
        }

        let params = QueryParams::new().with("query", query);
        let response: SearchResponse = self.fetch_with_cache("search", &params, None).await?;

        Ok(response
            .coins
            .into_iter()
            .take(SEARCH_RESULT_LIMIT)
            .collect())
    }
}

/// Checks an asset identifier before it is spliced into a URL path.
pub fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(MarketError::InvalidRequest(
            "Identifier cannot be empty".to_string(),
        ));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(MarketError::InvalidRequest(format!(
            "Invalid identifier: {}",
            id
        )));
    }
    Ok(())
}
