//! API Handlers
//!
//! HTTP request handlers for each endpoint.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::client::{validate_id, MarketClient};
use crate::config::Config;
use crate::error::{MarketError, Result};
use crate::models::{
    ChartQuery, CoinDetails, CoinHistory, CoinMarket, GlobalData, HealthResponse, HistoryQuery,
    LivePriceResponse, MarketChart, MarketsQuery, SearchCoin, SearchQuery, StartTrackingRequest,
    StatsResponse, TrackingResponse, TrendingCoin,
};
use crate::pubsub::PubSub;
use crate::ticker::LivePriceTicker;

/// Application state shared across all handlers.
///
/// Holds the single client (with its cache and limiter), event bus and
/// ticker of the process. Every field is a cheap shared handle.
#[derive(Clone)]
pub struct AppState {
    pub client: MarketClient,
    pub pubsub: PubSub,
    pub ticker: LivePriceTicker,
}

impl AppState {
    /// Creates a new AppState from already built components.
    pub fn new(client: MarketClient, pubsub: PubSub, ticker: LivePriceTicker) -> Self {
        Self {
            client,
            pubsub,
            ticker,
        }
    }

    /// Builds every component from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let client = MarketClient::from_config(config)?;
        let pubsub = PubSub::new();
        let ticker = LivePriceTicker::new(pubsub.clone(), config.tick_interval());
        Ok(Self::new(client, pubsub, ticker))
    }
}

/// Handler for GET /api/coins/markets
pub async fn markets_handler(
    State(state): State<AppState>,
    Query(query): Query<MarketsQuery>,
) -> Result<Json<Vec<CoinMarket>>> {
    Ok(Json(state.client.markets(query.page).await?))
}

/// Handler for GET /api/coins/:id
pub async fn coin_details_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CoinDetails>> {
    Ok(Json(state.client.coin_details(&id).await?))
}

/// Handler for GET /api/coins/:id/market_chart
pub async fn market_chart_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<MarketChart>> {
    Ok(Json(state.client.market_chart(&id, query.days).await?))
}

/// Handler for GET /api/history
///
/// Combined price histories, by default for bitcoin, ethereum and binancecoin.
pub async fn history_handler(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<CoinHistory>>> {
    let ids = query.coin_ids();
    Ok(Json(
        state
            .client
            .historical_prices(ids.as_slice(), query.days)
            .await?,
    ))
}

/// Handler for GET /api/trending
pub async fn trending_handler(State(state): State<AppState>) -> Result<Json<Vec<TrendingCoin>>> {
    Ok(Json(state.client.trending().await?))
}

/// Handler for GET /api/global
pub async fn global_handler(State(state): State<AppState>) -> Result<Json<GlobalData>> {
    Ok(Json(state.client.global().await?))
}

/// Handler for GET /api/search
pub async fn search_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<SearchCoin>>> {
    Ok(Json(state.client.search(&query.query).await?))
}

/// Handler for POST /api/live/:id
///
/// Starts (or restarts) the simulated feed for an identifier.
pub async fn start_live_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<StartTrackingRequest>,
) -> Result<Json<TrackingResponse>> {
    validate_id(&id)?;
    if let Some(error_msg) = req.validate() {
        return Err(MarketError::InvalidRequest(error_msg));
    }

    state.ticker.start_updates(id.clone(), req.initial_price);

    Ok(Json(TrackingResponse::started(id)))
}

/// Handler for GET /api/live/:id
pub async fn live_price_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LivePriceResponse>> {
    let price = state
        .ticker
        .current_price(&id)
        .ok_or_else(|| MarketError::NotTracked(id.clone()))?;

    Ok(Json(LivePriceResponse::new(id, price)))
}

/// Handler for DELETE /api/live/:id
pub async fn stop_live_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<TrackingResponse> {
    let was_tracking = state.ticker.stop_updates(&id);
    Json(TrackingResponse::stopped(id, was_tracking))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.client.cache_stats().await;

    Json(StatsResponse::new(
        &cache,
        state.client.limiter().available_tokens(),
        state.ticker.tracked_ids(),
    ))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
