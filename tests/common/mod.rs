//! Fake upstream market data API for integration tests.
//!
//! Serves canned CoinGecko-shaped responses on a random local port and
//! counts every request it receives.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use market_pulse::{client::RetryPolicy, Config, MarketClient};

#[derive(Clone, Default)]
pub struct Upstream {
    hits: Arc<AtomicUsize>,
    /// Remaining 429 answers before succeeding
    throttle: Arc<AtomicUsize>,
    queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

impl Upstream {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn throttle_next(&self, responses: usize) {
        self.throttle.store(responses, Ordering::SeqCst);
    }

    pub fn last_query(&self) -> HashMap<String, String> {
        self.queries.lock().unwrap().last().cloned().unwrap_or_default()
    }

    fn record(&self, query: HashMap<String, String>) -> Option<Response> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query);

        let throttled = self
            .throttle
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if throttled {
            return Some((StatusCode::TOO_MANY_REQUESTS, "slow down").into_response());
        }
        None
    }
}

type Q = Query<HashMap<String, String>>;

async fn markets(State(up): State<Upstream>, Query(q): Q) -> Response {
    let page = q.get("page").cloned().unwrap_or_else(|| "1".to_string());
    if let Some(resp) = up.record(q) {
        return resp;
    }
    Json(json!([
        { "id": "bitcoin", "symbol": "btc", "name": "Bitcoin", "current_price": 64000.0,
          "market_cap_rank": 1, "page": page },
        { "id": "ethereum", "symbol": "eth", "name": "Ethereum", "current_price": 3100.0,
          "market_cap_rank": 2 }
    ]))
    .into_response()
}

async fn coin(State(up): State<Upstream>, Path(id): Path<String>, Query(q): Q) -> Response {
    if let Some(resp) = up.record(q) {
        return resp;
    }
    if id == "missing" {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "coin not found" }))).into_response();
    }
    Json(json!({
        "id": id, "symbol": "btc", "name": "Bitcoin", "market_cap_rank": 1,
        "market_data": { "current_price": { "usd": 64000.0 }, "price_change_percentage_24h": 2.5 },
        "description": { "en": "Peer-to-peer cash" },
        "links": { "homepage": ["https://bitcoin.org"] }
    }))
    .into_response()
}

async fn market_chart(State(up): State<Upstream>, Path(id): Path<String>, Query(q): Q) -> Response {
    if let Some(resp) = up.record(q) {
        return resp;
    }
    if id == "missing" {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "coin not found" }))).into_response();
    }
    Json(json!({
        "prices": [[1700000000000.0, 35000.0], [1700003600000.0, 35100.0]],
        "market_caps": [[1700000000000.0, 6.8e11]],
        "total_volumes": [[1700000000000.0, 1.2e10]]
    }))
    .into_response()
}

async fn trending(State(up): State<Upstream>, Query(q): Q) -> Response {
    if let Some(resp) = up.record(q) {
        return resp;
    }
    Json(json!({
        "coins": [
            { "item": { "id": "pepe", "name": "Pepe", "symbol": "PEPE", "score": 0 } },
            { "item": { "id": "sui", "name": "Sui", "symbol": "SUI", "score": 1 } }
        ]
    }))
    .into_response()
}

async fn global(State(up): State<Upstream>, Query(q): Q) -> Response {
    if let Some(resp) = up.record(q) {
        return resp;
    }
    Json(json!({
        "data": {
            "active_cryptocurrencies": 12000,
            "total_market_cap": { "usd": 2.4e12 },
            "market_cap_percentage": { "btc": 52.1 }
        }
    }))
    .into_response()
}

async fn search(State(up): State<Upstream>, Query(q): Q) -> Response {
    if let Some(resp) = up.record(q) {
        return resp;
    }
    let coins: Vec<Value> = (0..8)
        .map(|i| json!({ "id": format!("coin-{}", i), "name": format!("Coin {}", i), "symbol": "C" }))
        .collect();
    Json(json!({ "coins": coins })).into_response()
}

async fn broken(State(up): State<Upstream>, Query(q): Q) -> Response {
    up.record(q);
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
}

async fn garbage(State(up): State<Upstream>, Query(q): Q) -> Response {
    if let Some(resp) = up.record(q) {
        return resp;
    }
    (StatusCode::OK, "not json").into_response()
}

/// Starts the fake upstream and returns its base URL and request log.
pub async fn spawn_upstream() -> (String, Upstream) {
    let upstream = Upstream::default();
    let app = Router::new()
        .route("/coins/markets", get(markets))
        .route("/coins/:id", get(coin))
        .route("/coins/:id/market_chart", get(market_chart))
        .route("/search/trending", get(trending))
        .route("/global", get(global))
        .route("/search", get(search))
        .route("/broken", get(broken))
        .route("/garbage", get(garbage))
        .with_state(upstream.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), upstream)
}

/// Config pointing at the fake upstream with fast retries.
pub fn test_config(base_url: &str) -> Config {
    Config {
        api_base_url: base_url.to_string(),
        retry_base_delay_ms: 10,
        retry_max_delay_ms: 40,
        request_timeout_secs: 5,
        ..Config::default()
    }
}

pub fn test_client(config: &Config) -> MarketClient {
    MarketClient::from_config(config)
        .unwrap()
        .with_retry_policy(RetryPolicy {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
            max_delay: Duration::from_millis(config.retry_max_delay_ms),
        })
}
