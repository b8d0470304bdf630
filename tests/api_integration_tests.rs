//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint against a fake
//! upstream.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use common::{spawn_upstream, test_config, Upstream};
use market_pulse::{api::create_router, AppState};

// == Helper Functions ==

async fn create_test_app() -> (Router, AppState, Upstream) {
    let (base_url, upstream) = spawn_upstream().await;
    let state = AppState::from_config(&test_config(&base_url)).unwrap();
    (create_router(state.clone()), state, upstream)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn start_live(id: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/api/live/{}", id))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// == Market Data Endpoint Tests ==

#[tokio::test]
async fn test_markets_cached_across_requests() {
    let (app, _state, upstream) = create_test_app().await;

    let first = app.clone().oneshot(get("/api/coins/markets")).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let first = body_to_json(first.into_body()).await;

    let second = app.clone().oneshot(get("/api/coins/markets")).await.unwrap();
    let second = body_to_json(second.into_body()).await;

    assert_eq!(first, second);
    assert_eq!(first[0]["id"], "bitcoin");
    assert_eq!(upstream.hits(), 1);

    let stats = app.oneshot(get("/stats")).await.unwrap();
    let stats = body_to_json(stats.into_body()).await;
    assert_eq!(stats["hits"], 1);
    assert_eq!(stats["misses"], 1);
    assert_eq!(stats["total_entries"], 1);
    assert_eq!(stats["available_tokens"], 9);
}

#[tokio::test]
async fn test_markets_page_forwarded() {
    let (app, _state, upstream) = create_test_app().await;

    let response = app
        .oneshot(get("/api/coins/markets?page=3"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(upstream.last_query()["page"], "3");
}

#[tokio::test]
async fn test_coin_details_endpoint() {
    let (app, _state, _upstream) = create_test_app().await;

    let response = app.oneshot(get("/api/coins/bitcoin")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["id"], "bitcoin");
    assert_eq!(json["market_data"]["current_price"]["usd"], 64000.0);
}

#[tokio::test]
async fn test_upstream_error_is_bad_gateway() {
    let (app, _state, _upstream) = create_test_app().await;

    let response = app.oneshot(get("/api/coins/missing")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("404"));
}

#[tokio::test]
async fn test_upstream_throttling_is_too_many_requests() {
    let (app, _state, upstream) = create_test_app().await;
    upstream.throttle_next(100);

    let response = app.oneshot(get("/api/trending")).await.unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(upstream.hits(), 4);
}

#[tokio::test]
async fn test_chart_trending_global_search() {
    let (app, _state, _upstream) = create_test_app().await;

    let chart = app
        .clone()
        .oneshot(get("/api/coins/bitcoin/market_chart?days=7"))
        .await
        .unwrap();
    assert_eq!(chart.status(), StatusCode::OK);
    let chart = body_to_json(chart.into_body()).await;
    assert_eq!(chart["prices"].as_array().unwrap().len(), 2);

    let trending = app.clone().oneshot(get("/api/trending")).await.unwrap();
    let trending = body_to_json(trending.into_body()).await;
    assert_eq!(trending[0]["id"], "pepe");

    let global = app.clone().oneshot(get("/api/global")).await.unwrap();
    let global = body_to_json(global.into_body()).await;
    assert_eq!(global["active_cryptocurrencies"], 12000);

    let search = app.oneshot(get("/api/search?query=coin")).await.unwrap();
    let search = body_to_json(search.into_body()).await;
    assert_eq!(search.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_history_endpoint() {
    let (app, _state, upstream) = create_test_app().await;

    let response = app
        .clone()
        .oneshot(get("/api/history?ids=bitcoin,ethereum&days=7"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json[0]["name"], "bitcoin");
    assert_eq!(json[1]["name"], "ethereum");
    assert_eq!(json[1]["prices"][1][1], 35100.0);
    assert_eq!(upstream.hits(), 2);
    assert_eq!(upstream.last_query()["days"], "7");

    let defaults = app.oneshot(get("/api/history")).await.unwrap();
    let defaults = body_to_json(defaults.into_body()).await;
    assert_eq!(defaults.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_history_without_ids_is_bad_request() {
    let (app, _state, upstream) = create_test_app().await;

    let response = app.oneshot(get("/api/history?ids=")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(upstream.hits(), 0);
}

#[tokio::test]
async fn test_empty_search_is_bad_request() {
    let (app, _state, upstream) = create_test_app().await;

    let response = app.oneshot(get("/api/search?query=")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(upstream.hits(), 0);
}

// == Live Price Endpoint Tests ==

#[tokio::test]
async fn test_live_feed_lifecycle() {
    let (app, state, _upstream) = create_test_app().await;

    let response = app
        .clone()
        .oneshot(start_live("bitcoin", r#"{"initial_price":100.0}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["tracking"], true);

    let response = app
        .clone()
        .oneshot(get("/api/live/bitcoin"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    let price = json["price"].as_f64().unwrap();
    assert!((99.0..=101.0).contains(&price));

    let stats = app.clone().oneshot(get("/stats")).await.unwrap();
    let stats = body_to_json(stats.into_body()).await;
    assert_eq!(stats["tracked"][0], "bitcoin");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/live/bitcoin")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["tracking"], false);
    assert!(!state.ticker.is_tracking("bitcoin"));

    let response = app.oneshot(get("/api/live/bitcoin")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stop_unknown_feed_is_noop() {
    let (app, _state, _upstream) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/live/unknown")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["tracking"], false);
}

#[tokio::test]
async fn test_live_rejects_bad_price() {
    let (app, state, _upstream) = create_test_app().await;

    let response = app
        .oneshot(start_live("bitcoin", r#"{"initial_price":0}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!state.ticker.is_tracking("bitcoin"));
}

#[tokio::test]
async fn test_live_rejects_bad_identifier() {
    let (app, state, _upstream) = create_test_app().await;

    let response = app
        .oneshot(start_live("bit%20coin", r#"{"initial_price":10.0}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(state.ticker.tracked_ids().is_empty());
}

#[tokio::test]
async fn test_live_price_missing_json_field() {
    let (app, _state, _upstream) = create_test_app().await;

    let response = app
        .oneshot(start_live("bitcoin", r#"{}"#))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

// == Health Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _state, _upstream) = create_test_app().await;

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}
