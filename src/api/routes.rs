//! API Routes
//!
//! Configures the Axum router with all endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    coin_details_handler, global_handler, health_handler, history_handler, live_price_handler,
    market_chart_handler, markets_handler, search_handler, start_live_handler, stats_handler,
    stop_live_handler, trending_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin, the dashboard is served from elsewhere
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/coins/markets", get(markets_handler))
        .route("/api/coins/:id", get(coin_details_handler))
        .route("/api/coins/:id/market_chart", get(market_chart_handler))
        .route("/api/history", get(history_handler))
        .route("/api/trending", get(trending_handler))
        .route("/api/global", get(global_handler))
        .route("/api/search", get(search_handler))
        .route(
            "/api/live/:id",
            post(start_live_handler)
                .get(live_price_handler)
                .delete(stop_live_handler),
        )
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
