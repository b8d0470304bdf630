//! API Module
//!
//! HTTP handlers and routing exposing the market data layer as JSON.
//!
//! # Endpoints
//! - `GET /api/coins/markets` - Market listing page
//! - `GET /api/coins/:id` - Coin details
//! - `GET /api/coins/:id/market_chart` - Price history
//! - `GET /api/trending` - Trending coins
//! - `GET /api/global` - Global market summary
//! - `GET /api/search` - Coin search
//! - `POST|GET|DELETE /api/live/:id` - Simulated live price feed
//! - `GET /stats` - Cache and limiter statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
