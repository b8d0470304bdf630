//! Error types for the market data layer
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Market Error Enum ==
/// Unified error type for the client, ticker and HTTP API.
#[derive(Error, Debug)]
pub enum MarketError {
    /// Transport failure talking to the upstream API
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status other than 429
    #[error("Upstream error {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Upstream kept answering 429 after every retry
    #[error("Rate limited by upstream after {attempts} attempts")]
    RateLimited { attempts: u32 },

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No live price feed for this identifier
    #[error("Not tracked: {0}")]
    NotTracked(String),

    /// Configuration value the service cannot run with
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl MarketError {
    /// HTTP status reported to API callers for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            MarketError::Http(_) | MarketError::Upstream { .. } | MarketError::Decode(_) => {
                StatusCode::BAD_GATEWAY
            }
            MarketError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            MarketError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            MarketError::NotTracked(_) => StatusCode::NOT_FOUND,
            MarketError::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for MarketError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the market data layer.
pub type Result<T> = std::result::Result<T, MarketError>;
