//! Market Pulse - cached, rate-limited market data for a crypto dashboard
//!
//! Serves the market data layer over a small JSON HTTP API.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use market_pulse::{api::create_router, AppState, Config, Event, EventKind, LivePriceTicker};

/// Main entry point for the Market Pulse server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the client, event bus and ticker
/// 4. Create Axum router with all endpoints
/// 5. Start HTTP server on configured port
/// 6. Stop every live feed on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "market_pulse=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Market Pulse");

    let config = Config::from_env();
    info!(
        "Configuration loaded: api_base_url={}, api_key_set={}, rate_limit={}/{}ms, tick={}s, port={}",
        config.api_base_url,
        config.api_key.is_some(),
        config.rate_limit_capacity,
        config.rate_limit_interval_ms,
        config.tick_interval_secs,
        config.server_port
    );

    let state = AppState::from_config(&config).context("Failed to build application state")?;

    let price_log = state.pubsub.subscribe(EventKind::PriceUpdate, |event| {
        let Event::PriceUpdate(update) = event;
        debug!(id = %update.id, price = update.price, "price update published");
    });

    let ticker = state.ticker.clone();
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(ticker))
        .await
        .context("Server error")?;

    price_log.unsubscribe();
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops all live feeds.
async fn shutdown_signal(ticker: LivePriceTicker) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    let stopped = ticker.stop_all();
    warn!("Stopped {} live price feeds", stopped);
}
