//! Pricecast Server - stock price forecasting over HTTP
//!
//! Loads the trained artifacts once at startup and serves multi-step
//! forecasts. Startup aborts if any artifact is missing or inconsistent.
//!
//! # Usage
//! ```sh
//! MODEL_DIR=model_artifacts SERVER_PORT=8000 cargo run --bin server
//! ```
//!
//! # Environment Variables
//! - `MODEL_DIR`, `MODEL_FILE`, `SCALER_FILE`, `METADATA_FILE` - artifact locations
//! - `SERVER_BIND_ADDRESS`, `SERVER_PORT` - listen address (default: 0.0.0.0:8000)
//! - `REQUEST_TIMEOUT_MS` - per-request prediction timeout, 0 disables (default: 30000)
//! - `MAX_FUTURE_STEPS` - cap on `future_steps`, 0 disables (default: 365)
//! - `METRICS_ENABLED` - expose `/metrics` (default: true)

use anyhow::{Context, Result};
use pricecast::application::context::ForecastContext;
use pricecast::application::prediction_service::PredictionService;
use pricecast::config::Config;
use pricecast::infrastructure::observability::Metrics;
use pricecast::interfaces::http::{ApiState, router};
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false).pretty();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("Pricecast Server {} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    let paths = config.artifacts.paths();
    info!(
        "Configuration loaded: model={:?}, scaler={:?}, metadata={:?}",
        paths.model, paths.scaler, paths.metadata
    );

    let context = ForecastContext::load(&paths).context("Failed to load model artifacts")?;
    let metrics = Metrics::new()?;
    let service = PredictionService::new(Arc::new(context), metrics)
        .with_max_future_steps(config.server.future_steps_cap());

    let state = ApiState {
        service: Arc::new(service),
        request_timeout: config.server.request_timeout(),
    };
    let app = router(state, config.observability.metrics_enabled);

    let address = config.server.socket_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received. Exiting...");
        })
        .await?;

    Ok(())
}
