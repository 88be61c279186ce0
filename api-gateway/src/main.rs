// api-gateway/src/main.rs

//! API gateway binary.
//!
//! This binary exposes the traceability ledger over HTTP:
//!
//! - `GET /health`
//! - `POST /trace/sell`, `/trace/process`, `/trace/shipment`, `/trace/add`
//! - `GET /trace/track/{batch_id}`
//! - `GET /ledger/verify`, `GET /ledger/block/{hash}`
//!
//! It owns the single `DefaultTraceLedger` of the process (storage backend
//! chosen by configuration) and runs a Prometheus metrics exporter on
//! `/metrics`.

mod config;
mod routes;
mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::signal;

use config::ApiConfig;
use routes::{health, ledger, trace};
use state::{AppState, SharedState};
use trace_ledger::{LedgerConfig, MetricsRegistry, open_ledger, run_prometheus_http_server};

#[tokio::main]
async fn main() {
    // Basic tracing setup.
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "api_gateway=info,trace_ledger=info".to_string()),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let api_cfg = ApiConfig::from_env().map_err(|e| format!("invalid configuration: {e}"))?;
    let ledger_cfg =
        LedgerConfig::from_env().map_err(|e| format!("invalid configuration: {e}"))?;

    // ---------------------------
    // Metrics
    // ---------------------------

    let metrics = Arc::new(
        MetricsRegistry::new()
            .map_err(|e| format!("failed to initialise metrics registry: {e}"))?,
    );

    if ledger_cfg.metrics.enabled {
        let metrics_clone = metrics.clone();
        let addr = ledger_cfg.metrics.listen_addr;
        tokio::spawn(async move {
            if let Err(e) = run_prometheus_http_server(metrics_clone, addr).await {
                tracing::error!("metrics HTTP server error: {e}");
            }
        });
        tracing::info!("metrics exporter listening on http://{}/metrics", addr);
    }

    // ---------------------------
    // Ledger
    // ---------------------------

    let ledger = open_ledger(&ledger_cfg)
        .map_err(|e| format!("failed to open ledger ({:?}): {e}", ledger_cfg.storage.backend))?
        .with_metrics(metrics.ledger.clone());

    if let Err(violation) = ledger.verify() {
        // Served anyway; every trace response reports COMPROMISED.
        tracing::warn!("ledger loaded but does not verify: {violation}");
    }

    let app = router(AppState::new(ledger));

    // ---------------------------
    // axum 0.8 server (hyper 1 / tokio 1.48 style)
    // ---------------------------

    tracing::info!("API gateway listening on http://{}", api_cfg.listen_addr);

    let listener = tokio::net::TcpListener::bind(api_cfg.listen_addr)
        .await
        .map_err(|e| format!("failed to bind {}: {e}", api_cfg.listen_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("API server error: {e}"))?;

    Ok(())
}

fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/trace/sell", post(trace::sell))
        .route("/trace/process", post(trace::process))
        .route("/trace/shipment", post(trace::shipment))
        .route("/trace/add", post(trace::add_entry))
        .route("/trace/track/{batch_id}", get(trace::track))
        .route("/ledger/verify", get(ledger::verify))
        .route("/ledger/block/{hash}", get(ledger::block_by_hash))
        .with_state(state)
}

/// Waits for Ctrl-C and returns, used for graceful shutdown.
async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
