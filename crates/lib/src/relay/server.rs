//! Relay server: single port serving HTTP health plus both WebSocket links.

use anyhow::{Context, Result};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;

use super::client::subscriber_ws_handler;
use super::device::device_ws_handler;
use super::hub::BroadcastHub;
use crate::config::Config;

/// Path the device (ESP32) connects on.
pub const DEVICE_WS_PATH: &str = "/ws/esp32";

/// Path browser subscribers connect on.
pub const SUBSCRIBER_WS_PATH: &str = "/ws";

/// Shared state for the relay (config and the broadcast hub).
///
/// The hub is created once at startup and handed by reference to both the
/// device and subscriber handlers; it lives as long as the process.
#[derive(Clone)]
pub struct RelayState {
    pub config: Arc<Config>,
    pub hub: Arc<BroadcastHub>,
}

/// Run the relay server; binds to config.relay.bind:config.relay.port.
/// Fails fast when the port is already bound rather than retrying.
/// Blocks until shutdown (e.g. Ctrl+C).
pub async fn run_relay(config: Config) -> Result<()> {
    let state = RelayState {
        config: Arc::new(config),
        hub: Arc::new(BroadcastHub::new()),
    };

    let app = Router::new()
        .route("/", get(health_http))
        .route(SUBSCRIBER_WS_PATH, get(subscriber_ws_handler))
        .route(DEVICE_WS_PATH, get(device_ws_handler))
        .with_state(state.clone());

    let bind_addr = format!("{}:{}", state.config.relay.bind, state.config.relay.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {} (is the port already in use?)", bind_addr))?;
    log::info!("relay listening on {}", bind_addr);
    log::info!("device endpoint: ws://{}{}", bind_addr, DEVICE_WS_PATH);
    log::info!("subscriber endpoint: ws://{}{}", bind_addr, SUBSCRIBER_WS_PATH);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("relay server exited")?;
    log::info!("relay stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received");
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<RelayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.config.relay.port,
        "subscribers": state.hub.subscriber_count().await,
    }))
}
