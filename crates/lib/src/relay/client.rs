//! Subscriber link: WebSocket endpoint browsers subscribe on for jump events.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::time::{interval, Instant};

use super::hub::SUBSCRIBER_BUFFER;
use super::server::RelayState;

/// GET /ws upgrades to a subscriber connection.
pub(super) async fn subscriber_ws_handler(
    State(state): State<RelayState>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_subscriber(socket, state))
}

/// Register with the hub, then pump hub frames out and track liveness in.
///
/// The connection is treated as dead when a write fails, the client closes,
/// or nothing has been heard for two heartbeat intervals (the server pings
/// every interval, so a live transport always has traffic). Every exit path
/// unregisters the subscriber; unregistering twice is harmless.
async fn handle_subscriber(socket: WebSocket, state: RelayState) {
    let id = format!("sub-{}", uuid::Uuid::new_v4());
    let (tx, mut rx) = tokio::sync::mpsc::channel(SUBSCRIBER_BUFFER);
    state.hub.register(id.clone(), tx).await;
    log::info!("subscriber connected: {}", id);

    let (mut ws_tx, mut ws_rx) = socket.split();
    let heartbeat = Duration::from_millis(state.config.relay.heartbeat_interval_ms);
    let mut ping = interval(heartbeat);
    ping.tick().await; // the first tick completes immediately
    let mut last_heard = Instant::now();

    loop {
        tokio::select! {
            frame = rx.recv() => {
                let Some(frame) = frame else { break };
                if ws_tx.send(Message::Text((*frame).clone())).await.is_err() {
                    break;
                }
            }
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    // Any inbound frame proves the transport is alive.
                    Some(Ok(_)) => last_heard = Instant::now(),
                    Some(Err(e)) => {
                        log::warn!("subscriber {} transport error: {}", id, e);
                        break;
                    }
                }
            }
            _ = ping.tick() => {
                if last_heard.elapsed() > heartbeat * 2 {
                    log::warn!("subscriber {} silent for two heartbeats, dropping", id);
                    break;
                }
                if ws_tx.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }
        }
    }

    state.hub.unregister(&id).await;
    log::info!("subscriber disconnected: {}", id);
}
