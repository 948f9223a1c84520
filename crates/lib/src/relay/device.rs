//! Device link: raw WebSocket endpoint for the ESP32 control connection.

use axum::extract::connect_info::ConnectInfo;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use std::net::SocketAddr;

use super::protocol::normalize;
use super::server::RelayState;

/// GET /ws/esp32 upgrades to the device control connection.
pub(super) async fn device_ws_handler(
    State(state): State<RelayState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_device(socket, state, addr))
}

/// Read control frames until the device goes away.
///
/// Each text frame is decoded as JSON and handed to the normalizer;
/// recognized jump triggers are broadcast. A frame that fails to decode is
/// logged and dropped without closing the connection. On close or transport
/// error the task ends; reconnection is the device's responsibility.
async fn handle_device(mut socket: WebSocket, state: RelayState, addr: SocketAddr) {
    log::info!("device connected from {}", addr);

    loop {
        let msg = match socket.recv().await {
            Some(Ok(msg)) => msg,
            Some(Err(e)) => {
                log::warn!("device {} transport error: {}", addr, e);
                break;
            }
            None => break,
        };
        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => break,
            // Binary and ping/pong frames carry no control messages.
            _ => continue,
        };
        log::debug!("device {} frame: {}", addr, text);
        let value: serde_json::Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("device {} sent undecodable frame: {}", addr, e);
                continue;
            }
        };
        if let Some(event) = normalize(&value) {
            log::info!("jump signal from {}, broadcasting", addr);
            state.hub.broadcast(&event).await;
        }
    }

    log::info!("device disconnected: {}", addr);
}
