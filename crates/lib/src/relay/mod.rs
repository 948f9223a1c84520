//! Jump relay: device link, event normalizer, broadcast hub, subscriber link.
//!
//! Single port serves HTTP and WebSocket. The device pushes JSON control
//! frames on the ESP32 path; recognized jump triggers fan out to every
//! subscriber connected on the default WS path.

mod client;
mod device;
mod hub;
mod protocol;
mod server;

pub use hub::{BroadcastHub, SubscriberId};
pub use protocol::{normalize, CanonicalEvent, EventFrame, EventPayload, DEVICE_ORIGIN, JUMP_EVENT};
pub use server::{run_relay, RelayState, DEVICE_WS_PATH, SUBSCRIBER_WS_PATH};
