//! Relay wire types and the event normalizer.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Event name of the recognized control message and of the broadcast frame.
pub const JUMP_EVENT: &str = "game_jump";

/// Origin tag carried in every broadcast payload.
pub const DEVICE_ORIGIN: &str = "esp32";

/// The one normalized event the relay broadcasts: origin plus capture-time timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalEvent {
    pub origin: &'static str,
    /// Unix millis taken when the control frame was recognized (not device time).
    pub ts: u64,
}

impl CanonicalEvent {
    /// Jump event stamped with the current time.
    pub fn jump() -> Self {
        Self {
            origin: DEVICE_ORIGIN,
            ts: epoch_millis(),
        }
    }
}

/// Outbound subscriber frame: `{ "event": "game_jump", "payload": { "from", "ts" } }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventFrame {
    pub event: String,
    pub payload: EventPayload,
}

/// Broadcast payload: origin tag and Unix-millis timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventPayload {
    pub from: String,
    pub ts: u64,
}

impl From<&CanonicalEvent> for EventFrame {
    fn from(event: &CanonicalEvent) -> Self {
        Self {
            event: JUMP_EVENT.to_string(),
            payload: EventPayload {
                from: event.origin.to_string(),
                ts: event.ts,
            },
        }
    }
}

/// Decide whether a decoded control frame is the jump trigger.
///
/// `Some` iff the value is an object whose `event` member is the string
/// `"game_jump"`. Any other shape (missing field, wrong type, non-object)
/// is not an error, just "no event" — the channel may carry message shapes
/// outside this relay's concern.
pub fn normalize(value: &serde_json::Value) -> Option<CanonicalEvent> {
    let event = value.as_object()?.get("event")?.as_str()?;
    if event == JUMP_EVENT {
        Some(CanonicalEvent::jump())
    } else {
        None
    }
}

/// Current time as Unix millis.
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_recognizes_jump() {
        let event = normalize(&json!({"event": "game_jump"})).expect("recognized");
        assert_eq!(event.origin, "esp32");
        assert!(event.ts > 0);
    }

    #[test]
    fn normalize_ignores_extra_fields() {
        assert!(normalize(&json!({"event": "game_jump", "seq": 7, "battery": 0.92})).is_some());
    }

    #[test]
    fn normalize_ignores_other_events() {
        assert!(normalize(&json!({"event": "ping"})).is_none());
        assert!(normalize(&json!({"event": "game_duck"})).is_none());
    }

    #[test]
    fn normalize_ignores_missing_or_mistyped_event_field() {
        assert!(normalize(&json!({})).is_none());
        assert!(normalize(&json!({"ev": "game_jump"})).is_none());
        assert!(normalize(&json!({"event": 5})).is_none());
        assert!(normalize(&json!({"event": null})).is_none());
        assert!(normalize(&json!({"event": ["game_jump"]})).is_none());
    }

    #[test]
    fn normalize_ignores_non_objects() {
        assert!(normalize(&json!("game_jump")).is_none());
        assert!(normalize(&json!(["game_jump"])).is_none());
        assert!(normalize(&json!(42)).is_none());
        assert!(normalize(&json!(null)).is_none());
    }

    #[test]
    fn event_frame_wire_shape() {
        let event = CanonicalEvent {
            origin: DEVICE_ORIGIN,
            ts: 1_700_000_000_123,
        };
        let text = serde_json::to_string(&EventFrame::from(&event)).expect("serialize");
        let value: serde_json::Value = serde_json::from_str(&text).expect("parse back");
        assert_eq!(value["event"], "game_jump");
        assert_eq!(value["payload"]["from"], "esp32");
        assert_eq!(value["payload"]["ts"], 1_700_000_000_123u64);
    }

    #[test]
    fn jump_timestamp_is_capture_time() {
        let before = epoch_millis();
        let event = CanonicalEvent::jump();
        assert!(event.ts >= before);
        assert!(event.ts <= epoch_millis());
    }
}
