//! Broadcast hub: the live set of subscriber connections and event fan-out.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use super::protocol::{CanonicalEvent, EventFrame};

/// Unique subscriber connection identifier (opaque string).
pub type SubscriberId = String;

/// Outbound frames buffered per subscriber before delivery counts as failed.
pub(crate) const SUBSCRIBER_BUFFER: usize = 32;

/// Live mapping from subscriber id to its outbound frame channel.
///
/// The hub holds only the sending half of each channel; the subscriber task
/// owns the socket and tears the connection down itself, unregistering on
/// the way out. Shared across all connection handlers via `Arc`.
pub struct BroadcastHub {
    subscribers: RwLock<HashMap<SubscriberId, mpsc::Sender<Arc<String>>>>,
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
        }
    }

    /// Add a subscriber. Registering an id that is already present is a no-op.
    pub async fn register(&self, id: SubscriberId, tx: mpsc::Sender<Arc<String>>) {
        let mut g = self.subscribers.write().await;
        g.entry(id).or_insert(tx);
    }

    /// Remove a subscriber. Unregistering an absent id is a no-op.
    pub async fn unregister(&self, id: &str) {
        let mut g = self.subscribers.write().await;
        g.remove(id);
    }

    /// Deliver the event to every registered subscriber, best-effort.
    ///
    /// The frame is serialized once and shared; a full or closed subscriber
    /// channel is logged and skipped without affecting the others. No
    /// acknowledgment, no retry. With no subscribers the event is dropped.
    pub async fn broadcast(&self, event: &CanonicalEvent) {
        let json = match serde_json::to_string(&EventFrame::from(event)) {
            Ok(j) => Arc::new(j),
            Err(e) => {
                log::warn!("failed to serialize event frame: {}", e);
                return;
            }
        };
        let g = self.subscribers.read().await;
        if g.is_empty() {
            log::debug!("no subscribers connected, dropping event");
            return;
        }
        let mut delivered = 0usize;
        for (id, tx) in g.iter() {
            if tx.try_send(Arc::clone(&json)).is_ok() {
                delivered += 1;
            } else {
                log::warn!("failed to deliver event to {} (channel full or closed)", id);
            }
        }
        log::info!("broadcast jump to {}/{} subscriber(s)", delivered, g.len());
    }

    /// Number of registered subscribers.
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }
}
