//! Fan-out of server events to connected observers

use crate::protocol::ServerMessage;
use tokio::sync::broadcast;

/// Default number of events an observer may fall behind before it is
/// resynchronised with a fresh snapshot
pub const DEFAULT_CAPACITY: usize = 100;

/// Publishes events to every connected presenter display
#[derive(Debug, Clone)]
pub struct Broadcaster {
    tx: broadcast::Sender<ServerMessage>,
}

impl Broadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Register a new observer
    pub fn subscribe(&self) -> broadcast::Receiver<ServerMessage> {
        self.tx.subscribe()
    }

    /// Number of currently connected observers
    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Send an event to all observers. Having no observers is fine.
    pub fn publish(&self, msg: ServerMessage) {
        if self.tx.send(msg).is_err() {
            tracing::debug!("No observers connected, event dropped");
        }
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
