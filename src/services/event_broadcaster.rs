//! Event broadcaster for WebSocket real-time updates.
//!
//! Uses tokio::sync::broadcast to fan-out lifecycle events to all connected
//! WebSocket clients.

use tokio::sync::broadcast;

use crate::models::{WsEvent, WsEventMessage};

/// Default capacity for the broadcast channel.
const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Event broadcaster that distributes events to all connected WebSocket clients.
#[derive(Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<WsEventMessage>,
}

impl EventBroadcaster {
    /// Create a new EventBroadcaster with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new EventBroadcaster with a specific capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<WsEventMessage> {
        self.sender.subscribe()
    }

    /// Stamp and broadcast an event.
    ///
    /// Returns the number of receivers reached; 0 when nobody is listening.
    pub fn publish(&self, event: WsEvent) -> usize {
        self.sender.send(WsEventMessage::new(event)).unwrap_or(0)
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}
