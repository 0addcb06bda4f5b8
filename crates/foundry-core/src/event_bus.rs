//! Broadcasting of state changes to presentation subscribers.
//!
//! Every orchestrator publishes a [`UiEvent`] after each state change. Any
//! number of renderers can subscribe; each receives every event emitted after
//! it subscribed.
//!
//! # Example
//!
//! ```rust
//! use foundry_core::event::UiEvent;
//! use foundry_core::event_bus::EventBus;
//! use std::sync::Arc;
//!
//! let event_bus = Arc::new(EventBus::new());
//! let mut rx = event_bus.subscribe();
//!
//! event_bus.emit(UiEvent::NotificationsChanged { active: vec![] });
//!
//! // In async context:
//! // let event = rx.recv().await.unwrap();
//! # drop(rx);
//! ```

use tokio::sync::broadcast;

use crate::event::UiEvent;

/// Events beyond this many unread ones make slow subscribers lag.
const DEFAULT_CAPACITY: usize = 1024;

pub struct EventBus {
    sender: broadcast::Sender<UiEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a bus buffering at most `capacity` unread events per subscriber.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit an event to all subscribers.
    ///
    /// Returns the number of subscribers reached; with none, the event is
    /// dropped and 0 is returned.
    pub fn emit(&self, event: UiEvent) -> usize {
        log::trace!("Emitting {}", event.name());
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe to all future events. Past events are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
