//! The outbound side of a town: "send this to every client in the space".
//!
//! Areas and the town hold an `Arc<dyn BroadcastChannel>` and call it after
//! every state change that clients must see. Delivery is fire-and-forget:
//! nothing is acknowledged and nothing is retried. A client that misses a
//! broadcast heals on the next one, or on the full snapshot it receives
//! when it reconnects.

use covey_types::{Interactable, ServerToClientEvent};
use parking_lot::Mutex;

/// Fan-out of server events to every client in one town.
pub trait BroadcastChannel: Send + Sync {
    /// Deliver `event` to every connected client. Must not block.
    fn broadcast(&self, event: ServerToClientEvent);
}

/// An in-memory channel that records every broadcast in order.
///
/// Useful for embedding a town without a network transport, and for
/// asserting exactly what a town sent.
#[derive(Debug, Default)]
pub struct RecordingBroadcast {
    events: Mutex<Vec<ServerToClientEvent>>,
}

impl RecordingBroadcast {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event broadcast so far.
    pub fn events(&self) -> Vec<ServerToClientEvent> {
        self.events.lock().clone()
    }

    /// The area snapshots broadcast so far, in order.
    pub fn interactable_updates(&self) -> Vec<Interactable> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                ServerToClientEvent::InteractableUpdate(model) => Some(model.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of events broadcast so far.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether nothing has been broadcast.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Drain and return the recorded events.
    pub fn take(&self) -> Vec<ServerToClientEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl BroadcastChannel for RecordingBroadcast {
    fn broadcast(&self, event: ServerToClientEvent) {
        self.events.lock().push(event);
    }
}
