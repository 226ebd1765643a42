//! Shared application state for the town server.
//!
//! [`AppState`] holds every hosted town. Each [`TownHandle`] pairs the
//! town, behind an async mutex so inbound messages are handled one at a
//! time, with the broadcast channel its sockets subscribe to.

use std::collections::BTreeMap;
use std::sync::Arc;

use covey_town::{AreaDefinition, BroadcastChannel, Town, TownError, TownSettings};
use covey_types::ServerToClientEvent;
use tokio::sync::{Mutex, broadcast};
use tracing::debug;

/// Capacity of each town's broadcast channel when none is configured.
///
/// If a subscriber falls behind by more than this many messages it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest message.
pub const DEFAULT_BROADCAST_CAPACITY: usize = 256;

/// [`BroadcastChannel`] backed by a Tokio broadcast sender.
///
/// Sending never blocks. With no socket subscribed the event is dropped.
#[derive(Debug, Clone)]
pub struct TownBroadcaster {
    tx: broadcast::Sender<ServerToClientEvent>,
}

impl TownBroadcaster {
    /// Wrap a broadcast sender.
    pub const fn new(tx: broadcast::Sender<ServerToClientEvent>) -> Self {
        Self { tx }
    }
}

impl BroadcastChannel for TownBroadcaster {
    fn broadcast(&self, event: ServerToClientEvent) {
        if self.tx.send(event).is_err() {
            debug!("broadcast dropped, no connected clients");
        }
    }
}

/// One hosted town and its outbound channel.
#[derive(Debug)]
pub struct TownHandle {
    /// The town. Locked for the duration of one inbound message.
    pub town: Mutex<Town>,
    tx: broadcast::Sender<ServerToClientEvent>,
}

impl TownHandle {
    /// Subscribe to everything the town broadcasts from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerToClientEvent> {
        self.tx.subscribe()
    }
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug)]
pub struct AppState {
    towns: BTreeMap<String, Arc<TownHandle>>,
    capacity: usize,
}

impl AppState {
    /// Create a state hosting no towns.
    ///
    /// A zero `capacity` falls back to [`DEFAULT_BROADCAST_CAPACITY`].
    pub fn new(capacity: usize) -> Self {
        Self {
            towns: BTreeMap::new(),
            capacity: if capacity == 0 {
                DEFAULT_BROADCAST_CAPACITY
            } else {
                capacity
            },
        }
    }

    /// Host a new town built from `definitions`.
    ///
    /// # Errors
    ///
    /// Returns [`TownError::DuplicateArea`] if two definitions share an id.
    pub fn add_town(
        &mut self,
        town_id: &str,
        settings: TownSettings,
        definitions: &[AreaDefinition],
    ) -> Result<Arc<TownHandle>, TownError> {
        let (tx, _) = broadcast::channel(self.capacity);
        let channel: Arc<dyn BroadcastChannel> = Arc::new(TownBroadcaster::new(tx.clone()));
        let town = Town::new(town_id, settings, definitions, channel)?;
        let handle = Arc::new(TownHandle {
            town: Mutex::new(town),
            tx,
        });
        self.towns.insert(town_id.to_owned(), Arc::clone(&handle));
        Ok(handle)
    }

    /// Look up a hosted town.
    pub fn town(&self, town_id: &str) -> Option<Arc<TownHandle>> {
        self.towns.get(town_id).cloned()
    }

    /// Number of hosted towns.
    pub fn town_count(&self) -> usize {
        self.towns.len()
    }

    /// Tell every connected client of every town that the town is closing.
    pub async fn close_all(&self) {
        for handle in self.towns.values() {
            handle.town.lock().await.close();
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_BROADCAST_CAPACITY)
    }
}
