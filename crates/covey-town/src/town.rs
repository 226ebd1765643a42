//! Event processing for one town.
//!
//! A [`Town`] owns the player roster and the [`AreaRegistry`] of one space.
//! It is driven by one inbound event at a time (`&mut self`), so each
//! message is handled to completion before the next one is looked at.
//! Everything clients must learn about goes out through the town's
//! [`BroadcastChannel`].

use std::collections::BTreeMap;
use std::sync::Arc;

use covey_types::{
    ChatMessage, ClientToServerEvent, Interactable, InteractableId, Player, PlayerId,
    PlayerLocation, ServerToClientEvent, TownJoinResponse,
};
use tracing::{debug, info, warn};

use crate::broadcast::BroadcastChannel;
use crate::error::TownError;
use crate::map::AreaDefinition;
use crate::registry::AreaRegistry;

/// Descriptive settings of a town.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TownSettings {
    /// Friendly name shown to players.
    pub friendly_name: String,
    /// Whether the town is listed publicly.
    pub is_publicly_listed: bool,
}

impl Default for TownSettings {
    fn default() -> Self {
        Self {
            friendly_name: String::from("Covey Town"),
            is_publicly_listed: true,
        }
    }
}

/// One space: its players, its areas and its broadcast channel.
pub struct Town {
    town_id: String,
    settings: TownSettings,
    players: BTreeMap<PlayerId, Player>,
    areas: AreaRegistry,
    channel: Arc<dyn BroadcastChannel>,
}

impl core::fmt::Debug for Town {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Town")
            .field("town_id", &self.town_id)
            .field("settings", &self.settings)
            .field("players", &self.players.len())
            .field("areas", &self.areas.len())
            .finish_non_exhaustive()
    }
}

impl Town {
    /// Create a town whose areas come from `definitions`.
    ///
    /// # Errors
    ///
    /// Returns [`TownError::DuplicateArea`] if two definitions share an id.
    pub fn new(
        town_id: impl Into<String>,
        settings: TownSettings,
        definitions: &[AreaDefinition],
        channel: Arc<dyn BroadcastChannel>,
    ) -> Result<Self, TownError> {
        let areas = AreaRegistry::from_definitions(definitions, &channel)?;
        let town_id = town_id.into();
        info!(town = %town_id, areas = areas.len(), "town created");
        Ok(Self {
            town_id,
            settings,
            players: BTreeMap::new(),
            areas,
            channel,
        })
    }

    /// The town's id.
    pub fn town_id(&self) -> &str {
        &self.town_id
    }

    /// The town's settings.
    pub const fn settings(&self) -> &TownSettings {
        &self.settings
    }

    /// The town's areas.
    pub const fn areas(&self) -> &AreaRegistry {
        &self.areas
    }

    /// Players currently in the town, by id.
    pub const fn players(&self) -> &BTreeMap<PlayerId, Player> {
        &self.players
    }

    /// Snapshot of one area.
    ///
    /// # Errors
    ///
    /// Returns [`TownError::NotFound`] for an unknown id.
    pub fn interactable(&self, id: &InteractableId) -> Result<Interactable, TownError> {
        self.areas.get(id).map(crate::area::AuthoritativeArea::to_snapshot)
    }

    /// Add a player and build the payload that initializes their client.
    ///
    /// Everyone already connected hears `playerJoined`.
    pub fn join(&mut self, user_name: impl Into<String>) -> TownJoinResponse {
        let player = Player {
            id: PlayerId::new(),
            user_name: user_name.into(),
            location: PlayerLocation::default(),
            current_track_name: None,
            current_track_href: None,
        };
        info!(town = %self.town_id, player = %player.id, user = %player.user_name, "player joined");
        self.players.insert(player.id, player.clone());
        self.channel
            .broadcast(ServerToClientEvent::PlayerJoined(player.clone()));
        self.join_response(player.id)
    }

    /// The initial payload for `player`: the full roster and every area.
    pub fn join_response(&self, player: PlayerId) -> TownJoinResponse {
        TownJoinResponse {
            user_id: player,
            current_players: self.players.values().cloned().collect(),
            friendly_name: self.settings.friendly_name.clone(),
            is_publicly_listed: self.settings.is_publicly_listed,
            interactables: self.areas.snapshots(),
        }
    }

    /// Remove a player, taking them out of every area first.
    ///
    /// # Errors
    ///
    /// Returns [`TownError::UnknownPlayer`] if the player is not here.
    pub fn leave(&mut self, player: PlayerId) -> Result<Player, TownError> {
        let removed = self
            .players
            .remove(&player)
            .ok_or(TownError::UnknownPlayer(player))?;
        let exited = self.areas.remove_player(player);
        info!(town = %self.town_id, %player, areas_left = exited.len(), "player left");
        self.channel
            .broadcast(ServerToClientEvent::PlayerDisconnect(removed.clone()));
        Ok(removed)
    }

    /// Handle one event sent by `player`.
    ///
    /// # Errors
    ///
    /// Returns [`TownError::UnknownPlayer`] for a sender that is not in the
    /// town, and propagates area update failures. A failure affects only
    /// the one message; the town keeps running.
    pub fn handle(&mut self, player: PlayerId, event: ClientToServerEvent) -> Result<(), TownError> {
        if !self.players.contains_key(&player) {
            return Err(TownError::UnknownPlayer(player));
        }
        match event {
            ClientToServerEvent::PlayerMovement(location) => self.move_player(player, location),
            ClientToServerEvent::InteractableUpdate(update) => {
                debug!(town = %self.town_id, %player, area = %update.id(), "interactable update");
                self.areas.apply_update(update).inspect_err(|e| {
                    warn!(town = %self.town_id, %player, error = %e, "interactable update rejected");
                })
            }
            ClientToServerEvent::ChatMessage(message) => {
                self.relay_chat(message);
                Ok(())
            }
        }
    }

    /// Record a player's new location and recompute area occupancy.
    ///
    /// # Errors
    ///
    /// Returns [`TownError::UnknownPlayer`] if the player is not here.
    pub fn move_player(
        &mut self,
        player: PlayerId,
        mut location: PlayerLocation,
    ) -> Result<(), TownError> {
        if !self.players.contains_key(&player) {
            return Err(TownError::UnknownPlayer(player));
        }
        let change = self.areas.update_occupancy(player, &location);
        if !change.is_empty() {
            debug!(
                town = %self.town_id,
                %player,
                entered = ?change.entered,
                exited = ?change.exited,
                "player crossed area bounds"
            );
        }
        location.interactable_id = self.areas.area_of(player).cloned();

        let moved = self
            .players
            .get_mut(&player)
            .ok_or(TownError::UnknownPlayer(player))?;
        moved.location = location;
        let moved = moved.clone();
        self.channel.broadcast(ServerToClientEvent::PlayerMoved(moved));
        Ok(())
    }

    /// Tell every client the town is going away.
    pub fn close(&self) {
        info!(town = %self.town_id, "town closing");
        self.channel.broadcast(ServerToClientEvent::TownClosing);
    }

    fn relay_chat(&self, message: ChatMessage) {
        debug!(town = %self.town_id, author = %message.author, "relaying chat message");
        self.channel.broadcast(ServerToClientEvent::ChatMessage(message));
    }
}
