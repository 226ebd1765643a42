//! Socket event vocabulary between a town and its clients.
//!
//! Events are JSON objects tagged by name with the payload under `data`:
//!
//! ```json
//! {"event": "interactableUpdate", "data": {"type": "SongArea", "id": "room-7", ...}}
//! ```
//!
//! `interactableUpdate` flows both ways: a client uses it to ask for an
//! area's state to become the enclosed model, and the server uses it to
//! broadcast the resulting authoritative snapshot.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::areas::Interactable;
use crate::snapshot::SnapshotError;
use crate::structs::{ChatMessage, Player, PlayerLocation, TownJoinResponse};

/// Events pushed from the town to connected clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum ServerToClientEvent {
    /// Initial state, sent once to a newly connected client.
    Initialize(TownJoinResponse),
    /// A player joined the town.
    PlayerJoined(Player),
    /// A player's location changed.
    PlayerMoved(Player),
    /// A player left the town.
    PlayerDisconnect(Player),
    /// A chat message relayed to everyone.
    ChatMessage(ChatMessage),
    /// The authoritative snapshot of one area.
    InteractableUpdate(Interactable),
    /// The town is shutting down; clients should disconnect.
    TownClosing,
}

/// Events sent by a client to its town.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum ClientToServerEvent {
    /// Post a chat message.
    ChatMessage(ChatMessage),
    /// Report the sender's new location.
    PlayerMovement(PlayerLocation),
    /// Ask for an area's state to become the enclosed model.
    InteractableUpdate(Interactable),
}

impl ServerToClientEvent {
    /// Decode one text frame, validating any area snapshots it carries.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Malformed`] if the frame is not a known
    /// event or carries an invalid snapshot.
    pub fn decode(text: &str) -> Result<Self, SnapshotError> {
        let event: Self = serde_json::from_str(text)?;
        match &event {
            Self::Initialize(response) => {
                for model in &response.interactables {
                    model.validate()?;
                }
            }
            Self::InteractableUpdate(model) => model.validate()?,
            _ => {}
        }
        Ok(event)
    }
}

impl ClientToServerEvent {
    /// Decode one text frame, validating any area snapshot it carries.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Malformed`] if the frame is not a known
    /// event or carries an invalid snapshot.
    pub fn decode(text: &str) -> Result<Self, SnapshotError> {
        let event: Self = serde_json::from_str(text)?;
        if let Self::InteractableUpdate(model) = &event {
            model.validate()?;
        }
        Ok(event)
    }
}
