//! Plain data structs carried inside area models and socket events.
//!
//! Covers geometry (`BoundingBox`, `PlayerLocation`), players, the music
//! payloads of song areas (`Track`, `Playlist`, `Comment`), chat messages
//! and the initial join payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::areas::Interactable;
use crate::enums::Direction;
use crate::ids::{InteractableId, PlayerId};

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Axis-aligned rectangle in map pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BoundingBox {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl BoundingBox {
    /// Create a bounding box from its top-left corner and size.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether a player's centre point lies strictly inside the box.
    ///
    /// A player standing exactly on an edge is outside.
    pub fn contains(&self, location: &PlayerLocation) -> bool {
        location.x > self.x
            && location.x < self.x + self.width
            && location.y > self.y
            && location.y < self.y + self.height
    }
}

/// Where a player is and which way they are facing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PlayerLocation {
    /// Centre x coordinate.
    pub x: f64,
    /// Centre y coordinate.
    pub y: f64,
    /// Facing direction.
    pub rotation: Direction,
    /// Whether the avatar is walking.
    pub moving: bool,
    /// The area the player is currently inside, if any.
    #[serde(default, rename = "interactableID", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub interactable_id: Option<InteractableId>,
}

impl PlayerLocation {
    /// A standing player at `(x, y)` facing the camera.
    pub const fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            rotation: Direction::Front,
            moving: false,
            interactable_id: None,
        }
    }
}

/// A player connected to a town.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Player {
    /// Player identifier.
    pub id: PlayerId,
    /// Display name chosen at join time.
    pub user_name: String,
    /// Last reported location.
    pub location: PlayerLocation,
    /// Name of the track the player is listening to in a song area.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub current_track_name: Option<String>,
    /// Link to the track the player is listening to in a song area.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub current_track_href: Option<String>,
}

// ---------------------------------------------------------------------------
// Song area payloads
// ---------------------------------------------------------------------------

/// A playable track, as returned by the music service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Track {
    /// Artist names.
    pub artists: Vec<String>,
    /// API link for the track.
    pub href: String,
    /// Service-side track id.
    pub id: String,
    /// Track title.
    pub name: String,
    /// Playable URI.
    pub uri: String,
}

/// A playlist selected for a song area.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Playlist {
    /// Free-text description set by the playlist owner.
    pub description: Option<String>,
    /// API link for the playlist.
    pub href: String,
    /// Service-side playlist id.
    pub id: String,
    /// Cover image URLs.
    pub images: Vec<String>,
    /// Playlist title.
    pub name: String,
    /// Owner display name.
    pub owner: String,
    /// Tracks in play order.
    pub tracks: Vec<Track>,
    /// Playable URI.
    pub uri: String,
}

/// A comment left on the song currently playing in a song area.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Comment {
    /// Author's display name.
    pub username: String,
    /// Comment body.
    pub comment_text: String,
}

// ---------------------------------------------------------------------------
// Chat and join payload
// ---------------------------------------------------------------------------

/// A chat message relayed to everyone in the town.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ChatMessage {
    /// Author's player id.
    pub author: PlayerId,
    /// Client-generated message id.
    pub sid: String,
    /// Message text.
    pub body: String,
    /// When the author sent it.
    pub date_created: DateTime<Utc>,
    /// Area the message is scoped to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub interactable_id: Option<InteractableId>,
}

/// Everything a client needs to build its initial view of a town.
///
/// `current_players` is the complete roster and replaces whatever the
/// client held before. `interactables` carries one snapshot per area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct TownJoinResponse {
    /// The id assigned to the joining player.
    #[serde(rename = "userID")]
    pub user_id: PlayerId,
    /// Every player currently in the town, including the joining one.
    pub current_players: Vec<Player>,
    /// Friendly town name.
    pub friendly_name: String,
    /// Whether the town is listed publicly.
    pub is_publicly_listed: bool,
    /// Current state of every interactable area.
    pub interactables: Vec<Interactable>,
}
