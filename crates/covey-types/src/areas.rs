//! Area models: the serializable state of every interactable area.
//!
//! Each area kind has one model struct holding its stable `id` plus its
//! mutable fields. [`Interactable`] is the tagged union that travels over
//! the socket (`{"type": "SongArea", ...}`). The server's authoritative
//! storage and the client's controllers both hold these exact structs, so
//! the set of mutable fields can never drift between the two sides.
//!
//! Every model has an *empty* state (see [`AreaModel::empty`]) which is
//! what an area is created with and what it resets to when its last
//! occupant leaves.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::AreaKind;
use crate::ids::{InteractableId, PlayerId};
use crate::structs::{Comment, Playlist, Track};

/// Behaviour shared by the four concrete area models.
pub trait AreaModel: Clone + PartialEq + Into<Interactable> {
    /// The payload kind this model represents.
    const KIND: AreaKind;

    /// The stable identifier of the area.
    fn id(&self) -> &InteractableId;

    /// A model with every mutable field at its empty default.
    fn empty(id: InteractableId) -> Self;

    /// Extract this kind from a tagged model, handing it back on mismatch.
    fn try_from_interactable(model: Interactable) -> Result<Self, Interactable>;

    /// Revert every mutable field to its empty default, keeping the id.
    fn reset(&mut self) {
        let id = self.id().clone();
        *self = Self::empty(id);
    }

    /// Whether every mutable field holds its empty default.
    fn is_empty_state(&self) -> bool {
        *self == Self::empty(self.id().clone())
    }
}

// ---------------------------------------------------------------------------
// Conversation area
// ---------------------------------------------------------------------------

/// A conversation area: a topic and the players currently inside.
///
/// `occupants_by_id` is owned by the server; clients mirror it but their
/// updates never change it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ConversationAreaModel {
    /// Stable area id.
    pub id: InteractableId,
    /// Conversation topic, unset when nobody has named one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub topic: Option<String>,
    /// Players inside the area, in arrival order.
    #[serde(rename = "occupantsByID")]
    pub occupants_by_id: Vec<PlayerId>,
}

impl AreaModel for ConversationAreaModel {
    const KIND: AreaKind = AreaKind::ConversationArea;

    fn id(&self) -> &InteractableId {
        &self.id
    }

    fn empty(id: InteractableId) -> Self {
        Self {
            id,
            topic: None,
            occupants_by_id: Vec::new(),
        }
    }

    fn try_from_interactable(model: Interactable) -> Result<Self, Interactable> {
        match model {
            Interactable::ConversationArea(area) => Ok(area),
            other => Err(other),
        }
    }
}

// ---------------------------------------------------------------------------
// Viewing area
// ---------------------------------------------------------------------------

/// A viewing area: a shared video with its playback position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ViewingAreaModel {
    /// Stable area id.
    pub id: InteractableId,
    /// Video URL, unset when nothing is loaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub video: Option<String>,
    /// Whether playback is running.
    pub is_playing: bool,
    /// Playback position in seconds.
    pub elapsed_time_sec: f64,
}

impl AreaModel for ViewingAreaModel {
    const KIND: AreaKind = AreaKind::ViewingArea;

    fn id(&self) -> &InteractableId {
        &self.id
    }

    fn empty(id: InteractableId) -> Self {
        Self {
            id,
            video: None,
            is_playing: false,
            elapsed_time_sec: 0.0,
        }
    }

    fn try_from_interactable(model: Interactable) -> Result<Self, Interactable> {
        match model {
            Interactable::ViewingArea(area) => Ok(area),
            other => Err(other),
        }
    }
}

// ---------------------------------------------------------------------------
// Poster session area
// ---------------------------------------------------------------------------

/// A poster session area: an image, its title and a star count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PosterSessionAreaModel {
    /// Stable area id.
    pub id: InteractableId,
    /// Number of stars the poster has received.
    pub stars: u32,
    /// Encoded poster image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub image_contents: Option<String>,
    /// Poster title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub title: Option<String>,
}

impl AreaModel for PosterSessionAreaModel {
    const KIND: AreaKind = AreaKind::PosterSessionArea;

    fn id(&self) -> &InteractableId {
        &self.id
    }

    fn empty(id: InteractableId) -> Self {
        Self {
            id,
            stars: 0,
            image_contents: None,
            title: None,
        }
    }

    fn try_from_interactable(model: Interactable) -> Result<Self, Interactable> {
        match model {
            Interactable::PosterSessionArea(area) => Ok(area),
            other => Err(other),
        }
    }
}

// ---------------------------------------------------------------------------
// Song area
// ---------------------------------------------------------------------------

/// A song area: the current track, its comments and likes, and the
/// playlist the area is working through.
///
/// Field names keep the snake-case wire format the song frontend uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SongAreaModel {
    /// Stable area id.
    pub id: InteractableId,
    /// Track currently playing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub curr_song: Option<Track>,
    /// Comments on the current track.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub comments: Option<Vec<Comment>>,
    /// Like counter for the current track.
    #[ts(type = "number")]
    pub like_count: i64,
    /// Playlist selected for the area.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub songs_playlist: Option<Playlist>,
    /// Free-text description of the playlist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub playlist_def: Option<String>,
}

impl AreaModel for SongAreaModel {
    const KIND: AreaKind = AreaKind::SongArea;

    fn id(&self) -> &InteractableId {
        &self.id
    }

    fn empty(id: InteractableId) -> Self {
        Self {
            id,
            curr_song: None,
            comments: None,
            like_count: 0,
            songs_playlist: None,
            playlist_def: None,
        }
    }

    fn try_from_interactable(model: Interactable) -> Result<Self, Interactable> {
        match model {
            Interactable::SongArea(area) => Ok(area),
            other => Err(other),
        }
    }
}

// ---------------------------------------------------------------------------
// Tagged union
// ---------------------------------------------------------------------------

/// Snapshot of any interactable area, tagged by kind.
#[allow(clippy::large_enum_variant)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type")]
#[ts(export, export_to = "bindings/")]
pub enum Interactable {
    /// A conversation area.
    ConversationArea(ConversationAreaModel),
    /// A viewing area.
    ViewingArea(ViewingAreaModel),
    /// A poster session area.
    PosterSessionArea(PosterSessionAreaModel),
    /// A song area.
    SongArea(SongAreaModel),
}

impl Interactable {
    /// The stable id of the area this snapshot describes.
    pub const fn id(&self) -> &InteractableId {
        match self {
            Self::ConversationArea(area) => &area.id,
            Self::ViewingArea(area) => &area.id,
            Self::PosterSessionArea(area) => &area.id,
            Self::SongArea(area) => &area.id,
        }
    }

    /// The payload kind.
    pub const fn kind(&self) -> AreaKind {
        match self {
            Self::ConversationArea(_) => AreaKind::ConversationArea,
            Self::ViewingArea(_) => AreaKind::ViewingArea,
            Self::PosterSessionArea(_) => AreaKind::PosterSessionArea,
            Self::SongArea(_) => AreaKind::SongArea,
        }
    }

    /// An empty snapshot of the given kind.
    pub fn empty(kind: AreaKind, id: InteractableId) -> Self {
        match kind {
            AreaKind::ConversationArea => ConversationAreaModel::empty(id).into(),
            AreaKind::ViewingArea => ViewingAreaModel::empty(id).into(),
            AreaKind::PosterSessionArea => PosterSessionAreaModel::empty(id).into(),
            AreaKind::SongArea => SongAreaModel::empty(id).into(),
        }
    }

    /// Revert every mutable field to its empty default, keeping the id.
    pub fn reset(&mut self) {
        match self {
            Self::ConversationArea(area) => area.reset(),
            Self::ViewingArea(area) => area.reset(),
            Self::PosterSessionArea(area) => area.reset(),
            Self::SongArea(area) => area.reset(),
        }
    }

    /// Whether every mutable field holds its empty default.
    pub fn is_empty_state(&self) -> bool {
        match self {
            Self::ConversationArea(area) => area.is_empty_state(),
            Self::ViewingArea(area) => area.is_empty_state(),
            Self::PosterSessionArea(area) => area.is_empty_state(),
            Self::SongArea(area) => area.is_empty_state(),
        }
    }
}

impl From<ConversationAreaModel> for Interactable {
    fn from(area: ConversationAreaModel) -> Self {
        Self::ConversationArea(area)
    }
}

impl From<ViewingAreaModel> for Interactable {
    fn from(area: ViewingAreaModel) -> Self {
        Self::ViewingArea(area)
    }
}

impl From<PosterSessionAreaModel> for Interactable {
    fn from(area: PosterSessionAreaModel) -> Self {
        Self::PosterSessionArea(area)
    }
}

impl From<SongAreaModel> for Interactable {
    fn from(area: SongAreaModel) -> Self {
        Self::SongArea(area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song_area() -> SongAreaModel {
        SongAreaModel {
            id: InteractableId::from("room-7"),
            curr_song: Some(Track {
                name: String::from("Hello"),
                uri: String::from("track:1234567890"),
                ..Track::default()
            }),
            comments: Some(vec![Comment {
                username: String::from("ronit"),
                comment_text: String::from("Hello Server"),
            }]),
            like_count: 3,
            songs_playlist: Some(Playlist {
                id: String::from("12345"),
                ..Playlist::default()
            }),
            playlist_def: Some(String::from("road trip")),
        }
    }

    #[test]
    fn interactable_is_tagged_by_type() {
        let model: Interactable = song_area().into();
        let json = serde_json::to_value(&model).unwrap_or_default();
        assert_eq!(json["type"], "SongArea");
        assert_eq!(json["id"], "room-7");
        assert_eq!(json["like_count"], 3);
    }

    #[test]
    fn conversation_area_uses_original_wire_names() {
        let model = ConversationAreaModel {
            id: InteractableId::from("Conv 1"),
            topic: Some(String::from("rust")),
            occupants_by_id: vec![PlayerId::new()],
        };
        let json = serde_json::to_value(Interactable::from(model)).unwrap_or_default();
        assert_eq!(json["type"], "ConversationArea");
        assert!(json["occupantsByID"].is_array());
        assert_eq!(json["topic"], "rust");
    }

    #[test]
    fn reset_keeps_id_and_clears_every_field() {
        let mut model = song_area();
        assert!(!model.is_empty_state());
        model.reset();
        assert_eq!(model.id.as_str(), "room-7");
        assert!(model.is_empty_state());
        assert_eq!(model.like_count, 0);
        assert!(model.songs_playlist.is_none());
    }

    #[test]
    fn empty_matches_kind() {
        for kind in AreaKind::ALL {
            let model = Interactable::empty(kind, InteractableId::from("a"));
            assert_eq!(model.kind(), kind);
            assert!(model.is_empty_state());
        }
    }

    #[test]
    fn try_from_interactable_rejects_other_kinds() {
        let viewing: Interactable = ViewingAreaModel::empty(InteractableId::from("v")).into();
        let back = SongAreaModel::try_from_interactable(viewing.clone());
        assert_eq!(back.err(), Some(viewing));
    }
}
