//! Enumeration types used by area models and player locations.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Direction a player avatar is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Direction {
    /// Facing the camera.
    #[default]
    Front,
    /// Facing away from the camera.
    Back,
    /// Facing left.
    Left,
    /// Facing right.
    Right,
}

/// The payload kind of an interactable area.
///
/// Every area shares the same bounds and occupant bookkeeping; the kind
/// only decides which set of mutable fields the area carries. The names
/// match the `type` property of objects in the town map and the `type`
/// tag of [`Interactable`](crate::Interactable) on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum AreaKind {
    /// A conversation area with a topic and an occupant list.
    ConversationArea,
    /// A shared video player.
    ViewingArea,
    /// A poster with a title, image and star count.
    PosterSessionArea,
    /// A shared song/playlist area with comments and likes.
    SongArea,
}

impl AreaKind {
    /// All kinds, in a fixed order.
    pub const ALL: [Self; 4] = [
        Self::ConversationArea,
        Self::ViewingArea,
        Self::PosterSessionArea,
        Self::SongArea,
    ];

    /// The map/wire name of this kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConversationArea => "ConversationArea",
            Self::ViewingArea => "ViewingArea",
            Self::PosterSessionArea => "PosterSessionArea",
            Self::SongArea => "SongArea",
        }
    }

    /// Parse a map object type name. Unknown names yield `None`.
    pub fn from_map_type(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl core::fmt::Display for AreaKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
