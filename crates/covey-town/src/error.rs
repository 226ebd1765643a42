//! Error types for the `covey-town` crate.
//!
//! All fallible operations in this crate return [`TownError`]. None of them
//! is fatal to the process: each failure is local to one area or one
//! inbound message, and the area keeps its previous state.

use covey_types::{AreaKind, InteractableId, PlayerId};

/// Errors that can occur while maintaining a town's areas.
#[derive(Debug, thiserror::Error)]
pub enum TownError {
    /// No area with this id exists in the town.
    #[error("interactable area not found: {0}")]
    NotFound(InteractableId),

    /// An update addressed to one area carried another area's id.
    #[error("update for area {received} cannot be applied to area {expected}")]
    IdentityMismatch {
        /// The id of the area being updated.
        expected: InteractableId,
        /// The id carried by the update.
        received: InteractableId,
    },

    /// An update carried a different payload kind than the area holds.
    #[error("area {id} is a {expected} but the update is a {received}")]
    KindMismatch {
        /// The area.
        id: InteractableId,
        /// The kind the area holds.
        expected: AreaKind,
        /// The kind carried by the update.
        received: AreaKind,
    },

    /// A map object describing an area lacks a usable width or height.
    #[error("map object {0} is missing width/height")]
    MissingBounds(String),

    /// Two map objects share the same area name.
    #[error("duplicate interactable area id: {0}")]
    DuplicateArea(InteractableId),

    /// The map file could not be parsed.
    #[error("invalid town map: {0}")]
    Map(#[from] serde_json::Error),

    /// No player with this id is in the town.
    #[error("player not in town: {0}")]
    UnknownPlayer(PlayerId),
}
