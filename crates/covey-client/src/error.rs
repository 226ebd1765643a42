//! Error types for the `covey-client` crate.

use covey_types::{AreaKind, InteractableId, SnapshotError};

/// Errors that can occur while mirroring a town on the client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No controller with this id is known to the session.
    #[error("no controller for interactable area {0}")]
    NotFound(InteractableId),

    /// A snapshot or lookup disagreed with the kind of an existing controller.
    #[error("area {id} is a {expected} but a {received} was supplied")]
    KindMismatch {
        /// The area.
        id: InteractableId,
        /// The kind the controller mirrors.
        expected: AreaKind,
        /// The kind that was supplied or requested.
        received: AreaKind,
    },

    /// A received frame could not be decoded or validated.
    #[error(transparent)]
    MalformedSnapshot(#[from] SnapshotError),

    /// The transport refused an outbound event.
    #[error("transport error: {0}")]
    Transport(String),

    /// The session has been disconnected or the town closed.
    #[error("session closed")]
    Closed,
}
