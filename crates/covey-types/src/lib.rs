//! Shared type definitions for Covey Town area synchronization.
//!
//! This crate is the single source of truth for the area models and socket
//! events exchanged between the town service and its clients. Types flow
//! downstream to `TypeScript` via `ts-rs` for the web frontend.
//!
//! # Modules
//!
//! - [`ids`] -- Player and interactable-area identifiers
//! - [`enums`] -- Area kinds and facing directions
//! - [`structs`] -- Geometry, players, music payloads, chat, join payload
//! - [`areas`] -- The four area models and the [`Interactable`] union
//! - [`events`] -- Server-to-client and client-to-server socket events
//! - [`snapshot`] -- Decoding and validation of received snapshots

pub mod areas;
pub mod enums;
pub mod events;
pub mod ids;
pub mod snapshot;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use areas::{
    AreaModel, ConversationAreaModel, Interactable, PosterSessionAreaModel, SongAreaModel,
    ViewingAreaModel,
};
pub use enums::{AreaKind, Direction};
pub use events::{ClientToServerEvent, ServerToClientEvent};
pub use ids::{InteractableId, PlayerId};
pub use snapshot::{SnapshotError, decode_interactable};
pub use structs::{
    BoundingBox, ChatMessage, Comment, Player, PlayerLocation, Playlist, Track, TownJoinResponse,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // The files are written to the `bindings/` directory relative to
        // the crate root.
        use ts_rs::TS;

        let _ = crate::ids::PlayerId::export_all();
        let _ = crate::ids::InteractableId::export_all();

        let _ = crate::enums::Direction::export_all();
        let _ = crate::enums::AreaKind::export_all();

        let _ = crate::structs::BoundingBox::export_all();
        let _ = crate::structs::PlayerLocation::export_all();
        let _ = crate::structs::Player::export_all();
        let _ = crate::structs::Track::export_all();
        let _ = crate::structs::Playlist::export_all();
        let _ = crate::structs::Comment::export_all();
        let _ = crate::structs::ChatMessage::export_all();
        let _ = crate::structs::TownJoinResponse::export_all();

        let _ = crate::areas::ConversationAreaModel::export_all();
        let _ = crate::areas::ViewingAreaModel::export_all();
        let _ = crate::areas::PosterSessionAreaModel::export_all();
        let _ = crate::areas::SongAreaModel::export_all();
        let _ = crate::areas::Interactable::export_all();

        let _ = crate::events::ServerToClientEvent::export_all();
        let _ = crate::events::ClientToServerEvent::export_all();
    }
}
