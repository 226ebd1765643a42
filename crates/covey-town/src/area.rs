//! Authoritative server-side state for one interactable area.
//!
//! An [`AuthoritativeArea`] is the sole writer of its area model. It keeps
//! the live occupant list (player ids only; removing an occupant never
//! affects the player itself) and pushes a snapshot through the town's
//! [`BroadcastChannel`] whenever clients need to see a change.
//!
//! # Occupancy
//!
//! An area is either OCCUPIED or EMPTY. Becoming occupied changes nothing
//! in the payload. The removal that empties an area resets every mutable
//! field to its empty default and broadcasts the reset snapshot exactly
//! once, synchronously with the removal.
//!
//! Conversation areas carry their occupant list in the model, so every
//! join or leave of a conversation area is broadcast as well.

use std::sync::Arc;

use covey_types::{
    AreaKind, BoundingBox, Interactable, InteractableId, PlayerId, PlayerLocation,
    ServerToClientEvent,
};
use tracing::{debug, warn};

use crate::broadcast::BroadcastChannel;
use crate::error::TownError;
use crate::map::AreaDefinition;

/// The server's owner of one area model.
pub struct AuthoritativeArea {
    /// Rectangle the area covers.
    bounds: BoundingBox,
    /// Players inside the area, in arrival order.
    occupants: Vec<PlayerId>,
    /// Current model. Its id never changes after construction.
    state: Interactable,
    /// Where snapshots go.
    channel: Arc<dyn BroadcastChannel>,
}

impl core::fmt::Debug for AuthoritativeArea {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthoritativeArea")
            .field("bounds", &self.bounds)
            .field("occupants", &self.occupants)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl AuthoritativeArea {
    /// Create an area from its map definition with every field empty.
    pub fn from_definition(definition: &AreaDefinition, channel: Arc<dyn BroadcastChannel>) -> Self {
        Self {
            bounds: definition.bounds,
            occupants: Vec::new(),
            state: Interactable::empty(definition.kind, definition.id.clone()),
            channel,
        }
    }

    /// The area's stable id.
    pub const fn id(&self) -> &InteractableId {
        self.state.id()
    }

    /// The area's payload kind.
    pub const fn kind(&self) -> AreaKind {
        self.state.kind()
    }

    /// The rectangle the area covers.
    pub const fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Players currently inside, in arrival order.
    pub fn occupants(&self) -> &[PlayerId] {
        &self.occupants
    }

    /// Number of players currently inside.
    pub const fn occupant_count(&self) -> usize {
        self.occupants.len()
    }

    /// Whether at least one player is inside.
    pub const fn is_occupied(&self) -> bool {
        !self.occupants.is_empty()
    }

    /// Whether `player` is currently an occupant.
    pub fn has_occupant(&self, player: PlayerId) -> bool {
        self.occupants.contains(&player)
    }

    /// Whether a location lies inside this area's bounds.
    pub fn contains(&self, location: &PlayerLocation) -> bool {
        self.bounds.contains(location)
    }

    /// Replace every mutable field with the fields of `update`, then
    /// broadcast the result.
    ///
    /// Fields are replaced wholesale, without comparing against the current
    /// value, and the snapshot is broadcast even if nothing changed. No
    /// domain guard is applied: whatever the client sent becomes the truth.
    /// The occupant list of a conversation area is owned by the server and
    /// is never taken from an update.
    ///
    /// # Errors
    ///
    /// Returns [`TownError::IdentityMismatch`] if `update` names another
    /// area, or [`TownError::KindMismatch`] if it carries another kind.
    /// The area is left untouched in both cases.
    pub fn apply_update(&mut self, update: Interactable) -> Result<(), TownError> {
        if update.id() != self.id() {
            warn!(
                area = %self.id(),
                received = %update.id(),
                "rejected interactable update with mismatched id"
            );
            return Err(TownError::IdentityMismatch {
                expected: self.id().clone(),
                received: update.id().clone(),
            });
        }
        if update.kind() != self.kind() {
            warn!(
                area = %self.id(),
                expected = %self.kind(),
                received = %update.kind(),
                "rejected interactable update with mismatched kind"
            );
            return Err(TownError::KindMismatch {
                id: self.id().clone(),
                expected: self.kind(),
                received: update.kind(),
            });
        }

        self.state = update;
        self.sync_occupants();
        self.broadcast();
        Ok(())
    }

    /// An independent copy of the current model, ready for transport.
    pub fn to_snapshot(&self) -> Interactable {
        self.state.clone()
    }

    /// Add a player to the area.
    ///
    /// Returns `false` (and does nothing) if the player is already inside.
    pub fn add_occupant(&mut self, player: PlayerId) -> bool {
        if self.has_occupant(player) {
            return false;
        }
        self.occupants.push(player);
        debug!(area = %self.id(), %player, occupants = self.occupants.len(), "occupant entered");
        if self.kind() == AreaKind::ConversationArea {
            self.sync_occupants();
            self.broadcast();
        }
        true
    }

    /// Remove a player from the area.
    ///
    /// If this empties the area, every mutable field is reset and the
    /// reset snapshot is broadcast once. Returns `false` (and does nothing)
    /// if the player was not inside.
    pub fn remove_occupant(&mut self, player: PlayerId) -> bool {
        let before = self.occupants.len();
        self.occupants.retain(|occupant| *occupant != player);
        if self.occupants.len() == before {
            return false;
        }
        debug!(area = %self.id(), %player, occupants = self.occupants.len(), "occupant left");

        if self.occupants.is_empty() {
            self.state.reset();
            debug!(area = %self.id(), "area emptied, state reset");
            self.broadcast();
        } else if self.kind() == AreaKind::ConversationArea {
            self.sync_occupants();
            self.broadcast();
        }
        true
    }

    /// Mirror the live occupant list into a conversation area's model.
    fn sync_occupants(&mut self) {
        if let Interactable::ConversationArea(area) = &mut self.state {
            area.occupants_by_id.clone_from(&self.occupants);
        }
    }

    /// Fire-and-forget the current snapshot to every client.
    fn broadcast(&self) {
        debug!(area = %self.id(), "broadcasting interactable update");
        self.channel
            .broadcast(ServerToClientEvent::InteractableUpdate(self.to_snapshot()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::RecordingBroadcast;
    use covey_types::{
        AreaModel, ConversationAreaModel, Playlist, SongAreaModel, Track, ViewingAreaModel,
    };

    fn song_area(channel: &Arc<RecordingBroadcast>) -> AuthoritativeArea {
        let def = AreaDefinition::new(
            "room-7",
            AreaKind::SongArea,
            BoundingBox::new(0.0, 0.0, 100.0, 100.0),
        );
        AuthoritativeArea::from_definition(&def, Arc::clone(channel) as Arc<dyn BroadcastChannel>)
    }

    fn populated_song(id: &str) -> SongAreaModel {
        SongAreaModel {
            id: InteractableId::from(id),
            curr_song: Some(Track {
                uri: String::from("track:1"),
                ..Track::default()
            }),
            comments: Some(Vec::new()),
            like_count: 4,
            songs_playlist: Some(Playlist {
                id: String::from("12345"),
                ..Playlist::default()
            }),
            playlist_def: Some(String::from("chill")),
        }
    }

    #[test]
    fn from_definition_starts_empty() {
        let channel = Arc::new(RecordingBroadcast::new());
        let area = song_area(&channel);
        assert_eq!(area.id().as_str(), "room-7");
        assert!(area.to_snapshot().is_empty_state());
        assert!(!area.is_occupied());
        assert!(channel.is_empty());
    }

    #[test]
    fn apply_update_replaces_fields_and_broadcasts() {
        let channel = Arc::new(RecordingBroadcast::new());
        let mut area = song_area(&channel);
        let update: Interactable = populated_song("room-7").into();

        assert!(area.apply_update(update.clone()).is_ok());
        assert_eq!(area.to_snapshot(), update);
        assert_eq!(channel.interactable_updates(), vec![update]);
    }

    #[test]
    fn apply_update_broadcasts_even_without_change() {
        let channel = Arc::new(RecordingBroadcast::new());
        let mut area = song_area(&channel);
        let unchanged = area.to_snapshot();

        assert!(area.apply_update(unchanged.clone()).is_ok());
        assert!(area.apply_update(unchanged).is_ok());
        assert_eq!(channel.len(), 2);
    }

    #[test]
    fn apply_update_accepts_zero_like_count_literally() {
        let channel = Arc::new(RecordingBroadcast::new());
        let mut area = song_area(&channel);
        assert!(area.apply_update(populated_song("room-7").into()).is_ok());

        let mut zeroed = populated_song("room-7");
        zeroed.like_count = 0;
        assert!(area.apply_update(zeroed.into()).is_ok());

        let Interactable::SongArea(snapshot) = area.to_snapshot() else {
            panic!("expected a song area");
        };
        assert_eq!(snapshot.like_count, 0);
    }

    #[test]
    fn apply_update_rejects_foreign_id() {
        let channel = Arc::new(RecordingBroadcast::new());
        let mut area = song_area(&channel);
        let before = area.to_snapshot();

        let result = area.apply_update(populated_song("room-8").into());
        assert!(matches!(result, Err(TownError::IdentityMismatch { .. })));
        assert_eq!(area.id().as_str(), "room-7");
        assert_eq!(area.to_snapshot(), before);
        assert!(channel.is_empty());
    }

    #[test]
    fn apply_update_rejects_other_kind() {
        let channel = Arc::new(RecordingBroadcast::new());
        let mut area = song_area(&channel);
        let viewing = ViewingAreaModel::empty(InteractableId::from("room-7"));

        let result = area.apply_update(viewing.into());
        assert!(matches!(result, Err(TownError::KindMismatch { .. })));
        assert!(channel.is_empty());
    }

    #[test]
    fn last_occupant_leaving_resets_and_broadcasts_once() {
        let channel = Arc::new(RecordingBroadcast::new());
        let mut area = song_area(&channel);
        let player = PlayerId::new();

        assert!(area.add_occupant(player));
        assert!(area.apply_update(populated_song("room-7").into()).is_ok());
        let _ = channel.take();

        assert!(area.remove_occupant(player));
        let Interactable::SongArea(snapshot) = area.to_snapshot() else {
            panic!("expected a song area");
        };
        assert!(snapshot.songs_playlist.is_none());
        assert!(snapshot.is_empty_state());

        let sent = channel.interactable_updates();
        assert_eq!(sent.len(), 1);
        assert!(sent.iter().all(Interactable::is_empty_state));
    }

    #[test]
    fn removal_that_leaves_occupants_keeps_state() {
        let channel = Arc::new(RecordingBroadcast::new());
        let mut area = song_area(&channel);
        let (a, b) = (PlayerId::new(), PlayerId::new());
        area.add_occupant(a);
        area.add_occupant(b);
        assert!(area.apply_update(populated_song("room-7").into()).is_ok());
        let _ = channel.take();

        assert!(area.remove_occupant(a));
        assert!(!area.to_snapshot().is_empty_state());
        assert!(channel.is_empty());
    }

    #[test]
    fn duplicate_add_and_absent_remove_are_no_ops() {
        let channel = Arc::new(RecordingBroadcast::new());
        let mut area = song_area(&channel);
        let player = PlayerId::new();

        assert!(area.add_occupant(player));
        assert!(!area.add_occupant(player));
        assert_eq!(area.occupant_count(), 1);
        assert!(!area.remove_occupant(PlayerId::new()));
        assert!(channel.is_empty());
    }

    #[test]
    fn conversation_area_broadcasts_occupant_changes() {
        let channel = Arc::new(RecordingBroadcast::new());
        let def = AreaDefinition::new(
            "Conv 1",
            AreaKind::ConversationArea,
            BoundingBox::new(0.0, 0.0, 10.0, 10.0),
        );
        let mut area =
            AuthoritativeArea::from_definition(&def, Arc::clone(&channel) as Arc<dyn BroadcastChannel>);
        let (a, b) = (PlayerId::new(), PlayerId::new());

        area.add_occupant(a);
        area.add_occupant(b);
        let topic = ConversationAreaModel {
            id: InteractableId::from("Conv 1"),
            topic: Some(String::from("rust")),
            // Client-supplied occupants are ignored.
            occupants_by_id: Vec::new(),
        };
        assert!(area.apply_update(topic.into()).is_ok());
        area.remove_occupant(a);

        let sent = channel.interactable_updates();
        assert_eq!(sent.len(), 4);
        let Some(Interactable::ConversationArea(last)) = sent.last() else {
            panic!("expected a conversation area");
        };
        assert_eq!(last.occupants_by_id, vec![b]);
        assert_eq!(last.topic.as_deref(), Some("rust"));

        area.remove_occupant(b);
        let Interactable::ConversationArea(empty) = area.to_snapshot() else {
            panic!("expected a conversation area");
        };
        assert!(empty.topic.is_none());
        assert!(empty.occupants_by_id.is_empty());
        assert_eq!(channel.len(), 5);
    }
}
