//! Client-side mirrors of area models.
//!
//! Each controller owns a private copy of one area model and exposes one
//! getter/setter pair per mutable field. Setters are the only way to write
//! the copy, and all of them run the same change-detection gate: the new
//! value is compared with the stored one and, only if they differ, stored
//! and announced on that field's [`Channel`]. Writing a value the field
//! already holds is silent.
//!
//! `update_from` pushes a whole received snapshot through those setters,
//! so a snapshot from the server fires exactly one event per field that
//! actually changed. The area id is fixed at construction.

use std::sync::Arc;

use covey_types::{
    AreaKind, Comment, ConversationAreaModel, Interactable, InteractableId, PlayerId,
    Playlist, PosterSessionAreaModel, SongAreaModel, Track, ViewingAreaModel,
};
use parking_lot::Mutex;

use crate::error::ClientError;
use crate::events::Channel;

/// Store `value` into the field selected by `field` if it differs, then
/// announce it. The model lock is released before listeners run.
fn set_field<M, T>(
    model: &Mutex<M>,
    field: impl FnOnce(&mut M) -> &mut T,
    value: T,
    channel: &Channel<T>,
) where
    T: PartialEq + Clone + 'static,
{
    let changed = {
        let mut model = model.lock();
        let slot = field(&mut model);
        if *slot == value {
            false
        } else {
            slot.clone_from(&value);
            true
        }
    };
    if changed {
        channel.emit(&value);
    }
}

// ---------------------------------------------------------------------------
// Song areas
// ---------------------------------------------------------------------------

/// Per-field change events of a [`SongAreaController`].
#[derive(Debug, Default)]
pub struct SongAreaEvents {
    /// The current track changed.
    pub curr_song_change: Channel<Option<Track>>,
    /// The comment list changed.
    pub comments_change: Channel<Option<Vec<Comment>>>,
    /// The like counter changed.
    pub like_count_change: Channel<i64>,
    /// The attached playlist changed.
    pub songs_playlist_change: Channel<Option<Playlist>>,
    /// The playlist reference changed.
    pub playlist_def_change: Channel<Option<String>>,
}

/// Client mirror of a song area.
#[derive(Debug)]
pub struct SongAreaController {
    id: InteractableId,
    model: Mutex<SongAreaModel>,
    events: SongAreaEvents,
}

impl SongAreaController {
    /// Build a controller from an initial snapshot.
    pub fn new(model: SongAreaModel) -> Self {
        Self {
            id: model.id.clone(),
            model: Mutex::new(model),
            events: SongAreaEvents::default(),
        }
    }

    /// The area id.
    pub const fn id(&self) -> &InteractableId {
        &self.id
    }

    /// Change events, one channel per field.
    pub const fn events(&self) -> &SongAreaEvents {
        &self.events
    }

    /// Track currently playing.
    pub fn curr_song(&self) -> Option<Track> {
        self.model.lock().curr_song.clone()
    }

    /// Set the track currently playing.
    pub fn set_curr_song(&self, value: Option<Track>) {
        set_field(&self.model, |m| &mut m.curr_song, value, &self.events.curr_song_change);
    }

    /// Comments on the current track.
    pub fn comments(&self) -> Option<Vec<Comment>> {
        self.model.lock().comments.clone()
    }

    /// Replace the comments on the current track.
    pub fn set_comments(&self, value: Option<Vec<Comment>>) {
        set_field(&self.model, |m| &mut m.comments, value, &self.events.comments_change);
    }

    /// Like counter of the current track.
    pub fn like_count(&self) -> i64 {
        self.model.lock().like_count
    }

    /// Set the like counter.
    ///
    /// Counts of zero or below are ignored; the counter only ever moves
    /// to a positive value through this controller.
    pub fn set_like_count(&self, value: i64) {
        if value <= 0 {
            return;
        }
        set_field(&self.model, |m| &mut m.like_count, value, &self.events.like_count_change);
    }

    /// Playlist attached to the area.
    pub fn songs_playlist(&self) -> Option<Playlist> {
        self.model.lock().songs_playlist.clone()
    }

    /// Attach or clear the playlist.
    pub fn set_songs_playlist(&self, value: Option<Playlist>) {
        set_field(
            &self.model,
            |m| &mut m.songs_playlist,
            value,
            &self.events.songs_playlist_change,
        );
    }

    /// Reference to the playlist definition.
    pub fn playlist_def(&self) -> Option<String> {
        self.model.lock().playlist_def.clone()
    }

    /// Set the playlist reference.
    pub fn set_playlist_def(&self, value: Option<String>) {
        set_field(
            &self.model,
            |m| &mut m.playlist_def,
            value,
            &self.events.playlist_def_change,
        );
    }

    /// Apply every field of `model` through its setter. The id is ignored.
    pub fn update_from(&self, model: &SongAreaModel) {
        self.set_curr_song(model.curr_song.clone());
        self.set_comments(model.comments.clone());
        self.set_like_count(model.like_count);
        self.set_songs_playlist(model.songs_playlist.clone());
        self.set_playlist_def(model.playlist_def.clone());
    }

    /// The model representing the controller's current state.
    pub fn to_model(&self) -> SongAreaModel {
        self.model.lock().clone()
    }
}

// ---------------------------------------------------------------------------
// Viewing areas
// ---------------------------------------------------------------------------

/// Per-field change events of a [`ViewingAreaController`].
#[derive(Debug, Default)]
pub struct ViewingAreaEvents {
    /// The video changed.
    pub video_change: Channel<Option<String>>,
    /// Playback started or paused.
    pub playback_change: Channel<bool>,
    /// The playback position changed.
    pub progress_change: Channel<f64>,
}

/// Client mirror of a viewing area.
#[derive(Debug)]
pub struct ViewingAreaController {
    id: InteractableId,
    model: Mutex<ViewingAreaModel>,
    events: ViewingAreaEvents,
}

impl ViewingAreaController {
    /// Build a controller from an initial snapshot.
    pub fn new(model: ViewingAreaModel) -> Self {
        Self {
            id: model.id.clone(),
            model: Mutex::new(model),
            events: ViewingAreaEvents::default(),
        }
    }

    /// The area id.
    pub const fn id(&self) -> &InteractableId {
        &self.id
    }

    /// Change events, one channel per field.
    pub const fn events(&self) -> &ViewingAreaEvents {
        &self.events
    }

    /// Video URL.
    pub fn video(&self) -> Option<String> {
        self.model.lock().video.clone()
    }

    /// Set the video URL.
    pub fn set_video(&self, value: Option<String>) {
        set_field(&self.model, |m| &mut m.video, value, &self.events.video_change);
    }

    /// Whether the video is playing.
    pub fn is_playing(&self) -> bool {
        self.model.lock().is_playing
    }

    /// Start or pause playback.
    pub fn set_is_playing(&self, value: bool) {
        set_field(&self.model, |m| &mut m.is_playing, value, &self.events.playback_change);
    }

    /// Playback position in seconds.
    pub fn elapsed_time_sec(&self) -> f64 {
        self.model.lock().elapsed_time_sec
    }

    /// Set the playback position. Negative and non-finite values are ignored.
    pub fn set_elapsed_time_sec(&self, value: f64) {
        if !value.is_finite() || value < 0.0 {
            return;
        }
        set_field(
            &self.model,
            |m| &mut m.elapsed_time_sec,
            value,
            &self.events.progress_change,
        );
    }

    /// Apply every field of `model` through its setter. The id is ignored.
    pub fn update_from(&self, model: &ViewingAreaModel) {
        self.set_video(model.video.clone());
        self.set_is_playing(model.is_playing);
        self.set_elapsed_time_sec(model.elapsed_time_sec);
    }

    /// The model representing the controller's current state.
    pub fn to_model(&self) -> ViewingAreaModel {
        self.model.lock().clone()
    }
}

// ---------------------------------------------------------------------------
// Poster session areas
// ---------------------------------------------------------------------------

/// Per-field change events of a [`PosterSessionAreaController`].
#[derive(Debug, Default)]
pub struct PosterSessionAreaEvents {
    /// The star count changed.
    pub stars_change: Channel<u32>,
    /// The poster image changed.
    pub image_contents_change: Channel<Option<String>>,
    /// The poster title changed.
    pub title_change: Channel<Option<String>>,
}

/// Client mirror of a poster session area.
#[derive(Debug)]
pub struct PosterSessionAreaController {
    id: InteractableId,
    model: Mutex<PosterSessionAreaModel>,
    events: PosterSessionAreaEvents,
}

impl PosterSessionAreaController {
    /// Build a controller from an initial snapshot.
    pub fn new(model: PosterSessionAreaModel) -> Self {
        Self {
            id: model.id.clone(),
            model: Mutex::new(model),
            events: PosterSessionAreaEvents::default(),
        }
    }

    /// The area id.
    pub const fn id(&self) -> &InteractableId {
        &self.id
    }

    /// Change events, one channel per field.
    pub const fn events(&self) -> &PosterSessionAreaEvents {
        &self.events
    }

    /// Stars given to the poster.
    pub fn stars(&self) -> u32 {
        self.model.lock().stars
    }

    /// Set the star count.
    pub fn set_stars(&self, value: u32) {
        set_field(&self.model, |m| &mut m.stars, value, &self.events.stars_change);
    }

    /// Encoded poster image.
    pub fn image_contents(&self) -> Option<String> {
        self.model.lock().image_contents.clone()
    }

    /// Set the poster image.
    pub fn set_image_contents(&self, value: Option<String>) {
        set_field(
            &self.model,
            |m| &mut m.image_contents,
            value,
            &self.events.image_contents_change,
        );
    }

    /// Poster title.
    pub fn title(&self) -> Option<String> {
        self.model.lock().title.clone()
    }

    /// Set the poster title.
    pub fn set_title(&self, value: Option<String>) {
        set_field(&self.model, |m| &mut m.title, value, &self.events.title_change);
    }

    /// Apply every field of `model` through its setter. The id is ignored.
    pub fn update_from(&self, model: &PosterSessionAreaModel) {
        self.set_stars(model.stars);
        self.set_image_contents(model.image_contents.clone());
        self.set_title(model.title.clone());
    }

    /// The model representing the controller's current state.
    pub fn to_model(&self) -> PosterSessionAreaModel {
        self.model.lock().clone()
    }
}

// ---------------------------------------------------------------------------
// Conversation areas
// ---------------------------------------------------------------------------

/// Per-field change events of a [`ConversationAreaController`].
#[derive(Debug, Default)]
pub struct ConversationAreaEvents {
    /// The topic changed.
    pub topic_change: Channel<Option<String>>,
    /// Someone entered or left.
    pub occupants_change: Channel<Vec<PlayerId>>,
}

/// Client mirror of a conversation area.
#[derive(Debug)]
pub struct ConversationAreaController {
    id: InteractableId,
    model: Mutex<ConversationAreaModel>,
    events: ConversationAreaEvents,
}

impl ConversationAreaController {
    /// Build a controller from an initial snapshot.
    pub fn new(model: ConversationAreaModel) -> Self {
        Self {
            id: model.id.clone(),
            model: Mutex::new(model),
            events: ConversationAreaEvents::default(),
        }
    }

    /// The area id.
    pub const fn id(&self) -> &InteractableId {
        &self.id
    }

    /// Change events, one channel per field.
    pub const fn events(&self) -> &ConversationAreaEvents {
        &self.events
    }

    /// Conversation topic.
    pub fn topic(&self) -> Option<String> {
        self.model.lock().topic.clone()
    }

    /// Set the conversation topic.
    pub fn set_topic(&self, value: Option<String>) {
        set_field(&self.model, |m| &mut m.topic, value, &self.events.topic_change);
    }

    /// Players in the conversation.
    pub fn occupants(&self) -> Vec<PlayerId> {
        self.model.lock().occupants_by_id.clone()
    }

    /// Replace the occupant list.
    pub fn set_occupants(&self, value: Vec<PlayerId>) {
        set_field(
            &self.model,
            |m| &mut m.occupants_by_id,
            value,
            &self.events.occupants_change,
        );
    }

    /// Whether nobody is in the conversation and it has no topic.
    pub fn is_empty(&self) -> bool {
        let model = self.model.lock();
        model.topic.is_none() && model.occupants_by_id.is_empty()
    }

    /// Apply every field of `model` through its setter. The id is ignored.
    pub fn update_from(&self, model: &ConversationAreaModel) {
        self.set_topic(model.topic.clone());
        self.set_occupants(model.occupants_by_id.clone());
    }

    /// The model representing the controller's current state.
    pub fn to_model(&self) -> ConversationAreaModel {
        self.model.lock().clone()
    }
}

// ---------------------------------------------------------------------------
// Any controller
// ---------------------------------------------------------------------------

/// A shared handle to a controller of any kind.
#[derive(Debug, Clone)]
pub enum AnyController {
    /// A conversation area.
    Conversation(Arc<ConversationAreaController>),
    /// A viewing area.
    Viewing(Arc<ViewingAreaController>),
    /// A poster session area.
    PosterSession(Arc<PosterSessionAreaController>),
    /// A song area.
    Song(Arc<SongAreaController>),
}

impl AnyController {
    /// Build the controller matching the snapshot's kind.
    pub fn from_model(model: Interactable) -> Self {
        match model {
            Interactable::ConversationArea(m) => {
                Self::Conversation(Arc::new(ConversationAreaController::new(m)))
            }
            Interactable::ViewingArea(m) => Self::Viewing(Arc::new(ViewingAreaController::new(m))),
            Interactable::PosterSessionArea(m) => {
                Self::PosterSession(Arc::new(PosterSessionAreaController::new(m)))
            }
            Interactable::SongArea(m) => Self::Song(Arc::new(SongAreaController::new(m))),
        }
    }

    /// The area id.
    pub fn id(&self) -> &InteractableId {
        match self {
            Self::Conversation(c) => c.id(),
            Self::Viewing(c) => c.id(),
            Self::PosterSession(c) => c.id(),
            Self::Song(c) => c.id(),
        }
    }

    /// The kind of area mirrored.
    pub const fn kind(&self) -> AreaKind {
        match self {
            Self::Conversation(_) => AreaKind::ConversationArea,
            Self::Viewing(_) => AreaKind::ViewingArea,
            Self::PosterSession(_) => AreaKind::PosterSessionArea,
            Self::Song(_) => AreaKind::SongArea,
        }
    }

    /// Push a received snapshot through the controller's setters.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::KindMismatch`] if the snapshot is of another
    /// kind; the controller is left untouched.
    pub fn update_from(&self, model: &Interactable) -> Result<(), ClientError> {
        match (self, model) {
            (Self::Conversation(c), Interactable::ConversationArea(m)) => c.update_from(m),
            (Self::Viewing(c), Interactable::ViewingArea(m)) => c.update_from(m),
            (Self::PosterSession(c), Interactable::PosterSessionArea(m)) => c.update_from(m),
            (Self::Song(c), Interactable::SongArea(m)) => c.update_from(m),
            _ => {
                return Err(ClientError::KindMismatch {
                    id: self.id().clone(),
                    expected: self.kind(),
                    received: model.kind(),
                });
            }
        }
        Ok(())
    }

    /// The model representing the controller's current state.
    pub fn to_model(&self) -> Interactable {
        match self {
            Self::Conversation(c) => c.to_model().into(),
            Self::Viewing(c) => c.to_model().into(),
            Self::PosterSession(c) => c.to_model().into(),
            Self::Song(c) => c.to_model().into(),
        }
    }

    /// Whether every mutable field holds its empty default.
    pub fn is_empty_state(&self) -> bool {
        self.to_model().is_empty_state()
    }
}
