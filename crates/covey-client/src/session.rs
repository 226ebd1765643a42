//! One client's connection to a town.
//!
//! A [`TownSession`] is built from the initial join payload and owns
//! everything the client knows about the town: the player roster, the
//! [`ControllerRegistry`] and the outbound [`ClientTransport`]. The
//! embedding application feeds it every frame the server sends and reads
//! or writes areas through the controllers it hands out.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use covey_types::{
    ChatMessage, ClientToServerEvent, InteractableId, Player, PlayerId, PlayerLocation,
    ServerToClientEvent, TownJoinResponse,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::ClientError;
use crate::events::Channel;
use crate::registry::ControllerRegistry;

/// The outbound half of a client connection.
pub trait ClientTransport: Send + Sync {
    /// Send one event to the town server.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the event cannot be sent.
    fn send(&self, event: ClientToServerEvent) -> Result<(), ClientError>;
}

/// Town-level change events.
#[derive(Debug, Default)]
pub struct TownEvents {
    /// The roster changed; carries the full new roster.
    pub players_changed: Channel<Vec<Player>>,
    /// A chat message arrived.
    pub chat_message: Channel<ChatMessage>,
    /// The server is shutting the town down.
    pub town_closing: Channel<()>,
}

/// A client's live view of one town.
pub struct TownSession {
    user_id: PlayerId,
    friendly_name: String,
    is_publicly_listed: bool,
    players: BTreeMap<PlayerId, Player>,
    areas: ControllerRegistry,
    events: TownEvents,
    transport: Arc<dyn ClientTransport>,
    closed: bool,
}

impl core::fmt::Debug for TownSession {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TownSession")
            .field("user_id", &self.user_id)
            .field("friendly_name", &self.friendly_name)
            .field("players", &self.players.len())
            .field("areas", &self.areas.len())
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl TownSession {
    /// Start a session from the server's join payload.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::KindMismatch`] if the payload lists one id
    /// under two kinds. The session is not created in that case.
    pub fn connect(
        join: TownJoinResponse,
        transport: Arc<dyn ClientTransport>,
    ) -> Result<Self, ClientError> {
        let areas = ControllerRegistry::new();
        areas.reconcile(&join.interactables)?;
        info!(
            player = %join.user_id,
            town = %join.friendly_name,
            players = join.current_players.len(),
            areas = areas.len(),
            "connected to town"
        );
        Ok(Self {
            user_id: join.user_id,
            friendly_name: join.friendly_name,
            is_publicly_listed: join.is_publicly_listed,
            players: roster(join.current_players),
            areas,
            events: TownEvents::default(),
            transport,
            closed: false,
        })
    }

    /// This client's player id.
    pub const fn user_id(&self) -> PlayerId {
        self.user_id
    }

    /// The town's friendly name.
    pub fn friendly_name(&self) -> &str {
        &self.friendly_name
    }

    /// Whether the town is listed publicly.
    pub const fn is_publicly_listed(&self) -> bool {
        self.is_publicly_listed
    }

    /// Every player currently in the town.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// Look up one player.
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// This client's own player, if still on the roster.
    pub fn our_player(&self) -> Option<&Player> {
        self.players.get(&self.user_id)
    }

    /// The area controllers.
    pub const fn areas(&self) -> &ControllerRegistry {
        &self.areas
    }

    /// Town-level change events.
    pub const fn events(&self) -> &TownEvents {
        &self.events
    }

    /// Whether the session has ended.
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Decode one text frame from the server and handle it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MalformedSnapshot`] for a frame that does not
    /// decode or validate; nothing about the session changes. Otherwise
    /// as [`Self::handle_server_event`].
    pub fn handle_text(&mut self, text: &str) -> Result<(), ClientError> {
        let event = ServerToClientEvent::decode(text).inspect_err(|e| {
            warn!(error = %e, "discarding malformed frame");
        })?;
        self.handle_server_event(event)
    }

    /// Apply one server event to the session.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Closed`] after the session ended, and
    /// [`ClientError::KindMismatch`] for a snapshot that disagrees with an
    /// existing controller.
    pub fn handle_server_event(&mut self, event: ServerToClientEvent) -> Result<(), ClientError> {
        if self.closed {
            return Err(ClientError::Closed);
        }
        match event {
            ServerToClientEvent::Initialize(join) => {
                self.players = roster(join.current_players);
                self.friendly_name = join.friendly_name;
                self.is_publicly_listed = join.is_publicly_listed;
                self.emit_players();
                self.areas.reconcile(&join.interactables)?;
            }
            ServerToClientEvent::PlayerJoined(player) | ServerToClientEvent::PlayerMoved(player) => {
                self.players.insert(player.id, player);
                self.emit_players();
            }
            ServerToClientEvent::PlayerDisconnect(player) => {
                if self.players.remove(&player.id).is_some() {
                    self.emit_players();
                }
            }
            ServerToClientEvent::ChatMessage(message) => self.events.chat_message.emit(&message),
            ServerToClientEvent::InteractableUpdate(model) => {
                debug!(area = %model.id(), "interactable update received");
                self.areas.reconcile_one(&model)?;
            }
            ServerToClientEvent::TownClosing => {
                info!(town = %self.friendly_name, "town closing");
                self.shut_down();
                self.events.town_closing.emit(&());
            }
        }
        Ok(())
    }

    /// Send the current state of one area's controller to the server.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for an unknown area,
    /// [`ClientError::Closed`] after the session ended, or the transport's
    /// error.
    pub fn push_area_update(&self, id: &InteractableId) -> Result<(), ClientError> {
        self.ensure_open()?;
        let model = self.areas.get(id)?.to_model();
        debug!(area = %id, "pushing interactable update");
        self.transport
            .send(ClientToServerEvent::InteractableUpdate(model))
    }

    /// Move this client's player and tell the server.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Closed`] after the session ended, or the
    /// transport's error.
    pub fn emit_movement(&mut self, location: PlayerLocation) -> Result<(), ClientError> {
        self.ensure_open()?;
        if let Some(player) = self.players.get_mut(&self.user_id) {
            player.location = location.clone();
        }
        self.transport
            .send(ClientToServerEvent::PlayerMovement(location))
    }

    /// Send a chat message, optionally scoped to one area.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Closed`] after the session ended, or the
    /// transport's error.
    pub fn send_chat(
        &self,
        body: impl Into<String>,
        interactable_id: Option<InteractableId>,
    ) -> Result<(), ClientError> {
        self.ensure_open()?;
        self.transport
            .send(ClientToServerEvent::ChatMessage(ChatMessage {
                author: self.user_id,
                sid: Uuid::now_v7().to_string(),
                body: body.into(),
                date_created: Utc::now(),
                interactable_id,
            }))
    }

    /// End the session and drop every controller.
    pub fn disconnect(&mut self) {
        if !self.closed {
            info!(player = %self.user_id, "disconnecting from town");
            self.shut_down();
        }
    }

    fn shut_down(&mut self) {
        self.closed = true;
        self.areas.teardown();
        self.players.clear();
    }

    const fn ensure_open(&self) -> Result<(), ClientError> {
        if self.closed {
            Err(ClientError::Closed)
        } else {
            Ok(())
        }
    }

    fn emit_players(&self) {
        let players: Vec<Player> = self.players.values().cloned().collect();
        self.events.players_changed.emit(&players);
    }
}

fn roster(players: Vec<Player>) -> BTreeMap<PlayerId, Player> {
    players.into_iter().map(|p| (p.id, p)).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use covey_types::{AreaModel, Interactable, SongAreaModel};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Outbox(Mutex<Vec<ClientToServerEvent>>);

    impl ClientTransport for Outbox {
        fn send(&self, event: ClientToServerEvent) -> Result<(), ClientError> {
            self.0.lock().push(event);
            Ok(())
        }
    }

    fn player(name: &str) -> Player {
        Player {
            id: PlayerId::new(),
            user_name: name.to_owned(),
            location: PlayerLocation::default(),
            current_track_name: None,
            current_track_href: None,
        }
    }

    fn session() -> (TownSession, Arc<Outbox>) {
        let me = player("me");
        let join = TownJoinResponse {
            user_id: me.id,
            current_players: vec![me, player("other")],
            friendly_name: String::from("Test Town"),
            is_publicly_listed: false,
            interactables: vec![SongAreaModel::empty(InteractableId::from("room-7")).into()],
        };
        let outbox = Arc::new(Outbox::default());
        let session =
            TownSession::connect(join, Arc::clone(&outbox) as Arc<dyn ClientTransport>).unwrap();
        (session, outbox)
    }

    #[test]
    fn connect_builds_roster_and_controllers() {
        let (session, _) = session();
        assert_eq!(session.players().count(), 2);
        assert!(session.our_player().is_some());
        assert_eq!(session.areas().len(), 1);
        assert_eq!(session.friendly_name(), "Test Town");
    }

    #[test]
    fn roster_follows_join_move_and_disconnect() {
        let (mut session, _) = session();
        let newcomer = player("new");
        session
            .handle_server_event(ServerToClientEvent::PlayerJoined(newcomer.clone()))
            .unwrap();
        assert_eq!(session.players().count(), 3);

        let mut moved = newcomer.clone();
        moved.location = PlayerLocation::at(4.0, 5.0);
        session
            .handle_server_event(ServerToClientEvent::PlayerMoved(moved.clone()))
            .unwrap();
        assert_eq!(session.player(newcomer.id), Some(&moved));

        session
            .handle_server_event(ServerToClientEvent::PlayerDisconnect(moved))
            .unwrap();
        assert!(session.player(newcomer.id).is_none());
    }

    #[test]
    fn malformed_frame_leaves_state_alone() {
        let (mut session, _) = session();
        let result = session.handle_text(r#"{"event":"interactableUpdate","data":{"type":"SongArea"}}"#);
        assert!(matches!(result, Err(ClientError::MalformedSnapshot(_))));
        let song = session.areas().song_area(&InteractableId::from("room-7")).unwrap();
        assert!(song.to_model().is_empty_state());
    }

    #[test]
    fn push_area_update_sends_controller_state() {
        let (session, outbox) = session();
        let id = InteractableId::from("room-7");
        session.areas().song_area(&id).unwrap().set_like_count(3);
        session.push_area_update(&id).unwrap();

        let sent = outbox.0.lock();
        let Some(ClientToServerEvent::InteractableUpdate(Interactable::SongArea(model))) =
            sent.first()
        else {
            panic!("Expected an interactable update");
        };
        assert_eq!(model.like_count, 3);
        drop(sent);

        assert!(matches!(
            session.push_area_update(&InteractableId::from("nowhere")),
            Err(ClientError::NotFound(_))
        ));
    }

    #[test]
    fn movement_updates_our_player_and_is_sent() {
        let (mut session, outbox) = session();
        session.emit_movement(PlayerLocation::at(9.0, 9.0)).unwrap();
        assert_eq!(session.our_player().unwrap().location, PlayerLocation::at(9.0, 9.0));
        assert!(matches!(
            outbox.0.lock().first(),
            Some(ClientToServerEvent::PlayerMovement(_))
        ));
    }

    #[test]
    fn town_closing_ends_the_session() {
        let (mut session, outbox) = session();
        let closed = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&closed);
        let _s = session.events().town_closing.subscribe(move |_: &()| *flag.lock() = true);

        session.handle_server_event(ServerToClientEvent::TownClosing).unwrap();
        assert!(*closed.lock());
        assert!(session.is_closed());
        assert!(session.areas().is_empty());
        assert!(matches!(
            session.handle_server_event(ServerToClientEvent::TownClosing),
            Err(ClientError::Closed)
        ));
        assert!(matches!(session.send_chat("hi", None), Err(ClientError::Closed)));
        assert!(outbox.0.lock().is_empty());
    }

    #[test]
    fn chat_is_sent_with_author() {
        let (session, outbox) = session();
        session.send_chat("hello", None).unwrap();
        let sent = outbox.0.lock();
        let Some(ClientToServerEvent::ChatMessage(message)) = sent.first() else {
            panic!("Expected a chat message");
        };
        assert_eq!(message.author, session.user_id());
        assert_eq!(message.body, "hello");
    }
}
