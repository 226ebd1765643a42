//! End-to-end synchronization between a town and client sessions.
//!
//! The town broadcasts into a recorder; the tests deliver the recorded
//! events to each session the way the socket layer would, serialized to
//! text frames and back.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use covey_client::{ClientError, ClientTransport, TownSession};
use covey_town::{BroadcastChannel, RecordingBroadcast, Town, TownSettings, default_definitions};
use covey_types::{
    AreaModel, ClientToServerEvent, Interactable, InteractableId, PlayerId, PlayerLocation,
    Playlist, SongAreaModel,
};
use parking_lot::Mutex;

/// Collects what a session sends so the test can hand it to the town.
#[derive(Default)]
struct Outbox(Mutex<Vec<ClientToServerEvent>>);

impl ClientTransport for Outbox {
    fn send(&self, event: ClientToServerEvent) -> Result<(), ClientError> {
        self.0.lock().push(event);
        Ok(())
    }
}

struct Harness {
    town: Town,
    channel: Arc<RecordingBroadcast>,
}

struct Client {
    id: PlayerId,
    session: TownSession,
    outbox: Arc<Outbox>,
}

impl Harness {
    fn new() -> Self {
        let channel = Arc::new(RecordingBroadcast::new());
        let town = Town::new(
            "town-1",
            TownSettings::default(),
            &default_definitions(),
            Arc::clone(&channel) as Arc<dyn BroadcastChannel>,
        )
        .unwrap();
        Self { town, channel }
    }

    fn join(&mut self, name: &str) -> Client {
        let join = self.town.join(name);
        let outbox = Arc::new(Outbox::default());
        let id = join.user_id;
        let session =
            TownSession::connect(join, Arc::clone(&outbox) as Arc<dyn ClientTransport>).unwrap();
        Client { id, session, outbox }
    }

    /// Forward everything `client` sent to the town.
    fn flush_outbound(&mut self, client: &Client) {
        let sent: Vec<_> = std::mem::take(&mut *client.outbox.0.lock());
        for event in sent {
            let frame = serde_json::to_string(&event).unwrap();
            let decoded = ClientToServerEvent::decode(&frame).unwrap();
            self.town.handle(client.id, decoded).unwrap();
        }
    }

    /// Deliver every pending broadcast to each client.
    fn deliver(&self, clients: &mut [&mut Client]) {
        for event in self.channel.take() {
            let frame = serde_json::to_string(&event).unwrap();
            for client in clients.iter_mut() {
                client.session.handle_text(&frame).unwrap();
            }
        }
    }
}

fn song_1() -> InteractableId {
    InteractableId::from("Song 1")
}

fn playlist() -> Playlist {
    Playlist {
        description: None,
        href: String::from("https://api.example.com/playlists/p1"),
        id: String::from("p1"),
        images: Vec::new(),
        name: String::from("Focus"),
        owner: String::from("dj"),
        tracks: Vec::new(),
        uri: String::from("music:playlist:p1"),
    }
}

fn record<T: Clone + Send + 'static>(
    channel: &covey_client::Channel<T>,
) -> (Arc<Mutex<Vec<T>>>, covey_client::Subscription) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let subscription = channel.subscribe(move |value: &T| sink.lock().push(value.clone()));
    (seen, subscription)
}

#[test]
fn like_count_is_gated_on_client_but_literal_on_server() {
    let mut harness = Harness::new();
    let mut alice = harness.join("alice");

    // Area starts with a counter of one.
    let song = alice.session.areas().song_area(&song_1()).unwrap();
    song.set_like_count(1);
    alice.session.push_area_update(&song_1()).unwrap();
    harness.flush_outbound(&alice);
    harness.deliver(&mut [&mut alice]);
    assert_eq!(song.like_count(), 1);

    let (seen, _s) = record(&song.events().like_count_change);
    song.set_like_count(2);
    assert_eq!(*seen.lock(), vec![2]);
    assert_eq!(song.like_count(), 2);
    song.set_like_count(2);
    assert_eq!(seen.lock().len(), 1);

    // A snapshot carrying zero reaches both sides.
    let mut zero = song.to_model();
    zero.like_count = 0;
    song.update_from(&zero);
    assert_eq!(song.like_count(), 2);
    assert_eq!(seen.lock().len(), 1);

    harness
        .town
        .handle(alice.id, ClientToServerEvent::InteractableUpdate(zero.into()))
        .unwrap();
    let Interactable::SongArea(stored) = harness.town.interactable(&song_1()).unwrap() else {
        panic!("Expected a song area");
    };
    assert_eq!(stored.like_count, 0);
}

#[test]
fn edits_reach_every_other_client() {
    let mut harness = Harness::new();
    let mut alice = harness.join("alice");
    let mut bob = harness.join("bob");
    harness.deliver(&mut [&mut alice, &mut bob]);
    assert_eq!(alice.session.players().count(), 2);

    let bob_song = bob.session.areas().song_area(&song_1()).unwrap();
    let (seen, _s) = record(&bob_song.events().playlist_def_change);

    let alice_song = alice.session.areas().song_area(&song_1()).unwrap();
    alice_song.set_playlist_def(Some(String::from("p1")));
    alice.session.push_area_update(&song_1()).unwrap();
    harness.flush_outbound(&alice);
    harness.deliver(&mut [&mut alice, &mut bob]);

    assert_eq!(bob_song.playlist_def(), Some(String::from("p1")));
    assert_eq!(*seen.lock(), vec![Some(String::from("p1"))]);
    assert_eq!(bob_song.to_model(), alice_song.to_model());
}

#[test]
fn echo_of_own_update_fires_nothing() {
    let mut harness = Harness::new();
    let mut alice = harness.join("alice");
    let _ = harness.channel.take();

    let song = alice.session.areas().song_area(&song_1()).unwrap();
    song.set_like_count(4);
    let (seen, _s) = record(&song.events().like_count_change);
    alice.session.push_area_update(&song_1()).unwrap();
    harness.flush_outbound(&alice);

    // The server broadcasts even though the state matches the sender's.
    assert_eq!(harness.channel.interactable_updates().len(), 1);
    harness.deliver(&mut [&mut alice]);
    assert!(seen.lock().is_empty());
}

#[test]
fn last_occupant_leaving_clears_playlist_everywhere() {
    let mut harness = Harness::new();
    let mut alice = harness.join("alice");
    let mut bob = harness.join("bob");

    alice.session.emit_movement(PlayerLocation::at(800.0, 100.0)).unwrap();
    harness.flush_outbound(&alice);
    let song = alice.session.areas().song_area(&song_1()).unwrap();
    song.set_songs_playlist(Some(playlist()));
    alice.session.push_area_update(&song_1()).unwrap();
    harness.flush_outbound(&alice);
    harness.deliver(&mut [&mut alice, &mut bob]);

    let bob_song = bob.session.areas().song_area(&song_1()).unwrap();
    assert_eq!(bob_song.songs_playlist(), Some(playlist()));
    let (cleared, _s) = record(&bob_song.events().songs_playlist_change);

    alice.session.emit_movement(PlayerLocation::at(5000.0, 5000.0)).unwrap();
    harness.flush_outbound(&alice);
    let resets = harness.channel.interactable_updates();
    assert_eq!(resets.len(), 1);
    assert!(resets.iter().all(Interactable::is_empty_state));
    harness.deliver(&mut [&mut alice, &mut bob]);

    assert!(bob_song.songs_playlist().is_none());
    assert_eq!(*cleared.lock(), vec![None]);
}

#[test]
fn controller_round_trips_server_snapshot() {
    let mut harness = Harness::new();
    let alice = harness.join("alice");
    let mut model = SongAreaModel::empty(song_1());
    model.like_count = 7;
    model.playlist_def = Some(String::from("p1"));
    harness
        .town
        .handle(alice.id, ClientToServerEvent::InteractableUpdate(model.into()))
        .unwrap();

    let snapshot = harness.town.interactable(&song_1()).unwrap();
    let mirror = covey_client::AnyController::from_model(snapshot.clone());
    assert_eq!(mirror.to_model(), snapshot);
}

#[test]
fn late_joiner_sees_current_state() {
    let mut harness = Harness::new();
    let alice = harness.join("alice");
    let mut model = SongAreaModel::empty(song_1());
    model.playlist_def = Some(String::from("p9"));
    harness
        .town
        .handle(alice.id, ClientToServerEvent::InteractableUpdate(model.into()))
        .unwrap();

    let carol = harness.join("carol");
    let song = carol.session.areas().song_area(&song_1()).unwrap();
    assert_eq!(song.playlist_def(), Some(String::from("p9")));
    assert_eq!(carol.session.areas().len(), 4);
}
