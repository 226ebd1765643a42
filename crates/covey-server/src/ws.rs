//! `WebSocket` handler for one player's connection to a town.
//!
//! Clients connect to `GET /ws/towns/{town_id}?userName=...`. The player
//! joins the town, receives `initialize` with the full roster and every
//! area snapshot, then sees every event the town broadcasts. Text frames
//! from the client are decoded as client events and handled by the town
//! one at a time. Closing the socket removes the player.
//!
//! If a client falls behind, lagged messages are skipped and the client
//! resumes from the most recent event.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use covey_types::{ClientToServerEvent, PlayerId, ServerToClientEvent};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::{AppState, TownHandle};

/// Query parameters for the socket endpoint.
#[derive(Debug, Deserialize)]
pub struct JoinQuery {
    /// Display name for the joining player.
    #[serde(rename = "userName")]
    pub user_name: String,
}

/// Upgrade an HTTP request to a `WebSocket` connection to one town.
///
/// # Route
///
/// `GET /ws/towns/{town_id}?userName=...`
///
/// # Errors
///
/// Returns [`ApiError::TownNotFound`] for an unknown town and
/// [`ApiError::BadRequest`] for an empty user name.
pub async fn ws_town(
    ws: WebSocketUpgrade,
    Path(town_id): Path<String>,
    Query(query): Query<JoinQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = state
        .town(&town_id)
        .ok_or_else(|| ApiError::TownNotFound(town_id.clone()))?;
    let user_name = query.user_name.trim().to_owned();
    if user_name.is_empty() {
        return Err(ApiError::BadRequest(String::from("userName must not be empty")));
    }
    Ok(ws.on_upgrade(move |socket| handle_ws(socket, handle, user_name)))
}

/// Handle one inbound text frame from `player`.
///
/// Frames that fail to decode and events the town rejects are logged and
/// dropped; the connection stays open.
pub async fn handle_client_frame(handle: &TownHandle, player: PlayerId, text: &str) {
    let event = match ClientToServerEvent::decode(text) {
        Ok(event) => event,
        Err(e) => {
            warn!(%player, error = %e, "discarding malformed client frame");
            return;
        }
    };
    let result = handle.town.lock().await.handle(player, event);
    if let Err(e) = result {
        warn!(%player, error = %e, "client event rejected");
    }
}

/// Serialize and send one event. Returns `false` once the socket is gone.
async fn send_event(socket: &mut WebSocket, event: &ServerToClientEvent) -> bool {
    let json = match serde_json::to_string(event) {
        Ok(j) => j,
        Err(e) => {
            warn!("Failed to serialize server event: {e}");
            return true;
        }
    };
    socket.send(Message::Text(json.into())).await.is_ok()
}

/// Handle the `WebSocket` lifecycle: join, relay broadcasts, forward
/// client events, leave.
async fn handle_ws(mut socket: WebSocket, handle: Arc<TownHandle>, user_name: String) {
    // Subscribe before joining so nothing broadcast after `initialize` is missed.
    let (mut rx, join) = {
        let mut town = handle.town.lock().await;
        let rx = handle.subscribe();
        (rx, town.join(user_name))
    };
    let player = join.user_id;
    info!(%player, "WebSocket client joined town");

    if send_event(&mut socket, &ServerToClientEvent::Initialize(join)).await {
        relay(&mut socket, &handle, &mut rx, player).await;
    }

    let left = handle.town.lock().await.leave(player);
    match left {
        Ok(_) => info!(%player, "WebSocket client left town"),
        Err(e) => debug!(%player, error = %e, "player already gone"),
    }
}

async fn relay(
    socket: &mut WebSocket,
    handle: &TownHandle,
    rx: &mut tokio::sync::broadcast::Receiver<ServerToClientEvent>,
    player: PlayerId,
) {
    loop {
        tokio::select! {
            // Forward a town broadcast to this client.
            result = rx.recv() => {
                match result {
                    Ok(event) => {
                        let closing = matches!(event, ServerToClientEvent::TownClosing);
                        if !send_event(socket, &event).await {
                            debug!(%player, "WebSocket client disconnected (send failed)");
                            return;
                        }
                        if closing {
                            debug!(%player, "town closing, ending WebSocket");
                            return;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(%player, skipped = n, "WebSocket client lagged, skipping ahead");
                    }
                    Err(RecvError::Closed) => {
                        debug!("Broadcast channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            // Handle what the client sent.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_client_frame(handle, player, text.as_str()).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(%player, "WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!(%player, "WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(%player, "WebSocket error: {e}");
                        return;
                    }
                    _ => {
                        // Binary and pong frames carry nothing for us.
                    }
                }
            }
        }
    }
}
