//! REST endpoint handlers for the town server.
//!
//! Handlers read area snapshots from the hosted towns; they never mutate
//! anything. Writes go through the socket.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Liveness probe |
//! | `GET` | `/api/towns/{town_id}/interactables` | Every area snapshot |
//! | `GET` | `/api/towns/{town_id}/interactables/{area_id}` | One area snapshot |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use covey_types::{Interactable, InteractableId};

use crate::error::ApiError;
use crate::state::{AppState, TownHandle};

fn find_town(state: &AppState, town_id: &str) -> Result<Arc<TownHandle>, ApiError> {
    state
        .town(town_id)
        .ok_or_else(|| ApiError::TownNotFound(town_id.to_owned()))
}

/// Liveness probe.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "towns": state.town_count(),
    }))
}

/// Every area snapshot of one town, in id order.
///
/// # Errors
///
/// Returns [`ApiError::TownNotFound`] for an unknown town.
pub async fn list_interactables(
    Path(town_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Interactable>>, ApiError> {
    let handle = find_town(&state, &town_id)?;
    let town = handle.town.lock().await;
    Ok(Json(town.areas().snapshots()))
}

/// One area snapshot.
///
/// # Errors
///
/// Returns [`ApiError::TownNotFound`] for an unknown town and
/// [`ApiError::AreaNotFound`] for an unknown area.
pub async fn get_interactable(
    Path((town_id, area_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Interactable>, ApiError> {
    let handle = find_town(&state, &town_id)?;
    let town = handle.town.lock().await;
    let snapshot = town.interactable(&InteractableId::new(area_id))?;
    Ok(Json(snapshot))
}
