//! Integration tests for the town server's HTTP endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use covey_server::router::build_router;
use covey_server::{AppState, CoveyConfig, build_state};
use covey_types::{AreaModel, ClientToServerEvent, InteractableId, PosterSessionAreaModel};
use serde_json::Value;
use tower::ServiceExt;

async fn make_test_state() -> Arc<AppState> {
    let state = build_state(&CoveyConfig::default()).unwrap();
    let handle = state.town("demo").unwrap();
    {
        let mut town = handle.town.lock().await;
        let player = town.join("alice").user_id;
        let mut poster = PosterSessionAreaModel::empty(InteractableId::from("Poster 1"));
        poster.stars = 4;
        poster.title = Some(String::from("Results"));
        town.handle(player, ClientToServerEvent::InteractableUpdate(poster.into()))
            .unwrap();
    }
    Arc::new(state)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(state: Arc<AppState>, uri: &str) -> (StatusCode, Value) {
    let response = build_router(state)
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_health() {
    let (status, json) = get(make_test_state().await, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["towns"], 1);
}

#[tokio::test]
async fn test_list_interactables() {
    let (status, json) = get(make_test_state().await, "/api/towns/demo/interactables").await;
    assert_eq!(status, StatusCode::OK);

    let areas = json.as_array().unwrap();
    assert_eq!(areas.len(), 4);
    let types: Vec<&str> = areas.iter().filter_map(|a| a["type"].as_str()).collect();
    for kind in ["ConversationArea", "ViewingArea", "PosterSessionArea", "SongArea"] {
        assert!(types.contains(&kind), "missing {kind}");
    }
}

#[tokio::test]
async fn test_get_interactable() {
    let (status, json) =
        get(make_test_state().await, "/api/towns/demo/interactables/Poster%201").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["type"], "PosterSessionArea");
    assert_eq!(json["id"], "Poster 1");
    assert_eq!(json["stars"], 4);
    assert_eq!(json["title"], "Results");
}

#[tokio::test]
async fn test_song_area_uses_snake_case_fields() {
    let (status, json) =
        get(make_test_state().await, "/api/towns/demo/interactables/Song%201").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["type"], "SongArea");
    assert_eq!(json["like_count"], 0);
}

#[tokio::test]
async fn test_unknown_area_is_404() {
    let (status, json) =
        get(make_test_state().await, "/api/towns/demo/interactables/room-99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["status"], 404);
    assert!(json["error"].as_str().unwrap().contains("room-99"));
}

#[tokio::test]
async fn test_unknown_town_is_404() {
    let (status, json) = get(make_test_state().await, "/api/towns/elsewhere/interactables").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["status"], 404);
}
