//! Axum router construction for the town server.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin frontend access.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the town server.
///
/// The router includes:
/// - `GET /health` -- liveness probe
/// - `GET /ws/towns/{town_id}` -- `WebSocket` connection to one town
/// - `GET /api/towns/{town_id}/interactables` -- every area snapshot
/// - `GET /api/towns/{town_id}/interactables/{area_id}` -- one area snapshot
///
/// CORS allows any origin, matching how the frontend is served from a
/// separate dev server.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        // WebSocket
        .route("/ws/towns/{town_id}", get(ws::ws_town))
        // REST API
        .route(
            "/api/towns/{town_id}/interactables",
            get(handlers::list_interactables),
        )
        .route(
            "/api/towns/{town_id}/interactables/{area_id}",
            get(handlers::get_interactable),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
