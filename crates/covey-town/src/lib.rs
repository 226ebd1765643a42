//! Server-authoritative state for one Covey Town space.
//!
//! The town service owns every interactable area. Clients propose whole
//! snapshots, the owning area replaces its model and fans the result out
//! to every connected client. Occupancy is derived from player movement;
//! an area resets to its empty state when its last occupant leaves.
//!
//! # Modules
//!
//! - [`area`] -- [`AuthoritativeArea`]: one area model, its occupants and
//!   the reset-on-empty rule.
//! - [`broadcast`] -- The [`BroadcastChannel`] seam and an in-memory recorder.
//! - [`error`] -- Error types for town operations.
//! - [`map`] -- Area definitions read from a Tiled map.
//! - [`registry`] -- [`AreaRegistry`]: id lookup, update routing and
//!   occupancy recomputation.
//! - [`town`] -- [`Town`]: roster, join/leave and inbound event handling.

pub mod area;
pub mod broadcast;
pub mod error;
pub mod map;
pub mod registry;
pub mod town;

pub use area::AuthoritativeArea;
pub use broadcast::{BroadcastChannel, RecordingBroadcast};
pub use error::TownError;
pub use map::{AreaDefinition, TiledObject, default_definitions, definitions_from_tiled_json};
pub use registry::{AreaRegistry, OccupancyChange};
pub use town::{Town, TownSettings};
