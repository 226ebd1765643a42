//! Client-side mirror of a Covey Town space.
//!
//! Every area the server knows about is mirrored by one controller. UI
//! code reads and writes areas only through controllers, and subscribes
//! to their per-field change events to know when to re-render. Received
//! snapshots are reconciled into the controllers; local edits are pushed
//! back to the server as whole snapshots.
//!
//! # Modules
//!
//! - [`controller`] -- The four area controllers and [`AnyController`].
//! - [`error`] -- Error types for client operations.
//! - [`events`] -- Typed [`Channel`]s and [`Subscription`] handles.
//! - [`registry`] -- [`ControllerRegistry`]: snapshot reconciliation.
//! - [`session`] -- [`TownSession`]: roster, transport and event handling.

pub mod controller;
pub mod error;
pub mod events;
pub mod registry;
pub mod session;

pub use controller::{
    AnyController, ConversationAreaController, ConversationAreaEvents,
    PosterSessionAreaController, PosterSessionAreaEvents, SongAreaController, SongAreaEvents,
    ViewingAreaController, ViewingAreaEvents,
};
pub use error::ClientError;
pub use events::{Channel, Subscription};
pub use registry::ControllerRegistry;
pub use session::{ClientTransport, TownEvents, TownSession};
