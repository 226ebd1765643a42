//! Identifier types shared by the town service and its clients.
//!
//! Players get a [`PlayerId`] (UUID v7, minted by the server on join).
//! Interactable areas are identified by [`InteractableId`], the stable name
//! of the map object that defines them. Area ids are assigned once, when the
//! map is loaded, and are never reassigned.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Unique identifier for a player connected to a town.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for PlayerId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Stable identifier of an interactable area.
///
/// This is the `name` of the rectangle object in the town map. It is the
/// only field of an area model that can never change.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct InteractableId(String);

impl InteractableId {
    /// Wrap a map object name as an area identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is the empty string (never valid on the wire).
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl core::fmt::Display for InteractableId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InteractableId {
    fn from(name: &str) -> Self {
        Self(String::from(name))
    }
}

impl From<String> for InteractableId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for InteractableId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
