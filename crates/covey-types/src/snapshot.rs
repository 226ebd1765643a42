//! Decoding and validation of snapshots received off the wire.
//!
//! Serde already rejects a model that is missing a required field. The
//! checks here cover what the type system cannot: an empty area id and a
//! playback position that is not a finite, non-negative number.

use crate::areas::Interactable;

/// A received snapshot that cannot be applied.
///
/// The receiver keeps its previous state when this is returned.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The payload is not a well-formed model.
    #[error("malformed snapshot: {reason}")]
    Malformed {
        /// What was wrong with it.
        reason: String,
    },
}

impl SnapshotError {
    fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(source: serde_json::Error) -> Self {
        Self::malformed(source.to_string())
    }
}

impl Interactable {
    /// Check invariants the type system does not enforce.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Malformed`] for an empty id or an invalid
    /// playback position.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.id().is_empty() {
            return Err(SnapshotError::malformed(format!(
                "{} snapshot has an empty id",
                self.kind()
            )));
        }
        if let Self::ViewingArea(area) = self {
            if !area.elapsed_time_sec.is_finite() || area.elapsed_time_sec < 0.0 {
                return Err(SnapshotError::malformed(format!(
                    "viewing area {} has invalid elapsedTimeSec {}",
                    area.id, area.elapsed_time_sec
                )));
            }
        }
        Ok(())
    }
}

/// Decode and validate one area snapshot from JSON text.
///
/// # Errors
///
/// Returns [`SnapshotError::Malformed`] if the JSON does not describe a
/// complete model or fails [`Interactable::validate`].
pub fn decode_interactable(json: &str) -> Result<Interactable, SnapshotError> {
    let model: Interactable = serde_json::from_str(json)?;
    model.validate()?;
    Ok(model)
}
