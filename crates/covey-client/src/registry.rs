//! The client's collection of area controllers.
//!
//! The registry holds at most one controller per area id. Received
//! snapshots are reconciled against it: an unknown id creates and
//! announces a new controller, a known id is updated in place so that
//! anyone holding the controller keeps observing the same object. Area
//! lists are not treated as total, so an id missing from a list leaves
//! its controller alone.

use std::collections::BTreeMap;
use std::sync::Arc;

use covey_types::{AreaKind, Interactable, InteractableId};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::controller::{
    AnyController, ConversationAreaController, PosterSessionAreaController, SongAreaController,
    ViewingAreaController,
};
use crate::error::ClientError;
use crate::events::Channel;

/// Controllers for every area the session knows about.
#[derive(Debug, Default)]
pub struct ControllerRegistry {
    controllers: Mutex<BTreeMap<InteractableId, AnyController>>,
    areas_added: Channel<AnyController>,
}

impl ControllerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Announces every newly created controller.
    pub const fn areas_added(&self) -> &Channel<AnyController> {
        &self.areas_added
    }

    /// Reconcile a list of snapshots.
    ///
    /// Every snapshot is processed even if an earlier one fails.
    ///
    /// # Errors
    ///
    /// Returns the first [`ClientError::KindMismatch`] encountered.
    pub fn reconcile(&self, models: &[Interactable]) -> Result<(), ClientError> {
        let mut first_error = None;
        for model in models {
            if let Err(e) = self.reconcile_one(model) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Reconcile one snapshot: update the existing controller or create one.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::KindMismatch`] if a controller with this id
    /// mirrors another kind; it is left untouched.
    pub fn reconcile_one(&self, model: &Interactable) -> Result<(), ClientError> {
        let existing = self.controllers.lock().get(model.id()).cloned();
        if let Some(controller) = existing {
            return controller.update_from(model).inspect_err(|e| {
                warn!(area = %model.id(), error = %e, "snapshot does not match controller");
            });
        }

        let created = {
            let mut controllers = self.controllers.lock();
            if controllers.contains_key(model.id()) {
                None
            } else {
                let controller = AnyController::from_model(model.clone());
                controllers.insert(model.id().clone(), controller.clone());
                Some(controller)
            }
        };
        match created {
            Some(controller) => {
                debug!(area = %controller.id(), kind = %controller.kind(), "controller created");
                self.areas_added.emit(&controller);
                Ok(())
            }
            // Created concurrently between the two locks; treat as an update.
            None => self.reconcile_one(model),
        }
    }

    /// Look up a controller of any kind.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for an unknown id.
    pub fn get(&self, id: &InteractableId) -> Result<AnyController, ClientError> {
        self.controllers
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(id.clone()))
    }

    /// Look up a song area controller.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for an unknown id and
    /// [`ClientError::KindMismatch`] if the area is of another kind.
    pub fn song_area(&self, id: &InteractableId) -> Result<Arc<SongAreaController>, ClientError> {
        match self.get(id)? {
            AnyController::Song(c) => Ok(c),
            other => Err(mismatch(&other, AreaKind::SongArea)),
        }
    }

    /// Look up a viewing area controller.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for an unknown id and
    /// [`ClientError::KindMismatch`] if the area is of another kind.
    pub fn viewing_area(
        &self,
        id: &InteractableId,
    ) -> Result<Arc<ViewingAreaController>, ClientError> {
        match self.get(id)? {
            AnyController::Viewing(c) => Ok(c),
            other => Err(mismatch(&other, AreaKind::ViewingArea)),
        }
    }

    /// Look up a poster session area controller.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for an unknown id and
    /// [`ClientError::KindMismatch`] if the area is of another kind.
    pub fn poster_session_area(
        &self,
        id: &InteractableId,
    ) -> Result<Arc<PosterSessionAreaController>, ClientError> {
        match self.get(id)? {
            AnyController::PosterSession(c) => Ok(c),
            other => Err(mismatch(&other, AreaKind::PosterSessionArea)),
        }
    }

    /// Look up a conversation area controller.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for an unknown id and
    /// [`ClientError::KindMismatch`] if the area is of another kind.
    pub fn conversation_area(
        &self,
        id: &InteractableId,
    ) -> Result<Arc<ConversationAreaController>, ClientError> {
        match self.get(id)? {
            AnyController::Conversation(c) => Ok(c),
            other => Err(mismatch(&other, AreaKind::ConversationArea)),
        }
    }

    /// Every controller, in id order.
    pub fn controllers(&self) -> Vec<AnyController> {
        self.controllers.lock().values().cloned().collect()
    }

    /// Number of controllers.
    pub fn len(&self) -> usize {
        self.controllers.lock().len()
    }

    /// Whether no controller exists.
    pub fn is_empty(&self) -> bool {
        self.controllers.lock().is_empty()
    }

    /// Drop every controller. Used when the session ends.
    pub fn teardown(&self) {
        let dropped = std::mem::take(&mut *self.controllers.lock());
        debug!(controllers = dropped.len(), "controller registry torn down");
    }
}

fn mismatch(found: &AnyController, requested: AreaKind) -> ClientError {
    ClientError::KindMismatch {
        id: found.id().clone(),
        expected: found.kind(),
        received: requested,
    }
}
