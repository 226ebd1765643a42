//! The set of authoritative areas in one town.
//!
//! The [`AreaRegistry`] is built once from the town's map definitions and
//! lives as long as the town. It resolves area ids, routes client updates
//! to the owning area and turns player location changes into enter/exit
//! transitions by checking the location against every area's bounds.
//!
//! Occupancy recomputation compares each area's current occupant list with
//! the new location, so running it repeatedly for the same location yields
//! no further transitions.

use std::collections::BTreeMap;
use std::sync::Arc;

use covey_types::{Interactable, InteractableId, PlayerId, PlayerLocation};

use crate::area::AuthoritativeArea;
use crate::broadcast::BroadcastChannel;
use crate::error::TownError;
use crate::map::AreaDefinition;

/// Enter/exit transitions produced by one occupancy recomputation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccupancyChange {
    /// Areas the player entered.
    pub entered: Vec<InteractableId>,
    /// Areas the player left.
    pub exited: Vec<InteractableId>,
}

impl OccupancyChange {
    /// Whether no transition happened.
    pub const fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.exited.is_empty()
    }
}

/// All authoritative areas of one town, keyed by id.
#[derive(Debug)]
pub struct AreaRegistry {
    areas: BTreeMap<InteractableId, AuthoritativeArea>,
}

impl AreaRegistry {
    /// Build the registry from the town's map definitions.
    ///
    /// Every area shares the same broadcast channel.
    ///
    /// # Errors
    ///
    /// Returns [`TownError::DuplicateArea`] if two definitions share an id.
    pub fn from_definitions(
        definitions: &[AreaDefinition],
        channel: &Arc<dyn BroadcastChannel>,
    ) -> Result<Self, TownError> {
        let mut areas = BTreeMap::new();
        for definition in definitions {
            if areas.contains_key(&definition.id) {
                return Err(TownError::DuplicateArea(definition.id.clone()));
            }
            areas.insert(
                definition.id.clone(),
                AuthoritativeArea::from_definition(definition, Arc::clone(channel)),
            );
        }
        Ok(Self { areas })
    }

    /// Look up an area.
    ///
    /// # Errors
    ///
    /// Returns [`TownError::NotFound`] for an unknown id.
    pub fn get(&self, id: &InteractableId) -> Result<&AuthoritativeArea, TownError> {
        self.areas
            .get(id)
            .ok_or_else(|| TownError::NotFound(id.clone()))
    }

    /// Look up an area for mutation.
    ///
    /// # Errors
    ///
    /// Returns [`TownError::NotFound`] for an unknown id.
    pub fn get_mut(&mut self, id: &InteractableId) -> Result<&mut AuthoritativeArea, TownError> {
        self.areas
            .get_mut(id)
            .ok_or_else(|| TownError::NotFound(id.clone()))
    }

    /// Number of areas.
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    /// Whether the town has no areas.
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Iterate over all areas in id order.
    pub fn areas(&self) -> impl Iterator<Item = &AuthoritativeArea> {
        self.areas.values()
    }

    /// Iterate over all areas mutably in id order.
    pub fn areas_mut(&mut self) -> impl Iterator<Item = &mut AuthoritativeArea> {
        self.areas.values_mut()
    }

    /// A snapshot of every area, in id order.
    pub fn snapshots(&self) -> Vec<Interactable> {
        self.areas.values().map(AuthoritativeArea::to_snapshot).collect()
    }

    /// Route a client update to the area it names.
    ///
    /// # Errors
    ///
    /// Returns [`TownError::NotFound`] for an unknown id, or whatever
    /// [`AuthoritativeArea::apply_update`] rejects.
    pub fn apply_update(&mut self, update: Interactable) -> Result<(), TownError> {
        let id = update.id().clone();
        self.get_mut(&id)?.apply_update(update)
    }

    /// Recompute which areas `player` occupies after moving to `location`.
    ///
    /// Every area is checked against the location: the player is added to
    /// areas whose bounds now contain them and removed from areas whose
    /// bounds no longer do.
    pub fn update_occupancy(
        &mut self,
        player: PlayerId,
        location: &PlayerLocation,
    ) -> OccupancyChange {
        let mut change = OccupancyChange::default();
        for area in self.areas.values_mut() {
            let inside = area.contains(location);
            let present = area.has_occupant(player);
            if inside && !present {
                area.add_occupant(player);
                change.entered.push(area.id().clone());
            } else if !inside && present {
                area.remove_occupant(player);
                change.exited.push(area.id().clone());
            }
        }
        change
    }

    /// Remove `player` from every area it occupies.
    ///
    /// Returns the areas the player left.
    pub fn remove_player(&mut self, player: PlayerId) -> Vec<InteractableId> {
        self.areas
            .values_mut()
            .filter_map(|area| area.remove_occupant(player).then(|| area.id().clone()))
            .collect()
    }

    /// The first area (in id order) that `player` currently occupies.
    pub fn area_of(&self, player: PlayerId) -> Option<&InteractableId> {
        self.areas
            .values()
            .find(|area| area.has_occupant(player))
            .map(AuthoritativeArea::id)
    }
}
