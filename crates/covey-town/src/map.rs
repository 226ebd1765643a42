//! Area definitions and the town map they are read from.
//!
//! Towns are drawn in the Tiled editor. Interactable areas are rectangle
//! objects on the layer named `Objects`; the object's `type` (or `class`
//! in newer Tiled versions) names the area kind and its `name` becomes the
//! area's permanent id. Objects of any other type are ignored.

use covey_types::{AreaKind, BoundingBox, InteractableId};
use serde::Deserialize;

use crate::error::TownError;

/// Name of the Tiled layer holding interactable areas.
pub const OBJECTS_LAYER: &str = "Objects";

/// A static area definition: where the area is, what it is, what it is called.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaDefinition {
    /// Stable area id (the map object's name).
    pub id: InteractableId,
    /// Payload kind.
    pub kind: AreaKind,
    /// Rectangle the area covers.
    pub bounds: BoundingBox,
}

impl AreaDefinition {
    /// Define an area directly.
    pub fn new(id: impl Into<InteractableId>, kind: AreaKind, bounds: BoundingBox) -> Self {
        Self {
            id: id.into(),
            kind,
            bounds,
        }
    }

    /// Build a definition from a Tiled map object.
    ///
    /// Returns `Ok(None)` for objects that are not interactable areas.
    ///
    /// # Errors
    ///
    /// Returns [`TownError::MissingBounds`] when an area object has no
    /// width or height, or a zero one.
    pub fn from_map_object(object: &TiledObject) -> Result<Option<Self>, TownError> {
        let Some(kind) = object.kind_name().and_then(AreaKind::from_map_type) else {
            return Ok(None);
        };
        let (Some(width), Some(height)) = (object.width, object.height) else {
            return Err(TownError::MissingBounds(object.name.clone()));
        };
        if width <= 0.0 || height <= 0.0 {
            return Err(TownError::MissingBounds(object.name.clone()));
        }
        Ok(Some(Self::new(
            object.name.as_str(),
            kind,
            BoundingBox::new(object.x, object.y, width, height),
        )))
    }
}

/// One object from a Tiled object layer.
#[derive(Debug, Clone, Deserialize)]
pub struct TiledObject {
    /// Object name.
    #[serde(default)]
    pub name: String,
    /// Object type (Tiled 1.8 and earlier).
    #[serde(default, rename = "type")]
    pub object_type: Option<String>,
    /// Object class (Tiled 1.9 and later).
    #[serde(default)]
    pub class: Option<String>,
    /// Left edge.
    #[serde(default)]
    pub x: f64,
    /// Top edge.
    #[serde(default)]
    pub y: f64,
    /// Width, absent for point objects.
    #[serde(default)]
    pub width: Option<f64>,
    /// Height, absent for point objects.
    #[serde(default)]
    pub height: Option<f64>,
}

impl TiledObject {
    fn kind_name(&self) -> Option<&str> {
        self.object_type
            .as_deref()
            .filter(|name| !name.is_empty())
            .or(self.class.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct TiledLayer {
    #[serde(default)]
    name: String,
    #[serde(default)]
    objects: Vec<TiledObject>,
}

#[derive(Debug, Deserialize)]
struct TiledMap {
    #[serde(default)]
    layers: Vec<TiledLayer>,
}

/// Read every interactable area out of a Tiled map JSON document.
///
/// # Errors
///
/// Returns [`TownError::Map`] for unparseable JSON and
/// [`TownError::MissingBounds`] for an area object without a size.
pub fn definitions_from_tiled_json(json: &str) -> Result<Vec<AreaDefinition>, TownError> {
    let map: TiledMap = serde_json::from_str(json)?;
    let mut definitions = Vec::new();
    for layer in map.layers.iter().filter(|layer| layer.name == OBJECTS_LAYER) {
        for object in &layer.objects {
            if let Some(definition) = AreaDefinition::from_map_object(object)? {
                definitions.push(definition);
            }
        }
    }
    Ok(definitions)
}

/// The built-in map used when no map file is configured.
///
/// One area of each kind, laid out left to right.
pub fn default_definitions() -> Vec<AreaDefinition> {
    vec![
        AreaDefinition::new(
            "Conversation 1",
            AreaKind::ConversationArea,
            BoundingBox::new(0.0, 0.0, 200.0, 200.0),
        ),
        AreaDefinition::new(
            "Viewing 1",
            AreaKind::ViewingArea,
            BoundingBox::new(250.0, 0.0, 200.0, 200.0),
        ),
        AreaDefinition::new(
            "Poster 1",
            AreaKind::PosterSessionArea,
            BoundingBox::new(500.0, 0.0, 200.0, 200.0),
        ),
        AreaDefinition::new(
            "Song 1",
            AreaKind::SongArea,
            BoundingBox::new(750.0, 0.0, 200.0, 200.0),
        ),
    ]
}
