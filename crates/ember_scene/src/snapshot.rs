//! Scene snapshot — the JSON persistence boundary.
//!
//! The snapshot format is consumed and produced by external collaborators
//! (save files, the editor, the replay recorder). Shape, per scene:
//!
//! ```json
//! {
//!   "Systems": [ { "MovementSystem": { "Priority": 0 } } ],
//!   "CategoryActivity": [ true, true, true, true, true, true, true, true ],
//!   "Entities": [
//!     {
//!       "Name": "Player",
//!       "Handle": "xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx",
//!       "isUnique": false,
//!       "Systems": [ { "SystemCategory": 3, "SystemName": "MovementSystem" } ],
//!       "Components": { "Transform": [ ... ] }
//!     }
//!   ]
//! }
//! ```
//!
//! Only entities whose `should_save` flag is set are captured. Handles
//! round-trip as canonical UUID strings and are preserved on apply.

use std::collections::BTreeMap;

use ember_entity::EntityHandle;
use ember_system::Category;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::scene::Scene;

/// Errors raised while applying a snapshot to a scene.
///
/// Capture is total — a live scene always snapshots. Apply validates
/// external data and fails on the first inconsistency.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// An entity handle string did not parse as a UUID.
    #[error("malformed entity handle '{value}'")]
    MalformedHandle {
        /// The offending string.
        value: String,
        /// The underlying parse error.
        #[source]
        source: uuid::Error,
    },

    /// An entity handle was nil or already present in the scene.
    #[error("unusable entity handle {0}: nil or already present")]
    HandleConflict(EntityHandle),

    /// A component type key has no registered factory.
    #[error("component type '{0}' has no registered factory")]
    UnknownComponentType(String),

    /// A system type key has no registered factory.
    #[error("system type '{0}' has no registered factory")]
    UnknownSystem(String),

    /// A system category index was out of range.
    #[error("unknown system category index {0}")]
    UnknownCategory(usize),

    /// Component data failed to decode.
    #[error("component data for '{type_key}' failed to decode")]
    ComponentDecode {
        /// The component type being restored.
        type_key: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The snapshot document itself failed to encode or decode.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// A system's membership entry on an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemMembership {
    /// The system's category, as its frame-order index.
    #[serde(rename = "SystemCategory")]
    pub category: usize,
    /// The system's type key.
    #[serde(rename = "SystemName")]
    pub name: String,
}

/// One persisted entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// The entity's data-type tag.
    #[serde(rename = "Name")]
    pub name: String,
    /// The entity's handle, as a canonical UUID string.
    #[serde(rename = "Handle")]
    pub handle: String,
    /// Whether the entity is registered in the unique-entity index.
    #[serde(rename = "isUnique")]
    pub is_unique: bool,
    /// Systems holding this entity in their membership lists.
    #[serde(rename = "Systems")]
    pub systems: Vec<SystemMembership>,
    /// Component lists keyed by type key, as array-specific JSON.
    #[serde(rename = "Components")]
    pub components: serde_json::Map<String, Value>,
}

/// Per-system scene configuration: `{ <name>: { "Priority": <int> } }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemPriority {
    /// The system's within-category priority.
    #[serde(rename = "Priority")]
    pub priority: i32,
}

/// A full scene snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSnapshot {
    /// Registered systems in execution order, each a single-key map.
    #[serde(rename = "Systems")]
    pub systems: Vec<BTreeMap<String, SystemPriority>>,
    /// Per-category activity flags, in frame order.
    #[serde(rename = "CategoryActivity")]
    pub category_activity: Vec<bool>,
    /// Persisted entities.
    #[serde(rename = "Entities")]
    pub entities: Vec<EntitySnapshot>,
}

impl SceneSnapshot {
    /// Capture the persistable state of a scene.
    #[must_use]
    pub fn capture(scene: &Scene) -> Self {
        let systems: Vec<BTreeMap<String, SystemPriority>> = scene
            .systems()
            .registered_systems()
            .into_iter()
            .map(|(_, key)| {
                let priority = scene.systems().priority(key).unwrap_or_default();
                let mut entry = BTreeMap::new();
                entry.insert(key.to_string(), SystemPriority { priority });
                entry
            })
            .collect();

        let category_activity = Category::ALL
            .iter()
            .map(|&category| scene.systems().category_active(category))
            .collect();

        let mut entities = Vec::new();
        for entity in scene.entities().iter() {
            if !entity.should_save() {
                continue;
            }
            let handle = entity.handle();

            let systems = scene
                .systems()
                .systems_with_entity(handle)
                .into_iter()
                .map(|(category, name)| SystemMembership {
                    category: category.index(),
                    name: name.to_string(),
                })
                .collect();

            let mut components = serde_json::Map::new();
            for type_key in scene.components().type_keys() {
                if let Some(array) = scene.components().array(type_key)
                    && let Some(value) = array.snapshot(handle)
                {
                    components.insert(type_key.to_string(), value);
                }
            }

            entities.push(EntitySnapshot {
                name: entity.data_type().to_string(),
                handle: handle.to_string(),
                is_unique: entity.is_unique(),
                systems,
                components,
            });
        }

        debug!(
            systems = systems.len(),
            entities = entities.len(),
            "scene snapshot captured"
        );

        Self {
            systems,
            category_activity,
            entities,
        }
    }

    /// Apply this snapshot to a scene, preserving entity handles.
    ///
    /// Systems are registered (or re-prioritised when already present)
    /// first, then category activity, then entities with their components
    /// and system memberships.
    ///
    /// # Errors
    ///
    /// Fails on the first unregistered system or component type,
    /// malformed or conflicting handle, out-of-range category index, or
    /// undecodable component data. The scene may be partially populated
    /// on error.
    pub fn apply(&self, scene: &mut Scene) -> Result<(), SnapshotError> {
        for entry in &self.systems {
            for (name, config) in entry {
                if scene.systems().priority(name).is_some() {
                    scene.systems_mut().set_priority(name, config.priority);
                    continue;
                }
                if !ember_system::registry::is_registered(name) {
                    return Err(SnapshotError::UnknownSystem(name.clone()));
                }
                scene.systems_mut().register(name, config.priority, true);
            }
        }

        for (&category, &active) in Category::ALL.iter().zip(&self.category_activity) {
            scene.systems_mut().set_category_active(category, active);
        }

        for entity in &self.entities {
            let handle = EntityHandle::parse_str(&entity.handle).map_err(|source| {
                SnapshotError::MalformedHandle {
                    value: entity.handle.clone(),
                    source,
                }
            })?;
            if !scene
                .entities_mut()
                .adopt(handle, entity.name.clone(), entity.is_unique)
            {
                return Err(SnapshotError::HandleConflict(handle));
            }

            for (type_key, value) in &entity.components {
                let Some(array) = scene.components_mut().array_mut(type_key) else {
                    return Err(SnapshotError::UnknownComponentType(type_key.clone()));
                };
                array
                    .restore(handle, value)
                    .map_err(|source| SnapshotError::ComponentDecode {
                        type_key: type_key.clone(),
                        source,
                    })?;
            }

            for membership in &entity.systems {
                if Category::from_index(membership.category).is_none() {
                    return Err(SnapshotError::UnknownCategory(membership.category));
                }
                if !scene
                    .systems_mut()
                    .register_entity(&membership.name, handle)
                {
                    return Err(SnapshotError::UnknownSystem(membership.name.clone()));
                }
            }
        }

        debug!(entities = self.entities.len(), "scene snapshot applied");
        Ok(())
    }

    /// Serialise the snapshot to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if encoding fails.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a snapshot from JSON.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if the document does not match the format.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}
