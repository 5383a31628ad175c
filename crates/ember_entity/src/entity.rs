//! The per-slot entity value.

use serde::{Deserialize, Serialize};

use crate::handle::EntityHandle;

/// One live game object.
///
/// An entity carries no behaviour — it is an identity plus a handful of
/// bookkeeping flags. Components give it data; systems give it behaviour.
///
/// Entities live in the repository's slot arena. A slot's value is only
/// meaningful while the corresponding occupancy bit is set; destroyed
/// slots are overwritten with [`Entity::dead`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    handle: EntityHandle,
    data_type: String,
    is_alive: bool,
    is_unique: bool,
    should_save: bool,
}

impl Entity {
    /// Create a live entity. Called only by the repository on allocation.
    #[must_use]
    pub(crate) fn new(handle: EntityHandle, data_type: impl Into<String>, is_unique: bool) -> Self {
        Self {
            handle,
            data_type: data_type.into(),
            is_alive: true,
            is_unique,
            should_save: true,
        }
    }

    /// The dead sentinel written into recycled slots.
    #[must_use]
    pub(crate) fn dead() -> Self {
        Self {
            handle: EntityHandle::INVALID,
            data_type: String::new(),
            is_alive: false,
            is_unique: false,
            should_save: false,
        }
    }

    /// The entity's handle. Immutable once assigned.
    #[must_use]
    pub fn handle(&self) -> EntityHandle {
        self.handle
    }

    /// The logical type tag used for grouping and unique-entity lookup.
    #[must_use]
    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    /// Returns `true` while the entity occupies a live slot.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.is_alive
    }

    /// Returns `true` if the entity is registered in the unique-entity index.
    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.is_unique
    }

    /// Whether persistence includes this entity.
    #[must_use]
    pub fn should_save(&self) -> bool {
        self.should_save
    }

    /// Set whether persistence includes this entity.
    pub fn set_should_save(&mut self, should_save: bool) {
        self.should_save = should_save;
    }

}
