//! Entity repository — slot arena, handle resolution, unique index.
//!
//! The repository owns all entity value storage for one scene. Slots are
//! preallocated and recycled through a [`SlotBitmap`]; handles map to slot
//! indices through a hash map that holds an entry iff the entity is alive.
//!
//! Destruction is deferred: callers mark an entity for destruction and the
//! owning scene drains the queue exactly once per frame, before any system
//! category runs. A marked entity stays alive and resolvable until then.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::bitmap::SlotBitmap;
use crate::entity::Entity;
use crate::handle::EntityHandle;

/// Initial slot count. The arena doubles whenever it runs out.
const DEFAULT_CAPACITY: usize = 64;

/// Allocates and resolves entities for one scene.
///
/// All lookup failures are recoverable: unknown or stale handles log a
/// warning and return `None`/`false`, never panic.
#[derive(Debug)]
pub struct EntityRepository {
    slots: Vec<Entity>,
    occupancy: SlotBitmap,
    slot_of: HashMap<EntityHandle, usize>,
    unique: HashMap<String, EntityHandle>,
    pending_destroy: Vec<EntityHandle>,
}

impl EntityRepository {
    /// Create a repository with the default slot capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a repository with an explicit initial slot capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: vec![Entity::dead(); capacity],
            occupancy: SlotBitmap::with_capacity(capacity),
            slot_of: HashMap::with_capacity(capacity),
            unique: HashMap::new(),
            pending_destroy: Vec::new(),
        }
    }

    /// Allocate a new entity and return its handle.
    ///
    /// The lowest free slot is claimed; when none is free the arena doubles.
    /// If `is_unique` is requested but the type tag is already registered,
    /// the collision is logged and the entity is created as non-unique.
    pub fn create(&mut self, data_type: impl Into<String>, is_unique: bool) -> EntityHandle {
        let data_type = data_type.into();
        let handle = EntityHandle::generate();
        let slot = self.claim_slot();

        let mut is_unique = is_unique;
        if is_unique {
            if self.unique.contains_key(&data_type) {
                warn!(
                    data_type,
                    "unique entity tag already registered, creating as non-unique"
                );
                is_unique = false;
            } else {
                self.unique.insert(data_type.clone(), handle);
            }
        }

        self.slots[slot] = Entity::new(handle, data_type, is_unique);
        self.slot_of.insert(handle, slot);
        debug!(%handle, slot, "entity created");
        handle
    }

    /// Insert an entity under an externally supplied handle.
    ///
    /// Used by snapshot restore and replay, where handles must survive a
    /// round trip. Returns `false` (and logs) if the handle is invalid or
    /// already mapped. Unique-tag collisions degrade to non-unique exactly
    /// as in [`EntityRepository::create`].
    pub fn adopt(
        &mut self,
        handle: EntityHandle,
        data_type: impl Into<String>,
        is_unique: bool,
    ) -> bool {
        if !handle.is_valid() {
            warn!("refusing to adopt the invalid handle");
            return false;
        }
        if self.slot_of.contains_key(&handle) {
            warn!(%handle, "handle already mapped, adopt ignored");
            return false;
        }

        let data_type = data_type.into();
        let slot = self.claim_slot();

        let mut is_unique = is_unique;
        if is_unique {
            if self.unique.contains_key(&data_type) {
                warn!(
                    data_type,
                    "unique entity tag already registered, adopting as non-unique"
                );
                is_unique = false;
            } else {
                self.unique.insert(data_type.clone(), handle);
            }
        }

        self.slots[slot] = Entity::new(handle, data_type, is_unique);
        self.slot_of.insert(handle, slot);
        debug!(%handle, slot, "entity adopted");
        true
    }

    /// Resolve a handle to its entity. O(1).
    ///
    /// Unknown or stale handles log a warning and return `None`.
    #[must_use]
    pub fn get(&self, handle: EntityHandle) -> Option<&Entity> {
        match self.slot_of.get(&handle) {
            Some(&slot) => Some(&self.slots[slot]),
            None => {
                warn!(%handle, "unknown or stale entity handle");
                None
            }
        }
    }

    /// Resolve a handle to a mutable entity reference.
    #[must_use]
    pub fn get_mut(&mut self, handle: EntityHandle) -> Option<&mut Entity> {
        match self.slot_of.get(&handle) {
            Some(&slot) => Some(&mut self.slots[slot]),
            None => {
                warn!(%handle, "unknown or stale entity handle");
                None
            }
        }
    }

    /// Non-logging liveness probe.
    ///
    /// The system runner purges dead handles every pass; stale handles are
    /// expected there and must not spam the log.
    #[must_use]
    pub fn is_alive(&self, handle: EntityHandle) -> bool {
        self.slot_of
            .get(&handle)
            .is_some_and(|&slot| self.slots[slot].is_alive())
    }

    /// Destroy an entity immediately, recycling its slot.
    ///
    /// The handle is permanently retired. Returns `false` if the handle
    /// was already unknown. Most callers should prefer
    /// [`EntityRepository::mark_for_destroy`] and let the scene drain the
    /// queue at the frame boundary.
    pub fn remove(&mut self, handle: EntityHandle) -> bool {
        let Some(slot) = self.slot_of.remove(&handle) else {
            warn!(%handle, "remove of unknown entity handle");
            return false;
        };

        let entity = &self.slots[slot];
        if entity.is_unique() {
            self.unique.remove(entity.data_type());
        }
        self.slots[slot] = Entity::dead();
        self.occupancy.release(slot);
        self.pending_destroy.retain(|&h| h != handle);
        debug!(%handle, slot, "entity removed");
        true
    }

    /// Look up the single registered entity for a unique type tag.
    ///
    /// Logs and returns [`EntityHandle::INVALID`] if none is registered.
    #[must_use]
    pub fn unique_handle(&self, data_type: &str) -> EntityHandle {
        match self.unique.get(data_type) {
            Some(&handle) => handle,
            None => {
                warn!(data_type, "no unique entity registered for tag");
                EntityHandle::INVALID
            }
        }
    }

    /// Queue an entity for destruction at the next frame boundary.
    ///
    /// The entity stays alive and resolvable for the rest of the current
    /// frame. Duplicate marks are a no-op. Returns `false` if the handle
    /// is unknown.
    pub fn mark_for_destroy(&mut self, handle: EntityHandle) -> bool {
        if !self.slot_of.contains_key(&handle) {
            warn!(%handle, "mark_for_destroy of unknown entity handle");
            return false;
        }
        if !self.pending_destroy.contains(&handle) {
            self.pending_destroy.push(handle);
        }
        true
    }

    /// Returns `true` if the entity is queued for destruction.
    #[must_use]
    pub fn is_pending_destroy(&self, handle: EntityHandle) -> bool {
        self.pending_destroy.contains(&handle)
    }

    /// Drain the deferred-destroy queue.
    ///
    /// Called by the owning scene exactly once per frame, before any
    /// category runs. The caller is responsible for removing components
    /// and system membership before freeing each slot.
    pub fn take_pending(&mut self) -> Vec<EntityHandle> {
        std::mem::take(&mut self.pending_destroy)
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slot_of.len()
    }

    /// Returns `true` if no entities are alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slot_of.is_empty()
    }

    /// Total slot capacity. Only ever grows.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Iterate over live entities in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(i, _)| self.occupancy.is_set(*i))
            .map(|(_, e)| e)
    }

    fn claim_slot(&mut self) -> usize {
        if let Some(slot) = self.occupancy.acquire() {
            return slot;
        }
        // Arena exhausted: double it. Capacity never shrinks.
        let old = self.slots.len();
        let new = old * 2;
        debug_assert!(new >= self.slot_of.len(), "arena shrank below live count");
        self.slots.resize_with(new, Entity::dead);
        self.occupancy.grow(new);
        debug!(old_capacity = old, new_capacity = new, "entity arena grown");
        self.occupancy
            .acquire()
            .expect("freshly grown arena must have a free slot")
    }
}

impl Default for EntityRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_create_and_get() {
        let mut repo = EntityRepository::new();
        let h = repo.create("Player", false);
        let e = repo.get(h).unwrap();
        assert_eq!(e.data_type(), "Player");
        assert_eq!(e.handle(), h);
        assert!(e.is_alive());
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_unknown_handle_is_none_not_panic() {
        let repo = EntityRepository::new();
        assert!(repo.get(EntityHandle::generate()).is_none());
        assert!(repo.get(EntityHandle::INVALID).is_none());
    }

    #[test]
    fn test_remove_retires_handle() {
        let mut repo = EntityRepository::new();
        let h = repo.create("Enemy", false);
        assert!(repo.remove(h));
        assert!(repo.get(h).is_none());
        assert!(!repo.remove(h));
        assert_eq!(repo.len(), 0);
    }

    #[test]
    fn test_handles_never_shared_or_reused() {
        let mut repo = EntityRepository::with_capacity(4);
        let mut seen = HashSet::new();
        // Churn through many create/delete cycles; every handle must be new.
        for round in 0..50 {
            let h = repo.create("Churn", false);
            assert!(seen.insert(h), "handle reused on round {round}");
            if round % 2 == 0 {
                repo.remove(h);
            }
        }
    }

    #[test]
    fn test_slot_reuse_is_first_fit() {
        let mut repo = EntityRepository::with_capacity(8);
        let handles: Vec<_> = (0..4).map(|_| repo.create("Filler", false)).collect();
        // Free the lowest occupied slot, then allocate again: the new
        // entity must land in that slot while keeping a fresh handle.
        repo.remove(handles[0]);
        let replacement = repo.create("Filler", false);
        assert_ne!(replacement, handles[0]);
        let slot_order: Vec<_> = repo.iter().map(Entity::handle).collect();
        assert_eq!(slot_order[0], replacement);
        assert_eq!(slot_order[1], handles[1]);
    }

    #[test]
    fn test_arena_doubles_when_full() {
        let mut repo = EntityRepository::with_capacity(2);
        let handles: Vec<_> = (0..5).map(|_| repo.create("Grow", false)).collect();
        assert_eq!(repo.len(), 5);
        assert!(repo.capacity() >= 5);
        for h in handles {
            assert!(repo.get(h).is_some());
        }
    }

    #[test]
    fn test_unique_entity_lookup() {
        let mut repo = EntityRepository::new();
        let h = repo.create("GameCamera", true);
        assert_eq!(repo.unique_handle("GameCamera"), h);
        assert!(repo.get(h).unwrap().is_unique());
    }

    #[test]
    fn test_duplicate_unique_tag_degrades_to_non_unique() {
        let mut repo = EntityRepository::new();
        let first = repo.create("GameCamera", true);
        let second = repo.create("GameCamera", true);
        // The original registration wins; the second entity exists but is
        // not unique.
        assert_eq!(repo.unique_handle("GameCamera"), first);
        assert!(!repo.get(second).unwrap().is_unique());
    }

    #[test]
    fn test_unique_tag_freed_on_remove() {
        let mut repo = EntityRepository::new();
        let first = repo.create("GameCamera", true);
        repo.remove(first);
        assert_eq!(repo.unique_handle("GameCamera"), EntityHandle::INVALID);
        let second = repo.create("GameCamera", true);
        assert_eq!(repo.unique_handle("GameCamera"), second);
    }

    #[test]
    fn test_missing_unique_tag_is_invalid_handle() {
        let repo = EntityRepository::new();
        assert_eq!(repo.unique_handle("Nothing"), EntityHandle::INVALID);
    }

    #[test]
    fn test_deferred_destroy_keeps_entity_resolvable() {
        let mut repo = EntityRepository::new();
        let h = repo.create("Doomed", false);
        assert!(repo.mark_for_destroy(h));
        // Marked but not drained: still alive and resolvable.
        assert!(repo.is_alive(h));
        assert!(repo.is_pending_destroy(h));
        assert!(repo.get(h).is_some());

        let pending = repo.take_pending();
        assert_eq!(pending, vec![h]);
        for handle in pending {
            repo.remove(handle);
        }
        assert!(!repo.is_alive(h));
        assert!(repo.get(h).is_none());
    }

    #[test]
    fn test_duplicate_mark_queued_once() {
        let mut repo = EntityRepository::new();
        let h = repo.create("Doomed", false);
        repo.mark_for_destroy(h);
        repo.mark_for_destroy(h);
        assert_eq!(repo.take_pending().len(), 1);
    }

    #[test]
    fn test_mark_unknown_handle_is_false() {
        let mut repo = EntityRepository::new();
        assert!(!repo.mark_for_destroy(EntityHandle::generate()));
        assert!(repo.take_pending().is_empty());
    }

    #[test]
    fn test_adopt_preserves_handle() {
        let mut repo = EntityRepository::new();
        let handle = EntityHandle::generate();
        assert!(repo.adopt(handle, "Saved", true));
        assert_eq!(repo.get(handle).unwrap().data_type(), "Saved");
        assert_eq!(repo.unique_handle("Saved"), handle);
    }

    #[test]
    fn test_adopt_rejects_invalid_and_duplicate() {
        let mut repo = EntityRepository::new();
        assert!(!repo.adopt(EntityHandle::INVALID, "Bad", false));
        let handle = EntityHandle::generate();
        assert!(repo.adopt(handle, "Once", false));
        assert!(!repo.adopt(handle, "Twice", false));
        assert_eq!(repo.len(), 1);
    }
}
