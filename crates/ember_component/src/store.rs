//! Per-type component storage.
//!
//! A [`ComponentStore`] holds every instance of one component type in the
//! scene, keyed by owning entity. Each entity owns an ordered `Vec` of
//! instances — removing one preserves the relative order of the rest, and
//! an emptied list is a valid, inert state.
//!
//! [`ComponentArray`] is the type-erased face of a store. It is the only
//! place down-casting happens; consumers go through the typed methods on
//! [`ComponentRepository`](crate::ComponentRepository).

use std::any::Any;
use std::collections::HashMap;

use ember_entity::EntityHandle;
use serde_json::Value;
use tracing::warn;

use crate::component::Component;

/// Initial owner-map capacity for a fresh store.
const DEFAULT_CAPACITY: usize = 64;

/// Type-erased access to a [`ComponentStore`].
///
/// One boxed `ComponentArray` per component type lives in the scene's
/// component repository. All operations are total: out-of-range indices
/// and unknown owners log and return sentinels, and no operation can
/// corrupt another type's array.
pub trait ComponentArray: Send + Sync {
    /// The type key of the stored component type.
    fn type_key(&self) -> &'static str;

    /// Number of instances attached to `owner`.
    fn count(&self, owner: EntityHandle) -> usize;

    /// Append a default-constructed instance to `owner`'s list and run its
    /// attach hook. Returns the new instance's index.
    fn push_default(&mut self, owner: EntityHandle) -> usize;

    /// Remove the instance at `index` from `owner`'s list, preserving the
    /// order of the remaining instances. Out of range → log + `false`.
    fn remove_at(&mut self, owner: EntityHandle, index: usize) -> bool;

    /// Remove every instance attached to `owner`, dropping its list
    /// entirely. Returns the number removed.
    fn remove_all(&mut self, owner: EntityHandle) -> usize;

    /// Serialise `owner`'s instance list to JSON for the snapshot format.
    /// `None` when the entity has no instances of this type.
    fn snapshot(&self, owner: EntityHandle) -> Option<Value>;

    /// Append instances parsed from snapshot JSON to `owner`'s list,
    /// running attach hooks. Returns the number restored.
    ///
    /// # Errors
    ///
    /// Returns the underlying JSON error when `value` does not decode as a
    /// list of this component type.
    fn restore(&mut self, owner: EntityHandle, value: &Value) -> Result<usize, serde_json::Error>;

    /// Down-cast support. Confined to the repository boundary.
    fn as_any(&self) -> &dyn Any;

    /// Mutable down-cast support. Confined to the repository boundary.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Storage for all instances of one component type, keyed by owner.
#[derive(Debug)]
pub struct ComponentStore<T: Component> {
    instances: HashMap<EntityHandle, Vec<T>>,
}

impl<T: Component> ComponentStore<T> {
    /// Create an empty store with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            instances: HashMap::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Append an instance to `owner`'s list, running its attach hook.
    /// Returns the instance's index.
    pub fn push(&mut self, owner: EntityHandle, mut value: T) -> usize {
        value.initialize(owner);
        let list = self.instances.entry(owner).or_default();
        list.push(value);
        list.len() - 1
    }

    /// The instance at `index` of `owner`'s list.
    #[must_use]
    pub fn get(&self, owner: EntityHandle, index: usize) -> Option<&T> {
        match self.instances.get(&owner).and_then(|list| list.get(index)) {
            Some(value) => Some(value),
            None => {
                warn!(
                    type_key = T::type_key(),
                    %owner,
                    index,
                    "component index out of range"
                );
                None
            }
        }
    }

    /// Mutable access to the instance at `index` of `owner`'s list.
    #[must_use]
    pub fn get_mut(&mut self, owner: EntityHandle, index: usize) -> Option<&mut T> {
        match self
            .instances
            .get_mut(&owner)
            .and_then(|list| list.get_mut(index))
        {
            Some(value) => Some(value),
            None => {
                warn!(
                    type_key = T::type_key(),
                    %owner,
                    index,
                    "component index out of range"
                );
                None
            }
        }
    }

    /// All of `owner`'s instances, in insertion order. Empty when none.
    #[must_use]
    pub fn slice(&self, owner: EntityHandle) -> &[T] {
        self.instances.get(&owner).map_or(&[], Vec::as_slice)
    }

    /// Mutable view of all of `owner`'s instances.
    #[must_use]
    pub fn slice_mut(&mut self, owner: EntityHandle) -> &mut [T] {
        self.instances
            .get_mut(&owner)
            .map_or(&mut [], Vec::as_mut_slice)
    }
}

impl<T: Component> Default for ComponentStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> ComponentArray for ComponentStore<T> {
    fn type_key(&self) -> &'static str {
        T::type_key()
    }

    fn count(&self, owner: EntityHandle) -> usize {
        self.instances.get(&owner).map_or(0, Vec::len)
    }

    fn push_default(&mut self, owner: EntityHandle) -> usize {
        self.push(owner, T::default())
    }

    fn remove_at(&mut self, owner: EntityHandle, index: usize) -> bool {
        let Some(list) = self.instances.get_mut(&owner) else {
            warn!(type_key = T::type_key(), %owner, "remove from entity with no components of this type");
            return false;
        };
        if index >= list.len() {
            warn!(
                type_key = T::type_key(),
                %owner,
                index,
                len = list.len(),
                "component remove index out of range"
            );
            return false;
        }
        // Shifting remove: the relative order of the survivors is part of
        // the index-addressing contract.
        let mut removed = list.remove(index);
        removed.finalize();
        true
    }

    fn remove_all(&mut self, owner: EntityHandle) -> usize {
        match self.instances.remove(&owner) {
            Some(list) => {
                let count = list.len();
                for mut value in list {
                    value.finalize();
                }
                count
            }
            None => 0,
        }
    }

    fn snapshot(&self, owner: EntityHandle) -> Option<Value> {
        let list = self.instances.get(&owner)?;
        if list.is_empty() {
            return None;
        }
        match serde_json::to_value(list) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(type_key = T::type_key(), %owner, %error, "component snapshot failed");
                None
            }
        }
    }

    fn restore(&mut self, owner: EntityHandle, value: &Value) -> Result<usize, serde_json::Error> {
        let restored: Vec<T> = serde_json::from_value(value.clone())?;
        let count = restored.len();
        for instance in restored {
            self.push(owner, instance);
        }
        Ok(count)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
    struct Marker {
        value: i32,
    }

    impl Component for Marker {
        fn type_key() -> &'static str {
            "Marker"
        }
    }

    #[test]
    fn test_multiple_instances_per_entity() {
        let mut store = ComponentStore::<Marker>::new();
        let owner = EntityHandle::generate();
        for value in 0..3 {
            store.push(owner, Marker { value });
        }
        assert_eq!(store.count(owner), 3);
        assert_eq!(store.get(owner, 0).unwrap().value, 0);
        assert_eq!(store.get(owner, 2).unwrap().value, 2);
    }

    #[test]
    fn test_remove_middle_preserves_order() {
        let mut store = ComponentStore::<Marker>::new();
        let owner = EntityHandle::generate();
        for value in 0..3 {
            store.push(owner, Marker { value });
        }
        assert!(store.remove_at(owner, 1));
        assert_eq!(store.count(owner), 2);
        assert_eq!(store.get(owner, 0).unwrap().value, 0);
        assert_eq!(store.get(owner, 1).unwrap().value, 2);
    }

    #[test]
    fn test_out_of_range_is_none_not_panic() {
        let mut store = ComponentStore::<Marker>::new();
        let owner = EntityHandle::generate();
        store.push(owner, Marker { value: 7 });
        assert!(store.get(owner, 1).is_none());
        assert!(!store.remove_at(owner, 1));
        assert!(store.get(EntityHandle::generate(), 0).is_none());
    }

    #[test]
    fn test_emptied_list_is_valid_inert_state() {
        let mut store = ComponentStore::<Marker>::new();
        let owner = EntityHandle::generate();
        store.push(owner, Marker { value: 1 });
        assert!(store.remove_at(owner, 0));
        assert_eq!(store.count(owner), 0);
        assert!(store.slice(owner).is_empty());
        // The entity can accumulate instances again afterwards.
        store.push(owner, Marker { value: 2 });
        assert_eq!(store.count(owner), 1);
    }

    #[test]
    fn test_remove_all() {
        let mut store = ComponentStore::<Marker>::new();
        let owner = EntityHandle::generate();
        let other = EntityHandle::generate();
        store.push(owner, Marker { value: 1 });
        store.push(owner, Marker { value: 2 });
        store.push(other, Marker { value: 3 });
        assert_eq!(store.remove_all(owner), 2);
        assert_eq!(store.count(owner), 0);
        // Another entity's instances are untouched.
        assert_eq!(store.count(other), 1);
    }

    #[test]
    fn test_snapshot_restore_roundtrip() {
        let mut store = ComponentStore::<Marker>::new();
        let owner = EntityHandle::generate();
        store.push(owner, Marker { value: 4 });
        store.push(owner, Marker { value: 5 });

        let json = store.snapshot(owner).unwrap();
        let mut fresh = ComponentStore::<Marker>::new();
        assert_eq!(fresh.restore(owner, &json).unwrap(), 2);
        assert_eq!(fresh.slice(owner), store.slice(owner));
    }

    #[test]
    fn test_snapshot_of_absent_owner_is_none() {
        let store = ComponentStore::<Marker>::new();
        assert!(store.snapshot(EntityHandle::generate()).is_none());
    }

    #[test]
    fn test_restore_rejects_malformed_json() {
        let mut store = ComponentStore::<Marker>::new();
        let owner = EntityHandle::generate();
        let bad = serde_json::json!({"not": "a list"});
        assert!(store.restore(owner, &bad).is_err());
        assert_eq!(store.count(owner), 0);
    }
}
