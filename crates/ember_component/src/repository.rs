//! Component repository — one scene's type-keyed array collection.
//!
//! The repository owns one [`ComponentArray`] per component type that the
//! scene has touched. Arrays are instantiated lazily from the process-wide
//! factory registry on first mutable access. Typed access (`add`, `get`,
//! `get_all`) down-casts at the array boundary so consumer code never sees
//! `dyn Any`.

use std::collections::HashMap;

use ember_entity::EntityHandle;
use tracing::{debug, error, warn};

use crate::component::Component;
use crate::registry;
use crate::store::{ComponentArray, ComponentStore};

/// Type-keyed component storage for one scene.
///
/// Lookup failures (unknown type key, out-of-range index) are recoverable:
/// they log and return a sentinel. A missing factory is a configuration
/// error: it logs at error level and the operation degrades to a no-op.
#[derive(Default)]
pub struct ComponentRepository {
    arrays: HashMap<String, Box<dyn ComponentArray>>,
}

impl ComponentRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiate the array for `type_key` from the factory registry.
    ///
    /// Returns `false` (and logs) when no factory is registered for the
    /// key. Re-registering an existing array is a no-op returning `true`.
    pub fn register_array(&mut self, type_key: &str) -> bool {
        if self.arrays.contains_key(type_key) {
            return true;
        }
        match registry::create_array(type_key) {
            Some(array) => {
                self.arrays.insert(type_key.to_string(), array);
                debug!(type_key, "component array instantiated");
                true
            }
            None => {
                error!(type_key, "no factory registered for component type");
                false
            }
        }
    }

    /// The array for `type_key`, if instantiated in this scene.
    #[must_use]
    pub fn array(&self, type_key: &str) -> Option<&dyn ComponentArray> {
        self.arrays.get(type_key).map(Box::as_ref)
    }

    /// The array for `type_key`, instantiating it on first access.
    ///
    /// `None` only when the type has no registered factory.
    #[must_use]
    pub fn array_mut(&mut self, type_key: &str) -> Option<&mut (dyn ComponentArray + 'static)> {
        if !self.arrays.contains_key(type_key) && !self.register_array(type_key) {
            return None;
        }
        self.arrays.get_mut(type_key).map(Box::as_mut)
    }

    /// Attach a component instance to `owner`, running its attach hook.
    /// Returns the instance's index in the owner's list.
    pub fn add<T: Component>(&mut self, owner: EntityHandle, value: T) -> usize {
        self.store_mut::<T>().push(owner, value)
    }

    /// Attach a default-constructed component by type key.
    ///
    /// Returns the new instance's index, or `None` when the type has no
    /// registered factory.
    pub fn add_default(&mut self, type_key: &str, owner: EntityHandle) -> Option<usize> {
        self.array_mut(type_key)
            .map(|array| array.push_default(owner))
    }

    /// The instance at `index` of `owner`'s list for type `T`.
    #[must_use]
    pub fn get<T: Component>(&self, owner: EntityHandle, index: usize) -> Option<&T> {
        self.store::<T>()?.get(owner, index)
    }

    /// Mutable access to the instance at `index` of `owner`'s list.
    #[must_use]
    pub fn get_mut<T: Component>(&mut self, owner: EntityHandle, index: usize) -> Option<&mut T> {
        match self.typed_mut::<T>() {
            Some(store) => store.get_mut(owner, index),
            None => None,
        }
    }

    /// All of `owner`'s instances of type `T`, in insertion order.
    #[must_use]
    pub fn get_all<T: Component>(&self, owner: EntityHandle) -> &[T] {
        self.store::<T>().map_or(&[], |store| store.slice(owner))
    }

    /// Mutable view of all of `owner`'s instances of type `T`.
    #[must_use]
    pub fn get_all_mut<T: Component>(&mut self, owner: EntityHandle) -> &mut [T] {
        match self.typed_mut::<T>() {
            Some(store) => store.slice_mut(owner),
            None => &mut [],
        }
    }

    /// Number of instances of `type_key` attached to `owner`.
    #[must_use]
    pub fn count(&self, type_key: &str, owner: EntityHandle) -> usize {
        self.arrays
            .get(type_key)
            .map_or(0, |array| array.count(owner))
    }

    /// Remove the instance at `index` of `owner`'s list for `type_key`.
    ///
    /// Removing the last instance leaves an empty, inert list — the array
    /// entry itself survives until the entity is deleted.
    pub fn remove(&mut self, type_key: &str, owner: EntityHandle, index: usize) -> bool {
        match self.arrays.get_mut(type_key) {
            Some(array) => array.remove_at(owner, index),
            None => {
                warn!(type_key, "remove on unknown component type");
                false
            }
        }
    }

    /// Remove every component attached to `owner`, across all types.
    ///
    /// The single choke point guaranteeing no component outlives its
    /// owning entity. Returns the total number of instances removed.
    pub fn delete_entity(&mut self, owner: EntityHandle) -> usize {
        let mut removed = 0;
        for array in self.arrays.values_mut() {
            removed += array.remove_all(owner);
        }
        if removed > 0 {
            debug!(%owner, removed, "components removed with entity");
        }
        removed
    }

    /// Type keys of every array instantiated in this scene, sorted.
    #[must_use]
    pub fn type_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.arrays.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    fn store<T: Component>(&self) -> Option<&ComponentStore<T>> {
        match self.arrays.get(T::type_key()) {
            Some(array) => array.as_any().downcast_ref::<ComponentStore<T>>(),
            None => {
                warn!(type_key = T::type_key(), "no array instantiated for component type");
                None
            }
        }
    }

    fn typed_mut<T: Component>(&mut self) -> Option<&mut ComponentStore<T>> {
        self.store_exists_or_insert::<T>();
        self.arrays
            .get_mut(T::type_key())
            .and_then(|array| array.as_any_mut().downcast_mut::<ComponentStore<T>>())
    }

    fn store_mut<T: Component>(&mut self) -> &mut ComponentStore<T> {
        // Only reachable if two component types share one type key.
        self.typed_mut::<T>()
            .expect("component type key mapped to a different store type")
    }

    // The typed path can create the store directly: the concrete type is
    // in hand, so no factory lookup is needed.
    fn store_exists_or_insert<T: Component>(&mut self) {
        if !self.arrays.contains_key(T::type_key()) {
            self.arrays.insert(
                T::type_key().to_string(),
                Box::new(ComponentStore::<T>::new()),
            );
            debug!(type_key = T::type_key(), "component array instantiated");
        }
    }
}

impl std::fmt::Debug for ComponentRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRepository")
            .field("types", &self.type_keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
    struct Label {
        text: String,
    }

    impl Component for Label {
        fn type_key() -> &'static str {
            "Label"
        }
    }

    #[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
    struct Counter {
        hits: u32,
    }

    impl Component for Counter {
        fn type_key() -> &'static str {
            "Counter"
        }
    }

    fn label(text: &str) -> Label {
        Label {
            text: text.to_string(),
        }
    }

    #[test]
    fn test_typed_add_and_get() {
        let mut repo = ComponentRepository::new();
        let owner = EntityHandle::generate();
        let index = repo.add(owner, label("hello"));
        assert_eq!(index, 0);
        assert_eq!(repo.get::<Label>(owner, 0).unwrap().text, "hello");
    }

    #[test]
    fn test_three_instances_addressable_by_index() {
        let mut repo = ComponentRepository::new();
        let owner = EntityHandle::generate();
        repo.add(owner, label("a"));
        repo.add(owner, label("b"));
        repo.add(owner, label("c"));

        let all = repo.get_all::<Label>(owner);
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].text, "a");
        assert_eq!(all[2].text, "c");

        assert!(repo.remove("Label", owner, 1));
        let all = repo.get_all::<Label>(owner);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].text, "a");
        assert_eq!(all[1].text, "c");
    }

    #[test]
    fn test_add_default_by_type_key() {
        registry::register_component::<Counter>();
        let mut repo = ComponentRepository::new();
        let owner = EntityHandle::generate();
        assert_eq!(repo.add_default("Counter", owner), Some(0));
        assert_eq!(repo.add_default("Counter", owner), Some(1));
        assert_eq!(repo.count("Counter", owner), 2);
    }

    #[test]
    fn test_unknown_type_key_degrades_to_noop() {
        let mut repo = ComponentRepository::new();
        let owner = EntityHandle::generate();
        assert!(repo.add_default("NoSuchType", owner).is_none());
        assert!(!repo.register_array("NoSuchType"));
        assert!(!repo.remove("NoSuchType", owner, 0));
        assert_eq!(repo.count("NoSuchType", owner), 0);
    }

    #[test]
    fn test_lazy_array_registration() {
        registry::register_component::<Counter>();
        let mut repo = ComponentRepository::new();
        assert!(repo.array("Counter").is_none());
        assert!(repo.array_mut("Counter").is_some());
        assert!(repo.array("Counter").is_some());
    }

    #[test]
    fn test_delete_entity_walks_every_array() {
        let mut repo = ComponentRepository::new();
        let owner = EntityHandle::generate();
        let bystander = EntityHandle::generate();
        repo.add(owner, label("x"));
        repo.add(owner, Counter { hits: 3 });
        repo.add(owner, Counter { hits: 4 });
        repo.add(bystander, label("y"));

        assert_eq!(repo.delete_entity(owner), 3);
        assert!(repo.get_all::<Label>(owner).is_empty());
        assert!(repo.get_all::<Counter>(owner).is_empty());
        // Other entities' components are untouched.
        assert_eq!(repo.get_all::<Label>(bystander).len(), 1);
    }

    #[test]
    fn test_operations_cannot_corrupt_other_arrays() {
        let mut repo = ComponentRepository::new();
        let owner = EntityHandle::generate();
        repo.add(owner, label("keep"));
        repo.add(owner, Counter { hits: 1 });
        // A bad remove on one type leaves the other untouched.
        assert!(!repo.remove("Counter", owner, 5));
        assert_eq!(repo.get_all::<Label>(owner).len(), 1);
        assert_eq!(repo.get_all::<Counter>(owner).len(), 1);
    }

    #[test]
    fn test_type_keys_enumeration() {
        let mut repo = ComponentRepository::new();
        let owner = EntityHandle::generate();
        repo.add(owner, Counter { hits: 1 });
        repo.add(owner, label("z"));
        assert_eq!(repo.type_keys(), vec!["Counter", "Label"]);
    }
}
