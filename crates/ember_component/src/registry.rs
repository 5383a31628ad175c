//! Process-wide component-type factory registry.
//!
//! Component types are registered once, by string type key, with a factory
//! that produces an empty storage array of the right shape. The registry is
//! the only process-wide state in the engine: it is written during startup
//! registration and read-only afterwards.
//!
//! Registration is idempotent and order-independent — registering the same
//! type twice is a no-op, and no behaviour depends on registration order.

use std::collections::HashMap;

use lazy_static::lazy_static;
use parking_lot::RwLock;
use tracing::debug;

use crate::component::Component;
use crate::store::{ComponentArray, ComponentStore};

/// Produces a fresh, empty storage array for one component type.
pub type ComponentArrayFactory = fn() -> Box<dyn ComponentArray>;

lazy_static! {
    static ref FACTORIES: RwLock<HashMap<String, ComponentArrayFactory>> =
        RwLock::new(HashMap::new());
}

fn make_array<T: Component>() -> Box<dyn ComponentArray> {
    Box::new(ComponentStore::<T>::new())
}

/// Register a component type under its [`Component::type_key`].
///
/// Idempotent: re-registering an already known type is a no-op.
pub fn register_component<T: Component>() {
    let mut factories = FACTORIES.write();
    if factories.contains_key(T::type_key()) {
        return;
    }
    factories.insert(T::type_key().to_string(), make_array::<T>);
    debug!(type_key = T::type_key(), "component type registered");
}

/// Returns `true` if a factory exists for `type_key`.
#[must_use]
pub fn is_registered(type_key: &str) -> bool {
    FACTORIES.read().contains_key(type_key)
}

/// Instantiate a fresh, empty array for `type_key`, or `None` when the
/// type was never registered (a configuration error the caller reports).
#[must_use]
pub fn create_array(type_key: &str) -> Option<Box<dyn ComponentArray>> {
    FACTORIES.read().get(type_key).map(|factory| factory())
}

/// Every registered type key, sorted. Used by editor tooling to enumerate
/// attachable component types.
#[must_use]
pub fn registered_type_keys() -> Vec<String> {
    let mut keys: Vec<String> = FACTORIES.read().keys().cloned().collect();
    keys.sort();
    keys
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct RegistryProbe;

    impl Component for RegistryProbe {
        fn type_key() -> &'static str {
            "RegistryProbe"
        }
    }

    #[test]
    fn test_register_and_create() {
        register_component::<RegistryProbe>();
        assert!(is_registered("RegistryProbe"));
        let array = create_array("RegistryProbe").unwrap();
        assert_eq!(array.type_key(), "RegistryProbe");
    }

    #[test]
    fn test_registration_is_idempotent() {
        register_component::<RegistryProbe>();
        register_component::<RegistryProbe>();
        let count = registered_type_keys()
            .iter()
            .filter(|k| k.as_str() == "RegistryProbe")
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_unknown_type_has_no_factory() {
        assert!(!is_registered("NeverRegistered"));
        assert!(create_array("NeverRegistered").is_none());
    }
}
