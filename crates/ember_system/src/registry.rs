//! Process-wide system factory registry.
//!
//! Mirrors the component factory registry: a string type key maps to a
//! factory producing a fresh system instance. Written during startup
//! registration, read-only afterwards; registration is idempotent and
//! order-independent.

use std::collections::HashMap;

use lazy_static::lazy_static;
use parking_lot::RwLock;
use tracing::debug;

use crate::system::System;

/// Produces a fresh instance of one system type.
pub type SystemFactory = fn() -> Box<dyn System>;

lazy_static! {
    static ref FACTORIES: RwLock<HashMap<String, SystemFactory>> = RwLock::new(HashMap::new());
}

fn make_system<S: System + Default + 'static>() -> Box<dyn System> {
    Box::new(S::default())
}

/// Register a system type under its `type_key`.
///
/// Idempotent: re-registering an already known type is a no-op.
pub fn register_system<S: System + Default + 'static>() {
    let key = S::default().type_key();
    let mut factories = FACTORIES.write();
    if factories.contains_key(key) {
        return;
    }
    factories.insert(key.to_string(), make_system::<S>);
    debug!(type_key = key, "system type registered");
}

/// Returns `true` if a factory exists for `type_key`.
#[must_use]
pub fn is_registered(type_key: &str) -> bool {
    FACTORIES.read().contains_key(type_key)
}

/// Construct a fresh system for `type_key`, or `None` when the type was
/// never registered.
#[must_use]
pub fn create_system(type_key: &str) -> Option<Box<dyn System>> {
    FACTORIES.read().get(type_key).map(|factory| factory())
}

/// Every registered type key, sorted.
#[must_use]
pub fn registered_type_keys() -> Vec<String> {
    let mut keys: Vec<String> = FACTORIES.read().keys().cloned().collect();
    keys.sort();
    keys
}
