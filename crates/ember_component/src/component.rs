//! Core [`Component`] trait.
//!
//! Every piece of data attached to an entity implements [`Component`]. The
//! trait requires `Serialize`/`Deserialize` so component state can round-trip
//! through the scene snapshot format, and `Default` so a type-erased store
//! can construct an instance from nothing but a type key.

use ember_entity::EntityHandle;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// The contract all attached entity data must satisfy.
///
/// An entity may carry any number of instances of the same component type;
/// instances are ordered by insertion and addressed by index.
///
/// # Examples
///
/// ```rust
/// use serde::{Serialize, Deserialize};
/// use ember_component::Component;
///
/// #[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// struct Health {
///     current: f32,
///     max: f32,
/// }
///
/// impl Component for Health {
///     fn type_key() -> &'static str { "Health" }
/// }
/// ```
pub trait Component: Default + Send + Sync + 'static + Serialize + DeserializeOwned {
    /// The stable string key this component type is registered under.
    fn type_key() -> &'static str;

    /// Called once when the component is attached to an entity.
    fn initialize(&mut self, owner: EntityHandle) {
        let _ = owner;
    }

    /// Called when the component is removed or its owner is destroyed.
    fn finalize(&mut self) {}
}
