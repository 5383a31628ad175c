//! # ember_defaults
//!
//! Stock components and systems most scenes want: spatial transforms,
//! velocity integration, and sprite drawing.
//!
//! Call [`register_defaults`] once at startup to make every stock type
//! available by type key (registration is idempotent, so calling it from
//! multiple entry points is harmless).

pub mod components;
pub mod systems;
pub mod transform;

pub use components::{Material, SpriteRenderer, Velocity};
pub use systems::{MovementSystem, SpriteRenderSystem};
pub use transform::Transform3D;

use ember_component::registry::register_component;
use ember_system::registry::register_system;

/// Register every stock component and system type. Idempotent.
pub fn register_defaults() {
    register_component::<Transform3D>();
    register_component::<Velocity>();
    register_component::<SpriteRenderer>();
    register_component::<Material>();

    register_system::<MovementSystem>();
    register_system::<SpriteRenderSystem>();
}
