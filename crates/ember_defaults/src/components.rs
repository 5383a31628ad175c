//! Stock component definitions.
//!
//! These satisfy the [`Component`] contract: `Default`, `Serialize`,
//! `Deserialize`, `Send + Sync + 'static`, and a stable type key.

use ember_component::Component;
use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Linear and angular velocity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Velocity {
    /// Linear velocity in world units per second.
    pub linear: Vec3,
    /// Angular velocity as a scaled rotation axis, radians per second.
    pub angular: Vec3,
}

impl Velocity {
    /// Zero velocity.
    pub const ZERO: Self = Self {
        linear: Vec3::ZERO,
        angular: Vec3::ZERO,
    };

    /// A purely linear velocity.
    #[must_use]
    pub fn linear(x: f32, y: f32, z: f32) -> Self {
        Self {
            linear: Vec3::new(x, y, z),
            ..Self::ZERO
        }
    }
}

impl Default for Velocity {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Component for Velocity {
    fn type_key() -> &'static str {
        "Velocity"
    }
}

/// A drawable 2D sprite reference.
///
/// The renderer resolves `texture` against the asset store at draw time;
/// this component only carries the reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SpriteRenderer {
    /// Asset key of the texture to draw.
    pub texture: String,
    /// Draw layer; higher layers draw on top.
    pub layer: i32,
    /// Whether the sprite is submitted at all.
    pub visible: bool,
}

impl SpriteRenderer {
    /// A visible sprite on layer 0.
    #[must_use]
    pub fn new(texture: impl Into<String>) -> Self {
        Self {
            texture: texture.into(),
            layer: 0,
            visible: true,
        }
    }
}

impl Component for SpriteRenderer {
    fn type_key() -> &'static str {
        "SpriteRenderer"
    }
}

/// Surface appearance parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Material {
    /// Base colour, linear RGBA.
    pub base_color: Vec4,
    /// Metallic factor in `[0, 1]`.
    pub metallic: f32,
    /// Perceptual roughness in `[0, 1]`.
    pub roughness: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: Vec4::ONE,
            metallic: 0.0,
            roughness: 0.5,
        }
    }
}

impl Component for Material {
    fn type_key() -> &'static str {
        "Material"
    }
}
