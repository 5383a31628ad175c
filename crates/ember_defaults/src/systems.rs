//! Stock systems.
//!
//! Both follow the fetch-optional pattern: a member entity missing a
//! required component is skipped, never assumed.

use ember_entity::EntityHandle;
use ember_system::{Category, FrameContext, System};
use glam::Quat;
use tracing::trace;

use crate::components::{SpriteRenderer, Velocity};
use crate::transform::Transform3D;

/// Integrates [`Velocity`] into [`Transform3D`] each frame.
///
/// Runs in the Movement category. Only the first instance of each
/// component type participates; extra instances are left untouched.
#[derive(Debug, Default)]
pub struct MovementSystem;

impl System for MovementSystem {
    fn type_key(&self) -> &'static str {
        "MovementSystem"
    }

    fn category(&self) -> Category {
        Category::Movement
    }

    fn update_entity(&mut self, ctx: &mut FrameContext<'_>, entity: EntityHandle) {
        let Some(&velocity) = ctx.components.get::<Velocity>(entity, 0) else {
            return;
        };
        let dt = ctx.dt;
        let Some(transform) = ctx.components.get_mut::<Transform3D>(entity, 0) else {
            return;
        };

        transform.position += velocity.linear * dt;
        if velocity.angular != glam::Vec3::ZERO {
            transform.rotation =
                (Quat::from_scaled_axis(velocity.angular * dt) * transform.rotation).normalize();
        }
    }
}

/// Submits visible [`SpriteRenderer`] components to the draw log.
///
/// Runs in the Render category, after all gameplay state for the frame is
/// final. The actual GPU submission lives in the rendering backend; this
/// system traces what would be drawn and is the reference shape for
/// renderer-facing systems.
#[derive(Debug, Default)]
pub struct SpriteRenderSystem {
    drawn: u64,
}

impl SpriteRenderSystem {
    /// Total sprites submitted since registration.
    #[must_use]
    pub fn drawn(&self) -> u64 {
        self.drawn
    }
}

impl System for SpriteRenderSystem {
    fn type_key(&self) -> &'static str {
        "SpriteRenderSystem"
    }

    fn category(&self) -> Category {
        Category::Render
    }

    fn update_entity(&mut self, ctx: &mut FrameContext<'_>, entity: EntityHandle) {
        let position = ctx
            .components
            .get_all::<Transform3D>(entity)
            .first()
            .map(|t| t.position)
            .unwrap_or_default();

        for sprite in ctx.components.get_all::<SpriteRenderer>(entity) {
            if !sprite.visible {
                continue;
            }
            self.drawn += 1;
            trace!(
                %entity,
                texture = sprite.texture,
                layer = sprite.layer,
                x = position.x,
                y = position.y,
                "sprite submitted"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use ember_scene::Scene;
    use glam::Vec3;

    use super::*;
    use crate::register_defaults;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_movement_integrates_velocity() {
        register_defaults();
        let mut scene = Scene::new("test");
        let player = scene.create_entity("Player", false);
        scene.add_component(player, Transform3D::IDENTITY);
        scene.add_component(player, Velocity::linear(60.0, 0.0, 0.0));

        assert!(scene.register_system("MovementSystem", 0, true));
        scene.register_entity_with_system("MovementSystem", player);

        scene.update(DT);
        scene.update(DT);

        let transform = scene.component::<Transform3D>(player, 0).unwrap();
        assert!((transform.position.x - 2.0).abs() < 1e-4);
        assert_eq!(transform.position.y, 0.0);
    }

    #[test]
    fn test_movement_skips_entity_missing_transform() {
        register_defaults();
        let mut scene = Scene::new("test");
        let ghost = scene.create_entity("Ghost", false);
        scene.add_component(ghost, Velocity::linear(1.0, 0.0, 0.0));

        scene.register_system("MovementSystem", 0, true);
        scene.register_entity_with_system("MovementSystem", ghost);

        // Missing Transform: the entity is skipped, not a crash.
        scene.update(DT);
        assert!(scene.components_of::<Transform3D>(ghost).is_empty());
    }

    #[test]
    fn test_sprites_submit_after_movement() {
        register_defaults();
        let mut scene = Scene::new("test");
        let player = scene.create_entity("Player", false);
        scene.add_component(player, Transform3D::from_position(Vec3::ZERO));
        scene.add_component(player, Velocity::linear(60.0, 0.0, 0.0));
        scene.add_component(player, SpriteRenderer::new("hero.png"));
        let mut hidden = SpriteRenderer::new("shadow.png");
        hidden.visible = false;
        scene.add_component(player, hidden);

        scene.register_system("MovementSystem", 0, true);
        scene.register_system("SpriteRenderSystem", 0, true);
        scene.register_entity_with_system("MovementSystem", player);
        scene.register_entity_with_system("SpriteRenderSystem", player);

        scene.update(DT);

        // Only the visible sprite submitted; movement ran first in the
        // same frame.
        let transform = scene.component::<Transform3D>(player, 0).unwrap();
        assert!(transform.position.x > 0.0);
    }

    #[test]
    fn test_rotation_integrates_angular_velocity() {
        register_defaults();
        let mut scene = Scene::new("test");
        let spinner = scene.create_entity("Spinner", false);
        scene.add_component(spinner, Transform3D::IDENTITY);
        scene.add_component(
            spinner,
            Velocity {
                linear: Vec3::ZERO,
                angular: Vec3::new(0.0, std::f32::consts::PI, 0.0),
            },
        );

        scene.register_system("MovementSystem", 0, true);
        scene.register_entity_with_system("MovementSystem", spinner);

        // Half a turn per second for one simulated second.
        for _ in 0..60 {
            scene.update(DT);
        }

        let transform = scene.component::<Transform3D>(spinner, 0).unwrap();
        let expected = Quat::from_rotation_y(std::f32::consts::PI);
        // Quaternions double-cover: q and -q are the same rotation.
        let dot = transform.rotation.dot(expected).abs();
        assert!(dot > 0.999, "rotation off: dot = {dot}");
    }
}
