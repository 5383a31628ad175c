//! # ember_app — demo scene
//!
//! Builds a small scene with the stock components and systems, runs it
//! for a few seconds of simulated time, then prints the scene snapshot.
//!
//! ## What it demonstrates
//!
//! 1. Startup type registration (`register_defaults`).
//! 2. Entity creation, component attachment, system membership.
//! 3. The fixed-timestep frame loop.
//! 4. Snapshot capture at shutdown.

use anyhow::Result;
use ember_defaults::{SpriteRenderer, Transform3D, Velocity, register_defaults};
use ember_scene::{FrameConfig, FrameLoop, Scene, SceneSnapshot};
use glam::Vec3;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "ember_app=info".into()),
        )
        .init();

    info!("ember demo starting");

    // Component and system types must be registered before any scene
    // refers to them by key.
    register_defaults();

    let mut scene = Scene::new("demo");
    scene.register_system("MovementSystem", 0, true);
    scene.register_system("SpriteRenderSystem", 0, true);

    let player = scene.create_entity("Player", false);
    scene.add_component(player, Transform3D::IDENTITY);
    scene.add_component(player, Velocity::linear(2.0, 0.0, 0.0));
    scene.add_component(player, SpriteRenderer::new("hero.png"));
    scene.register_entity_with_system("MovementSystem", player);
    scene.register_entity_with_system("SpriteRenderSystem", player);

    let camera = scene.create_entity("GameCamera", true);
    scene.add_component(camera, Transform3D::from_position(Vec3::new(0.0, 5.0, 10.0)));

    info!(
        entities = scene.entities().len(),
        systems = scene.systems().len(),
        "scene built"
    );

    let config = FrameConfig {
        frame_rate: 60.0,
        max_frames: 180, // three seconds of simulation
    };
    let mut frame_loop = FrameLoop::new(scene, config);
    frame_loop.run();

    let scene = frame_loop.into_scene();
    if let Some(transform) = scene.component::<Transform3D>(player, 0) {
        info!(
            frames = scene.frame(),
            x = transform.position.x,
            "simulation finished"
        );
    }

    let snapshot = SceneSnapshot::capture(&scene);
    println!("{}", snapshot.to_json()?);

    info!("ember demo shut down");
    Ok(())
}
