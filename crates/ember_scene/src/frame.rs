//! Fixed-timestep frame driver.
//!
//! [`FrameLoop`] runs a [`Scene`] at a target frame rate. This is the
//! standalone driver used by headless simulation and the demo binary; an
//! embedding application with its own main loop calls [`Scene::update`]
//! directly instead.

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::scene::Scene;

/// Configuration for the frame loop.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Target frames per second.
    pub frame_rate: f64,
    /// Maximum number of frames to run (0 = unlimited).
    pub max_frames: u64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60.0,
            max_frames: 0,
        }
    }
}

/// Drives a scene at a fixed timestep.
#[derive(Debug)]
pub struct FrameLoop {
    scene: Scene,
    config: FrameConfig,
}

impl FrameLoop {
    /// Create a frame loop around a scene.
    #[must_use]
    pub fn new(scene: Scene, config: FrameConfig) -> Self {
        Self { scene, config }
    }

    /// The driven scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable access to the driven scene.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Consume the loop, returning the scene.
    #[must_use]
    pub fn into_scene(self) -> Scene {
        self.scene
    }

    /// Advance exactly one frame at the configured timestep.
    pub fn step(&mut self) {
        let dt = (1.0 / self.config.frame_rate) as f32;
        self.scene.update(dt);
    }

    /// Run until `max_frames` is reached (forever when 0), sleeping off
    /// any time left in each frame's budget.
    pub fn run(&mut self) {
        let frame_budget = Duration::from_secs_f64(1.0 / self.config.frame_rate);

        info!(
            scene = self.scene.name(),
            frame_rate = self.config.frame_rate,
            max_frames = self.config.max_frames,
            "frame loop starting"
        );

        loop {
            let start = Instant::now();
            self.step();

            if self.config.max_frames > 0 && self.scene.frame() >= self.config.max_frames {
                info!(frames = self.scene.frame(), "frame loop complete");
                break;
            }

            let elapsed = start.elapsed();
            if elapsed < frame_budget {
                std::thread::sleep(frame_budget - elapsed);
            } else {
                warn!(
                    frame = self.scene.frame(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = frame_budget.as_millis() as u64,
                    "frame exceeded time budget"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_advances_one_frame() {
        let mut frame_loop = FrameLoop::new(Scene::new("test"), FrameConfig::default());
        frame_loop.step();
        frame_loop.step();
        assert_eq!(frame_loop.scene().frame(), 2);
    }

    #[test]
    fn test_run_stops_at_max_frames() {
        let config = FrameConfig {
            frame_rate: 1000.0, // fast for testing
            max_frames: 5,
        };
        let mut frame_loop = FrameLoop::new(Scene::new("test"), config);
        frame_loop.run();
        assert_eq!(frame_loop.into_scene().frame(), 5);
    }
}
