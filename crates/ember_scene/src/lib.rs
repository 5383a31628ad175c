//! # ember_scene
//!
//! Scene ownership of the ECS core.
//!
//! A [`Scene`] owns exactly one entity repository, one component
//! repository, and one system runner — nothing outside the scene mutates
//! them. The scene drives the frame: drain the deferred-deletion queue
//! once, then sweep every system category in the fixed frame order.
//!
//! This crate provides:
//!
//! - [`Scene`] — the owning façade and per-frame update entry point.
//! - [`FrameLoop`] — a fixed-timestep driver for standalone simulation.
//! - [`SceneSnapshot`] — JSON persistence of entities, components,
//!   systems, and category activity.

pub mod frame;
pub mod scene;
pub mod snapshot;

pub use frame::{FrameConfig, FrameLoop};
pub use scene::Scene;
pub use snapshot::{SceneSnapshot, SnapshotError};
