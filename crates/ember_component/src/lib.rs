//! # ember_component
//!
//! The "C" in ECS — defines what a component is, how it is stored, and how
//! it is reached through a string type key.
//!
//! This crate provides:
//!
//! - [`Component`] trait — the contract all attached data must satisfy.
//! - [`ComponentStore`] — per-type storage holding an ordered list of
//!   instances per entity (N components of one type per entity).
//! - [`ComponentArray`] — the type-erased face of a store; down-casting
//!   happens only here, never in consumer code.
//! - [`registry`] — the process-wide type-key → array-factory registry,
//!   idempotent and registration-order-independent.
//! - [`ComponentRepository`] — one scene's collection of arrays, with
//!   typed and type-keyed access.

pub mod component;
pub mod registry;
pub mod repository;
pub mod store;

pub use component::Component;
pub use repository::ComponentRepository;
pub use store::{ComponentArray, ComponentStore};
