//! System execution categories.
//!
//! Every system belongs to exactly one category, fixed at construction.
//! Categories run in a fixed frame-global order; this ordering is a
//! structural invariant — a Movement system must never observe state
//! mutated by a later category within the same frame, and Render systems
//! assume all gameplay state for the frame is final.

use serde::{Deserialize, Serialize};

/// The fixed scheduling phase a system belongs to.
///
/// [`Category::ALL`] lists the categories in frame execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// One-shot and spawn-time work.
    Initialize,
    /// Input interpretation.
    Input,
    /// Game-state and mode transitions.
    StateTransition,
    /// Position and physics integration.
    Movement,
    /// Overlap tests and contact response.
    Collision,
    /// Particles and other visual effects.
    Effect,
    /// Draw submission.
    Render,
    /// After-draw bookkeeping.
    PostRender,
}

impl Category {
    /// All categories, in frame execution order.
    pub const ALL: [Category; Category::COUNT] = [
        Category::Initialize,
        Category::Input,
        Category::StateTransition,
        Category::Movement,
        Category::Collision,
        Category::Effect,
        Category::Render,
        Category::PostRender,
    ];

    /// Number of categories.
    pub const COUNT: usize = 8;

    /// The category's position in the frame order. Also its integer form
    /// in the persistence format.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The category at `index` in the frame order, or `None` when out of
    /// range (e.g. malformed persisted data).
    #[must_use]
    pub fn from_index(index: usize) -> Option<Category> {
        Category::ALL.get(index).copied()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Category::Initialize => "Initialize",
            Category::Input => "Input",
            Category::StateTransition => "StateTransition",
            Category::Movement => "Movement",
            Category::Collision => "Collision",
            Category::Effect => "Effect",
            Category::Render => "Render",
            Category::PostRender => "PostRender",
        };
        write!(f, "{name}")
    }
}
