//! The [`System`] trait and the per-pass [`FrameContext`].

use ember_component::ComponentRepository;
use ember_entity::{EntityHandle, EntityRepository};

use crate::category::Category;

/// Everything a system may touch during one category pass.
///
/// The context split-borrows the scene's repositories for the duration of
/// the pass; systems route all entity and component access through it and
/// never hold resolved references across calls.
#[derive(Debug)]
pub struct FrameContext<'a> {
    /// Entity identity and liveness.
    pub entities: &'a mut EntityRepository,
    /// Component storage.
    pub components: &'a mut ComponentRepository,
    /// Seconds since the previous frame.
    pub dt: f32,
    /// Monotonically increasing frame counter.
    pub frame: u64,
}

impl<'a> FrameContext<'a> {
    /// Borrow the repositories for one pass.
    #[must_use]
    pub fn new(
        entities: &'a mut EntityRepository,
        components: &'a mut ComponentRepository,
        dt: f32,
        frame: u64,
    ) -> Self {
        Self {
            entities,
            components,
            dt,
            frame,
        }
    }
}

/// A stateless-between-frames processing unit.
///
/// Systems do not own entities or components; they hold only an explicit
/// membership list of entity handles, managed by the
/// [`SystemRunner`](crate::SystemRunner). Entities opt in — a system never
/// implicitly claims all entities of a matching shape.
///
/// The runner does not guard [`System::update_entity`]: a missing
/// component is an expected condition, so fetch it as an `Option` and skip
/// the entity rather than assume presence.
pub trait System: Send {
    /// The stable string key this system type is registered under.
    fn type_key(&self) -> &'static str;

    /// The execution category. Fixed at construction.
    fn category(&self) -> Category;

    /// Called once when the system is registered with a runner.
    fn initialize(&mut self) {}

    /// Called when the system is unregistered.
    fn finalize(&mut self) {}

    /// Process one member entity. Invoked once per live member per frame,
    /// in membership insertion order.
    fn update_entity(&mut self, ctx: &mut FrameContext<'_>, entity: EntityHandle);
}
