//! The [`Scene`] — exclusive owner of one ECS runtime.

use ember_component::{Component, ComponentRepository};
use ember_entity::{EntityHandle, EntityRepository};
use ember_system::{Category, FrameContext, System, SystemRunner};
use tracing::debug;

/// One scene's ECS runtime: entities, components, systems.
///
/// The scene is an explicit context object — there are no engine-wide
/// singletons. Collaborators (gameplay code, the editor, the renderer)
/// either use the façade methods here or reach the repositories directly
/// through the accessors; systems receive the repositories through their
/// [`FrameContext`] each pass.
#[derive(Debug)]
pub struct Scene {
    name: String,
    entities: EntityRepository,
    components: ComponentRepository,
    systems: SystemRunner,
    frame: u64,
}

impl Scene {
    /// Create an empty scene.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entities: EntityRepository::new(),
            components: ComponentRepository::new(),
            systems: SystemRunner::new(),
            frame: 0,
        }
    }

    /// The scene's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Frames completed so far.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// The entity repository.
    #[must_use]
    pub fn entities(&self) -> &EntityRepository {
        &self.entities
    }

    /// Mutable access to the entity repository.
    pub fn entities_mut(&mut self) -> &mut EntityRepository {
        &mut self.entities
    }

    /// The component repository.
    #[must_use]
    pub fn components(&self) -> &ComponentRepository {
        &self.components
    }

    /// Mutable access to the component repository.
    pub fn components_mut(&mut self) -> &mut ComponentRepository {
        &mut self.components
    }

    /// The system runner.
    #[must_use]
    pub fn systems(&self) -> &SystemRunner {
        &self.systems
    }

    /// Mutable access to the system runner.
    pub fn systems_mut(&mut self) -> &mut SystemRunner {
        &mut self.systems
    }

    // ── Entity façade ───────────────────────────────────────────────────

    /// Allocate a new entity.
    pub fn create_entity(&mut self, data_type: impl Into<String>, is_unique: bool) -> EntityHandle {
        self.entities.create(data_type, is_unique)
    }

    /// Queue an entity for destruction at the next frame boundary.
    ///
    /// The entity stays resolvable (and its components fetchable) for the
    /// rest of the current frame; the queue drains at the top of
    /// [`Scene::update`].
    pub fn destroy_entity(&mut self, handle: EntityHandle) -> bool {
        self.entities.mark_for_destroy(handle)
    }

    /// The single registered entity for a unique type tag, or the invalid
    /// handle.
    #[must_use]
    pub fn unique_entity(&self, data_type: &str) -> EntityHandle {
        self.entities.unique_handle(data_type)
    }

    // ── Component façade ────────────────────────────────────────────────

    /// Attach a component instance. Returns its index in the entity's
    /// per-type list.
    pub fn add_component<T: Component>(&mut self, owner: EntityHandle, value: T) -> usize {
        self.components.add(owner, value)
    }

    /// Attach a default-constructed component by type key.
    pub fn add_component_by_key(&mut self, type_key: &str, owner: EntityHandle) -> Option<usize> {
        self.components.add_default(type_key, owner)
    }

    /// The instance at `index` of the entity's per-type list.
    #[must_use]
    pub fn component<T: Component>(&self, owner: EntityHandle, index: usize) -> Option<&T> {
        self.components.get(owner, index)
    }

    /// All instances of `T` attached to the entity, in insertion order.
    #[must_use]
    pub fn components_of<T: Component>(&self, owner: EntityHandle) -> &[T] {
        self.components.get_all(owner)
    }

    /// Remove one component instance by index.
    pub fn remove_component(&mut self, type_key: &str, owner: EntityHandle, index: usize) -> bool {
        self.components.remove(type_key, owner, index)
    }

    // ── System façade ───────────────────────────────────────────────────

    /// Register a system from the process-wide factory registry.
    pub fn register_system(&mut self, type_key: &str, priority: i32, activate: bool) -> bool {
        self.systems.register(type_key, priority, activate)
    }

    /// Register an already constructed system instance.
    pub fn register_system_boxed(
        &mut self,
        system: Box<dyn System>,
        priority: i32,
        activate: bool,
    ) -> bool {
        self.systems.register_boxed(system, priority, activate)
    }

    /// Unregister a system, running its finalize hook.
    pub fn unregister_system(&mut self, type_key: &str) -> bool {
        self.systems.unregister(type_key)
    }

    /// Add an entity to a system's membership list.
    pub fn register_entity_with_system(&mut self, type_key: &str, entity: EntityHandle) -> bool {
        self.systems.register_entity(type_key, entity)
    }

    /// Remove an entity from a system's membership list.
    pub fn remove_entity_from_system(&mut self, type_key: &str, entity: EntityHandle) -> bool {
        self.systems.remove_entity(type_key, entity)
    }

    // ── Frame update ────────────────────────────────────────────────────

    /// Advance the scene by one frame.
    ///
    /// The deferred-deletion queue is drained exactly once, here, before
    /// any category runs: components are removed first, then system
    /// membership, then the entity slot itself. Deletions queued while
    /// the frame is in flight — including by an Effect-category system
    /// running between Movement and Render — are NOT re-drained before
    /// Render: Render observes pre-deletion state, and the doomed entity
    /// stays resolvable (reporting
    /// [`pending destroy`](EntityRepository::is_pending_destroy)) until
    /// the next frame's drain.
    ///
    /// Categories then run in [`Category::ALL`] order, each system to
    /// completion before the next.
    pub fn update(&mut self, dt: f32) {
        self.frame += 1;
        debug!(scene = self.name, frame = self.frame, dt, "frame start");

        let pending = self.entities.take_pending();
        for handle in pending {
            self.components.delete_entity(handle);
            self.systems.remove_entity_everywhere(handle);
            self.entities.remove(handle);
        }

        for category in Category::ALL {
            self.update_category(category, dt);
        }
    }

    /// Run a single category pass outside the full frame sweep.
    pub fn update_category(&mut self, category: Category, dt: f32) {
        let mut ctx = FrameContext::new(&mut self.entities, &mut self.components, dt, self.frame);
        self.systems.update_category(category, &mut ctx);
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new("scene")
    }
}
