//! System runner — ownership, ordering, and per-frame execution of systems.
//!
//! The runner owns every registered system instance, keyed by type name.
//! Each category keeps an execution list sorted by ascending priority,
//! with registration order breaking ties (stable). Execution is gated
//! twice: a per-category activity flag and a per-system activity flag.
//!
//! Per system, each pass first purges membership handles whose entity is
//! no longer alive, then invokes the per-entity hook for every remaining
//! handle in membership insertion order. Nothing here is parallel — a
//! system runs to completion before the next begins.

use std::collections::HashMap;

use ember_entity::EntityHandle;
use tracing::{debug, error, info, warn};

use crate::category::Category;
use crate::registry;
use crate::system::{FrameContext, System};

struct SystemEntry {
    system: Box<dyn System>,
    category: Category,
    priority: i32,
    active: bool,
    seq: u64,
    entities: Vec<EntityHandle>,
}

/// Owns and schedules all systems for one scene.
///
/// Referencing an unregistered system type by name is recoverable: the
/// operation logs and returns a sentinel. The per-entity update hook is
/// not guarded — see [`System`].
pub struct SystemRunner {
    entries: HashMap<String, SystemEntry>,
    order: [Vec<String>; Category::COUNT],
    category_active: [bool; Category::COUNT],
    next_seq: u64,
}

impl SystemRunner {
    /// Create an empty runner with every category active.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: std::array::from_fn(|_| Vec::new()),
            category_active: [true; Category::COUNT],
            next_seq: 0,
        }
    }

    /// Construct and register a system from the process-wide factory
    /// registry.
    ///
    /// The system's initialization hook runs before it becomes reachable.
    /// Unknown type keys and duplicate registrations are logged no-ops.
    pub fn register(&mut self, type_key: &str, priority: i32, activate: bool) -> bool {
        if self.entries.contains_key(type_key) {
            warn!(type_key, "system already registered");
            return false;
        }
        let Some(system) = registry::create_system(type_key) else {
            error!(type_key, "no factory registered for system type");
            return false;
        };
        self.insert_entry(system, priority, activate)
    }

    /// Register an already constructed system instance.
    ///
    /// Used by scene builders and tests that need a system carrying
    /// captured state.
    pub fn register_boxed(&mut self, system: Box<dyn System>, priority: i32, activate: bool) -> bool {
        if self.entries.contains_key(system.type_key()) {
            warn!(type_key = system.type_key(), "system already registered");
            return false;
        }
        self.insert_entry(system, priority, activate)
    }

    fn insert_entry(&mut self, mut system: Box<dyn System>, priority: i32, active: bool) -> bool {
        system.initialize();
        let key = system.type_key().to_string();
        let category = system.category();
        let seq = self.next_seq;
        self.next_seq += 1;

        self.entries.insert(
            key.clone(),
            SystemEntry {
                system,
                category,
                priority,
                active,
                seq,
                entities: Vec::new(),
            },
        );
        self.order[category.index()].push(key.clone());
        self.resort_category(category.index());
        info!(type_key = key, %category, priority, active, "system registered");
        true
    }

    /// Unregister a system, running its finalize hook. Its entity
    /// membership is discarded with it.
    pub fn unregister(&mut self, type_key: &str) -> bool {
        let Some(mut entry) = self.entries.remove(type_key) else {
            warn!(type_key, "unregister of unknown system");
            return false;
        };
        entry.system.finalize();
        self.order[entry.category.index()].retain(|key| key != type_key);
        info!(type_key, "system unregistered");
        true
    }

    /// Resume executing a system. Membership and ordering are unaffected
    /// by activity toggles.
    pub fn activate(&mut self, type_key: &str) -> bool {
        self.set_active(type_key, true)
    }

    /// Stop executing a system without destroying it.
    pub fn deactivate(&mut self, type_key: &str) -> bool {
        self.set_active(type_key, false)
    }

    fn set_active(&mut self, type_key: &str, active: bool) -> bool {
        match self.entries.get_mut(type_key) {
            Some(entry) => {
                entry.active = active;
                true
            }
            None => {
                warn!(type_key, active, "activity toggle on unknown system");
                false
            }
        }
    }

    /// Whether a system is currently active. `None` for unknown types.
    #[must_use]
    pub fn is_active(&self, type_key: &str) -> Option<bool> {
        self.entries.get(type_key).map(|entry| entry.active)
    }

    /// A system's priority. `None` for unknown types.
    #[must_use]
    pub fn priority(&self, type_key: &str) -> Option<i32> {
        self.entries.get(type_key).map(|entry| entry.priority)
    }

    /// Re-prioritise a system within its category. Ties keep registration
    /// order.
    pub fn set_priority(&mut self, type_key: &str, priority: i32) -> bool {
        let Some(entry) = self.entries.get_mut(type_key) else {
            warn!(type_key, "set_priority on unknown system");
            return false;
        };
        entry.priority = priority;
        let index = entry.category.index();
        self.resort_category(index);
        true
    }

    /// Gate or ungate an entire category.
    pub fn set_category_active(&mut self, category: Category, active: bool) {
        self.category_active[category.index()] = active;
    }

    /// Whether a category currently executes.
    #[must_use]
    pub fn category_active(&self, category: Category) -> bool {
        self.category_active[category.index()]
    }

    /// Add an entity to a system's membership list. Duplicate
    /// registrations are membership-checked no-ops.
    pub fn register_entity(&mut self, type_key: &str, entity: EntityHandle) -> bool {
        let Some(entry) = self.entries.get_mut(type_key) else {
            warn!(type_key, %entity, "register_entity on unknown system");
            return false;
        };
        if !entry.entities.contains(&entity) {
            entry.entities.push(entity);
        }
        true
    }

    /// Remove an entity from a system's membership list.
    pub fn remove_entity(&mut self, type_key: &str, entity: EntityHandle) -> bool {
        let Some(entry) = self.entries.get_mut(type_key) else {
            warn!(type_key, %entity, "remove_entity on unknown system");
            return false;
        };
        entry.entities.retain(|&h| h != entity);
        true
    }

    /// Strip an entity from every system's membership list. Called when
    /// the entity is destroyed.
    pub fn remove_entity_everywhere(&mut self, entity: EntityHandle) {
        for entry in self.entries.values_mut() {
            entry.entities.retain(|&h| h != entity);
        }
    }

    /// A system's membership list, in insertion order.
    #[must_use]
    pub fn entities_of(&self, type_key: &str) -> Option<&[EntityHandle]> {
        self.entries
            .get(type_key)
            .map(|entry| entry.entities.as_slice())
    }

    /// Every system holding `entity` in its membership list, in execution
    /// order. Used by the persistence layer.
    #[must_use]
    pub fn systems_with_entity(&self, entity: EntityHandle) -> Vec<(Category, &str)> {
        let mut found = Vec::new();
        for category in Category::ALL {
            for key in &self.order[category.index()] {
                if let Some(entry) = self.entries.get(key)
                    && entry.entities.contains(&entity)
                {
                    found.push((category, key.as_str()));
                }
            }
        }
        found
    }

    /// Type keys of all registered systems, in execution order.
    #[must_use]
    pub fn registered_systems(&self) -> Vec<(Category, &str)> {
        let mut found = Vec::new();
        for category in Category::ALL {
            for key in &self.order[category.index()] {
                found.push((category, key.as_str()));
            }
        }
        found
    }

    /// Number of registered systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no systems are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run one category pass.
    ///
    /// Skipped entirely when the category flag is off. Per system (in
    /// priority order): skip if inactive, purge membership handles whose
    /// entity has died, then invoke the per-entity hook for every
    /// remaining handle in membership insertion order.
    pub fn update_category(&mut self, category: Category, ctx: &mut FrameContext<'_>) {
        let index = category.index();
        if !self.category_active[index] {
            debug!(%category, "category inactive, skipped");
            return;
        }

        let keys = self.order[index].clone();
        for key in keys {
            let Some(entry) = self.entries.get_mut(&key) else {
                continue;
            };
            if !entry.active {
                continue;
            }

            // Entities that died since the previous pass drop out here,
            // before any hook runs.
            entry.entities.retain(|&h| ctx.entities.is_alive(h));

            let members = entry.entities.clone();
            for entity in members {
                entry.system.update_entity(ctx, entity);
            }
        }
    }

    fn resort_category(&mut self, index: usize) {
        let entries = &self.entries;
        // Stable sort; seq breaks priority ties by registration order.
        self.order[index].sort_by_key(|key| {
            entries
                .get(key)
                .map_or((i32::MAX, u64::MAX), |entry| (entry.priority, entry.seq))
        });
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SystemRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemRunner")
            .field("systems", &self.registered_systems())
            .finish()
    }
}
