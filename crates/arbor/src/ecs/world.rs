//! # World: The Entity Store
//!
//! The [`World`] owns every entity id and every component value. Nothing else
//! in the crate owns entities: the scene graph, the [`EntityRef`] facade and
//! collaborators such as renderers hold plain [`Entity`] handles and must
//! check [`World::is_alive`] before trusting one.
//!
//! ## Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │ World                                                │
//! │  allocator:  generational ids                        │
//! │  archetypes: HashMap<ArchetypeKey, Archetype>        │
//! │  locations:  entity index → (archetype key, row)     │
//! │  hooks:      TypeId → on_insert / on_remove          │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Component hooks
//!
//! A component type may register [`ComponentHooks`]. `on_insert` runs right
//! after a value of that type lands on an entity, `on_remove` right before it
//! leaves (explicit removal, replacement, or despawn). The scene graph uses
//! these to keep the [`Hierarchy`](super::hierarchy::Hierarchy) linked lists
//! consistent no matter which API touched the component. The insert hook of a
//! type can be switched off temporarily for bulk loading, see
//! [`World::set_insert_hook_enabled`].
//!
//! [`EntityRef`]: crate::EntityRef

use std::any::{Any, TypeId};
use std::collections::HashMap;

use super::archetype::{Archetype, ArchetypeKey, archetype_key};
use super::component::{BoxedComponent, component_type_id};
use super::entity::{Entity, EntityAllocator};
use super::query::QueryParam;

/// Signature of a component hook.
pub type HookFn = fn(&mut World, Entity);

/// Lifecycle callbacks for one component type.
#[derive(Clone, Copy, Default)]
pub struct ComponentHooks {
    pub on_insert: Option<HookFn>,
    pub on_remove: Option<HookFn>,
}

struct HookEntry {
    hooks: ComponentHooks,
    insert_enabled: bool,
}

#[derive(Clone)]
struct EntityLocation {
    key: ArchetypeKey,
    row: usize,
}

/// Central container for entities and their components.
pub struct World {
    allocator: EntityAllocator,
    archetypes: HashMap<ArchetypeKey, Archetype>,
    locations: HashMap<u32, EntityLocation>,
    hooks: HashMap<TypeId, HookEntry>,
}

impl World {
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::new(),
            archetypes: HashMap::new(),
            locations: HashMap::new(),
            hooks: HashMap::new(),
        }
    }

    // ── Hooks ────────────────────────────────────────────────────────

    /// Register lifecycle hooks for component type `T`, replacing any hooks
    /// registered before. The insert hook starts out enabled.
    pub fn register_hooks<T: 'static + Send + Sync>(&mut self, hooks: ComponentHooks) {
        self.hooks.insert(
            TypeId::of::<T>(),
            HookEntry {
                hooks,
                insert_enabled: true,
            },
        );
    }

    /// Enable or disable the `on_insert` hook of `T`. Returns the previous
    /// setting. Remove hooks always run.
    pub fn set_insert_hook_enabled<T: 'static>(&mut self, enabled: bool) -> bool {
        match self.hooks.get_mut(&TypeId::of::<T>()) {
            Some(entry) => std::mem::replace(&mut entry.insert_enabled, enabled),
            None => false,
        }
    }

    /// Whether inserting a `T` currently fires its `on_insert` hook.
    pub fn insert_hook_enabled<T: 'static>(&self) -> bool {
        self.hooks
            .get(&TypeId::of::<T>())
            .is_some_and(|entry| entry.insert_enabled && entry.hooks.on_insert.is_some())
    }

    fn run_insert_hook(&mut self, type_id: TypeId, entity: Entity) {
        let hook = self
            .hooks
            .get(&type_id)
            .filter(|entry| entry.insert_enabled)
            .and_then(|entry| entry.hooks.on_insert);
        if let Some(hook) = hook {
            hook(self, entity);
        }
    }

    fn run_remove_hook(&mut self, type_id: TypeId, entity: Entity) {
        if let Some(hook) = self.hooks.get(&type_id).and_then(|entry| entry.hooks.on_remove) {
            hook(self, entity);
        }
    }

    // ── Entity Management ────────────────────────────────────────────

    /// Number of alive entities.
    pub fn entity_count(&self) -> usize {
        self.allocator.alive_count()
    }

    /// Number of archetype tables, including empty ones.
    pub fn archetype_count(&self) -> usize {
        self.archetypes.len()
    }

    /// O(1) liveness check. This is the guard every stored handle goes
    /// through before it is dereferenced.
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.allocator.is_alive(entity)
    }

    /// Snapshot of every alive entity, ordered by slot index.
    ///
    /// The returned list is detached from the world: it stays valid to
    /// iterate while entities are despawned, at which point the stale ones
    /// simply fail [`is_alive`](Self::is_alive).
    pub fn entities(&self) -> Vec<Entity> {
        let mut all: Vec<Entity> = self
            .archetypes
            .values()
            .flat_map(|arch| arch.entities.iter().copied())
            .collect();
        all.sort_by_key(|e| e.index);
        all
    }

    /// Every alive entity that has a `T`, ordered by slot index.
    pub fn entities_with<T: 'static + Send + Sync>(&self) -> Vec<Entity> {
        let type_id = TypeId::of::<T>();
        let mut result: Vec<Entity> = self
            .archetypes
            .values()
            .filter(|arch| arch.has_component(&type_id))
            .flat_map(|arch| arch.entities.iter().copied())
            .collect();
        result.sort_by_key(|e| e.index);
        result
    }

    /// Visit every alive entity together with its component types.
    pub fn for_each_entity(&self, mut f: impl FnMut(Entity, &[TypeId])) {
        for (key, arch) in &self.archetypes {
            for &entity in &arch.entities {
                f(entity, key);
            }
        }
    }

    /// Component types currently attached to `entity` (empty if dead).
    pub fn component_types(&self, entity: Entity) -> Vec<TypeId> {
        self.location(entity)
            .map(|loc| loc.key.clone())
            .unwrap_or_default()
    }

    fn location(&self, entity: Entity) -> Option<&EntityLocation> {
        if !self.allocator.is_alive(entity) {
            return None;
        }
        self.locations.get(&entity.index)
    }

    // ── Spawn / Despawn ──────────────────────────────────────────────

    /// Create an entity with no components.
    pub fn spawn_empty(&mut self) -> Entity {
        let entity = self.allocator.allocate();
        let key = archetype_key(Vec::new());
        self.place(entity, key, HashMap::new());
        entity
    }

    /// Create an entity from a tuple of components.
    ///
    /// ```ignore
    /// let e = world.spawn((Transform::from_xyz(1.0, 0.0, 0.0), Name::new("crate")));
    /// ```
    pub fn spawn<B: Bundle>(&mut self, bundle: B) -> Entity {
        let entity = self.allocator.allocate();
        let values: HashMap<TypeId, BoxedComponent> = bundle.into_components().into_iter().collect();
        let types: Vec<TypeId> = values.keys().copied().collect();
        self.place(entity, archetype_key(types.clone()), values);
        for type_id in types {
            self.run_insert_hook(type_id, entity);
        }
        entity
    }

    /// Create an entity with a single component.
    pub fn spawn_one<T: 'static + Send + Sync>(&mut self, component: T) -> Entity {
        self.spawn((component,))
    }

    /// Destroy `entity` and drop all its components. Remove hooks run first,
    /// while the entity is still alive.
    ///
    /// Returns `false` (and does nothing) for a dead or stale handle, which
    /// makes repeated destruction during recursive teardown harmless.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        let Some(loc) = self.location(entity) else {
            return false;
        };
        for type_id in loc.key.clone() {
            self.run_remove_hook(type_id, entity);
        }

        if let Some(loc) = self.locations.remove(&entity.index) {
            if let Some(arch) = self.archetypes.get_mut(&loc.key) {
                let (_dropped, moved) = arch.take_row(loc.row);
                if let Some(moved) = moved {
                    if let Some(moved_loc) = self.locations.get_mut(&moved.index) {
                        moved_loc.row = loc.row;
                    }
                }
            }
        }
        self.allocator.deallocate(entity)
    }

    /// Drop every entity and component at once. Hooks do not run: nothing
    /// survives that could hold a dangling link. Registered hooks are kept.
    pub fn clear(&mut self) {
        self.archetypes.clear();
        self.locations.clear();
        self.allocator.reset();
    }

    // ── Per-Entity Component Access ──────────────────────────────────

    /// Shared access to `T` on `entity`; `None` if dead or absent.
    pub fn get<T: 'static + Send + Sync>(&self, entity: Entity) -> Option<&T> {
        let loc = self.location(entity)?;
        let col = self.archetypes.get(&loc.key)?.columns.get(&TypeId::of::<T>())?;
        Some(col.get::<T>(loc.row))
    }

    /// Exclusive access to `T` on `entity`; `None` if dead or absent.
    pub fn get_mut<T: 'static + Send + Sync>(&mut self, entity: Entity) -> Option<&mut T> {
        let loc = self.location(entity)?.clone();
        let col = self
            .archetypes
            .get_mut(&loc.key)?
            .columns
            .get_mut(&TypeId::of::<T>())?;
        Some(col.get_mut::<T>(loc.row))
    }

    pub fn has<T: 'static + Send + Sync>(&self, entity: Entity) -> bool {
        self.location(entity)
            .is_some_and(|loc| loc.key.contains(&TypeId::of::<T>()))
    }

    /// Type-erased read, used by the component registry for serialisation
    /// and duplication.
    pub fn get_any(&self, entity: Entity, type_id: TypeId) -> Option<&dyn Any> {
        let loc = self.location(entity)?;
        let col = self.archetypes.get(&loc.key)?.columns.get(&type_id)?;
        Some(col.get_any(loc.row))
    }

    // ── Add / Remove ─────────────────────────────────────────────────

    /// Attach `component` to `entity`, replacing an existing `T`.
    ///
    /// Replacing runs the remove hook for the old value and the insert hook
    /// for the new one. Returns `None` if the entity is dead.
    pub fn insert<T: 'static + Send + Sync>(&mut self, entity: Entity, component: T) -> Option<&mut T> {
        if !self.insert_boxed(entity, component_type_id::<T>(), Box::new(component)) {
            return None;
        }
        self.get_mut::<T>(entity)
    }

    /// Return the existing `T` on `entity`, or attach `T::default()` first.
    pub fn get_or_insert_default<T: 'static + Send + Sync + Default>(
        &mut self,
        entity: Entity,
    ) -> Option<&mut T> {
        if !self.is_alive(entity) {
            return None;
        }
        if !self.has::<T>(entity) {
            self.insert(entity, T::default());
        }
        self.get_mut::<T>(entity)
    }

    /// Type-erased insert. `boxed` must hold a value whose `TypeId` is
    /// `type_id`. Returns `false` if the entity is dead.
    pub(crate) fn insert_boxed(&mut self, entity: Entity, type_id: TypeId, boxed: BoxedComponent) -> bool {
        let Some(loc) = self.location(entity).cloned() else {
            log::warn!("insert on dead entity {entity:?} ignored");
            return false;
        };

        if loc.key.contains(&type_id) {
            self.run_remove_hook(type_id, entity);
            // The hook may have moved the entity; look it up again.
            let Some(loc) = self.location(entity).cloned() else {
                return false;
            };
            if let Some(col) = self
                .archetypes
                .get_mut(&loc.key)
                .and_then(|arch| arch.columns.get_mut(&type_id))
            {
                col.replace(loc.row, boxed);
            }
        } else {
            let mut types = loc.key.clone();
            types.push(type_id);
            self.relocate(entity, archetype_key(types), move |values| {
                values.insert(type_id, boxed);
            });
        }

        self.run_insert_hook(type_id, entity);
        true
    }

    /// Detach `T` from `entity`. Returns `false` if the entity is dead or
    /// has no `T`.
    pub fn remove<T: 'static + Send + Sync>(&mut self, entity: Entity) -> bool {
        self.take::<T>(entity).is_some()
    }

    /// Detach `T` from `entity` and hand the value back.
    pub fn take<T: 'static + Send + Sync>(&mut self, entity: Entity) -> Option<T> {
        let type_id = TypeId::of::<T>();
        if !self.has::<T>(entity) {
            return None;
        }
        self.run_remove_hook(type_id, entity);
        let loc = self.location(entity)?.clone();

        let new_key: ArchetypeKey = loc.key.iter().copied().filter(|&t| t != type_id).collect();
        let mut taken = None;
        self.relocate(entity, new_key, |values| {
            taken = values.remove(&type_id);
        });
        taken.and_then(|boxed| boxed.downcast::<T>().ok()).map(|b| *b)
    }

    /// Move `entity` from its current table into the table for `new_key`.
    /// `edit` adjusts the row's values in between.
    fn relocate(
        &mut self,
        entity: Entity,
        new_key: ArchetypeKey,
        edit: impl FnOnce(&mut HashMap<TypeId, BoxedComponent>),
    ) {
        let Some(loc) = self.locations.remove(&entity.index) else {
            return;
        };
        let mut values = HashMap::new();
        if let Some(arch) = self.archetypes.get_mut(&loc.key) {
            let (taken, moved) = arch.take_row(loc.row);
            values = taken;
            if let Some(moved) = moved {
                if let Some(moved_loc) = self.locations.get_mut(&moved.index) {
                    moved_loc.row = loc.row;
                }
            }
        }
        edit(&mut values);
        self.place(entity, new_key, values);
    }

    fn place(&mut self, entity: Entity, key: ArchetypeKey, values: HashMap<TypeId, BoxedComponent>) {
        let arch = self
            .archetypes
            .entry(key.clone())
            .or_insert_with(|| Archetype::for_key(&key));
        let row = arch.push_row(entity, values);
        self.locations.insert(entity.index, EntityLocation { key, row });
    }

    // ── Query ────────────────────────────────────────────────────────

    /// Visit every entity that has all components in `Q`.
    ///
    /// ```ignore
    /// world.query::<(&mut Transform, &Spin)>(|_, (transform, spin)| {
    ///     transform.rotation *= Quat::from_rotation_z(spin.0);
    /// });
    /// ```
    pub fn query<Q: QueryParam>(&mut self, f: impl FnMut(Entity, Q::Item<'_>)) {
        self.query_matching::<Q>(Q::required(), f);
    }

    /// Like [`query`](Self::query), restricted to entities that also carry
    /// the marker component `F`.
    pub fn query_filtered<Q: QueryParam, F: 'static + Send + Sync>(
        &mut self,
        f: impl FnMut(Entity, Q::Item<'_>),
    ) {
        let mut required = Q::required();
        required.push(TypeId::of::<F>());
        self.query_matching::<Q>(required, f);
    }

    fn query_matching<Q: QueryParam>(
        &mut self,
        required: Vec<TypeId>,
        mut f: impl FnMut(Entity, Q::Item<'_>),
    ) {
        for arch in self.archetypes.values_mut() {
            if arch.len() == 0 || !required.iter().all(|t| arch.has_component(t)) {
                continue;
            }
            let mut cols = Q::lift(&mut arch.columns);
            for (row, &entity) in arch.entities.iter().enumerate() {
                f(entity, Q::row(&mut cols, row));
            }
            Q::put_back(cols, &mut arch.columns);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

// ── Bundles ──────────────────────────────────────────────────────────────

/// A tuple of components that can be spawned together.
pub trait Bundle: 'static {
    fn into_components(self) -> Vec<(TypeId, Box<dyn Any + Send + Sync>)>;
}

macro_rules! impl_bundle {
    ($($T:ident),+) => {
        impl<$($T: 'static + Send + Sync),+> Bundle for ($($T,)+) {
            #[allow(non_snake_case)]
            fn into_components(self) -> Vec<(TypeId, Box<dyn Any + Send + Sync>)> {
                let ($($T,)+) = self;
                vec![$((component_type_id::<$T>(), Box::new($T) as Box<dyn Any + Send + Sync>)),+]
            }
        }
    };
}

impl_bundle!(A);
impl_bundle!(A, B);
impl_bundle!(A, B, C);
impl_bundle!(A, B, C, D);
impl_bundle!(A, B, C, D, E);
impl_bundle!(A, B, C, D, E, F);
impl_bundle!(A, B, C, D, E, F, G);
impl_bundle!(A, B, C, D, E, F, G, H);
