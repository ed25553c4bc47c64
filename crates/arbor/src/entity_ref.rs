//! # EntityRef: One Entity, Borrowed Mutably
//!
//! [`EntityRef`] pairs an [`Entity`] with `&mut World` so callers can write
//! `scene.entity_mut(e)?.set_parent(p)?` instead of threading the world
//! through free functions. It holds no state of its own: two facades are
//! equal when their ids are, and a facade over an entity that dies
//! underneath it turns every accessor into a no-op.

use crate::components::{Active, Name};
use crate::ecs::hierarchy;
use crate::ecs::{Entity, World};
use crate::error::HierarchyError;
use crate::math::{Mat4, Transform};

pub struct EntityRef<'w> {
    world: &'w mut World,
    entity: Entity,
}

impl World {
    /// Facade over `entity`; `None` if it is dead.
    pub fn entity_mut(&mut self, entity: Entity) -> Option<EntityRef<'_>> {
        if !self.is_alive(entity) {
            return None;
        }
        Some(EntityRef {
            world: self,
            entity,
        })
    }
}

impl<'w> EntityRef<'w> {
    pub fn id(&self) -> Entity {
        self.entity
    }

    pub fn is_valid(&self) -> bool {
        self.world.is_alive(self.entity)
    }

    pub fn world(&self) -> &World {
        &*self.world
    }

    // ── Components ───────────────────────────────────────────────────

    pub fn get<T: 'static + Send + Sync>(&self) -> Option<&T> {
        self.world.get::<T>(self.entity)
    }

    pub fn get_mut<T: 'static + Send + Sync>(&mut self) -> Option<&mut T> {
        self.world.get_mut::<T>(self.entity)
    }

    pub fn has<T: 'static + Send + Sync>(&self) -> bool {
        self.world.has::<T>(self.entity)
    }

    pub fn insert<T: 'static + Send + Sync>(&mut self, component: T) -> Option<&mut T> {
        self.world.insert(self.entity, component)
    }

    pub fn remove<T: 'static + Send + Sync>(&mut self) -> bool {
        self.world.remove::<T>(self.entity)
    }

    pub fn get_or_insert_default<T: 'static + Send + Sync + Default>(&mut self) -> Option<&mut T> {
        self.world.get_or_insert_default::<T>(self.entity)
    }

    // ── Hierarchy ────────────────────────────────────────────────────

    pub fn parent(&self) -> Option<Entity> {
        hierarchy::parent(self.world, self.entity).filter(|&p| self.world.is_alive(p))
    }

    pub fn children(&self) -> Vec<Entity> {
        hierarchy::children(self.world, self.entity)
    }

    pub fn child_count(&self) -> usize {
        hierarchy::child_count(self.world, self.entity)
    }

    /// Move this entity under `parent`. See [`hierarchy::reparent`].
    pub fn set_parent(&mut self, parent: Entity) -> Result<(), HierarchyError> {
        hierarchy::reparent(self.world, self.entity, Some(parent))
    }

    /// Make this entity a root.
    pub fn clear_parent(&mut self) -> Result<(), HierarchyError> {
        hierarchy::reparent(self.world, self.entity, None)
    }

    /// Detach all children, leaving them as roots. Returns how many there were.
    pub fn clear_children(&mut self) -> usize {
        hierarchy::detach_children(self.world, self.entity)
    }

    /// Whether this entity is an ancestor of `node`.
    pub fn is_parent_of(&self, node: Entity) -> bool {
        hierarchy::is_parent_of(self.world, self.entity, node)
    }

    // ── Convenience ──────────────────────────────────────────────────

    /// Active when neither this entity nor any ancestor is switched off.
    /// Entities without an [`Active`] component count as active.
    pub fn is_active(&self) -> bool {
        if !self.is_valid() {
            return false;
        }
        let own = self.world.get::<Active>(self.entity).is_none_or(|a| a.0);
        own && hierarchy::ancestors(self.world, self.entity)
            .into_iter()
            .all(|e| self.world.get::<Active>(e).is_none_or(|a| a.0))
    }

    pub fn set_active(&mut self, active: bool) {
        self.world.insert(self.entity, Active(active));
    }

    pub fn name(&self) -> Option<&str> {
        self.world.get::<Name>(self.entity).map(Name::as_str)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.world.insert(self.entity, Name::new(name));
    }

    /// World matrix from the last scene graph update, identity without a
    /// [`Transform`].
    pub fn world_matrix(&self) -> Mat4 {
        self.world
            .get::<Transform>(self.entity)
            .map_or(Mat4::IDENTITY, Transform::world_matrix)
    }
}

impl PartialEq for EntityRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.entity == other.entity
    }
}

impl std::fmt::Debug for EntityRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRef")
            .field("entity", &self.entity)
            .field("alive", &self.is_valid())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::SceneGraph;

    fn world() -> World {
        let mut world = World::new();
        SceneGraph::new().init(&mut world);
        world
    }

    #[test]
    fn dead_entity_has_no_facade() {
        let mut w = world();
        let e = w.spawn_empty();
        w.despawn(e);
        assert!(w.entity_mut(e).is_none());
    }

    #[test]
    fn set_parent_and_children() {
        let mut w = world();
        let p = w.spawn_empty();
        let a = w.spawn_empty();
        let b = w.spawn_empty();
        w.entity_mut(a).unwrap().set_parent(p).unwrap();
        w.entity_mut(b).unwrap().set_parent(p).unwrap();

        let parent = w.entity_mut(p).unwrap();
        assert_eq!(parent.children(), vec![b, a]);
        assert_eq!(parent.child_count(), 2);
        assert!(parent.is_parent_of(a));

        assert_eq!(w.entity_mut(a).unwrap().parent(), Some(p));
        assert_eq!(
            w.entity_mut(p).unwrap().set_parent(a),
            Err(HierarchyError::CycleDetected { child: p, new_parent: a })
        );
    }

    #[test]
    fn clear_parent_and_children() {
        let mut w = world();
        let p = w.spawn_empty();
        let a = w.spawn_empty();
        w.entity_mut(a).unwrap().set_parent(p).unwrap();
        w.entity_mut(a).unwrap().clear_parent().unwrap();
        assert_eq!(w.entity_mut(a).unwrap().parent(), None);

        w.entity_mut(a).unwrap().set_parent(p).unwrap();
        assert_eq!(w.entity_mut(p).unwrap().clear_children(), 1);
        assert!(w.entity_mut(p).unwrap().children().is_empty());
    }

    #[test]
    fn inactive_ancestor_deactivates_descendants() {
        let mut w = world();
        let p = w.spawn_empty();
        let c = w.spawn_empty();
        w.entity_mut(c).unwrap().set_parent(p).unwrap();
        assert!(w.entity_mut(c).unwrap().is_active());

        w.entity_mut(p).unwrap().set_active(false);
        assert!(!w.entity_mut(c).unwrap().is_active());
        assert!(!w.entity_mut(p).unwrap().is_active());
    }

    #[test]
    fn name_round_trip() {
        let mut w = world();
        let e = w.spawn_empty();
        let mut facade = w.entity_mut(e).unwrap();
        assert_eq!(facade.name(), None);
        facade.set_name("lamp");
        assert_eq!(facade.name(), Some("lamp"));
        assert_eq!(facade.world_matrix(), Mat4::IDENTITY);
    }
}
