//! # Scene Graph: Keeping the Forest Consistent
//!
//! The [`SceneGraph`] owns no entities. It plugs the [`Hierarchy`] lifecycle
//! hooks into a [`World`] and runs the per-frame pass that turns local
//! [`Transform`]s into world matrices.
//!
//! ## Update pass
//!
//! ```text
//! roots (no live parent)        world = local
//!   └─ child with Transform     world = parent.world * local
//!   └─ child of a node without
//!      a Transform              world = local
//! ```
//!
//! Nodes are visited depth-first, pre-order, in `first_child → next_sibling`
//! order, so a parent's world matrix is always final before any of its
//! children read it. The traversal keeps an explicit stack and a visit budget
//! of `entity_count` steps; sibling data that loops back on itself stops the
//! pass instead of hanging it.
//!
//! World matrices are only refreshed here. Between a reparent or a local edit
//! and the next `update`, readers see the previous frame's values.

use super::entity::Entity;
use super::hierarchy::{self, Hierarchy};
use super::world::World;
use crate::error::HierarchyError;
use crate::math::{Mat4, Transform};

#[derive(Debug, Default)]
pub struct SceneGraph {
    last_visited: usize,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the [`Hierarchy`] hooks on `world`.
    ///
    /// After this, inserting a `Hierarchy` that names a parent links the
    /// entity in as that parent's first child, and removing it (or despawning
    /// the entity) unlinks it and promotes its children to roots.
    pub fn init(&mut self, world: &mut World) {
        world.register_hooks::<Hierarchy>(hierarchy::hooks());
    }

    /// While disabled, an inserted `Hierarchy` is stored verbatim and not
    /// linked into its parent. Scene loading and duplication write complete
    /// link sets themselves and switch the hook off for the duration.
    pub fn disable_on_construct(&self, disable: bool, world: &mut World) {
        world.set_insert_hook_enabled::<Hierarchy>(!disable);
    }

    /// Read from the world's hook table, so a direct
    /// [`World::set_insert_hook_enabled`] is reflected here. A world the
    /// graph was never initialised on reports `true`.
    pub fn is_construct_disabled(&self, world: &World) -> bool {
        !world.insert_hook_enabled::<Hierarchy>()
    }

    /// Recompute the world matrix of every [`Transform`] in the forest.
    pub fn update(&mut self, world: &mut World) {
        let roots = hierarchy::roots(world);
        let mut budget = world.entity_count();
        let mut visited = 0;

        // (entity, world matrix of its parent if the parent has a Transform)
        let mut stack: Vec<(Entity, Option<Mat4>)> =
            roots.into_iter().rev().map(|root| (root, None)).collect();

        while let Some((entity, parent_world)) = stack.pop() {
            if budget == 0 {
                log::warn!("scene graph update stopped after {visited} visits; hierarchy links are cyclic");
                break;
            }
            budget -= 1;
            visited += 1;

            let own_world = world.get_mut::<Transform>(entity).map(|transform| {
                let local = transform.local_matrix();
                let matrix = match parent_world {
                    Some(parent) => parent * local,
                    None => local,
                };
                transform.set_world_matrix(matrix);
                matrix
            });

            for child in hierarchy::children(world, entity).into_iter().rev() {
                stack.push((child, own_world));
            }
        }

        self.last_visited = visited;
        log::trace!("scene graph update visited {visited} entities");
    }

    /// Number of entities visited by the most recent [`update`](Self::update).
    pub fn last_visited(&self) -> usize {
        self.last_visited
    }

    pub fn reparent(
        &self,
        world: &mut World,
        child: Entity,
        new_parent: Option<Entity>,
    ) -> Result<(), HierarchyError> {
        hierarchy::reparent(world, child, new_parent)
    }

    pub fn is_parent_of(&self, world: &World, ancestor: Entity, node: Entity) -> bool {
        hierarchy::is_parent_of(world, ancestor, node)
    }

    pub fn roots(&self, world: &World) -> Vec<Entity> {
        hierarchy::roots(world)
    }

    /// Every entity in the forest, parents before children, with depths.
    pub fn traverse(&self, world: &World) -> Vec<(Entity, usize)> {
        hierarchy::roots(world)
            .into_iter()
            .flat_map(|root| hierarchy::depth_first(world, root))
            .collect()
    }
}
