//! # Entity Hierarchies: Intrusive Parent/Child Links
//!
//! Every entity that takes part in a hierarchy carries one [`Hierarchy`]
//! component holding four optional links:
//!
//! ```text
//!            R
//!            │ first_child
//!            ▼
//!            C ──next──▶ B ──next──▶ A
//!              ◀──prev──   ◀──prev──
//!   (parent of A, B and C is R)
//! ```
//!
//! Children form a doubly linked sibling list, so unlinking is O(1) and a
//! parent stores no per-child allocation. New children are prepended: the
//! child attached last is visited first.
//!
//! All mutation goes through the functions in this module. They keep three
//! invariants:
//!
//! - `parent(c) == p` exactly when `c` is reachable from `first_child(p)`
//!   along `next_sibling`;
//! - `next_sibling(a) == b` exactly when `prev_sibling(b) == a`;
//! - no entity is its own ancestor.
//!
//! The last one is checked when [`reparent`] is called. It is not
//! re-validated continuously, which is why every walk in this module carries a
//! step budget of `entity_count` to survive corrupted data loaded from disk.
//!
//! ## Usage
//!
//! ```ignore
//! let sun = world.spawn((Transform::default(),));
//! let earth = world.spawn((Transform::from_xyz(10.0, 0.0, 0.0),));
//! hierarchy::reparent(&mut world, earth, Some(sun))?;
//! assert_eq!(hierarchy::children(&world, sun), vec![earth]);
//! ```

use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::world::{ComponentHooks, World};
use crate::error::HierarchyError;

/// Links of one entity into the forest. Read through the accessors; change
/// through [`reparent`] and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Hierarchy {
    #[serde(default)]
    parent: Option<Entity>,
    #[serde(default)]
    first_child: Option<Entity>,
    #[serde(default)]
    next_sibling: Option<Entity>,
    #[serde(default)]
    prev_sibling: Option<Entity>,
}

impl Hierarchy {
    /// A component that asks to be attached under `parent` when inserted.
    ///
    /// Inserting a `Hierarchy` while the scene graph's construct hook is
    /// enabled honours only its parent; the sibling and child links are
    /// rebuilt by the hook.
    pub fn with_parent(parent: Entity) -> Self {
        Self {
            parent: Some(parent),
            ..Self::default()
        }
    }

    /// Raw links, stored exactly as given. Only meaningful while the construct
    /// hook is disabled (scene loading).
    pub(crate) fn from_links(
        parent: Option<Entity>,
        first_child: Option<Entity>,
        next_sibling: Option<Entity>,
        prev_sibling: Option<Entity>,
    ) -> Self {
        Self {
            parent,
            first_child,
            next_sibling,
            prev_sibling,
        }
    }

    pub fn parent(&self) -> Option<Entity> {
        self.parent
    }

    pub fn first_child(&self) -> Option<Entity> {
        self.first_child
    }

    pub fn next_sibling(&self) -> Option<Entity> {
        self.next_sibling
    }

    pub fn prev_sibling(&self) -> Option<Entity> {
        self.prev_sibling
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn has_children(&self) -> bool {
        self.first_child.is_some()
    }
}

// ── Queries ──────────────────────────────────────────────────────────────

pub fn parent(world: &World, entity: Entity) -> Option<Entity> {
    world.get::<Hierarchy>(entity).and_then(|h| h.parent)
}

pub fn first_child(world: &World, entity: Entity) -> Option<Entity> {
    world.get::<Hierarchy>(entity).and_then(|h| h.first_child)
}

pub fn next_sibling(world: &World, entity: Entity) -> Option<Entity> {
    world.get::<Hierarchy>(entity).and_then(|h| h.next_sibling)
}

pub fn prev_sibling(world: &World, entity: Entity) -> Option<Entity> {
    world.get::<Hierarchy>(entity).and_then(|h| h.prev_sibling)
}

/// Direct children in sibling order (newest first).
pub fn children(world: &World, entity: Entity) -> Vec<Entity> {
    let mut out = Vec::new();
    let mut budget = world.entity_count();
    let mut cursor = first_child(world, entity);
    while let Some(child) = cursor {
        if budget == 0 || !world.is_alive(child) {
            break;
        }
        budget -= 1;
        out.push(child);
        cursor = next_sibling(world, child);
    }
    out
}

pub fn child_count(world: &World, entity: Entity) -> usize {
    children(world, entity).len()
}

/// Whether `ancestor` appears on the parent chain of `node`.
///
/// An entity is not its own ancestor: `is_parent_of(w, e, e)` is `false`.
pub fn is_parent_of(world: &World, ancestor: Entity, node: Entity) -> bool {
    let mut budget = world.entity_count();
    let mut cursor = parent(world, node);
    while let Some(p) = cursor {
        if p == ancestor {
            return true;
        }
        if budget == 0 {
            return false;
        }
        budget -= 1;
        cursor = parent(world, p);
    }
    false
}

/// Parent chain of `entity`, nearest first.
pub fn ancestors(world: &World, entity: Entity) -> Vec<Entity> {
    let mut out = Vec::new();
    let mut budget = world.entity_count();
    let mut cursor = parent(world, entity);
    while let Some(p) = cursor {
        if budget == 0 || !world.is_alive(p) {
            break;
        }
        budget -= 1;
        out.push(p);
        cursor = parent(world, p);
    }
    out
}

/// Entities that are not attached to a live parent, ordered by slot index.
///
/// That covers entities without a `Hierarchy`, entities whose parent link is
/// empty, and orphans whose parent has died without unlinking them.
pub fn roots(world: &World) -> Vec<Entity> {
    world
        .entities()
        .into_iter()
        .filter(|&e| parent(world, e).is_none_or(|p| !world.is_alive(p)))
        .collect()
}

/// Pre-order walk of the subtree under `root` in `first_child → next_sibling`
/// order, with each entity's depth relative to `root` (which has depth 0).
pub fn depth_first(world: &World, root: Entity) -> Vec<(Entity, usize)> {
    let mut out = Vec::new();
    if !world.is_alive(root) {
        return out;
    }
    let mut budget = world.entity_count();
    let mut stack = vec![(root, 0usize)];
    while let Some((entity, depth)) = stack.pop() {
        if budget == 0 {
            log::warn!("hierarchy walk from {root:?} exceeded entity count; links are cyclic");
            break;
        }
        budget -= 1;
        out.push((entity, depth));
        // Reverse so the first child is popped first.
        for child in children(world, entity).into_iter().rev() {
            stack.push((child, depth + 1));
        }
    }
    out
}

// ── Mutation ─────────────────────────────────────────────────────────────

/// Move `child` under `new_parent`, or make it a root with `None`.
///
/// The child becomes the parent's first child. World transforms are not
/// touched; they catch up on the next [`SceneGraph::update`].
///
/// # Errors
///
/// - [`HierarchyError::InvalidEntity`] if `child` or `new_parent` is dead;
/// - [`HierarchyError::InvalidOperation`] if `new_parent == child`;
/// - [`HierarchyError::CycleDetected`] if `new_parent` is a descendant of
///   `child`.
///
/// Nothing is modified when an error is returned.
///
/// [`SceneGraph::update`]: super::scene_graph::SceneGraph::update
pub fn reparent(
    world: &mut World,
    child: Entity,
    new_parent: Option<Entity>,
) -> Result<(), HierarchyError> {
    if let Err(err) = check_reparent(world, child, new_parent) {
        log::warn!("reparent rejected: {err}");
        return Err(err);
    }

    if parent(world, child) == new_parent {
        return Ok(());
    }

    unlink(world, child);
    if let Some(p) = new_parent {
        link_first(world, child, p);
    }
    Ok(())
}

fn check_reparent(
    world: &World,
    child: Entity,
    new_parent: Option<Entity>,
) -> Result<(), HierarchyError> {
    if !world.is_alive(child) {
        return Err(HierarchyError::InvalidEntity(child));
    }
    let Some(p) = new_parent else {
        return Ok(());
    };
    if !world.is_alive(p) {
        return Err(HierarchyError::InvalidEntity(p));
    }
    if p == child {
        return Err(HierarchyError::InvalidOperation(child));
    }
    if is_parent_of(world, child, p) {
        return Err(HierarchyError::CycleDetected {
            child,
            new_parent: p,
        });
    }
    Ok(())
}

/// Detach every child of `entity`, turning each into a root. Returns how many
/// were detached.
pub fn detach_children(world: &mut World, entity: Entity) -> usize {
    let kids = children(world, entity);
    for &kid in &kids {
        unlink(world, kid);
    }
    kids.len()
}

/// Destroy `entity` and its whole subtree, children before parents.
///
/// Each child's `next_sibling` is read before descending into that child,
/// since destroying the child rewrites the links around it. Returns the
/// number of entities destroyed; a dead `entity` destroys nothing.
pub fn destroy_recursive(world: &mut World, entity: Entity) -> usize {
    if !world.is_alive(entity) {
        return 0;
    }

    let mut destroyed: usize = 0;
    let mut budget = world.entity_count();
    // (node, next child of node still to visit)
    let mut stack = vec![(entity, first_child(world, entity))];

    while let Some((node, cursor)) = stack.pop() {
        match cursor {
            Some(child) if budget > 0 && world.is_alive(child) => {
                budget -= 1;
                let after = next_sibling(world, child);
                stack.push((node, after));
                stack.push((child, first_child(world, child)));
            }
            _ => {
                if world.despawn(node) {
                    destroyed += 1;
                }
            }
        }
    }

    log::debug!("destroyed {entity:?} and {} descendants", destroyed.saturating_sub(1));
    destroyed
}

/// Remove `entity` from its parent's child list and clear its parent and
/// sibling links. Its own children stay attached.
fn unlink(world: &mut World, entity: Entity) {
    let Some(links) = world.get::<Hierarchy>(entity).copied() else {
        return;
    };

    match links.prev_sibling {
        Some(prev) => {
            if let Some(h) = world.get_mut::<Hierarchy>(prev) {
                h.next_sibling = links.next_sibling;
            }
        }
        None => {
            if let Some(h) = links.parent.and_then(|p| world.get_mut::<Hierarchy>(p)) {
                if h.first_child == Some(entity) {
                    h.first_child = links.next_sibling;
                }
            }
        }
    }
    if let Some(h) = links.next_sibling.and_then(|n| world.get_mut::<Hierarchy>(n)) {
        h.prev_sibling = links.prev_sibling;
    }

    if let Some(h) = world.get_mut::<Hierarchy>(entity) {
        h.parent = None;
        h.prev_sibling = None;
        h.next_sibling = None;
    }
}

/// Prepend `child` (currently unlinked) to `parent`'s child list, creating
/// either `Hierarchy` on demand.
fn link_first(world: &mut World, child: Entity, parent: Entity) {
    if world.get_or_insert_default::<Hierarchy>(child).is_none() {
        return;
    }
    let Some(parent_links) = world.get_or_insert_default::<Hierarchy>(parent) else {
        return;
    };
    let old_first = parent_links.first_child.replace(child);

    if let Some(h) = old_first.and_then(|f| world.get_mut::<Hierarchy>(f)) {
        h.prev_sibling = Some(child);
    }
    if let Some(h) = world.get_mut::<Hierarchy>(child) {
        h.parent = Some(parent);
        h.prev_sibling = None;
        h.next_sibling = old_first;
    }
}

// ── Loading ──────────────────────────────────────────────────────────────

/// Every parent lists each of its children exactly once, every listed child
/// names that parent, and the sibling links agree in both directions.
fn links_agree(world: &World, entities: &[Entity]) -> bool {
    entities.iter().all(|&e| {
        let kids = children(world, e);
        let mut seen = kids.clone();
        seen.sort();
        seen.dedup();
        seen.len() == kids.len()
            && parent(world, e).is_none_or(|p| children(world, p).contains(&e))
            && kids.iter().all(|&kid| parent(world, kid) == Some(e))
            && first_child(world, e).is_none_or(|c| prev_sibling(world, c).is_none())
            && next_sibling(world, e).is_none_or(|n| prev_sibling(world, n) == Some(e))
    })
}

/// Make freshly loaded links usable. When the stored links of `entities`
/// disagree, every child and sibling link is rebuilt from the `parent`
/// fields, keeping file order among siblings. A parent that would close a
/// cycle is dropped and the entity stays a root. Returns whether anything
/// was rebuilt.
pub(crate) fn relink_loaded(world: &mut World, entities: &[Entity]) -> bool {
    if links_agree(world, entities) {
        return false;
    }

    let requested: Vec<(Entity, Option<Entity>)> =
        entities.iter().map(|&e| (e, parent(world, e))).collect();
    for &e in entities {
        if let Some(h) = world.get_mut::<Hierarchy>(e) {
            *h = Hierarchy::default();
        }
    }
    for &(child, wanted) in requested.iter().rev() {
        let Some(p) = wanted else {
            continue;
        };
        if p == child || !world.is_alive(p) || is_parent_of(world, child, p) {
            log::warn!("loaded parent link {child:?} -> {p:?} is unusable; left at root");
            continue;
        }
        link_first(world, child, p);
    }

    log::warn!("rebuilt hierarchy links of {} loaded entities from their parent fields", entities.len());
    true
}

// ── Construction / destruction hooks ─────────────────────────────────────

/// The lifecycle hooks the scene graph registers for [`Hierarchy`].
pub(crate) fn hooks() -> ComponentHooks {
    ComponentHooks {
        on_insert: Some(on_hierarchy_insert),
        on_remove: Some(on_hierarchy_remove),
    }
}

/// A freshly inserted `Hierarchy` keeps only its parent request, and is linked
/// in as that parent's first child.
fn on_hierarchy_insert(world: &mut World, entity: Entity) {
    let Some(h) = world.get_mut::<Hierarchy>(entity) else {
        return;
    };
    let requested = h.parent;
    *h = Hierarchy::default();

    let Some(p) = requested else {
        return;
    };
    if let Err(err) = check_reparent(world, entity, Some(p)) {
        log::warn!("inserted hierarchy left at root: {err}");
        return;
    }
    link_first(world, entity, p);
}

/// Unlink the entity and promote its children to roots.
fn on_hierarchy_remove(world: &mut World, entity: Entity) {
    unlink(world, entity);
    for kid in children(world, entity) {
        if let Some(h) = world.get_mut::<Hierarchy>(kid) {
            h.parent = None;
            h.prev_sibling = None;
            h.next_sibling = None;
        }
    }
    if let Some(h) = world.get_mut::<Hierarchy>(entity) {
        h.first_child = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tag;

    fn world() -> World {
        let mut world = World::new();
        world.register_hooks::<Hierarchy>(hooks());
        world
    }

    /// No live entity mentions a dead one, and both sibling directions agree.
    fn assert_consistent(world: &World) {
        for e in world.entities() {
            let Some(h) = world.get::<Hierarchy>(e) else {
                continue;
            };
            for link in [h.parent, h.first_child, h.next_sibling, h.prev_sibling]
                .into_iter()
                .flatten()
            {
                assert!(world.is_alive(link), "{e:?} links to dead {link:?}");
            }
            if let Some(n) = h.next_sibling {
                assert_eq!(prev_sibling(world, n), Some(e));
            }
            for kid in children(world, e) {
                assert_eq!(parent(world, kid), Some(e));
            }
        }
    }

    #[test]
    fn relink_leaves_consistent_links_alone() {
        let mut w = world();
        let r = w.spawn_one(Tag);
        let a = w.spawn_one(Tag);
        let b = w.spawn_one(Tag);
        reparent(&mut w, a, Some(r)).unwrap();
        reparent(&mut w, b, Some(r)).unwrap();

        assert!(!relink_loaded(&mut w, &[r, a, b]));
        assert_eq!(children(&w, r), vec![b, a]);
    }

    #[test]
    fn relink_builds_child_lists_from_parent_fields() {
        let mut w = world();
        w.set_insert_hook_enabled::<Hierarchy>(false);
        let r = w.spawn_one(Tag);
        let a = w.spawn_one(Hierarchy::with_parent(r));
        let b = w.spawn_one(Hierarchy::with_parent(r));
        let c = w.spawn_one(Hierarchy::with_parent(a));
        w.set_insert_hook_enabled::<Hierarchy>(true);

        assert!(relink_loaded(&mut w, &[r, a, b, c]));
        assert_eq!(children(&w, r), vec![a, b]);
        assert_eq!(children(&w, a), vec![c]);
        assert_eq!(roots(&w), vec![r]);
        assert_consistent(&w);
    }

    #[test]
    fn relink_drops_cyclic_parent_fields() {
        let mut w = world();
        w.set_insert_hook_enabled::<Hierarchy>(false);
        let a = w.spawn_empty();
        let b = w.spawn_one(Hierarchy::with_parent(a));
        w.insert(a, Hierarchy::with_parent(b));
        w.set_insert_hook_enabled::<Hierarchy>(true);

        assert!(relink_loaded(&mut w, &[a, b]));
        assert_eq!(roots(&w).len(), 1);
        assert!(!is_parent_of(&w, a, a) && !is_parent_of(&w, b, b));
        assert_consistent(&w);
    }

    #[test]
    fn children_iterate_newest_first() {
        let mut w = world();
        let r = w.spawn_one(Tag);
        let a = w.spawn_one(Tag);
        let b = w.spawn_one(Tag);
        let c = w.spawn_one(Tag);
        for e in [a, b, c] {
            reparent(&mut w, e, Some(r)).unwrap();
        }
        assert_eq!(children(&w, r), vec![c, b, a]);
        assert_eq!(child_count(&w, r), 3);
        assert_consistent(&w);
    }

    #[test]
    fn reparent_onto_descendant_is_rejected() {
        let mut w = world();
        let a = w.spawn_one(Tag);
        let b = w.spawn_one(Tag);
        reparent(&mut w, b, Some(a)).unwrap();

        let before = *w.get::<Hierarchy>(a).unwrap();
        let err = reparent(&mut w, a, Some(b)).unwrap_err();
        assert_eq!(err, HierarchyError::CycleDetected { child: a, new_parent: b });
        assert_eq!(*w.get::<Hierarchy>(a).unwrap(), before);
        assert_eq!(children(&w, a), vec![b]);
    }

    #[test]
    fn reparent_onto_self_is_rejected() {
        let mut w = world();
        let a = w.spawn_one(Tag);
        assert_eq!(
            reparent(&mut w, a, Some(a)),
            Err(HierarchyError::InvalidOperation(a))
        );
        assert!(w.get::<Hierarchy>(a).is_none());
    }

    #[test]
    fn reparent_with_dead_ids_is_rejected() {
        let mut w = world();
        let a = w.spawn_one(Tag);
        let dead = w.spawn_one(Tag);
        w.despawn(dead);
        assert_eq!(
            reparent(&mut w, a, Some(dead)),
            Err(HierarchyError::InvalidEntity(dead))
        );
        assert_eq!(
            reparent(&mut w, dead, Some(a)),
            Err(HierarchyError::InvalidEntity(dead))
        );
    }

    #[test]
    fn reparent_to_current_parent_keeps_order() {
        let mut w = world();
        let r = w.spawn_one(Tag);
        let a = w.spawn_one(Tag);
        let b = w.spawn_one(Tag);
        reparent(&mut w, a, Some(r)).unwrap();
        reparent(&mut w, b, Some(r)).unwrap();
        reparent(&mut w, a, Some(r)).unwrap();
        assert_eq!(children(&w, r), vec![b, a]);
    }

    #[test]
    fn unlink_middle_sibling_patches_neighbours() {
        let mut w = world();
        let r = w.spawn_one(Tag);
        let kids: Vec<_> = (0..3).map(|_| w.spawn_one(Tag)).collect();
        for &k in &kids {
            reparent(&mut w, k, Some(r)).unwrap();
        }
        // order is [k2, k1, k0]; detach the middle one
        reparent(&mut w, kids[1], None).unwrap();
        assert_eq!(children(&w, r), vec![kids[2], kids[0]]);
        assert!(w.get::<Hierarchy>(kids[1]).unwrap().is_root());
        assert_consistent(&w);
    }

    #[test]
    fn moving_between_parents() {
        let mut w = world();
        let p1 = w.spawn_one(Tag);
        let p2 = w.spawn_one(Tag);
        let c = w.spawn_one(Tag);
        reparent(&mut w, c, Some(p1)).unwrap();
        reparent(&mut w, c, Some(p2)).unwrap();
        assert!(children(&w, p1).is_empty());
        assert_eq!(children(&w, p2), vec![c]);
        assert!(is_parent_of(&w, p2, c));
        assert!(!is_parent_of(&w, p1, c));
        assert_consistent(&w);
    }

    #[test]
    fn is_parent_of_walks_the_whole_chain() {
        let mut w = world();
        let a = w.spawn_one(Tag);
        let b = w.spawn_one(Tag);
        let c = w.spawn_one(Tag);
        reparent(&mut w, b, Some(a)).unwrap();
        reparent(&mut w, c, Some(b)).unwrap();
        assert!(is_parent_of(&w, a, c));
        assert!(!is_parent_of(&w, c, a));
        assert!(!is_parent_of(&w, a, a));
        assert_eq!(ancestors(&w, c), vec![b, a]);
    }

    #[test]
    fn depth_first_is_preorder() {
        let mut w = world();
        let r = w.spawn_one(Tag);
        let a = w.spawn_one(Tag);
        let b = w.spawn_one(Tag);
        let a1 = w.spawn_one(Tag);
        reparent(&mut w, a, Some(r)).unwrap();
        reparent(&mut w, b, Some(r)).unwrap();
        reparent(&mut w, a1, Some(a)).unwrap();
        assert_eq!(depth_first(&w, r), vec![(r, 0), (b, 1), (a, 1), (a1, 2)]);
    }

    #[test]
    fn destroy_recursive_removes_subtree_only() {
        let mut w = world();
        let keep = w.spawn_one(Tag);
        let root = w.spawn_one(Tag);
        let a = w.spawn_one(Tag);
        let b = w.spawn_one(Tag);
        let a1 = w.spawn_one(Tag);
        reparent(&mut w, root, Some(keep)).unwrap();
        reparent(&mut w, a, Some(root)).unwrap();
        reparent(&mut w, b, Some(root)).unwrap();
        reparent(&mut w, a1, Some(a)).unwrap();

        assert_eq!(destroy_recursive(&mut w, root), 4);
        assert_eq!(w.entity_count(), 1);
        assert!(children(&w, keep).is_empty());
        assert_consistent(&w);
        assert_eq!(destroy_recursive(&mut w, root), 0);
    }

    #[test]
    fn plain_despawn_promotes_children() {
        let mut w = world();
        let p = w.spawn_one(Tag);
        let a = w.spawn_one(Tag);
        let b = w.spawn_one(Tag);
        reparent(&mut w, a, Some(p)).unwrap();
        reparent(&mut w, b, Some(p)).unwrap();
        w.despawn(p);
        assert_eq!(parent(&w, a), None);
        assert_eq!(parent(&w, b), None);
        assert_eq!(roots(&w), vec![a, b]);
        assert_consistent(&w);
    }

    #[test]
    fn inserting_with_parent_links_in() {
        let mut w = world();
        let p = w.spawn_one(Tag);
        let first = w.spawn((Tag, Hierarchy::with_parent(p)));
        let second = w.spawn_one(Tag);
        w.insert(second, Hierarchy::with_parent(p));
        assert_eq!(children(&w, p), vec![second, first]);
        assert_consistent(&w);
    }

    #[test]
    fn removing_hierarchy_unlinks() {
        let mut w = world();
        let p = w.spawn_one(Tag);
        let c = w.spawn((Tag, Hierarchy::with_parent(p)));
        assert!(w.remove::<Hierarchy>(c));
        assert!(children(&w, p).is_empty());
    }

    #[test]
    fn detach_children_makes_roots() {
        let mut w = world();
        let p = w.spawn_one(Tag);
        for _ in 0..3 {
            let c = w.spawn_one(Tag);
            reparent(&mut w, c, Some(p)).unwrap();
        }
        assert_eq!(detach_children(&mut w, p), 3);
        assert_eq!(roots(&w).len(), 4);
        assert_consistent(&w);
    }

    #[test]
    fn missing_fields_deserialize_as_none() {
        let h: Hierarchy = serde_json::from_str("{}").unwrap();
        assert_eq!(h, Hierarchy::default());
    }
}
