//! Flattened hierarchy for editor tree views.
//!
//! [`Outline::build`] walks every root (sorted by slot index so the display
//! order is stable between frames) depth-first and produces one
//! [`OutlineRow`] per entity with everything a tree widget needs: indentation
//! depth, label, whether to draw an expand arrow, whether to grey the row
//! out, and whether the row belongs to a prefab instance.
//!
//! A non-empty filter keeps rows whose label contains it (ignoring case)
//! together with all their ancestors, so matches stay reachable in the tree.

use crate::components::{Active, Name, Prefab};
use crate::ecs::hierarchy;
use crate::ecs::{Entity, World};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineRow {
    pub entity: Entity,
    pub depth: usize,
    pub label: String,
    pub has_children: bool,
    /// False if the entity or any ancestor is switched off.
    pub active: bool,
    /// True for a prefab root and everything below it.
    pub in_prefab: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Outline {
    rows: Vec<OutlineRow>,
}

impl Outline {
    pub fn build(world: &World, filter: &str) -> Self {
        let mut rows = Vec::new();
        // (active, in_prefab) of the current path, indexed by depth
        let mut path_state: Vec<(bool, bool)> = Vec::new();

        for root in hierarchy::roots(world) {
            for (entity, depth) in hierarchy::depth_first(world, root) {
                path_state.truncate(depth);
                let (parent_active, parent_prefab) = path_state.last().copied().unwrap_or((true, false));

                let active = parent_active && world.get::<Active>(entity).is_none_or(|a| a.0);
                let in_prefab = parent_prefab || world.has::<Prefab>(entity);
                path_state.push((active, in_prefab));

                rows.push(OutlineRow {
                    entity,
                    depth,
                    label: label(world, entity),
                    has_children: hierarchy::first_child(world, entity).is_some(),
                    active,
                    in_prefab,
                });
            }
        }

        if !filter.is_empty() {
            rows = apply_filter(rows, filter);
        }
        Self { rows }
    }

    pub fn rows(&self) -> &[OutlineRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn find(&self, entity: Entity) -> Option<&OutlineRow> {
        self.rows.iter().find(|row| row.entity == entity)
    }
}

fn label(world: &World, entity: Entity) -> String {
    match world.get::<Name>(entity) {
        Some(name) => name.0.clone(),
        None => format!("Entity {}", entity.index()),
    }
}

fn apply_filter(rows: Vec<OutlineRow>, filter: &str) -> Vec<OutlineRow> {
    let needle = filter.to_lowercase();
    let mut keep = vec![false; rows.len()];
    // Row indices of the current root-to-row path.
    let mut path: Vec<usize> = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        path.truncate(row.depth);
        path.push(i);
        if row.label.to_lowercase().contains(&needle) {
            for &j in &path {
                keep[j] = true;
            }
        }
    }

    rows.into_iter()
        .zip(keep)
        .filter_map(|(row, kept)| kept.then_some(row))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::SceneGraph;

    fn named(world: &mut World, name: &str) -> Entity {
        world.spawn_one(Name::new(name))
    }

    fn world() -> World {
        let mut world = World::new();
        SceneGraph::new().init(&mut world);
        world
    }

    #[test]
    fn rows_follow_traversal_order() {
        let mut w = world();
        let sun = named(&mut w, "Sun");
        let earth = named(&mut w, "Earth");
        let moon = named(&mut w, "Moon");
        let mars = named(&mut w, "Mars");
        hierarchy::reparent(&mut w, earth, Some(sun)).unwrap();
        hierarchy::reparent(&mut w, mars, Some(sun)).unwrap();
        hierarchy::reparent(&mut w, moon, Some(earth)).unwrap();

        let outline = Outline::build(&w, "");
        let labels: Vec<(&str, usize)> = outline.rows().iter().map(|r| (r.label.as_str(), r.depth)).collect();
        assert_eq!(labels, vec![("Sun", 0), ("Mars", 1), ("Earth", 1), ("Moon", 2)]);
        assert!(outline.find(sun).unwrap().has_children);
        assert!(!outline.find(moon).unwrap().has_children);
    }

    #[test]
    fn unnamed_entities_get_index_labels() {
        let mut w = world();
        let e = w.spawn_empty();
        let outline = Outline::build(&w, "");
        assert_eq!(outline.find(e).unwrap().label, format!("Entity {}", e.index()));
    }

    #[test]
    fn filter_keeps_ancestors_of_matches() {
        let mut w = world();
        let sun = named(&mut w, "Sun");
        let earth = named(&mut w, "Earth");
        let moon = named(&mut w, "Moon");
        let other = named(&mut w, "Comet");
        hierarchy::reparent(&mut w, earth, Some(sun)).unwrap();
        hierarchy::reparent(&mut w, moon, Some(earth)).unwrap();

        let outline = Outline::build(&w, "mOOn");
        let kept: Vec<Entity> = outline.rows().iter().map(|r| r.entity).collect();
        assert_eq!(kept, vec![sun, earth, moon]);
        assert!(outline.find(other).is_none());
    }

    #[test]
    fn inactive_and_prefab_state_is_inherited() {
        let mut w = world();
        let root = named(&mut w, "root");
        let child = named(&mut w, "child");
        let grandchild = named(&mut w, "grandchild");
        hierarchy::reparent(&mut w, child, Some(root)).unwrap();
        hierarchy::reparent(&mut w, grandchild, Some(child)).unwrap();
        w.insert(child, Active(false));
        w.insert(child, Prefab { path: "p.json".into() });

        let outline = Outline::build(&w, "");
        let row = |e| outline.find(e).unwrap().clone();
        assert!(row(root).active && !row(root).in_prefab);
        assert!(!row(child).active && row(child).in_prefab);
        assert!(!row(grandchild).active && row(grandchild).in_prefab);
    }
}
