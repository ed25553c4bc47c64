//! # Scene: Entity Store, Scene Graph and Persistence in One Place
//!
//! A [`Scene`] owns the [`World`] with all entities and components, the
//! [`SceneGraph`] that keeps the hierarchy consistent, the
//! [`ComponentRegistry`] that knows how to copy and persist components, and a
//! [`Schedule`] of per-frame systems.
//!
//! ## Frame
//!
//! ```text
//! scene.update(&time)
//!   1. schedule.run(world, time)   systems edit local transforms
//!   2. scene_graph.update(world)   world matrices recomputed, parents first
//! ```
//!
//! ## Persistence
//!
//! Scenes are saved as JSON [`SceneData`]: a version number and one
//! [`SceneEntity`] per entity with its registered components keyed by name
//! and its hierarchy links as file-local ids. Loading checks the version,
//! runs component upgrades for older files, and restores the links verbatim
//! with the scene graph's construct hook switched off.
//!
//! A prefab is the same format restricted to one subtree, with the subtree
//! root first.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::components::{Camera, Name, Prefab, StableId};
use crate::config::SceneConfig;
use crate::ecs::hierarchy::{self, Hierarchy};
use crate::ecs::{Entity, SceneGraph, Schedule, System, World};
use crate::entity_ref::EntityRef;
use crate::error::{HierarchyError, SceneError};
use crate::registry::ComponentRegistry;
use crate::time::TimeStep;

/// Version written by [`Scene::save`].
pub const CURRENT_SCENE_VERSION: u32 = 3;
/// Oldest version [`Scene::load`] accepts.
pub const MIN_SCENE_VERSION: u32 = 1;

// ── Scene Data (JSON wire format) ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneData {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub entities: Vec<SceneEntity>,
}

impl SceneData {
    pub fn from_json_str(json: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A single entity in a serialized scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEntity {
    /// File-local id, referenced by other entities' [`HierarchyRecord`]s.
    pub id: u32,
    #[serde(default)]
    pub components: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hierarchy: Option<HierarchyRecord>,
}

/// Raw hierarchy links in file-local ids. Missing fields read as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyRecord {
    pub parent: Option<u32>,
    pub first_child: Option<u32>,
    pub next_sibling: Option<u32>,
    pub prev_sibling: Option<u32>,
}

fn check_version(version: u32) -> Result<(), SceneError> {
    let result = match version {
        0 => Err(SceneError::InvalidVersion),
        v if v < MIN_SCENE_VERSION => Err(SceneError::VersionTooOld {
            found: v,
            min: MIN_SCENE_VERSION,
        }),
        v if v > CURRENT_SCENE_VERSION => Err(SceneError::VersionTooNew {
            found: v,
            max: CURRENT_SCENE_VERSION,
        }),
        _ => Ok(()),
    };
    if let Err(err) = &result {
        log::error!("cannot load scene: {err}");
    }
    result
}

/// Scene version 2 renamed the transform's `position` field to `translation`.
fn upgrade_transform_position(json: &mut serde_json::Value) {
    if let Some(map) = json.as_object_mut() {
        if let Some(position) = map.remove("position") {
            map.entry("translation").or_insert(position);
        }
    }
}

// ── Scene ────────────────────────────────────────────────────────────────

pub struct Scene {
    world: World,
    graph: SceneGraph,
    registry: ComponentRegistry,
    schedule: Schedule,
    config: SceneConfig,
    viewport: (u32, u32),
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(SceneConfig::new(name))
    }

    pub fn with_config(config: SceneConfig) -> Self {
        let mut world = World::new();
        let mut graph = SceneGraph::new();
        graph.init(&mut world);

        let mut registry = ComponentRegistry::with_builtins();
        registry.add_upgrade("Transform", 2, upgrade_transform_position);

        log::debug!("created scene `{}`", config.name);
        Self {
            world,
            graph,
            registry,
            schedule: Schedule::new(),
            viewport: (config.viewport_width, config.viewport_height),
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn scene_graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Register user components here so they are duplicated and saved.
    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    /// Append a system to the per-frame schedule.
    pub fn add_system<S: System + 'static>(&mut self, system: S) {
        self.schedule.add_system(system);
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    // ── Entities ─────────────────────────────────────────────────────

    /// Create an empty entity (with a fresh [`StableId`] when configured).
    pub fn create_entity(&mut self) -> Entity {
        let entity = self.world.spawn_empty();
        if self.config.assign_stable_ids {
            self.world.insert(entity, StableId::random());
        }
        entity
    }

    pub fn create_named(&mut self, name: impl Into<String>) -> Entity {
        let entity = self.create_entity();
        self.world.insert(entity, Name::new(name));
        entity
    }

    /// Facade over one entity; `None` if it is dead.
    pub fn entity_mut(&mut self, entity: Entity) -> Option<EntityRef<'_>> {
        self.world.entity_mut(entity)
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.world.is_alive(entity)
    }

    pub fn entity_count(&self) -> usize {
        self.world.entity_count()
    }

    pub fn entity_by_stable_id(&self, id: u64) -> Option<Entity> {
        self.world
            .entities_with::<StableId>()
            .into_iter()
            .find(|&e| self.world.get::<StableId>(e).is_some_and(|s| s.0 == id))
    }

    /// Destroy `entity` and all its descendants. Returns how many entities
    /// were destroyed (0 for a dead id).
    pub fn destroy_entity(&mut self, entity: Entity) -> usize {
        hierarchy::destroy_recursive(&mut self.world, entity)
    }

    pub fn set_parent(&mut self, child: Entity, parent: Option<Entity>) -> Result<(), HierarchyError> {
        self.graph.reparent(&mut self.world, child, parent)
    }

    /// Deep-copy `entity` and its subtree.
    ///
    /// Every registered component is cloned onto a fresh entity; the copy
    /// gets new [`StableId`]s and fresh hierarchy links, children keep their
    /// sibling order, and the copy of `entity` is attached under `parent`
    /// (or left a root). Returns `None` if `entity` or `parent` is dead.
    pub fn duplicate_entity(&mut self, entity: Entity, parent: Option<Entity>) -> Option<Entity> {
        if !self.world.is_alive(entity) || parent.is_some_and(|p| !self.world.is_alive(p)) {
            log::warn!("duplicate of {entity:?} under {parent:?} ignored: entity is not alive");
            return None;
        }

        let was_disabled = self.graph.is_construct_disabled(&self.world);
        self.graph.disable_on_construct(true, &mut self.world);

        let root_copy = self.copy_components(entity);
        let mut work = vec![(entity, root_copy)];
        while let Some((source, copy)) = work.pop() {
            // Prepending in reverse keeps the original order.
            for child in hierarchy::children(&self.world, source).into_iter().rev() {
                let child_copy = self.copy_components(child);
                if let Err(err) = hierarchy::reparent(&mut self.world, child_copy, Some(copy)) {
                    log::warn!("duplicate lost a child link: {err}");
                }
                work.push((child, child_copy));
            }
        }

        if let Some(p) = parent {
            if let Err(err) = hierarchy::reparent(&mut self.world, root_copy, Some(p)) {
                log::warn!("duplicate left at root: {err}");
            }
        }

        self.graph.disable_on_construct(was_disabled, &mut self.world);
        log::debug!("duplicated {entity:?} as {root_copy:?}");
        Some(root_copy)
    }

    fn copy_components(&mut self, source: Entity) -> Entity {
        let copy = self.world.spawn_empty();
        for (type_id, boxed) in self.registry.clone_components(&self.world, source) {
            self.world.insert_boxed(copy, type_id, boxed);
        }
        if self.world.has::<StableId>(copy) {
            self.world.insert(copy, StableId::random());
        }
        copy
    }

    // ── Frame ────────────────────────────────────────────────────────

    /// Run the systems, then propagate world transforms.
    pub fn update(&mut self, time: &TimeStep) {
        self.schedule.run(&mut self.world, time);
        self.graph.update(&mut self.world);
    }

    /// Recompute the aspect ratio of every camera for the new viewport size.
    pub fn on_window_resize(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
        self.world.query::<(&mut Camera,)>(|_, (camera,)| camera.set_viewport(width, height));
    }

    /// Drop every entity. Hooks and registrations stay in place, so the scene
    /// can be refilled.
    pub fn cleanup(&mut self) {
        log::debug!(
            "cleaning up scene `{}` ({} entities)",
            self.config.name,
            self.world.entity_count()
        );
        self.world.clear();
    }

    // ── Save / Load ──────────────────────────────────────────────────

    /// Serialise every entity, ordered by slot index.
    pub fn save(&self) -> SceneData {
        let entities = self.world.entities();
        let data = self.encode(&entities, None);
        log::debug!("saved scene `{}` ({} entities)", self.config.name, data.entities.len());
        data
    }

    /// Serialise the subtree under `root`, root first. The root's own parent
    /// and sibling links are left out.
    pub fn save_prefab(&self, root: Entity) -> Result<SceneData, SceneError> {
        if !self.world.is_alive(root) {
            return Err(SceneError::InvalidEntity(root));
        }
        let entities: Vec<Entity> = hierarchy::depth_first(&self.world, root)
            .into_iter()
            .map(|(e, _)| e)
            .collect();
        Ok(self.encode(&entities, Some(root)))
    }

    fn encode(&self, entities: &[Entity], prefab_root: Option<Entity>) -> SceneData {
        let included: HashMap<Entity, u32> = entities.iter().map(|&e| (e, e.index())).collect();
        let local = |link: Option<Entity>| link.and_then(|l| included.get(&l).copied());

        let entities = entities
            .iter()
            .map(|&entity| {
                let hierarchy = self.world.get::<Hierarchy>(entity).map(|h| {
                    let mut record = HierarchyRecord {
                        parent: local(h.parent()),
                        first_child: local(h.first_child()),
                        next_sibling: local(h.next_sibling()),
                        prev_sibling: local(h.prev_sibling()),
                    };
                    if prefab_root == Some(entity) {
                        record.parent = None;
                        record.next_sibling = None;
                        record.prev_sibling = None;
                    }
                    record
                });
                SceneEntity {
                    id: entity.index(),
                    components: self.registry.serialize_components(&self.world, entity),
                    hierarchy,
                }
            })
            .collect();

        SceneData {
            version: CURRENT_SCENE_VERSION,
            entities,
        }
    }

    /// Add the entities in `data` to this scene. Returns the new entities in
    /// the order they appear in `data`.
    ///
    /// # Errors
    ///
    /// Version 0, versions below [`MIN_SCENE_VERSION`] and versions above
    /// [`CURRENT_SCENE_VERSION`] are rejected before anything is created.
    pub fn load(&mut self, data: &SceneData) -> Result<Vec<Entity>, SceneError> {
        check_version(data.version)?;

        let was_disabled = self.graph.is_construct_disabled(&self.world);
        self.graph.disable_on_construct(true, &mut self.world);

        let mut id_map: HashMap<u32, Entity> = HashMap::with_capacity(data.entities.len());
        let mut spawned = Vec::with_capacity(data.entities.len());
        for scene_entity in &data.entities {
            let entity = self.world.spawn_empty();
            if id_map.insert(scene_entity.id, entity).is_some() {
                log::warn!("scene id {} appears twice; links resolve to the last one", scene_entity.id);
            }
            for (name, json) in &scene_entity.components {
                if let Some((type_id, boxed)) =
                    self.registry.deserialize_component(name, json, data.version)
                {
                    self.world.insert_boxed(entity, type_id, boxed);
                }
            }
            spawned.push(entity);
        }

        let resolve = |id: Option<u32>| id.and_then(|id| id_map.get(&id).copied());
        for (scene_entity, &entity) in data.entities.iter().zip(&spawned) {
            if let Some(record) = scene_entity.hierarchy {
                let links = Hierarchy::from_links(
                    resolve(record.parent),
                    resolve(record.first_child),
                    resolve(record.next_sibling),
                    resolve(record.prev_sibling),
                );
                self.world.insert(entity, links);
            }
        }
        hierarchy::relink_loaded(&mut self.world, &spawned);

        self.graph.disable_on_construct(was_disabled, &mut self.world);
        log::debug!(
            "loaded {} entities into scene `{}` (version {})",
            spawned.len(),
            self.config.name,
            data.version
        );
        Ok(spawned)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let json = self.save().to_json_string()?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<Vec<Entity>, SceneError> {
        let json = std::fs::read_to_string(path)?;
        let data = SceneData::from_json_str(&json)?;
        self.load(&data)
    }

    /// Load a prefab and mark its root with [`Prefab`]. Every instantiated
    /// entity that carries a [`StableId`] gets a fresh one, so a prefab can
    /// be instantiated many times.
    pub fn instantiate_prefab(&mut self, data: &SceneData, path: &str) -> Result<Entity, SceneError> {
        if data.entities.is_empty() {
            return Err(SceneError::EmptyPrefab);
        }
        let spawned = self.load(data)?;
        let root = spawned[0];

        for &entity in &spawned {
            if self.world.has::<StableId>(entity) {
                self.world.insert(entity, StableId::random());
            }
        }
        // The root record may come from a full scene; detach it to be safe.
        if let Err(err) = hierarchy::reparent(&mut self.world, root, None) {
            log::warn!("prefab root could not be detached: {err}");
        }
        self.world.insert(root, Prefab { path: path.to_string() });
        log::debug!("instantiated prefab `{path}` as {root:?}");
        Ok(root)
    }

    pub fn instantiate_prefab_from_file(&mut self, path: impl AsRef<Path>) -> Result<Entity, SceneError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let data = SceneData::from_json_str(&json)?;
        self.instantiate_prefab(&data, &path.to_string_lossy())
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::with_config(SceneConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Active;
    use crate::math::{Transform, Vec3};
    use std::time::Duration;

    fn children(scene: &Scene, e: Entity) -> Vec<Entity> {
        hierarchy::children(scene.world(), e)
    }

    fn name_of(scene: &Scene, e: Entity) -> String {
        scene.world().get::<Name>(e).map(|n| n.0.clone()).unwrap_or_default()
    }

    #[test]
    fn create_named_assigns_stable_id() {
        let mut scene = Scene::new("test");
        let e = scene.create_named("crate");
        let id = scene.world().get::<StableId>(e).unwrap().0;
        assert_eq!(scene.entity_by_stable_id(id), Some(e));
        assert_eq!(name_of(&scene, e), "crate");

        let mut plain = Scene::with_config(SceneConfig::new("plain").stable_ids(false));
        let f = plain.create_entity();
        assert!(!plain.world().has::<StableId>(f));
    }

    #[test]
    fn update_runs_systems_before_propagation() {
        let mut scene = Scene::new("test");
        let parent = scene.create_entity();
        scene.world_mut().insert(parent, Transform::default());
        let child = scene.create_entity();
        scene.world_mut().insert(child, Transform::from_xyz(1.0, 0.0, 0.0));
        scene.set_parent(child, Some(parent)).unwrap();

        scene.add_system(move |world: &mut World, time: &TimeStep| {
            if let Some(t) = world.get_mut::<Transform>(parent) {
                t.translation.x += time.delta_secs();
            }
        });
        scene.update(&TimeStep::fixed(Duration::from_secs(2)));

        let pos = scene.world().get::<Transform>(child).unwrap().world_position();
        assert!((pos - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn duplicate_copies_subtree_in_order() {
        let mut scene = Scene::new("test");
        let root = scene.create_named("root");
        let a = scene.create_named("a");
        let b = scene.create_named("b");
        scene.set_parent(a, Some(root)).unwrap();
        scene.set_parent(b, Some(root)).unwrap();

        let copy = scene.duplicate_entity(root, None).unwrap();
        assert_eq!(scene.entity_count(), 6);

        let originals: Vec<String> = children(&scene, root).iter().map(|&e| name_of(&scene, e)).collect();
        let copies: Vec<String> = children(&scene, copy).iter().map(|&e| name_of(&scene, e)).collect();
        assert_eq!(originals, vec!["b", "a"]);
        assert_eq!(copies, originals);

        let old_id = scene.world().get::<StableId>(root).unwrap();
        let new_id = scene.world().get::<StableId>(copy).unwrap();
        assert_ne!(old_id, new_id);
        assert!(hierarchy::parent(scene.world(), copy).is_none());
    }

    #[test]
    fn duplicate_under_parent() {
        let mut scene = Scene::new("test");
        let holder = scene.create_named("holder");
        let item = scene.create_named("item");
        let copy = scene.duplicate_entity(item, Some(holder)).unwrap();
        assert_eq!(children(&scene, holder), vec![copy]);
        assert!(!scene.scene_graph().is_construct_disabled(scene.world()));
    }

    #[test]
    fn duplicate_of_dead_entity_is_none() {
        let mut scene = Scene::new("test");
        let e = scene.create_entity();
        scene.destroy_entity(e);
        assert!(scene.duplicate_entity(e, None).is_none());
    }

    #[test]
    fn save_and_load_restore_structure() {
        let mut scene = Scene::new("test");
        let root = scene.create_named("root");
        scene.world_mut().insert(root, Transform::from_xyz(1.0, 2.0, 3.0));
        let a = scene.create_named("a");
        let b = scene.create_named("b");
        scene.set_parent(a, Some(root)).unwrap();
        scene.set_parent(b, Some(root)).unwrap();
        scene.world_mut().insert(b, Active(false));

        let data = scene.save();
        assert_eq!(data.version, CURRENT_SCENE_VERSION);
        let json = data.to_json_string().unwrap();

        let mut other = Scene::new("other");
        let loaded = other.load(&SceneData::from_json_str(&json).unwrap()).unwrap();
        assert_eq!(loaded.len(), 3);

        let new_root = loaded[0];
        assert_eq!(name_of(&other, new_root), "root");
        let kids: Vec<String> = children(&other, new_root).iter().map(|&e| name_of(&other, e)).collect();
        assert_eq!(kids, vec!["b", "a"]);
        assert_eq!(other.world().get::<Active>(loaded[2]), Some(&Active(false)));
        assert_eq!(
            other.world().get::<Transform>(new_root).unwrap().translation,
            Vec3::new(1.0, 2.0, 3.0)
        );
    }

    #[test]
    fn version_checks() {
        let mut scene = Scene::new("test");
        let mut data = SceneData {
            version: 0,
            entities: vec![],
        };
        assert!(matches!(scene.load(&data), Err(SceneError::InvalidVersion)));
        data.version = CURRENT_SCENE_VERSION + 1;
        assert!(matches!(
            scene.load(&data),
            Err(SceneError::VersionTooNew { found: 4, max: 3 })
        ));
        data.version = MIN_SCENE_VERSION;
        assert!(scene.load(&data).unwrap().is_empty());
    }

    #[test]
    fn old_transform_layout_is_upgraded() {
        let json = r#"{
            "version": 1,
            "entities": [
                { "id": 7, "components": { "Transform": { "position": [4.0, 5.0, 6.0] } } }
            ]
        }"#;
        let mut scene = Scene::new("test");
        let loaded = scene.load(&SceneData::from_json_str(json).unwrap()).unwrap();
        let t = scene.world().get::<Transform>(loaded[0]).unwrap();
        assert_eq!(t.translation, Vec3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn unknown_links_and_components_are_dropped() {
        let json = r#"{
            "version": 3,
            "entities": [
                { "id": 1, "components": { "Mystery": 1, "Name": "lonely" },
                  "hierarchy": { "parent": 99 } }
            ]
        }"#;
        let mut scene = Scene::new("test");
        let loaded = scene.load(&SceneData::from_json_str(json).unwrap()).unwrap();
        let h = scene.world().get::<Hierarchy>(loaded[0]).unwrap();
        assert_eq!(*h, Hierarchy::default());
        assert_eq!(name_of(&scene, loaded[0]), "lonely");
    }

    #[test]
    fn parent_only_records_are_linked_on_load() {
        let json = r#"{
            "version": 2,
            "entities": [
                { "id": 1, "components": { "Transform": { "translation": [10.0, 0.0, 0.0] } } },
                { "id": 2, "components": { "Transform": { "translation": [1.0, 0.0, 0.0] } },
                  "hierarchy": { "parent": 1 } }
            ]
        }"#;
        let mut scene = Scene::new("test");
        let loaded = scene.load(&SceneData::from_json_str(json).unwrap()).unwrap();
        let (p, c) = (loaded[0], loaded[1]);
        assert_eq!(children(&scene, p), vec![c]);
        assert_eq!(hierarchy::roots(scene.world()), vec![p]);

        scene.update(&TimeStep::new());
        let pos = scene.world().get::<Transform>(c).unwrap().world_position();
        assert!((pos - Vec3::new(11.0, 0.0, 0.0)).length() < 1e-5);
        assert_eq!(scene.scene_graph().traverse(scene.world()).len(), 2);
    }

    #[test]
    fn prefab_round_trip() {
        let mut scene = Scene::new("test");
        let outer = scene.create_named("outer");
        let tree = scene.create_named("tree");
        let leaf = scene.create_named("leaf");
        scene.set_parent(tree, Some(outer)).unwrap();
        scene.set_parent(leaf, Some(tree)).unwrap();

        let prefab = scene.save_prefab(tree).unwrap();
        assert_eq!(prefab.entities.len(), 2);

        let first = scene.instantiate_prefab(&prefab, "prefabs/tree.json").unwrap();
        let second = scene.instantiate_prefab(&prefab, "prefabs/tree.json").unwrap();
        assert_ne!(first, second);
        assert!(hierarchy::parent(scene.world(), first).is_none());
        assert_eq!(
            scene.world().get::<Prefab>(first).map(|p| p.path.as_str()),
            Some("prefabs/tree.json")
        );
        assert_eq!(children(&scene, first).len(), 1);
        assert_ne!(
            scene.world().get::<StableId>(first),
            scene.world().get::<StableId>(second)
        );
    }

    #[test]
    fn empty_prefab_is_an_error() {
        let mut scene = Scene::new("test");
        let data = SceneData {
            version: CURRENT_SCENE_VERSION,
            entities: vec![],
        };
        assert!(matches!(scene.instantiate_prefab(&data, "x"), Err(SceneError::EmptyPrefab)));
    }

    #[test]
    fn resize_updates_cameras() {
        let mut scene = Scene::new("test");
        let cam = scene.create_entity();
        scene.world_mut().insert(cam, Camera::default());
        scene.on_window_resize(1000, 500);
        assert_eq!(scene.world().get::<Camera>(cam).unwrap().aspect_ratio, 2.0);
        assert_eq!(scene.viewport(), (1000, 500));
    }

    #[test]
    fn cleanup_empties_but_keeps_hooks() {
        let mut scene = Scene::new("test");
        let p = scene.create_entity();
        scene.cleanup();
        assert!(!scene.is_alive(p));

        let p = scene.create_entity();
        let c = scene.create_entity();
        scene.world_mut().insert(c, Hierarchy::with_parent(p));
        assert_eq!(children(&scene, p), vec![c]);
    }
}
