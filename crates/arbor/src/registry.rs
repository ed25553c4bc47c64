//! # Component Registry: Type-Erased Clone, Save and Load
//!
//! The entity store is untyped at rest: an entity is a bag of
//! `Box<dyn Any>` values. Duplication and persistence need to do something
//! with each value without knowing its type, so every component type that
//! should survive a copy or a save is registered here once:
//!
//! ```ignore
//! let mut registry = ComponentRegistry::with_builtins();
//! registry.register::<Health>();
//! registry.add_upgrade("Health", 2, |json| {
//!     // version 2 wrapped the bare number in an object
//!     *json = serde_json::json!({ "hp": json.clone() });
//! });
//! ```
//!
//! Each entry holds a clone, a serialize and a deserialize function pointer,
//! keyed by the type's short name (`Transform`, `Name`, ...). Upgrade
//! functions are tagged with the scene version that introduced the new
//! layout and run, oldest first, on data saved before that version.

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::components::{Active, Camera, Name, Prefab, StableId};
use crate::ecs::component::BoxedComponent;
use crate::ecs::{Entity, Hierarchy, World};
use crate::math::Transform;

type CloneFn = fn(&dyn Any) -> Option<BoxedComponent>;
type SerializeFn = fn(&dyn Any) -> Option<serde_json::Value>;
type DeserializeFn = fn(serde_json::Value) -> Result<BoxedComponent, serde_json::Error>;

/// Rewrites a component's saved JSON into the layout of a newer version.
pub type UpgradeFn = fn(&mut serde_json::Value);

struct ComponentFns {
    short_name: String,
    clone: CloneFn,
    serialize: SerializeFn,
    deserialize: DeserializeFn,
    /// `(introduced_in_version, upgrade)`, sorted by version.
    upgrades: Vec<(u32, UpgradeFn)>,
}

/// Maps component types to clone/serialize/deserialize function pointers.
pub struct ComponentRegistry {
    by_type_id: HashMap<TypeId, ComponentFns>,
    by_name: HashMap<String, TypeId>,
}

impl ComponentRegistry {
    /// An empty registry. Nothing is duplicated or saved until registered.
    pub fn new() -> Self {
        Self {
            by_type_id: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// A registry that already knows the components this crate defines.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .register::<Transform>()
            .register::<Name>()
            .register::<Active>()
            .register::<StableId>()
            .register::<Prefab>()
            .register::<Camera>();
        registry
    }

    /// Register `T` under its short type name.
    pub fn register<T>(&mut self) -> &mut Self
    where
        T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        let name = short_type_name(std::any::type_name::<T>());
        self.register_as::<T>(&name)
    }

    /// Register `T` under an explicit name, e.g. to keep loading files after
    /// the type was renamed.
    pub fn register_as<T>(&mut self, name: &str) -> &mut Self
    where
        T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        let type_id = TypeId::of::<T>();
        if type_id == TypeId::of::<Hierarchy>() {
            log::warn!("`Hierarchy` is persisted by the scene itself; registration ignored");
            return self;
        }

        let fns = ComponentFns {
            short_name: name.to_string(),
            clone: |any| {
                let val = any.downcast_ref::<T>()?;
                Some(Box::new(val.clone()))
            },
            serialize: |any| {
                let val = any.downcast_ref::<T>()?;
                serde_json::to_value(val).ok()
            },
            deserialize: |json| {
                let val: T = serde_json::from_value(json)?;
                Ok(Box::new(val))
            },
            upgrades: Vec::new(),
        };

        if let Some(old) = self.by_type_id.insert(type_id, fns) {
            self.by_name.remove(&old.short_name);
        }
        self.by_name.insert(name.to_string(), type_id);
        self
    }

    /// Attach an upgrade to the component registered as `name`. It runs on
    /// data saved with a scene version older than `introduced_in`.
    ///
    /// Returns `false` if no component is registered under `name`.
    pub fn add_upgrade(&mut self, name: &str, introduced_in: u32, upgrade: UpgradeFn) -> bool {
        let Some(fns) = self
            .by_name
            .get(name)
            .and_then(|tid| self.by_type_id.get_mut(tid))
        else {
            return false;
        };
        let at = fns.upgrades.partition_point(|(v, _)| *v <= introduced_in);
        fns.upgrades.insert(at, (introduced_in, upgrade));
        true
    }

    pub fn is_registered<T: 'static>(&self) -> bool {
        self.by_type_id.contains_key(&TypeId::of::<T>())
    }

    /// Registered component names, sorted.
    pub fn component_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Copies of every registered component on `entity`.
    pub(crate) fn clone_components(&self, world: &World, entity: Entity) -> Vec<(TypeId, BoxedComponent)> {
        world
            .component_types(entity)
            .into_iter()
            .filter_map(|tid| {
                let fns = self.by_type_id.get(&tid)?;
                let any = world.get_any(entity, tid)?;
                Some((tid, (fns.clone)(any)?))
            })
            .collect()
    }

    /// JSON of every registered component on `entity`, keyed by name.
    pub(crate) fn serialize_components(
        &self,
        world: &World,
        entity: Entity,
    ) -> BTreeMap<String, serde_json::Value> {
        let mut out = BTreeMap::new();
        for tid in world.component_types(entity) {
            let Some(fns) = self.by_type_id.get(&tid) else {
                continue;
            };
            let Some(any) = world.get_any(entity, tid) else {
                continue;
            };
            match (fns.serialize)(any) {
                Some(json) => {
                    out.insert(fns.short_name.clone(), json);
                }
                None => log::warn!("failed to serialize `{}` on {entity:?}", fns.short_name),
            }
        }
        out
    }

    /// Decode one saved component, upgrading it from `saved_version` first.
    ///
    /// Unknown names and undecodable values are logged and yield `None`.
    pub(crate) fn deserialize_component(
        &self,
        name: &str,
        json: &serde_json::Value,
        saved_version: u32,
    ) -> Option<(TypeId, BoxedComponent)> {
        let Some((&tid, fns)) = self
            .by_name
            .get(name)
            .and_then(|tid| Some((tid, self.by_type_id.get(tid)?)))
        else {
            log::warn!("skipping unknown component `{name}`");
            return None;
        };

        let mut json = json.clone();
        for (introduced_in, upgrade) in &fns.upgrades {
            if saved_version < *introduced_in {
                upgrade(&mut json);
            }
        }

        match (fns.deserialize)(json) {
            Ok(boxed) => Some((tid, boxed)),
            Err(err) => {
                log::warn!("skipping component `{name}`: {err}");
                None
            }
        }
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// `arbor::components::Name` → `Name`, `alloc::vec::Vec<demo::Tag>` → `Vec<Tag>`.
fn short_type_name(full: &str) -> String {
    fn last_segment(path: &str) -> &str {
        path.rsplit("::").next().unwrap_or(path)
    }

    let mut short = String::with_capacity(full.len());
    let mut start = 0;
    for (i, c) in full.char_indices() {
        if matches!(c, '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | ';' | '&') {
            short.push_str(last_segment(&full[start..i]));
            short.push(c);
            start = i + c.len_utf8();
        }
    }
    short.push_str(last_segment(&full[start..]));
    short
}
