//! # Arbor: Scene Graph and Hierarchical Entity Ownership
//!
//! A flat entity store with a parent/child forest layered on top:
//!
//! - [`World`] owns every entity and component;
//! - the [`Hierarchy`] component links each entity to its parent, first child
//!   and siblings, and the [`hierarchy`](ecs::hierarchy) functions keep those
//!   links consistent (reparenting with cycle rejection, recursive destroy);
//! - the [`SceneGraph`] hooks the links into component insert/remove and
//!   propagates local [`Transform`]s to world matrices, parents first;
//! - a [`Scene`] ties it together with a system [`Schedule`](ecs::Schedule),
//!   duplication, prefabs and versioned JSON persistence.
//!
//! Start with `use arbor::prelude::*` and a [`Scene`].
//!
//! ```ignore
//! let mut scene = Scene::new("solar system");
//! let sun = scene.create_named("Sun");
//! let earth = scene.create_named("Earth");
//! scene.world_mut().insert(sun, Transform::default());
//! scene.world_mut().insert(earth, Transform::from_xyz(10.0, 0.0, 0.0));
//! scene.set_parent(earth, Some(sun))?;
//! scene.update(&TimeStep::new());
//! ```

pub mod commands;
pub mod components;
pub mod config;
pub mod ecs;
pub mod entity_ref;
pub mod error;
pub mod math;
pub mod outline;
pub mod prelude;
pub mod registry;
pub mod scene;
pub mod time;

pub use commands::HierarchyCommands;
pub use components::{Active, Camera, Name, Prefab, StableId};
pub use config::SceneConfig;
pub use ecs::{Entity, Hierarchy, SceneGraph, World};
pub use entity_ref::EntityRef;
pub use error::{HierarchyError, SceneError};
pub use math::Transform;
pub use outline::Outline;
pub use registry::ComponentRegistry;
pub use scene::{CURRENT_SCENE_VERSION, MIN_SCENE_VERSION, Scene, SceneData};
pub use time::TimeStep;
