//! # Entity Store and Scene Graph
//!
//! A small archetype-based entity store with an intrusive parent/child
//! hierarchy layered on top through component hooks.
//!
//! ## Module Overview
//!
//! - [`entity`]: Generational entity IDs
//! - [`component`]: Type-erased columnar storage (`Box<dyn Any>`)
//! - [`archetype`]: Groups entities by component signature
//! - [`world`]: Central container (entities + components + hooks)
//! - [`query`]: Closure-based iteration over matching archetypes
//! - [`hierarchy`]: `Hierarchy` component, reparenting, recursive destroy
//! - [`scene_graph`]: Hook registration and world-transform propagation
//! - [`system`]: System trait and schedule runner

pub(crate) mod archetype;
pub(crate) mod component;
pub mod entity;
pub mod hierarchy;
pub mod query;
pub mod scene_graph;
pub mod system;
pub mod world;

pub use entity::Entity;
pub use hierarchy::Hierarchy;
pub use query::QueryParam;
pub use scene_graph::SceneGraph;
pub use system::{Schedule, System};
pub use world::{Bundle, ComponentHooks, HookFn, World};
