//! Convenience re-exports: `use arbor::prelude::*` for the common items.

pub use crate::commands::{CommandOutcome, HierarchyCommand, HierarchyCommands};
pub use crate::components::{Active, Camera, Name, Prefab, StableId};
pub use crate::config::SceneConfig;
pub use crate::ecs::hierarchy;
pub use crate::ecs::{ComponentHooks, Entity, Hierarchy, SceneGraph, Schedule, System, World};
pub use crate::entity_ref::EntityRef;
pub use crate::error::{HierarchyError, SceneError};
pub use crate::math::{Mat4, Quat, Transform, Vec2, Vec3, Vec4};
pub use crate::outline::{Outline, OutlineRow};
pub use crate::registry::ComponentRegistry;
pub use crate::scene::{Scene, SceneData, SceneEntity};
pub use crate::time::TimeStep;
