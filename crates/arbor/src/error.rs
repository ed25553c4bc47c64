//! Error types for structural edits and scene persistence.

use crate::ecs::Entity;

/// A rejected hierarchy edit. The hierarchy is unchanged when one of these is
/// returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HierarchyError {
    #[error("entity {0} is not alive")]
    InvalidEntity(Entity),
    #[error("entity {0} cannot be its own parent")]
    InvalidOperation(Entity),
    #[error("cannot parent {child} under its own descendant {new_parent}")]
    CycleDetected { child: Entity, new_parent: Entity },
}

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("scene data has no valid version")]
    InvalidVersion,
    #[error("scene version {found} is older than the oldest supported version {min}")]
    VersionTooOld { found: u32, min: u32 },
    #[error("scene version {found} is newer than this build supports ({max})")]
    VersionTooNew { found: u32, max: u32 },
    #[error("scene file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("scene json is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("entity {0} is not alive")]
    InvalidEntity(Entity),
    #[error("prefab data contains no entities")]
    EmptyPrefab,
}
