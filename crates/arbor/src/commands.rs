//! Deferred structural edits.
//!
//! Code that walks the hierarchy (an outline view, a drag-and-drop handler,
//! a system iterating children) must not relink or destroy entities mid-walk.
//! It records the edit in [`HierarchyCommands`] instead and the queue is
//! applied to the [`Scene`] once the walk is over:
//!
//! ```ignore
//! let mut commands = HierarchyCommands::new();
//! for row in Outline::build(scene.world(), "").rows() {
//!     if dropped_on(row) {
//!         commands.reparent(dragged, Some(row.entity));
//!     }
//! }
//! commands.apply(&mut scene);
//! ```

use std::collections::VecDeque;

use crate::components::Name;
use crate::ecs::Entity;
use crate::error::HierarchyError;
use crate::scene::Scene;

#[derive(Debug, Clone, PartialEq)]
pub enum HierarchyCommand {
    Reparent { child: Entity, parent: Option<Entity> },
    Destroy(Entity),
    Duplicate { entity: Entity, parent: Option<Entity> },
    SpawnChild { parent: Entity, name: Option<String> },
}

/// What an applied command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Reparented,
    /// Number of entities destroyed (0 if the target was already gone).
    Destroyed(usize),
    Duplicated(Entity),
    Spawned(Entity),
}

/// FIFO queue of hierarchy edits.
#[derive(Debug, Default)]
pub struct HierarchyCommands {
    queue: VecDeque<HierarchyCommand>,
}

impl HierarchyCommands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: HierarchyCommand) {
        self.queue.push_back(command);
    }

    pub fn reparent(&mut self, child: Entity, parent: Option<Entity>) {
        self.push(HierarchyCommand::Reparent { child, parent });
    }

    pub fn destroy(&mut self, entity: Entity) {
        self.push(HierarchyCommand::Destroy(entity));
    }

    pub fn duplicate(&mut self, entity: Entity, parent: Option<Entity>) {
        self.push(HierarchyCommand::Duplicate { entity, parent });
    }

    pub fn spawn_child(&mut self, parent: Entity, name: Option<String>) {
        self.push(HierarchyCommand::SpawnChild { parent, name });
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Run every queued command in order and empty the queue. One result per
    /// command; rejected commands are logged and do not stop the rest.
    pub fn apply(&mut self, scene: &mut Scene) -> Vec<Result<CommandOutcome, HierarchyError>> {
        let mut results = Vec::with_capacity(self.queue.len());
        while let Some(command) = self.queue.pop_front() {
            let result = apply_one(scene, command);
            if let Err(err) = &result {
                log::warn!("hierarchy command skipped: {err}");
            }
            results.push(result);
        }
        results
    }
}

fn apply_one(scene: &mut Scene, command: HierarchyCommand) -> Result<CommandOutcome, HierarchyError> {
    match command {
        HierarchyCommand::Reparent { child, parent } => {
            scene.set_parent(child, parent)?;
            Ok(CommandOutcome::Reparented)
        }
        HierarchyCommand::Destroy(entity) => Ok(CommandOutcome::Destroyed(scene.destroy_entity(entity))),
        HierarchyCommand::Duplicate { entity, parent } => {
            if let Some(p) = parent.filter(|&p| !scene.is_alive(p)) {
                return Err(HierarchyError::InvalidEntity(p));
            }
            scene
                .duplicate_entity(entity, parent)
                .map(CommandOutcome::Duplicated)
                .ok_or(HierarchyError::InvalidEntity(entity))
        }
        HierarchyCommand::SpawnChild { parent, name } => {
            if !scene.is_alive(parent) {
                return Err(HierarchyError::InvalidEntity(parent));
            }
            let child = scene.create_entity();
            if let Some(name) = name {
                scene.world_mut().insert(child, Name::new(name));
            }
            scene.set_parent(child, Some(parent))?;
            Ok(CommandOutcome::Spawned(child))
        }
    }
}
