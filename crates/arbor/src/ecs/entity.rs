//! # Entity: Generational Handles Into the Store
//!
//! An [`Entity`] names a row in the [`World`](super::world::World). It carries
//! no data of its own; components are looked up through the world, and the
//! hierarchy links between entities are stored as plain `Entity` values inside
//! the [`Hierarchy`](super::hierarchy::Hierarchy) component.
//!
//! Because links are stored by value, an entity may be destroyed while other
//! components still mention it. Each slot therefore carries a **generation**
//! that is bumped whenever the slot is freed:
//!
//! ```text
//! Entity { index: 4, generation: 0 }   ← spawned
//! despawn                              ← generations[4] = 1, slot 4 freed
//! Entity { index: 4, generation: 1 }   ← slot reused by a new spawn
//! ```
//!
//! A stored `Entity(4v0)` no longer matches `generations[4]` and every lookup
//! through it fails, so a stale sibling or parent link can never resolve to
//! the entity that happens to reuse the slot.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A lightweight, copyable handle to an entity in a [`World`](super::world::World).
///
/// Two handles are equal only if both the slot index and the generation
/// match: a handle kept across a despawn/respawn of the same slot compares
/// unequal to the new occupant.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl Entity {
    /// Slot index inside the allocator.
    pub fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot at the time this handle was issued.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Hands out entity ids and recycles freed slots.
///
/// ```text
/// generations: [1, 0, 3]   ← current generation per slot
/// free:        [0]         ← slots waiting for reuse (LIFO)
/// ```
pub(crate) struct EntityAllocator {
    generations: Vec<u32>,
    free: Vec<u32>,
    alive: usize,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            free: Vec::new(),
            alive: 0,
        }
    }

    /// Issue a fresh id. Never fails; the slot table grows on demand.
    pub fn allocate(&mut self) -> Entity {
        self.alive += 1;
        match self.free.pop() {
            Some(index) => Entity {
                index,
                generation: self.generations[index as usize],
            },
            None => {
                let index = self.generations.len() as u32;
                self.generations.push(0);
                Entity {
                    index,
                    generation: 0,
                }
            }
        }
    }

    /// Free the slot behind `entity`. Returns `false` for a stale handle, so
    /// freeing twice is harmless.
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        let slot = &mut self.generations[entity.index as usize];
        *slot = slot.wrapping_add(1);
        self.free.push(entity.index);
        self.alive -= 1;
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.generations
            .get(entity.index as usize)
            .is_some_and(|&generation| generation == entity.generation)
    }

    pub fn alive_count(&self) -> usize {
        self.alive
    }

    /// Free every slot at once. Generations are bumped so that handles from
    /// before the reset stay stale.
    pub fn reset(&mut self) {
        self.free.clear();
        for (index, generation) in self.generations.iter_mut().enumerate().rev() {
            *generation = generation.wrapping_add(1);
            self.free.push(index as u32);
        }
        self.alive = 0;
    }

    #[cfg(test)]
    pub(crate) fn total_slots(&self) -> usize {
        self.generations.len()
    }
}
