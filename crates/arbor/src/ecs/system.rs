//! # System: Per-Frame Logic Over the World
//!
//! A system is a function that takes `&mut World` plus the frame's
//! [`TimeStep`] and does something with it: move entities, spin planets,
//! update cameras. Systems run in the order they're added; there is no
//! parameter injection and no parallelism.
//!
//! A [`Schedule`] is the ordered list. [`Scene::update`](crate::Scene::update)
//! runs it before the scene graph propagates transforms, so anything a system
//! writes to a local [`Transform`](crate::Transform) is reflected in world
//! matrices by the time `update` returns.

use super::world::World;
use crate::time::TimeStep;

/// A system that can be executed on a [`World`].
///
/// Any `FnMut(&mut World, &TimeStep)` implements this trait, so closures and
/// plain functions work directly.
pub trait System {
    fn run(&mut self, world: &mut World, time: &TimeStep);
}

impl<F: FnMut(&mut World, &TimeStep)> System for F {
    fn run(&mut self, world: &mut World, time: &TimeStep) {
        (self)(world, time);
    }
}

struct NamedSystem {
    name: String,
    system: Box<dyn System>,
}

/// An ordered list of systems to run.
pub struct Schedule {
    systems: Vec<NamedSystem>,
}

impl Schedule {
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
        }
    }

    /// Add a system to the end of the schedule.
    pub fn add_system<S: System + 'static>(&mut self, system: S) {
        let name = short_system_name(std::any::type_name::<S>());
        log::debug!("scheduled system `{name}`");
        self.systems.push(NamedSystem {
            name,
            system: Box::new(system),
        });
    }

    /// Run all systems in order.
    pub fn run(&mut self, world: &mut World, time: &TimeStep) {
        for ns in &mut self.systems {
            log::trace!("running system `{}`", ns.name);
            ns.system.run(world, time);
        }
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// System names in run order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.systems.iter().map(|ns| ns.name.as_str())
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip the module path from a fully-qualified type name
/// (`demo::orbit_system` → `orbit_system`, closures → `<closure>`).
fn short_system_name(full: &str) -> String {
    let name = full.rsplit("::").next().unwrap_or(full);
    if name.contains("closure") {
        "<closure>".to_string()
    } else {
        name.to_string()
    }
}
