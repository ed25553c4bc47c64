//! Entity Hierarchies: headless solar system demo.
//!
//! Planets orbit the sun; moons orbit their planet, all through the
//! hierarchy. The demo steps the scene a few frames, prints the outline with
//! world positions, duplicates a planet, destroys another with its moons,
//! and round-trips the scene through JSON.
//!
//! Run with: `RUST_LOG=debug cargo run -p arbor --example scene_hierarchy`

use std::time::Duration;

use arbor::prelude::*;
use serde::{Deserialize, Serialize};

// ── Orbit component ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Orbit {
    speed: f32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut scene = Scene::with_config(SceneConfig::new("solar system").viewport(1280, 720));
    scene.registry_mut().register::<Orbit>();
    scene.add_system(orbit_system);

    let sun = scene.create_named("Sun");
    scene.world_mut().insert(sun, Transform::default());

    let planet_configs = [("Mercury", 4.0, 1.6, 0), ("Earth", 10.0, 1.0, 1), ("Jupiter", 25.0, 0.4, 3)];
    let mut planets = Vec::new();
    for &(name, distance, speed, moons) in &planet_configs {
        planets.push(spawn_planet(&mut scene, sun, name, distance, speed, moons)?);
    }

    let mut time = TimeStep::new();
    for _ in 0..30 {
        time.advance(Duration::from_millis(16));
        scene.update(&time);
    }
    print_outline(&scene, "after 30 frames");

    // Earth gets a twin on the far side of the sun.
    if let Some(twin) = scene.duplicate_entity(planets[1], Some(sun)) {
        if let Some(mut twin) = scene.entity_mut(twin) {
            twin.set_name("Counter-Earth");
            if let Some(t) = twin.get_mut::<Transform>() {
                t.translation = -t.translation;
            }
        }
    }

    // A cycle is refused and leaves the tree alone.
    let moon = hierarchy::first_child(scene.world(), planets[2]).ok_or("Jupiter has no moons")?;
    if let Err(err) = scene.set_parent(planets[2], Some(moon)) {
        println!("refused: {err}");
    }

    let destroyed = scene.destroy_entity(planets[2]);
    println!("destroyed Jupiter and its moons: {destroyed} entities");

    scene.update(&time);
    print_outline(&scene, "after edits");

    let json = scene.save().to_json_string()?;
    let mut reloaded = Scene::new("reloaded");
    reloaded.registry_mut().register::<Orbit>();
    let loaded = reloaded.load(&SceneData::from_json_str(&json)?)?;
    reloaded.update(&time);
    println!("\nreloaded {} entities from {} bytes of JSON", loaded.len(), json.len());
    print_outline(&reloaded, "reloaded");

    Ok(())
}

fn spawn_planet(
    scene: &mut Scene,
    sun: Entity,
    name: &str,
    distance: f32,
    speed: f32,
    moons: usize,
) -> Result<Entity, HierarchyError> {
    let planet = scene.create_named(name);
    scene.world_mut().insert(planet, Transform::from_xyz(distance, 0.0, 0.0));
    scene.world_mut().insert(planet, Orbit { speed });
    scene.set_parent(planet, Some(sun))?;

    for i in 0..moons {
        let moon = scene.create_named(format!("{name} moon {}", i + 1));
        let offset = 1.0 + i as f32 * 0.5;
        scene.world_mut().insert(moon, Transform::from_xyz(offset, 0.0, 0.0));
        scene.world_mut().insert(moon, Orbit { speed: 3.0 / offset });
        scene.set_parent(moon, Some(planet))?;
    }
    Ok(planet)
}

/// Rotate each orbiting body's local position around its parent.
fn orbit_system(world: &mut World, time: &TimeStep) {
    let dt = time.delta_secs();
    world.query::<(&mut Transform, &Orbit)>(|_, (transform, orbit)| {
        let spin = Quat::from_rotation_z(orbit.speed * dt);
        transform.translation = spin * transform.translation;
    });
}

fn print_outline(scene: &Scene, title: &str) {
    println!("\n── {title} ──");
    for row in Outline::build(scene.world(), "").rows() {
        let pos = scene
            .world()
            .get::<Transform>(row.entity)
            .map(Transform::world_position)
            .unwrap_or(Vec3::ZERO);
        println!(
            "{:indent$}{} ({:.2}, {:.2})",
            "",
            row.label,
            pos.x,
            pos.y,
            indent = row.depth * 2
        );
    }
}
