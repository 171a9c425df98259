//! Headless демо Wayline
//!
//! Bevy App без рендера: один агент, одна walkable поверхность, один клик.

use std::time::Duration;

use bevy::prelude::*;
use wayline_simulation::{
    create_headless_app, spawn_agent_character, CommandInput, RaycastBackend, WalkableSurface,
    WalkableSurfaceRaycast, WorldGeometry,
};

fn main() {
    let mut app = create_headless_app();

    let surface = WalkableSurface {
        min_x: -200.0,
        min_z: -200.0,
        max_x: 1200.0,
        max_z: 200.0,
        height: 0.0,
    };
    app.insert_resource(WorldGeometry {
        surfaces: vec![surface],
    });
    app.insert_resource(RaycastBackend(Box::new(WalkableSurfaceRaycast::new(vec![
        surface,
    ]))));

    let agent = {
        let world = app.world_mut();
        let mut commands = world.commands();
        let entity = spawn_agent_character(&mut commands, Vec3::ZERO);
        world.flush();
        entity
    };

    // Startup: генерация navmesh + readiness push
    app.update();

    // Один "клик" в (1000, 0): preview, затем commit
    app.insert_resource(CommandInput {
        held: true,
        pressed: true,
        pointer_origin: Vec3::new(1000.0, 500.0, 0.0),
        pointer_dir: Vec3::NEG_Y,
        ..default()
    });
    app.world_mut().run_schedule(Update);

    app.insert_resource(CommandInput {
        released: true,
        ..default()
    });
    app.world_mut().run_schedule(Update);
    app.insert_resource(CommandInput::default());

    println!("Starting Wayline headless simulation");

    let timestep = app.world().resource::<Time<Fixed>>().timestep();
    for tick in 0..600 {
        fixed_step(&mut app, timestep);

        if tick % 100 == 0 {
            let position = app.world().get::<Transform>(agent).unwrap().translation;
            println!("Tick {}: agent at {:?}", tick, position);
        }
    }

    let position = app.world().get::<Transform>(agent).unwrap().translation;
    println!("Simulation complete, agent at {:?}", position);
}

fn fixed_step(app: &mut App, timestep: Duration) {
    app.world_mut()
        .resource_mut::<Time<Fixed>>()
        .advance_by(timestep);
    app.world_mut().run_schedule(FixedUpdate);
}
