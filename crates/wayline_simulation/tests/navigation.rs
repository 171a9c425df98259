//! Интеграционные тесты state machine агента
//!
//! Headless App с mock input и инжектированными backends; FixedUpdate
//! прогоняется вручную (advance Time<Fixed> + run_schedule) для
//! детерминизма.

use std::time::Duration;

use bevy::prelude::*;
use wayline_simulation::{
    create_headless_app, spawn_agent_character, Agent, AgentArrived, CommandInput,
    NavigationMesh, PathSearch, PathSearchBackend, PhysicsBody, RaycastBackend, SceneContext,
    Segment, WalkableSurface, WalkableSurfaceRaycast, WorldGeometry,
};

const SURFACE: WalkableSurface = WalkableSurface {
    min_x: -200.0,
    min_z: -200.0,
    max_x: 1200.0,
    max_z: 200.0,
    height: 0.0,
};

/// Mock search: фиксированная последовательность waypoints
struct FixedWaypoints(Vec<Vec3>);

impl PathSearch for FixedWaypoints {
    fn search(&self, _mesh: &NavigationMesh, _start: Vec3, _end: Vec3) -> Vec<Segment> {
        self.0.iter().map(|&position| Segment { position }).collect()
    }
}

fn app_with_surface() -> App {
    let mut app = create_headless_app();
    app.insert_resource(WorldGeometry {
        surfaces: vec![SURFACE],
    });
    app.insert_resource(RaycastBackend(Box::new(WalkableSurfaceRaycast::new(vec![
        SURFACE,
    ]))));
    app
}

fn spawn_agent(app: &mut App, position: Vec3) -> Entity {
    let world = app.world_mut();
    let mut commands = world.commands();
    let entity = spawn_agent_character(&mut commands, position);
    world.flush();
    entity
}

/// Первый update: Startup (generation request) + Update (readiness push)
fn boot(app: &mut App) {
    app.update();
}

/// Один variable-rate frame с удержанной командой (pointer сверху вниз)
fn hold_pointer(app: &mut App, x: f32, z: f32) {
    app.insert_resource(CommandInput {
        held: true,
        pressed: true,
        pointer_origin: Vec3::new(x, 500.0, z),
        pointer_dir: Vec3::NEG_Y,
        ..default()
    });
    app.world_mut().run_schedule(Update);
}

/// Луч снизу вверх: попадание в нижнюю сторону поверхности (normal -Y)
fn hold_pointer_from_below(app: &mut App, x: f32, z: f32) {
    app.insert_resource(CommandInput {
        held: true,
        pointer_origin: Vec3::new(x, -500.0, z),
        pointer_dir: Vec3::Y,
        ..default()
    });
    app.world_mut().run_schedule(Update);
}

/// Frame отпускания команды (commit)
fn release(app: &mut App) {
    app.insert_resource(CommandInput {
        released: true,
        ..default()
    });
    app.world_mut().run_schedule(Update);
    app.insert_resource(CommandInput::default());
}

fn fixed_steps(app: &mut App, count: usize) {
    let timestep = app.world().resource::<Time<Fixed>>().timestep();
    for _ in 0..count {
        advance_fixed(app, timestep);
    }
}

fn advance_fixed(app: &mut App, timestep: Duration) {
    app.world_mut()
        .resource_mut::<Time<Fixed>>()
        .advance_by(timestep);
    app.world_mut().run_schedule(FixedUpdate);
}

fn agent(app: &App, entity: Entity) -> &Agent {
    app.world().get::<Agent>(entity).unwrap()
}

fn translation(app: &App, entity: Entity) -> Vec3 {
    app.world().get::<Transform>(entity).unwrap().translation
}

fn velocity(app: &App, entity: Entity) -> Vec3 {
    app.world().get::<PhysicsBody>(entity).unwrap().velocity
}

#[test]
fn test_fixed_step_is_noop_until_mesh_ready() {
    let mut app = app_with_surface();
    // Физический мир не готов: generation на startup пропускается
    app.insert_resource(SceneContext {
        is_editor: false,
        physics_active: false,
    });
    let entity = spawn_agent(&mut app, Vec3::new(50.0, 0.0, 0.0));
    boot(&mut app);

    assert!(!agent(&app, entity).is_ready());

    let before = translation(&app, entity);
    fixed_steps(&mut app, 10);

    assert_eq!(translation(&app, entity), before);
    assert_eq!(velocity(&app, entity), Vec3::ZERO);
}

#[test]
fn test_full_traversal_scenario() {
    let mut app = app_with_surface();
    app.insert_resource(PathSearchBackend(Box::new(FixedWaypoints(vec![
        Vec3::new(300.0, 0.0, 0.0),
        Vec3::new(700.0, 0.0, 0.0),
    ]))));
    let entity = spawn_agent(&mut app, Vec3::ZERO);
    boot(&mut app);
    assert!(agent(&app, entity).is_ready());

    hold_pointer(&mut app, 1000.0, 0.0);
    assert_eq!(agent(&app, entity).destination(), Vec3::new(1000.0, 0.0, 0.0));
    // Preview ещё ничего не commit-ит
    assert_eq!(agent(&app, entity).remaining_waypoints(), 0);
    assert_eq!(agent(&app, entity).path_segments().len(), 2);

    release(&mut app);
    assert_eq!(agent(&app, entity).remaining_waypoints(), 2);

    // Working set между commit и arrival только уменьшается; waypoints
    // посещаются по порядку: 300, затем 700, затем финальная прямая
    let mut last_remaining = 2;
    let mut visit_positions = Vec::new();

    for _ in 0..200 {
        fixed_steps(&mut app, 1);

        let remaining = agent(&app, entity).remaining_waypoints();
        assert!(remaining <= last_remaining, "working set вырос");
        if remaining < last_remaining {
            visit_positions.push(translation(&app, entity));
        }
        last_remaining = remaining;
    }

    assert_eq!(visit_positions.len(), 2);
    assert!(visit_positions[0].distance(Vec3::new(300.0, 0.0, 0.0)) <= 8.0);
    assert!(visit_positions[1].distance(Vec3::new(700.0, 0.0, 0.0)) <= 8.0);

    // Arrival: позиция ровно destination, velocity ноль, событие один раз
    assert_eq!(translation(&app, entity), Vec3::new(1000.0, 0.0, 0.0));
    assert_eq!(velocity(&app, entity), Vec3::ZERO);
    assert_eq!(agent(&app, entity).remaining_waypoints(), 0);

    let arrivals = app.world().resource::<Events<AgentArrived>>();
    assert_eq!(arrivals.len(), 1);
}

#[test]
fn test_preview_reentry_clears_working_set_and_freezes_agent() {
    let mut app = app_with_surface();
    app.insert_resource(PathSearchBackend(Box::new(FixedWaypoints(vec![
        Vec3::new(300.0, 0.0, 0.0),
        Vec3::new(700.0, 0.0, 0.0),
    ]))));
    let entity = spawn_agent(&mut app, Vec3::ZERO);
    boot(&mut app);

    hold_pointer(&mut app, 1000.0, 0.0);
    release(&mut app);
    fixed_steps(&mut app, 20);
    assert!(translation(&app, entity).x > 0.0);

    // Повторное нажатие: working set сбрасывается, движение замирает
    hold_pointer(&mut app, 800.0, 0.0);
    assert_eq!(agent(&app, entity).remaining_waypoints(), 0);

    let frozen = translation(&app, entity);
    fixed_steps(&mut app, 10);
    assert_eq!(translation(&app, entity), frozen);
}

#[test]
fn test_rejected_hit_preserves_prior_state() {
    let mut app = app_with_surface();
    app.insert_resource(PathSearchBackend(Box::new(FixedWaypoints(vec![
        Vec3::new(300.0, 0.0, 0.0),
    ]))));
    let entity = spawn_agent(&mut app, Vec3::ZERO);
    boot(&mut app);

    hold_pointer(&mut app, 1000.0, 0.0);
    release(&mut app);
    assert_eq!(agent(&app, entity).destination(), Vec3::new(1000.0, 0.0, 0.0));

    // Мимо геометрии: destination и path не трогаются
    hold_pointer(&mut app, 5000.0, 0.0);
    assert_eq!(agent(&app, entity).destination(), Vec3::new(1000.0, 0.0, 0.0));
    assert_eq!(agent(&app, entity).path_segments().len(), 1);

    // Не-верхняя поверхность (normal -Y): тоже отбрасывается
    hold_pointer_from_below(&mut app, 600.0, 0.0);
    assert_eq!(agent(&app, entity).destination(), Vec3::new(1000.0, 0.0, 0.0));

    // Прежний committed-маршрут остаётся проходимым после release
    release(&mut app);
    assert_eq!(agent(&app, entity).remaining_waypoints(), 1);
}

#[test]
fn test_arrival_snaps_exactly() {
    let mut app = app_with_surface();
    let entity = spawn_agent(&mut app, Vec3::new(995.0, 0.0, 0.0));
    boot(&mut app);

    // Destination в 5 units — уже в пределах tolerance (10)
    hold_pointer(&mut app, 1000.0, 0.0);
    release(&mut app);

    fixed_steps(&mut app, 1);
    assert_eq!(translation(&app, entity), Vec3::new(1000.0, 0.0, 0.0));
    assert_eq!(velocity(&app, entity), Vec3::ZERO);

    // Повторные шаги не сдвигают
    fixed_steps(&mut app, 5);
    assert_eq!(translation(&app, entity), Vec3::new(1000.0, 0.0, 0.0));
}

#[test]
fn test_empty_working_set_steers_directly_at_destination() {
    let mut app = app_with_surface();
    // Search не даёт waypoints (один регион)
    app.insert_resource(PathSearchBackend(Box::new(FixedWaypoints(vec![]))));
    let entity = spawn_agent(&mut app, Vec3::ZERO);
    boot(&mut app);

    hold_pointer(&mut app, 150.0, 0.0);
    release(&mut app);
    assert_eq!(agent(&app, entity).remaining_waypoints(), 0);

    fixed_steps(&mut app, 1);
    let position = translation(&app, entity);
    assert!(position.x > 0.0);
    assert_eq!(position.y, 0.0);
    assert_eq!(position.z, 0.0);

    fixed_steps(&mut app, 40);
    assert_eq!(translation(&app, entity), Vec3::new(150.0, 0.0, 0.0));
}
