//! Wayline Simulation Core
//!
//! Click-to-move навигация на Bevy 0.16: mesh provider + path-following
//! агенты с инкрементальным re-planning.
//!
//! HYBRID ARCHITECTURE:
//! - ECS = strategic layer (state machine агента, mesh provider, re-plan)
//! - Игровой layer = tactical (input polling, raycast против physics,
//!   рендер preview) — инжектится через resources/backends, headless
//!   тесты подставляют mock'и

use bevy::prelude::*;
use bevy_rapier3d::plugin::PhysicsSet;

// Публичные модули
pub mod agent;
pub mod components;
pub mod logger;
pub mod navmesh;
pub mod physics;

// Re-export базовых типов для удобства
pub use agent::{
    AgentArrived, AgentPlugin, PathPreviewed, TraversalCommitted, DESTINATION_TOLERANCE,
    POINTER_RAY_DISTANCE,
};
pub use components::*;
pub use logger::{init_logger, log, log_error, log_info, log_warning, LogLevel, LogPrinter};
pub use navmesh::{
    GeneratorBackend, NavigationMesh, NavigationPath, Navmesh, NavmeshGenerator, NavmeshPlugin,
    NodeGraphSearch, PathSearch, PathSearchBackend, RegenerateNavmesh, Segment,
    SurfaceTriangulator,
};
pub use physics::{
    spawn_agent_character, CharacterMotor, CharacterMotorPlugin, PhysicsBody, RaycastBackend,
    SurfaceHit, SurfaceRaycast, WalkableSurfaceRaycast,
};

/// Порядок фаз fixed step: steering → актуатор → consume/re-plan
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationSet {
    /// Выбор цели, запись steering velocity
    Steer,
    /// Gravity, sync в Rapier, интеграция velocity → Transform
    Actuate,
    /// Proximity-arrival: consume waypoints + rebuild path
    Replan,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для navigation tick
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .init_resource::<CommandInput>()
            .init_resource::<SceneContext>()
            .init_resource::<WorldGeometry>()
            .init_resource::<Navmesh>()
            .configure_sets(
                FixedUpdate,
                (
                    NavigationSet::Steer,
                    NavigationSet::Actuate,
                    NavigationSet::Replan,
                )
                    .chain()
                    .before(PhysicsSet::SyncBackend),
            );

        // Reference backends, если игровой layer не поставил свои
        if !app.world().contains_resource::<GeneratorBackend>() {
            app.insert_resource(GeneratorBackend(Box::new(SurfaceTriangulator::default())));
        }
        if !app.world().contains_resource::<PathSearchBackend>() {
            app.insert_resource(PathSearchBackend(Box::new(NodeGraphSearch)));
        }
        if !app.world().contains_resource::<RaycastBackend>() {
            let surfaces = app.world().resource::<WorldGeometry>().surfaces.clone();
            app.insert_resource(RaycastBackend(Box::new(WalkableSurfaceRaycast::new(
                surfaces,
            ))));
        }

        // Подсистемы
        app.add_plugins((NavmeshPlugin, AgentPlugin, CharacterMotorPlugin));
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app() -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins).add_plugins(SimulationPlugin);
    app
}

/// Snapshot мира для сравнения детерминизма
///
/// Собирает компоненты в детерминированный байтовый формат (сортировка по
/// Entity ID, сериализация через Debug).
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
