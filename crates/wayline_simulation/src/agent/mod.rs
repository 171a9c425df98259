//! Path-following state machine агента
//!
//! Unready → Idle → Previewing → Committed → Navigating → Arrived,
//! из Navigating обратно в Previewing по повторному нажатию команды.
//!
//! Фазы строго разведены по schedule:
//! - Update (variable-rate): preview кандидата, commit working set
//! - FixedUpdate (60Hz): steering к ближайшему waypoint, consume + re-plan
//!
//! Состояние не кодируется enum'ом — оно выводится из данных (mesh/path
//! Option, command-флаги, working set, proximity).

use bevy::prelude::*;

use crate::components::{Agent, CommandInput};
use crate::navmesh::PathSearchBackend;
use crate::physics::{CharacterMotor, PhysicsBody, RaycastBackend};
use crate::NavigationSet;

pub mod events;

pub use events::{AgentArrived, PathPreviewed, TraversalCommitted};

/// Абсолютный порог "прибыл в destination" (units)
///
/// Намеренно НЕ связан с waypoint tolerance (radius/2): это разные пороги
/// с разной природой, не унифицировать.
pub const DESTINATION_TOLERANCE: f32 = 10.0;

/// Максимальная длина pointer ray
pub const POINTER_RAY_DISTANCE: f32 = 100_000.0;

/// Agent plugin: preview/commit в Update, steering/re-plan в FixedUpdate
pub struct AgentPlugin;

impl Plugin for AgentPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PathPreviewed>()
            .add_event::<TraversalCommitted>()
            .add_event::<AgentArrived>()
            .add_systems(Update, (agent_preview_path, agent_commit_path).chain())
            .add_systems(
                FixedUpdate,
                (
                    agent_navigate.in_set(NavigationSet::Steer),
                    agent_consume_waypoints.in_set(NavigationSet::Replan),
                ),
            );
    }
}

/// Горизонтальное направление steering (Y никогда не участвует)
pub fn steer_direction(from: Vec3, to: Vec3) -> Vec3 {
    (to - from).with_y(0.0).normalize_or_zero()
}

fn almost_equal(a: Vec3, b: Vec3, tolerance: f32) -> bool {
    a.distance(b) <= tolerance
}

/// Система: preview candidate path (каждый frame, пока команда удерживается)
///
/// Вход в preview всегда сбрасывает working set — незавершённый маршрут
/// отменяется. Невалидный hit (мимо геометрии или не-верхняя поверхность)
/// молча пропускается: прежние destination и committed path не трогаются.
pub fn agent_preview_path(
    command: Res<CommandInput>,
    raycast: Res<RaycastBackend>,
    search: Res<PathSearchBackend>,
    mut query: Query<(Entity, &mut Agent, &Transform)>,
    mut previews: EventWriter<PathPreviewed>,
) {
    if !command.held {
        return;
    }

    for (entity, mut agent, transform) in query.iter_mut() {
        agent.clear_working_set();

        if !agent.is_ready() {
            continue;
        }

        let Some(hit) =
            raycast
                .0
                .cast(command.pointer_origin, command.pointer_dir, POINTER_RAY_DISTANCE)
        else {
            continue;
        };

        // Только walkable top surface
        if hit.normal != Vec3::Y {
            continue;
        }

        agent.set_destination(hit.position);
        agent.rebuild_path(transform.translation, hit.position, search.0.as_ref());

        previews.write(PathPreviewed {
            agent: entity,
            points: agent.path_segments().iter().map(|s| s.position).collect(),
        });
    }
}

/// Система: commit (frame, в котором команда отпущена)
///
/// Working set = value-copy snapshot текущей segment sequence. Дальнейшие
/// rebuilds пути его не пополняют — только proximity-arrival уменьшает.
pub fn agent_commit_path(
    command: Res<CommandInput>,
    mut query: Query<(Entity, &mut Agent)>,
    mut commits: EventWriter<TraversalCommitted>,
) {
    if !command.released {
        return;
    }

    for (entity, mut agent) in query.iter_mut() {
        agent.commit_working_set();
        commits.write(TraversalCommitted {
            agent: entity,
            waypoints: agent.remaining_waypoints(),
        });
    }
}

/// Система: steering (fixed step, только пока команда не удерживается)
///
/// До readiness push — строгий no-op. В пределах DESTINATION_TOLERANCE
/// позиция снапится ровно в destination и velocity обнуляется. Иначе цель —
/// первый оставшийся waypoint working set, при пустом set — сам destination
/// (search не строит waypoints внутри одного региона, финальный отрезок
/// прямой).
pub fn agent_navigate(
    command: Res<CommandInput>,
    mut query: Query<(Entity, &mut Agent, &CharacterMotor, &mut PhysicsBody, &mut Transform)>,
    mut arrivals: EventWriter<AgentArrived>,
) {
    if command.held {
        // В preview физического движения нет: гасим stale steering velocity,
        // иначе интегратор продолжит везти агента по прошлому направлению
        for (_, _, _, mut body, _) in query.iter_mut() {
            body.velocity.x = 0.0;
            body.velocity.z = 0.0;
        }
        return;
    }

    for (entity, mut agent, motor, mut body, mut transform) in query.iter_mut() {
        if !agent.is_ready() {
            continue;
        }

        if almost_equal(transform.translation, agent.destination(), DESTINATION_TOLERANCE) {
            transform.translation = agent.destination();
            body.velocity = Vec3::ZERO;
            if agent.mark_arrived() {
                arrivals.write(AgentArrived { agent: entity });
            }
            continue;
        }

        let target = agent.current_target();
        let direction = steer_direction(transform.translation, target);
        body.velocity.x = direction.x * motor.move_speed;
        body.velocity.z = direction.z * motor.move_speed;
    }
}

/// Система: consume waypoints + re-plan (после интеграции движения)
///
/// Достигнув текущей цели (tolerance = radius/2), агент перестраивает путь
/// от СВОЕЙ текущей позиции к неизменному destination и выкидывает из
/// working set все waypoints в том же радиусе. Удаление по позиции, не по
/// индексу: rebuilt path может переупорядочить waypoints.
pub fn agent_consume_waypoints(
    command: Res<CommandInput>,
    search: Res<PathSearchBackend>,
    mut query: Query<(&mut Agent, &CharacterMotor, &Transform)>,
) {
    if command.held {
        return;
    }

    for (mut agent, motor, transform) in query.iter_mut() {
        if !agent.is_ready() {
            continue;
        }

        let position = transform.translation;
        if almost_equal(position, agent.destination(), DESTINATION_TOLERANCE) {
            continue;
        }

        let tolerance = motor.radius / 2.0;
        if !almost_equal(position, agent.current_target(), tolerance) {
            continue;
        }

        let destination = agent.destination();
        agent.rebuild_path(position, destination, search.0.as_ref());
        agent.consume_reached(position, tolerance);
    }
}
