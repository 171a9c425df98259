//! Kinematic актуатор агента
//!
//! Архитектура:
//! - Rapier для коллизий (RigidBody::KinematicPositionBased)
//! - Custom velocity integration (не используем Rapier forces)
//! - Gravity + ground check; steering velocity пишет agent-слой
//!
//! Детерминизм: fixed timestep 60Hz, системы в одной chain.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::components::Agent;
use crate::NavigationSet;

/// Порог ground check (временная заглушка вместо raycast вниз)
const GROUND_EPSILON: f32 = 1.0;

/// Физический актуатор персонажа
///
/// Agent-слой читает radius и пишет горизонтальную velocity; сам актуатор
/// отвечает за gravity и интеграцию. Vertical velocity агент не трогает.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct CharacterMotor {
    /// Скорость движения (units/s)
    pub move_speed: f32,
    /// Радиус капсулы (units); из него выводится waypoint tolerance
    pub radius: f32,
    /// Гравитация (units/s²)
    pub gravity: f32,
    /// На земле ли персонаж
    pub grounded: bool,
}

impl Default for CharacterMotor {
    fn default() -> Self {
        Self {
            move_speed: 450.0,
            radius: 16.0,
            gravity: -800.0,
            grounded: false,
        }
    }
}

/// Собственная velocity персонажа (интегрируется в Transform)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct PhysicsBody {
    pub velocity: Vec3,
}

/// Система: ground detection
///
/// Заглушка: grounded если Y близок к полу. TODO: заменить на raycast вниз
/// через RaycastBackend, когда появятся поверхности на разных высотах.
pub fn ground_detection(mut query: Query<(&Transform, &mut CharacterMotor)>) {
    for (transform, mut motor) in query.iter_mut() {
        motor.grounded = transform.translation.y <= GROUND_EPSILON;
    }
}

/// Система: gravity → velocity
pub fn apply_gravity(
    mut query: Query<(&CharacterMotor, &mut PhysicsBody)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (motor, mut body) in query.iter_mut() {
        if !motor.grounded {
            body.velocity.y += motor.gravity * delta;
        }
    }
}

/// Система: синхронизация velocity в Rapier
///
/// Rapier применяет velocity к KinematicPositionBased телам для коллизий;
/// интеграцию позиции делаем сами.
pub fn sync_velocity_to_rapier(
    mut query: Query<(&PhysicsBody, &mut Velocity), With<CharacterMotor>>,
) {
    for (body, mut rapier_velocity) in query.iter_mut() {
        rapier_velocity.linvel = body.velocity;
    }
}

/// Система: интеграция velocity → Transform
pub fn integrate_velocity_to_transform(
    mut query: Query<(&PhysicsBody, &mut Transform), With<CharacterMotor>>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (body, mut transform) in query.iter_mut() {
        transform.translation += body.velocity * delta;
    }
}

/// Plugin актуатора: вся chain в NavigationSet::Actuate
pub struct CharacterMotorPlugin;

impl Plugin for CharacterMotorPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (
                ground_detection,
                apply_gravity,
                sync_velocity_to_rapier,
                integrate_velocity_to_transform,
            )
                .chain()
                .in_set(NavigationSet::Actuate),
        );
    }
}

/// Spawn helper: entity с полным набором компонентов навигирующего персонажа
///
/// - Transform + Agent (inert до readiness push)
/// - PhysicsBody + CharacterMotor
/// - Rapier: kinematic body + capsule collider
pub fn spawn_agent_character(commands: &mut Commands, position: Vec3) -> Entity {
    let motor = CharacterMotor::default();

    commands
        .spawn((
            Transform::from_translation(position),
            Agent::default(),
            PhysicsBody::default(),
            motor,
            RigidBody::KinematicPositionBased,
            Collider::capsule_y(36.0, motor.radius),
            Velocity::default(),
        ))
        .id()
}
