//! Physics module: kinematic актуатор и raycast contract
//!
//! Движение и коллизии через Rapier (KinematicPositionBased), velocity
//! интегрируем сами. Raycast против сцены — инжектируемый backend.

pub mod movement;
pub mod raycast;

// Re-export основных типов
pub use movement::{
    spawn_agent_character, CharacterMotor, CharacterMotorPlugin, PhysicsBody,
};
pub use raycast::{RaycastBackend, SurfaceHit, SurfaceRaycast, WalkableSurfaceRaycast};
