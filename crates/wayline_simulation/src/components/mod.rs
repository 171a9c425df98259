//! ECS Components и resources симуляции
//!
//! Организация по доменам:
//! - agent: path-following агент (destination, path, working set)
//! - input: snapshot команды от внешнего input layer (CommandInput)
//! - world: контекст сцены и walkable-геометрия (SceneContext, WorldGeometry)

pub mod agent;
pub mod input;
pub mod world;

// Re-exports для удобного импорта
pub use agent::*;
pub use input::*;
pub use world::*;
