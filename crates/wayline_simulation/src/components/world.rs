//! Контекст сцены и walkable-геометрия
//!
//! [`SceneContext`] — флаги scene registry (authoring mode, наличие
//! физического мира). [`WorldGeometry`] — декларативный snapshot walkable
//! поверхностей, из которого generator backend строит navmesh. В полной
//! игре он заполняется из physics world; в headless тестах — руками.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Флаги сцены
///
/// `is_editor` блокирует автогенерацию navmesh на startup (authoring context).
/// `physics_active == false` означает "физический мир ещё не готов" — это
/// не ошибка, regeneration просто молча откладывается до следующего вызова.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SceneContext {
    pub is_editor: bool,
    pub physics_active: bool,
}

impl Default for SceneContext {
    fn default() -> Self {
        Self {
            is_editor: false,
            physics_active: true,
        }
    }
}

/// Горизонтальный walkable прямоугольник (top surface) на высоте `height`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WalkableSurface {
    pub min_x: f32,
    pub min_z: f32,
    pub max_x: f32,
    pub max_z: f32,
    pub height: f32,
}

impl WalkableSurface {
    pub fn contains_xz(&self, x: f32, z: f32) -> bool {
        x >= self.min_x && x <= self.max_x && z >= self.min_z && z <= self.max_z
    }
}

/// Snapshot walkable-геометрии физического мира
///
/// Regeneration читает его целиком и строит mesh заново — инкрементального
/// patching нет.
#[derive(Resource, Debug, Clone, Default)]
pub struct WorldGeometry {
    pub surfaces: Vec<WalkableSurface>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_contains_xz() {
        let surface = WalkableSurface {
            min_x: 0.0,
            min_z: -100.0,
            max_x: 1200.0,
            max_z: 100.0,
            height: 0.0,
        };

        assert!(surface.contains_xz(600.0, 0.0));
        assert!(surface.contains_xz(0.0, -100.0)); // Границы включены
        assert!(!surface.contains_xz(-1.0, 0.0));
        assert!(!surface.contains_xz(600.0, 101.0));
    }

    #[test]
    fn test_scene_context_default() {
        let scene = SceneContext::default();
        assert!(!scene.is_editor);
        assert!(scene.physics_active);
    }
}
