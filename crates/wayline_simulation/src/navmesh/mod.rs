//! Mesh provider: владеет navmesh сцены и раздаёт его агентам
//!
//! Generation запускается один раз на startup (кроме authoring context) и
//! по явному [`RegenerateNavmesh`]. Готовый mesh push-ится каждому агенту
//! сцены через readiness callback — агенты никогда не поллят.

use std::sync::Arc;

use bevy::prelude::*;

use crate::components::{Agent, SceneContext, WorldGeometry};
use crate::logger::log_info;

pub mod mesh;
pub mod path;

// Re-export основных типов
pub use mesh::{GeneratorBackend, NavNode, NavigationMesh, NavmeshGenerator, SurfaceTriangulator};
pub use path::{NavigationPath, NodeGraphSearch, PathSearch, PathSearchBackend, Segment};

/// Navmesh сцены (None до первой успешной generation)
///
/// Подмена ссылки — единственная мутация; агенты наблюдают её только через
/// readiness push.
#[derive(Resource, Default)]
pub struct Navmesh {
    mesh: Option<Arc<NavigationMesh>>,
}

impl Navmesh {
    pub fn mesh(&self) -> Option<&Arc<NavigationMesh>> {
        self.mesh.as_ref()
    }
}

/// Явный запрос regeneration (например, после изменения геометрии мира)
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct RegenerateNavmesh;

/// Navmesh provider plugin
pub struct NavmeshPlugin;

impl Plugin for NavmeshPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<RegenerateNavmesh>()
            .add_systems(Startup, regenerate_on_startup)
            .add_systems(Update, handle_regenerate);
    }
}

/// Система: автогенерация на startup
///
/// В authoring context generation откладывается до явного запроса.
pub fn regenerate_on_startup(
    scene: Res<SceneContext>,
    mut requests: EventWriter<RegenerateNavmesh>,
) {
    if scene.is_editor {
        return;
    }
    requests.write(RegenerateNavmesh);
}

/// Система: обработка regeneration requests
///
/// Без активного физического мира запрос молча пропускается (не ошибка,
/// "ещё не готово") — retry на стороне вызывающего. При успехе старый mesh
/// отбрасывается целиком и каждый агент сцены получает новую ссылку.
pub fn handle_regenerate(
    mut requests: EventReader<RegenerateNavmesh>,
    scene: Res<SceneContext>,
    geometry: Res<WorldGeometry>,
    generator: Res<GeneratorBackend>,
    mut navmesh: ResMut<Navmesh>,
    mut agents: Query<&mut Agent>,
) {
    for _ in requests.read() {
        if !scene.physics_active {
            continue;
        }

        let mesh = Arc::new(generator.0.generate(&geometry));
        log_info(&format!(
            "Generated navmesh... Node count: {}",
            mesh.node_count()
        ));
        navmesh.mesh = Some(Arc::clone(&mesh));

        // TODO: агенты, заспавненные после generation, остаются inert до
        // следующего regeneration — нужен late-join handshake при spawn.
        for mut agent in agents.iter_mut() {
            agent.nav_ready(Arc::clone(&mesh));
        }
    }
}
