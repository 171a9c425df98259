//! Path-following агент: destination, текущий path, working set
//!
//! Агент рождается inert: mesh и path появляются только через readiness
//! callback [`Agent::nav_ready`] от mesh provider. До этого все navigation
//! системы обязаны пропускать его.

use std::sync::Arc;

use bevy::prelude::*;

use crate::navmesh::{NavigationMesh, NavigationPath, PathSearch, Segment};

/// Per-entity контроллер навигации
///
/// Working set — изменяемый пул "ещё не достигнутых" waypoints, value-copy
/// из segment sequence на момент commit. Он переживает последующие rebuilds
/// пути (snapshot semantics) и может только уменьшаться: члены удаляются
/// исключительно по proximity-arrival, обратно не добавляются.
#[derive(Component, Debug, Default)]
pub struct Agent {
    /// Shared mesh, инжектится mesh provider'ом (None до readiness)
    mesh: Option<Arc<NavigationMesh>>,
    /// Текущий path (создаётся один раз при readiness, дальше rebuild)
    path: Option<NavigationPath>,
    /// Working set: оставшиеся waypoints committed-маршрута, в порядке пути
    working_set: Vec<Segment>,
    /// Точка назначения (world space)
    destination: Vec3,
    /// Переход not-arrived → arrived уже отработан (one-shot event guard)
    arrived: bool,
}

impl Agent {
    /// Readiness callback: mesh provider передаёт сгенерированный mesh.
    ///
    /// Единственный способ для агента узнать о существовании mesh. Повторный
    /// вызов (regeneration) подменяет ссылку и сбрасывает path/working set.
    pub fn nav_ready(&mut self, mesh: Arc<NavigationMesh>) {
        self.mesh = Some(mesh);
        self.path = Some(NavigationPath::default());
        self.working_set.clear();
    }

    pub fn is_ready(&self) -> bool {
        self.path.is_some()
    }

    pub fn mesh(&self) -> Option<&Arc<NavigationMesh>> {
        self.mesh.as_ref()
    }

    pub fn destination(&self) -> Vec3 {
        self.destination
    }

    pub fn set_destination(&mut self, destination: Vec3) {
        self.destination = destination;
        self.arrived = false;
    }

    /// Segments текущего path (пусто, если path ещё не создан)
    pub fn path_segments(&self) -> &[Segment] {
        self.path.as_ref().map(|p| p.segments()).unwrap_or(&[])
    }

    /// Rebuild пути start → end через search backend.
    ///
    /// No-op до readiness. Working set НЕ трогается.
    pub fn rebuild_path(&mut self, start: Vec3, end: Vec3, search: &dyn PathSearch) {
        let Some(mesh) = self.mesh.as_ref() else {
            return;
        };
        let Some(path) = self.path.as_mut() else {
            return;
        };
        path.start_point = start;
        path.end_point = end;
        path.build(mesh, search);
    }

    pub fn clear_working_set(&mut self) {
        self.working_set.clear();
    }

    /// Commit: снять value-copy snapshot с текущей segment sequence
    pub fn commit_working_set(&mut self) {
        self.working_set.clear();
        if let Some(path) = self.path.as_ref() {
            self.working_set.extend_from_slice(path.segments());
        }
    }

    pub fn remaining_waypoints(&self) -> usize {
        self.working_set.len()
    }

    /// Текущая цель шага: первый оставшийся waypoint, иначе сам destination
    pub fn current_target(&self) -> Vec3 {
        self.working_set
            .first()
            .map(|s| s.position)
            .unwrap_or(self.destination)
    }

    /// Удаляет из working set все waypoints в радиусе `tolerance` от позиции
    pub fn consume_reached(&mut self, position: Vec3, tolerance: f32) {
        self.working_set
            .retain(|s| s.position.distance(position) > tolerance);
    }

    /// true ровно один раз на каждый переход в arrived
    pub(crate) fn mark_arrived(&mut self) -> bool {
        if self.arrived {
            return false;
        }
        self.arrived = true;
        true
    }
}
