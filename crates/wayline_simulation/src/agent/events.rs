//! Navigation events для внешнего layer (debug draw, UI, sfx)

use bevy::prelude::*;

/// Event: candidate path перестроен в preview mode
///
/// Обрабатывается debug-render layer'ом (линии/сферы по waypoints);
/// состояния в simulation не несёт.
#[derive(Event, Debug, Clone)]
pub struct PathPreviewed {
    pub agent: Entity,
    /// Позиции segments текущего candidate path
    pub points: Vec<Vec3>,
}

/// Event: маршрут зафиксирован (команда отпущена)
#[derive(Event, Debug, Clone, Copy)]
pub struct TraversalCommitted {
    pub agent: Entity,
    pub waypoints: usize,
}

/// Event: агент достиг destination (один раз на arrival)
#[derive(Event, Debug, Clone, Copy)]
pub struct AgentArrived {
    pub agent: Entity,
}
