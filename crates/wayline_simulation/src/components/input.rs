//! Snapshot команды навигации от внешнего input layer
//!
//! ECS не опрашивает устройства ввода сам: игровой layer заполняет
//! [`CommandInput`] каждый variable-rate frame. Для headless тестов —
//! mock input через этот же resource.

use bevy::prelude::*;

/// Состояние навигационной команды за текущий frame
///
/// `held` / `pressed` / `released` — стандартная тройка edge-флагов:
/// `pressed` и `released` валидны ровно один frame, `held` — пока команда
/// удерживается. Pointer ray строится внешним layer из camera + screen
/// position и передаётся сюда уже в world space.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct CommandInput {
    /// Команда удерживается (preview mode)
    pub held: bool,
    /// Команда нажата в этом frame
    pub pressed: bool,
    /// Команда отпущена в этом frame (commit)
    pub released: bool,
    /// Начало pointer ray (world space)
    pub pointer_origin: Vec3,
    /// Направление pointer ray (не обязательно normalized)
    pub pointer_dir: Vec3,
}
