//! Raycast contract против физического мира
//!
//! Simulation знает только вход (origin, direction, max distance) и выход
//! (hit position + surface normal). Игровой layer ставит physics-backed
//! backend; reference backend пересекает луч с декларированными walkable
//! поверхностями.

use bevy::prelude::*;

use crate::components::WalkableSurface;

/// Результат raycast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub position: Vec3,
    pub normal: Vec3,
}

pub trait SurfaceRaycast: Send + Sync {
    fn cast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<SurfaceHit>;
}

/// Инжектируемый raycast backend
#[derive(Resource)]
pub struct RaycastBackend(pub Box<dyn SurfaceRaycast>);

/// Reference backend: пересечение луча с walkable прямоугольниками
///
/// Попадание сверху даёт normal +Y, снизу -Y (нижняя сторона поверхности
/// не walkable — preview её отбрасывает).
#[derive(Debug, Clone, Default)]
pub struct WalkableSurfaceRaycast {
    surfaces: Vec<WalkableSurface>,
}

impl WalkableSurfaceRaycast {
    pub fn new(surfaces: Vec<WalkableSurface>) -> Self {
        Self { surfaces }
    }
}

impl SurfaceRaycast for WalkableSurfaceRaycast {
    fn cast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<SurfaceHit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO {
            return None;
        }

        let mut best: Option<(f32, SurfaceHit)> = None;

        for surface in &self.surfaces {
            // Луч параллелен плоскости поверхности
            if dir.y.abs() <= 1e-6 {
                continue;
            }

            let t = (surface.height - origin.y) / dir.y;
            if t <= 0.0 || t > max_distance {
                continue;
            }

            let point = origin + dir * t;
            if !surface.contains_xz(point.x, point.z) {
                continue;
            }

            let normal = if dir.y < 0.0 { Vec3::Y } else { Vec3::NEG_Y };
            let hit = SurfaceHit {
                position: point,
                normal,
            };

            match best {
                None => best = Some((t, hit)),
                Some((best_t, _)) if t < best_t => best = Some((t, hit)),
                _ => {}
            }
        }

        best.map(|(_, hit)| hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> WalkableSurfaceRaycast {
        WalkableSurfaceRaycast::new(vec![WalkableSurface {
            min_x: 0.0,
            min_z: -100.0,
            max_x: 1200.0,
            max_z: 100.0,
            height: 0.0,
        }])
    }

    #[test]
    fn test_hit_from_above_is_upward() {
        let hit = backend()
            .cast(Vec3::new(500.0, 300.0, 0.0), Vec3::NEG_Y, 100_000.0)
            .unwrap();
        assert_eq!(hit.position, Vec3::new(500.0, 0.0, 0.0));
        assert_eq!(hit.normal, Vec3::Y);
    }

    #[test]
    fn test_hit_from_below_is_not_upward() {
        let hit = backend()
            .cast(Vec3::new(500.0, -300.0, 0.0), Vec3::Y, 100_000.0)
            .unwrap();
        assert_eq!(hit.normal, Vec3::NEG_Y);
    }

    #[test]
    fn test_miss_outside_surface() {
        let hit = backend().cast(Vec3::new(-500.0, 300.0, 0.0), Vec3::NEG_Y, 100_000.0);
        assert!(hit.is_none());
    }

    #[test]
    fn test_miss_beyond_max_distance() {
        let hit = backend().cast(Vec3::new(500.0, 300.0, 0.0), Vec3::NEG_Y, 100.0);
        assert!(hit.is_none());
    }

    #[test]
    fn test_nearest_surface_wins() {
        let backend = WalkableSurfaceRaycast::new(vec![
            WalkableSurface {
                min_x: -100.0,
                min_z: -100.0,
                max_x: 100.0,
                max_z: 100.0,
                height: 0.0,
            },
            WalkableSurface {
                min_x: -100.0,
                min_z: -100.0,
                max_x: 100.0,
                max_z: 100.0,
                height: 50.0,
            },
        ]);

        let hit = backend
            .cast(Vec3::new(0.0, 300.0, 0.0), Vec3::NEG_Y, 100_000.0)
            .unwrap();
        assert_eq!(hit.position.y, 50.0);
    }
}
