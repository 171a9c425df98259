//! NavigationMesh: baked walkable-surface representation
//!
//! Mesh — плоский список треугольных nodes с adjacency по shared edges.
//! Агенты держат его через `Arc` и никогда не мутируют; regeneration
//! строит новый mesh целиком и атомарно подменяет ссылку.

use bevy::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::components::WorldGeometry;

/// Один node навигационного mesh (треугольник walkable поверхности)
#[derive(Debug, Clone)]
pub struct NavNode {
    pub center: Vec3,
    pub verts: [Vec3; 3],
    /// Индексы соседних nodes (shared edge)
    pub neighbors: Vec<usize>,
}

/// Walkable-surface representation для path queries
///
/// Инвариант: adjacency симметрична (если a сосед b, то b сосед a).
#[derive(Debug, Clone, Default)]
pub struct NavigationMesh {
    nodes: Vec<NavNode>,
}

impl NavigationMesh {
    /// Строит mesh из набора непересекающихся треугольников.
    ///
    /// Adjacency выводится из bit-exact совпадения вершин shared edge,
    /// поэтому generator обязан выдавать соседние треугольники с
    /// идентичными координатами вершин.
    pub fn from_triangles(tris: Vec<[Vec3; 3]>) -> Self {
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
        struct VertexKey(u32, u32, u32);

        impl VertexKey {
            fn from_vec3(p: Vec3) -> Self {
                Self(p.x.to_bits(), p.y.to_bits(), p.z.to_bits())
            }
        }

        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
        struct EdgeKey(VertexKey, VertexKey);

        impl EdgeKey {
            fn new(a: Vec3, b: Vec3) -> Self {
                let ka = VertexKey::from_vec3(a);
                let kb = VertexKey::from_vec3(b);
                if ka <= kb {
                    Self(ka, kb)
                } else {
                    Self(kb, ka)
                }
            }
        }

        use std::collections::BTreeMap;
        let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); tris.len()];
        let mut edge_map: BTreeMap<EdgeKey, usize> = BTreeMap::new();

        for (tri_idx, tri) in tris.iter().enumerate() {
            for (a, b) in tri_edges(tri) {
                let key = EdgeKey::new(a, b);
                if let Some(other_tri) = edge_map.remove(&key) {
                    neighbors[tri_idx].push(other_tri);
                    neighbors[other_tri].push(tri_idx);
                } else {
                    edge_map.insert(key, tri_idx);
                }
            }
        }

        let nodes = tris
            .into_iter()
            .zip(neighbors)
            .map(|(verts, neighbors)| NavNode {
                center: (verts[0] + verts[1] + verts[2]) / 3.0,
                verts,
                neighbors,
            })
            .collect();

        Self { nodes }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[NavNode] {
        &self.nodes
    }

    /// Ищет node, содержащий точку (projection на XZ plane)
    pub fn find_node(&self, p: Vec3) -> Option<usize> {
        self.nodes
            .iter()
            .position(|node| point_in_triangle_xz(p, &node.verts))
    }
}

fn tri_edges(tri: &[Vec3; 3]) -> [(Vec3, Vec3); 3] {
    [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])]
}

fn cross_xz(a: Vec3, b: Vec3) -> f32 {
    a.x * b.z - a.z * b.x
}

fn tri_area2_xz(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    cross_xz(b - a, c - a)
}

fn point_in_triangle_xz(p: Vec3, tri: &[Vec3; 3]) -> bool {
    let eps = 1e-4;
    let ab = tri_area2_xz(tri[0], tri[1], p);
    let bc = tri_area2_xz(tri[1], tri[2], p);
    let ca = tri_area2_xz(tri[2], tri[0], p);
    let has_neg = ab < -eps || bc < -eps || ca < -eps;
    let has_pos = ab > eps || bc > eps || ca > eps;
    !(has_neg && has_pos)
}

// Serde-представление: только треугольники, adjacency восстанавливается
// при загрузке (так baked data не может разъехаться с топологией).
#[derive(Serialize, Deserialize)]
struct NavigationMeshSerde {
    tris: Vec<[[f32; 3]; 3]>,
}

impl Serialize for NavigationMesh {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        NavigationMeshSerde {
            tris: self
                .nodes
                .iter()
                .map(|n| n.verts.map(|v| [v.x, v.y, v.z]))
                .collect(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NavigationMesh {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let data = NavigationMeshSerde::deserialize(deserializer)?;
        Ok(NavigationMesh::from_triangles(
            data.tris
                .into_iter()
                .map(|t| t.map(|[x, y, z]| Vec3::new(x, y, z)))
                .collect(),
        ))
    }
}

/// Контракт генерации navmesh из snapshot физического мира
///
/// Синхронная и потенциально дорогая операция; вызывается не чаще одного
/// раза на regeneration request.
pub trait NavmeshGenerator: Send + Sync {
    fn generate(&self, geometry: &WorldGeometry) -> NavigationMesh;
}

/// Инжектируемый generator backend
#[derive(Resource)]
pub struct GeneratorBackend(pub Box<dyn NavmeshGenerator>);

/// Reference generator: триангуляция walkable прямоугольников grid-ячейками
///
/// Каждая ячейка `cell_size × cell_size` даёт два треугольника. Координаты
/// границ ячеек считаются один раз на ось, чтобы соседние ячейки делили
/// bit-exact вершины (требование adjacency в [`NavigationMesh`]).
#[derive(Debug, Clone, Copy)]
pub struct SurfaceTriangulator {
    pub cell_size: f32,
}

impl Default for SurfaceTriangulator {
    fn default() -> Self {
        Self { cell_size: 100.0 }
    }
}

impl SurfaceTriangulator {
    fn axis_steps(min: f32, max: f32, cell: f32) -> Vec<f32> {
        let span = (max - min).max(0.0);
        let count = (span / cell).ceil().max(1.0) as usize;
        let mut steps: Vec<f32> = (0..count).map(|i| min + i as f32 * cell).collect();
        steps.push(max);
        steps
    }
}

impl NavmeshGenerator for SurfaceTriangulator {
    fn generate(&self, geometry: &WorldGeometry) -> NavigationMesh {
        let mut tris = Vec::new();

        for surface in &geometry.surfaces {
            let xs = Self::axis_steps(surface.min_x, surface.max_x, self.cell_size);
            let zs = Self::axis_steps(surface.min_z, surface.max_z, self.cell_size);
            let h = surface.height;

            for ix in 0..xs.len() - 1 {
                for iz in 0..zs.len() - 1 {
                    let a = Vec3::new(xs[ix], h, zs[iz]);
                    let b = Vec3::new(xs[ix + 1], h, zs[iz]);
                    let c = Vec3::new(xs[ix + 1], h, zs[iz + 1]);
                    let d = Vec3::new(xs[ix], h, zs[iz + 1]);
                    tris.push([a, b, c]);
                    tris.push([a, c, d]);
                }
            }
        }

        NavigationMesh::from_triangles(tris)
    }
}
