//! NavigationPath и path search contract
//!
//! Path принадлежит ровно одному агенту. `build()` перезаписывает segment
//! sequence целиком — наружу segments отдаются только по значению/слайсу,
//! stale ссылок на прошлую последовательность существовать не может.

use core::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy::prelude::*;

use super::mesh::NavigationMesh;

/// Waypoint пути: одна точка упорядоченной последовательности
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub position: Vec3,
}

/// Планируемый путь агента
///
/// Start/end задаются перед `build()`; segments валидны до следующего
/// rebuild.
#[derive(Debug, Default)]
pub struct NavigationPath {
    pub start_point: Vec3,
    pub end_point: Vec3,
    segments: Vec<Segment>,
}

impl NavigationPath {
    /// Перестраивает segment sequence через search backend.
    ///
    /// Прошлая последовательность отбрасывается целиком.
    pub fn build(&mut self, mesh: &NavigationMesh, search: &dyn PathSearch) {
        self.segments = search.search(mesh, self.start_point, self.end_point);
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

/// Контракт path search
///
/// Выдаёт упорядоченные waypoints между start и end поверх mesh nodes.
/// Search НЕ прокладывает waypoints внутри одного traversable региона —
/// финальный отрезок до точки назначения агент проходит по прямой.
/// Пустой результат — валидный ответ ("идти напрямую"), не ошибка.
pub trait PathSearch: Send + Sync {
    fn search(&self, mesh: &NavigationMesh, start: Vec3, end: Vec3) -> Vec<Segment>;
}

/// Инжектируемый search backend
#[derive(Resource)]
pub struct PathSearchBackend(pub Box<dyn PathSearch>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    f: u32,
    g: u32,
    node: usize,
    tie: u64,
}

impl OpenNode {
    fn key(&self) -> (u32, u32, usize, u64) {
        (self.f, self.g, self.node, self.tie)
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering: BinaryHeap как min-heap
        other.key().cmp(&self.key())
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reference search: A* по центрам nodes
///
/// Waypoints — центры строго промежуточных nodes коридора (start/end nodes
/// не включаются). Детерминизм: квантованные стоимости + tie counter.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeGraphSearch;

impl NodeGraphSearch {
    fn node_path(mesh: &NavigationMesh, start: usize, goal: usize) -> Option<Vec<usize>> {
        let quant = |d: f32| -> u32 { (d.max(0.0) * 1024.0) as u32 };
        let nodes = mesh.nodes();
        let heuristic = |node: usize| -> u32 { quant(nodes[node].center.distance(nodes[goal].center)) };
        let edge_cost = |a: usize, b: usize| -> u32 {
            quant(nodes[a].center.distance(nodes[b].center)).saturating_add(1)
        };

        let n = nodes.len();
        let mut open: BinaryHeap<OpenNode> = BinaryHeap::new();
        let mut g_score = vec![u32::MAX; n];
        let mut came_from: Vec<Option<usize>> = vec![None; n];

        g_score[start] = 0;
        open.push(OpenNode {
            f: heuristic(start),
            g: 0,
            node: start,
            tie: 0,
        });
        let mut tie: u64 = 1;

        while let Some(current) = open.pop() {
            if current.node == goal {
                let mut path = vec![goal];
                let mut node = goal;
                while let Some(prev) = came_from[node] {
                    node = prev;
                    path.push(node);
                }
                path.reverse();
                return Some(path);
            }

            if current.g != g_score[current.node] {
                continue;
            }

            for &next in &nodes[current.node].neighbors {
                let tentative_g = current.g.saturating_add(edge_cost(current.node, next));
                if tentative_g >= g_score[next] {
                    continue;
                }

                came_from[next] = Some(current.node);
                g_score[next] = tentative_g;
                open.push(OpenNode {
                    f: tentative_g.saturating_add(heuristic(next)),
                    g: tentative_g,
                    node: next,
                    tie,
                });
                tie += 1;
            }
        }

        None
    }
}

impl PathSearch for NodeGraphSearch {
    fn search(&self, mesh: &NavigationMesh, start: Vec3, end: Vec3) -> Vec<Segment> {
        let (Some(start_node), Some(goal_node)) = (mesh.find_node(start), mesh.find_node(end))
        else {
            return Vec::new();
        };

        // Внутри одного региона waypoints не нужны
        if start_node == goal_node {
            return Vec::new();
        }

        let Some(node_path) = Self::node_path(mesh, start_node, goal_node) else {
            return Vec::new();
        };

        node_path[1..node_path.len() - 1]
            .iter()
            .map(|&i| Segment {
                position: mesh.nodes()[i].center,
            })
            .collect()
    }
}
