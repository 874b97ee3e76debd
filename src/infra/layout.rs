//! Deterministic 2D layouts for the network graph.
//!
//! The layout name comes straight from the command line. Every algorithm
//! maps the same graph to the same positions on every run, so repeated
//! conversions produce identical images.

use std::f32::consts::TAU;
use std::str::FromStr;

use glam::Vec2;
use thiserror::Error;

use crate::domain::graph::NetworkGraph;

const SPRING_ITERATIONS: usize = 100;
const STRESS_ITERATIONS: usize = 200;

/// Available layout algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Stress-majorized embedding of shortest-path distances.
    #[default]
    KamadaKawai,
    /// Fruchterman-Reingold force-directed iteration.
    Spring,
    /// Nodes evenly spaced on a circle.
    Circular,
    /// Concentric circles, highest-degree nodes innermost.
    Shell,
    /// Reproducible scatter.
    Random,
}

/// Unrecognized layout name on the command line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown layout '{0}' (expected kamada_kawai, spring, circular, shell, or random)")]
pub struct UnknownLayout(String);

impl FromStr for Layout {
    type Err = UnknownLayout;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "kamada_kawai" | "kamada-kawai" => Ok(Layout::KamadaKawai),
            "spring" => Ok(Layout::Spring),
            "circular" => Ok(Layout::Circular),
            "shell" => Ok(Layout::Shell),
            "random" => Ok(Layout::Random),
            _ => Err(UnknownLayout(raw.to_string())),
        }
    }
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Layout::KamadaKawai => "kamada_kawai",
            Layout::Spring => "spring",
            Layout::Circular => "circular",
            Layout::Shell => "shell",
            Layout::Random => "random",
        };
        f.write_str(name)
    }
}

impl Layout {
    /// One position per node, indexed like `graph.nodes()`. Coordinates
    /// are abstract; the renderer maps them onto the canvas.
    pub fn positions(&self, graph: &NetworkGraph) -> Vec<Vec2> {
        match self {
            Layout::KamadaKawai => kamada_kawai(graph),
            Layout::Spring => spring(graph),
            Layout::Circular => circle(graph.node_count(), 1.0),
            Layout::Shell => shells(graph),
            Layout::Random => scatter(graph.node_count()),
        }
    }
}

fn circle(n: usize, radius: f32) -> Vec<Vec2> {
    (0..n)
        .map(|i| {
            let angle = TAU * i as f32 / n.max(1) as f32;
            Vec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect()
}

/// Keyed linear congruential generator, so the scatter is stable across
/// runs and machines.
fn scatter(n: usize) -> Vec<Vec2> {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut unit = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 40) as f32 / (1u64 << 24) as f32
    };
    (0..n)
        .map(|_| Vec2::new(unit() * 2.0 - 1.0, unit() * 2.0 - 1.0))
        .collect()
}

/// One ring per degree class: substations and other hubs end up in the
/// middle, leaf meters on the rim.
fn shells(graph: &NetworkGraph) -> Vec<Vec2> {
    let degrees = node_degrees(graph);
    let mut classes = degrees.clone();
    classes.sort_unstable_by(|a, b| b.cmp(a));
    classes.dedup();
    let rings = classes.len().max(1) as f32;

    let mut positions = vec![Vec2::ZERO; degrees.len()];
    for (ring, class) in classes.iter().enumerate() {
        let members: Vec<usize> = (0..degrees.len())
            .filter(|&i| degrees[i] == *class)
            .collect();
        let radius = (ring as f32 + 1.0) / rings;
        for (slot, &node) in members.iter().enumerate() {
            let angle = TAU * slot as f32 / members.len() as f32;
            positions[node] = Vec2::new(angle.cos(), angle.sin()) * radius;
        }
    }
    positions
}

fn node_degrees(graph: &NetworkGraph) -> Vec<usize> {
    let mut degrees = vec![0usize; graph.node_count()];
    for (a, b) in graph.edge_indices() {
        degrees[a] += 1;
        if a != b {
            degrees[b] += 1;
        }
    }
    degrees
}

fn weighted_edges(graph: &NetworkGraph) -> Vec<(usize, usize, f32)> {
    graph
        .edge_indices()
        .zip(graph.edges())
        .map(|((a, b), edge)| (a, b, edge.weight as f32))
        .collect()
}

/// Fruchterman-Reingold: pairwise repulsion, attraction along edges
/// (heavier links pull harder), displacement capped by a cooling
/// temperature. Starts from the circular layout, so it is deterministic.
fn spring(graph: &NetworkGraph) -> Vec<Vec2> {
    let n = graph.node_count();
    if n <= 1 {
        return circle(n, 1.0);
    }

    let mut positions = circle(n, 1.0);
    let edges = weighted_edges(graph);
    let k = (4.0 / n as f32).sqrt();

    for iter in 0..SPRING_ITERATIONS {
        let mut disp = vec![Vec2::ZERO; n];

        for i in 0..n {
            for j in (i + 1)..n {
                let delta = positions[i] - positions[j];
                let dist = delta.length().max(1e-4);
                let push = delta / dist * (k * k / dist);
                disp[i] += push;
                disp[j] -= push;
            }
        }

        for &(a, b, weight) in &edges {
            if a == b {
                continue;
            }
            let delta = positions[a] - positions[b];
            let dist = delta.length().max(1e-4);
            let pull = delta / dist * (dist * dist / k) * weight;
            disp[a] -= pull;
            disp[b] += pull;
        }

        let temperature = 0.1 * (1.0 - iter as f32 / SPRING_ITERATIONS as f32);
        for (position, d) in positions.iter_mut().zip(&disp) {
            let len = d.length();
            if len > 1e-9 {
                *position += *d / len * len.min(temperature);
            }
        }
    }

    positions
}

/// Kamada-Kawai-style embedding: hop distances between all node pairs,
/// then SMACOF stress majorization until movement stalls.
fn kamada_kawai(graph: &NetworkGraph) -> Vec<Vec2> {
    let n = graph.node_count();
    if n <= 2 {
        return circle(n, 1.0);
    }

    let dist = hop_distances(graph);
    let mut positions = circle(n, 1.0);

    for _ in 0..STRESS_ITERATIONS {
        let mut moved = 0.0f32;
        for i in 0..n {
            let mut numer = Vec2::ZERO;
            let mut denom = 0.0f32;
            for j in 0..n {
                if i == j {
                    continue;
                }
                let d = dist[i][j];
                let w = 1.0 / (d * d);
                let delta = positions[i] - positions[j];
                let len = delta.length().max(1e-6);
                numer += (positions[j] + delta * (d / len)) * w;
                denom += w;
            }
            if denom > 0.0 {
                let next = numer / denom;
                moved += (next - positions[i]).length();
                positions[i] = next;
            }
        }
        if moved < 1e-4 {
            break;
        }
    }

    positions
}

/// BFS hop distances between all node pairs. Nodes in different
/// components are held `n` hops apart, which keeps islands separated
/// without distorting the rest of the embedding.
fn hop_distances(graph: &NetworkGraph) -> Vec<Vec<f32>> {
    let n = graph.node_count();
    let mut adjacency = vec![Vec::new(); n];
    for (a, b) in graph.edge_indices() {
        if a != b {
            adjacency[a].push(b);
            adjacency[b].push(a);
        }
    }

    let mut dist = vec![vec![n as f32; n]; n];
    let mut queue = std::collections::VecDeque::new();
    for start in 0..n {
        dist[start][start] = 0.0;
        queue.clear();
        queue.push_back(start);
        while let Some(node) = queue.pop_front() {
            for &next in &adjacency[node] {
                if dist[start][next] >= n as f32 {
                    dist[start][next] = dist[start][node] + 1.0;
                    queue.push_back(next);
                }
            }
        }
    }
    dist
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::{GraphOptions, build_graph};
    use crate::domain::model::ParsedModel;
    use serde_json::json;

    fn path_graph() -> NetworkGraph {
        // n1 - n2 - n3: the middle node has degree 2.
        let model: ParsedModel = serde_json::from_value(json!({
            "objects": {
                "n1": {"id": 1, "phases": "A"},
                "n2": {"id": 2, "phases": "B"},
                "n3": {"id": 3, "phases": "C"},
                "l1": {"id": 4, "from": "n1", "to": "n2", "phases": "AB",
                       "power_out": "1000 VA"},
                "l2": {"id": 5, "from": "n2", "to": "n3", "phases": "BC",
                       "power_out": "2000 VA"}
            }
        }))
        .expect("valid model");
        build_graph(&model, &GraphOptions::default()).expect("valid graph")
    }

    #[test]
    fn layout_names_round_trip() {
        for name in ["kamada_kawai", "spring", "circular", "shell", "random"] {
            let layout: Layout = name.parse().expect("known layout");
            assert_eq!(layout.to_string(), name);
        }
        assert!("planar".parse::<Layout>().is_err());
    }

    #[test]
    fn every_layout_is_deterministic() {
        let graph = path_graph();
        for layout in [
            Layout::KamadaKawai,
            Layout::Spring,
            Layout::Circular,
            Layout::Shell,
            Layout::Random,
        ] {
            let first = layout.positions(&graph);
            let second = layout.positions(&graph);
            assert_eq!(first, second, "{layout} must be deterministic");
            assert_eq!(first.len(), graph.node_count());
            assert!(
                first.iter().all(|p| p.x.is_finite() && p.y.is_finite()),
                "{layout} produced a non-finite position"
            );
        }
    }

    #[test]
    fn circular_spreads_nodes_on_the_unit_circle() {
        let positions = circle(4, 1.0);
        for p in &positions {
            assert!((p.length() - 1.0).abs() < 1e-5);
        }
        assert!((positions[0] - positions[2]).length() > 1.9);
    }

    #[test]
    fn stress_layout_separates_the_path_ends() {
        let graph = path_graph();
        let positions = Layout::KamadaKawai.positions(&graph);
        let end_to_mid = (positions[0] - positions[1]).length();
        let end_to_end = (positions[0] - positions[2]).length();
        assert!(
            end_to_end > end_to_mid,
            "two-hop pair must sit further apart than a one-hop pair"
        );
    }

    #[test]
    fn shell_puts_the_hub_inside() {
        let graph = path_graph();
        let positions = Layout::Shell.positions(&graph);
        let hub = positions[1].length();
        assert!(hub < positions[0].length());
        assert!(hub < positions[2].length());
    }

    #[test]
    fn scatter_is_spread_out() {
        let positions = scatter(16);
        assert_eq!(positions.len(), 16);
        for (i, a) in positions.iter().enumerate() {
            assert!(a.x.abs() <= 1.0 && a.y.abs() <= 1.0);
            for b in &positions[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
