use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::graph::{MindMapGraph, NodeId, Point};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSeedConfig {
    // radius of the ring that component centres sit on
    pub component_radius: f32,
    // local radius grows by this much per member ...
    pub node_spacing: f32,
    // ... up to this cap
    pub max_local_radius: f32,
}

impl Default for LayoutSeedConfig {
    fn default() -> Self {
        Self { component_radius: 600.0, node_spacing: 40.0, max_local_radius: 260.0 }
    }
}

/// Connected components of the built graph, edge direction ignored.
/// Components are numbered in order of their first node in the graph.
#[derive(Clone, Debug, Default)]
pub struct Components {
    component_of: HashMap<NodeId, usize>,
    members: Vec<Vec<NodeId>>,
}

impl Components {
    pub fn component_of(&self, id: &str) -> Option<usize> { self.component_of.get(id).copied() }
    pub fn len(&self) -> usize { self.members.len() }
    pub fn is_empty(&self) -> bool { self.members.is_empty() }
    pub fn members(&self, component: usize) -> &[NodeId] {
        self.members.get(component).map(Vec::as_slice).unwrap_or(&[])
    }
    pub fn iter(&self) -> impl Iterator<Item = &[NodeId]> { self.members.iter().map(Vec::as_slice) }
}

/// Depth-first labelling over an adjacency list built once per call. An
/// explicit stack keeps deep chains from exhausting the call stack.
pub fn connected_components(graph: &MindMapGraph) -> Components {
    let index: HashMap<&str, usize> = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();
    let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); graph.nodes.len()];
    for edge in &graph.edges {
        if let (Some(&a), Some(&b)) = (index.get(edge.from.as_str()), index.get(edge.to.as_str())) {
            neighbors[a].push(b);
            neighbors[b].push(a);
        }
    }

    let mut component: Vec<Option<usize>> = vec![None; graph.nodes.len()];
    let mut out = Components::default();
    for start in 0..graph.nodes.len() {
        if component[start].is_some() {
            continue;
        }
        let cid = out.members.len();
        let mut members: Vec<NodeId> = Vec::new();
        let mut stack = vec![start];
        component[start] = Some(cid);
        while let Some(u) = stack.pop() {
            members.push(graph.nodes[u].id.clone());
            // reversed so neighbours are visited in edge order
            for &v in neighbors[u].iter().rev() {
                if component[v].is_none() {
                    component[v] = Some(cid);
                    stack.push(v);
                }
            }
        }
        for id in &members {
            out.component_of.insert(id.clone(), cid);
        }
        out.members.push(members);
    }
    out
}

/// Seed positions that keep components apart: component centres on a ring,
/// members on a small circle around their centre. A lone component sits at
/// the origin.
pub fn seed_positions(components: &Components, config: &LayoutSeedConfig) -> HashMap<NodeId, Point> {
    let mut out: HashMap<NodeId, Point> = HashMap::new();
    let count = components.len();
    if count == 0 {
        return out;
    }
    for (ci, members) in components.iter().enumerate() {
        let center = if count == 1 {
            Point::new(0.0, 0.0)
        } else {
            let angle = std::f32::consts::TAU * ci as f32 / count as f32;
            Point::new(config.component_radius * angle.cos(), config.component_radius * angle.sin())
        };
        let size = members.len();
        if size == 1 {
            out.insert(members[0].clone(), center);
            continue;
        }
        let local_r = (size as f32 * config.node_spacing).min(config.max_local_radius);
        for (i, id) in members.iter().enumerate() {
            let angle = std::f32::consts::TAU * i as f32 / size as f32;
            out.insert(id.clone(), Point::new(center.x + local_r * angle.cos(), center.y + local_r * angle.sin()));
        }
    }
    out
}
