use std::collections::{HashMap, HashSet};
use serde::Serialize;

use super::catalog::Category;
use super::style::{DashPattern, FontSpec, NodeColor, NodeShape};

// Basic type aliases for clarity
pub type NodeId = String;
pub type EdgeId = String;

/// A point in simulation (canvas) space or in screen space.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self { Self { x, y } }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeOrigin {
    Entity,
    Debt,
    CourtCase,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescriptor {
    pub id: NodeId,
    pub label: String,
    pub tooltip_html: String,
    pub shape: NodeShape,
    pub color: NodeColor,
    pub font: FontSpec,
    pub size: f32,
    pub category: Category,
    pub origin: NodeOrigin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<Point>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDescriptor {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    pub label: String,
    pub color: &'static str,
    pub dash: DashPattern,
    pub width: f32,
}

/// The materialized graph handed to the render engine. Rebuilt in full on
/// every data or visibility change.
#[derive(Clone, Debug, Default, Serialize)]
pub struct MindMapGraph {
    pub nodes: Vec<NodeDescriptor>,
    pub edges: Vec<EdgeDescriptor>,
    #[serde(skip)]
    node_index: HashMap<NodeId, usize>,
    #[serde(skip)]
    edge_ids: HashSet<EdgeId>,
}

impl MindMapGraph {
    pub fn new() -> Self { Self::default() }

    // Add a node unless its id is already taken
    pub fn add_node(&mut self, node: NodeDescriptor) -> bool {
        if self.node_index.contains_key(&node.id) {
            log::warn!("node id '{}' already materialized, skipping", node.id);
            return false;
        }
        self.node_index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    // Add an edge if both ends exist and its id is unused
    pub fn add_edge(&mut self, edge: EdgeDescriptor) -> bool {
        if !self.contains_node(&edge.from) || !self.contains_node(&edge.to) {
            return false;
        }
        if !self.edge_ids.insert(edge.id.clone()) {
            return false;
        }
        self.edges.push(edge);
        true
    }

    pub fn contains_node(&self, id: &str) -> bool { self.node_index.contains_key(id) }
    pub fn contains_edge(&self, id: &str) -> bool { self.edge_ids.contains(id) }

    pub fn get_node(&self, id: &str) -> Option<&NodeDescriptor> {
        self.node_index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.edges.len() }

    /// Edges running from `from` to `to`; the ids are copied so the iterator
    /// only borrows the graph.
    pub fn edges_between(&self, from: &str, to: &str) -> impl Iterator<Item = &EdgeDescriptor> + use<'_> {
        let (from, to) = (from.to_string(), to.to_string());
        self.edges.iter().filter(move |e| e.from == from && e.to == to)
    }

    pub fn degree(&self, id: &str) -> usize {
        self.edges.iter().filter(|e| e.from == id || e.to == id).count()
    }

    /// Store seed positions on their nodes; ids not in the graph are ignored.
    pub fn apply_seeds(&mut self, seeds: &HashMap<NodeId, Point>) {
        for node in &mut self.nodes {
            if let Some(p) = seeds.get(&node.id) {
                node.seed = Some(*p);
            }
        }
    }
}
