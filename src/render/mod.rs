// Boundary to the force-directed render/physics engine. The engine owns its
// animation loop; this side only feeds it data/options and reacts to events.

pub mod session;
pub mod tooltip;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::graph_utils::graph::{MindMapGraph, NodeId, Point};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicsOptions {
    // preferred edge length in world units
    pub spring_length: f32,
    pub spring_stiffness: f32,
    pub repulsion: f32,
    // pairs closer than this push apart
    pub min_separation: f32,
    // velocity damping (1/s)
    pub damping: f32,
    pub max_speed: f32,
    // low-energy mode: only dragged nodes move
    pub freeze_settled: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineOptions {
    pub physics: PhysicsOptions,
    // iterations the engine may spend in the initial high-energy phase
    pub stabilization_iterations: u32,
    pub smooth_edges: bool,
    pub drag_nodes: bool,
    pub hover: bool,
}

impl EngineOptions {
    /// Initial high-energy phase: strong forces, bounded iteration count.
    pub fn stabilizing(iterations: u32) -> Self {
        Self {
            physics: PhysicsOptions {
                spring_length: 140.0,
                spring_stiffness: 4.0,
                repulsion: 10.0,
                min_separation: 110.0,
                damping: 6.0,
                max_speed: 600.0,
                freeze_settled: false,
            },
            stabilization_iterations: iterations,
            smooth_edges: true,
            drag_nodes: true,
            hover: true,
        }
    }

    /// Permanent low-energy mode after stabilization: settled nodes stay put,
    /// edges still reroute when a node is dragged.
    pub fn settled(&self) -> Self {
        Self {
            physics: PhysicsOptions {
                spring_stiffness: 0.5,
                repulsion: 1.0,
                damping: 20.0,
                max_speed: 120.0,
                freeze_settled: true,
                ..self.physics
            },
            stabilization_iterations: 0,
            ..self.clone()
        }
    }

    pub fn is_low_energy(&self) -> bool { self.physics.freeze_settled }
}

impl Default for EngineOptions {
    fn default() -> Self { Self::stabilizing(300) }
}

#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    HoverNode(NodeId),
    BlurNode(NodeId),
    StabilizationProgress { iterations: u32, total: u32 },
    StabilizationEnd,
    DragStart(Vec<NodeId>),
    DragEnd(Vec<NodeId>),
    PointerMove(Point),
    // a frame was drawn; simulated positions may have moved
    Tick,
}

/// Handle to a constructed engine instance.
pub trait RenderEngine {
    fn set_data(&mut self, graph: &MindMapGraph);
    fn set_options(&mut self, options: &EngineOptions);
    fn fit(&mut self, animate: bool);
    /// Current simulated coordinates for the requested nodes; unknown ids are absent.
    fn positions(&self, ids: &[&str]) -> HashMap<NodeId, Point>;
    /// Project a simulation coordinate to screen coordinates.
    fn canvas_to_dom(&self, point: Point) -> Point;
    fn redraw(&mut self);
    fn destroy(&mut self);
}
