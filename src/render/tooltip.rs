use std::collections::HashMap;

use crate::graph_utils::graph::{MindMapGraph, NodeId, Point};

#[derive(Clone, Debug, PartialEq)]
pub enum TooltipState {
    Idle,
    Hovering(NodeId),
}

/// What the overlay should draw, in screen coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct TooltipOverlay {
    pub content: String,
    pub x: f32,
    pub y: f32,
}

/// Follows the hovered node while it moves. Holds no rendering logic: the
/// live position and the screen projection are both supplied by the caller.
#[derive(Debug)]
pub struct TooltipCoordinator {
    state: TooltipState,
    contents: HashMap<NodeId, String>,
    overlay: Option<TooltipOverlay>,
}

impl TooltipCoordinator {
    pub fn new(graph: &MindMapGraph) -> Self {
        let contents = graph
            .nodes
            .iter()
            .filter(|n| !n.tooltip_html.trim().is_empty())
            .map(|n| (n.id.clone(), n.tooltip_html.clone()))
            .collect();
        Self { state: TooltipState::Idle, contents, overlay: None }
    }

    pub fn state(&self) -> &TooltipState { &self.state }
    pub fn overlay(&self) -> Option<&TooltipOverlay> { self.overlay.as_ref() }

    /// Idle -> Hovering(id) when the node has tooltip content. Returns whether
    /// a tooltip is now active for `id`.
    pub fn hover_enter(&mut self, id: &str) -> bool {
        if self.contents.contains_key(id) {
            self.state = TooltipState::Hovering(id.to_string());
            true
        } else {
            self.leave();
            false
        }
    }

    pub fn leave(&mut self) {
        self.state = TooltipState::Idle;
        self.overlay = None;
    }

    /// Re-read the hovered node's simulated position, project it and publish
    /// the overlay. A node that vanished from the simulation ends the hover.
    pub fn refresh<F, P>(&mut self, position_of: F, project: P) -> Option<&TooltipOverlay>
    where
        F: Fn(&str) -> Option<Point>,
        P: Fn(Point) -> Point,
    {
        let id = match &self.state {
            TooltipState::Hovering(id) => id.clone(),
            TooltipState::Idle => {
                self.overlay = None;
                return None;
            }
        };
        let (content, sim) = match (self.contents.get(&id), position_of(&id)) {
            (Some(content), Some(sim)) => (content.clone(), sim),
            _ => {
                self.leave();
                return None;
            }
        };
        let screen = project(sim);
        self.overlay = Some(TooltipOverlay { content, x: screen.x, y: screen.y });
        self.overlay.as_ref()
    }
}
