use uuid::Uuid;

use super::tooltip::{TooltipCoordinator, TooltipOverlay};
use super::{EngineEvent, EngineOptions, RenderEngine};
use crate::graph_utils::graph::{MindMapGraph, NodeId};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LayoutPhase {
    Stabilizing { iterations: u32, total: u32 },
    Settled,
}

/// Exclusive owner of one engine instance, from construction after data
/// arrives until `close()` (or drop) before a rebuild or on teardown.
pub struct GraphSession<E: RenderEngine> {
    id: Uuid,
    engine: Option<E>,
    options: EngineOptions,
    phase: LayoutPhase,
    tooltip: TooltipCoordinator,
    dragging: Vec<NodeId>,
}

impl<E: RenderEngine> GraphSession<E> {
    pub fn open(mut engine: E, graph: &MindMapGraph, options: EngineOptions) -> Self {
        let id = Uuid::now_v7();
        engine.set_options(&options);
        engine.set_data(graph);
        engine.fit(false);
        log::info!(
            "graph session {} opened: {} nodes, {} edges",
            id,
            graph.node_count(),
            graph.edge_count()
        );
        let phase = LayoutPhase::Stabilizing { iterations: 0, total: options.stabilization_iterations };
        Self {
            id,
            engine: Some(engine),
            options,
            phase,
            tooltip: TooltipCoordinator::new(graph),
            dragging: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn phase(&self) -> LayoutPhase { self.phase }
    pub fn options(&self) -> &EngineOptions { &self.options }
    pub fn tooltip(&self) -> &TooltipCoordinator { &self.tooltip }
    pub fn overlay(&self) -> Option<&TooltipOverlay> { self.tooltip.overlay() }
    pub fn dragging(&self) -> &[NodeId] { &self.dragging }
    pub fn is_open(&self) -> bool { self.engine.is_some() }

    pub fn engine(&self) -> Option<&E> { self.engine.as_ref() }
    pub fn engine_mut(&mut self) -> Option<&mut E> { self.engine.as_mut() }

    pub fn fit(&mut self, animate: bool) {
        if let Some(engine) = self.engine.as_mut() {
            engine.fit(animate);
            engine.redraw();
        }
    }

    /// React to one engine callback. Returns the tooltip overlay to draw, if any.
    pub fn handle_event(&mut self, event: EngineEvent) -> Option<TooltipOverlay> {
        match event {
            EngineEvent::StabilizationProgress { iterations, total } => {
                if self.phase != LayoutPhase::Settled {
                    self.phase = LayoutPhase::Stabilizing { iterations, total };
                    log::debug!("session {} stabilizing {}/{}", self.id, iterations, total);
                }
            }
            EngineEvent::StabilizationEnd => self.settle(),
            EngineEvent::HoverNode(id) => {
                self.tooltip.hover_enter(&id);
            }
            EngineEvent::BlurNode(_) => self.tooltip.leave(),
            EngineEvent::DragStart(ids) => self.dragging = ids,
            EngineEvent::DragEnd(_) => self.dragging.clear(),
            EngineEvent::PointerMove(_) | EngineEvent::Tick => {}
        }
        self.refresh_tooltip()
    }

    fn settle(&mut self) {
        if self.phase == LayoutPhase::Settled {
            return;
        }
        self.phase = LayoutPhase::Settled;
        self.options = self.options.settled();
        if let Some(engine) = self.engine.as_mut() {
            engine.set_options(&self.options);
            engine.fit(true);
            engine.redraw();
        }
        log::info!("session {} stabilized, switched to low-energy physics", self.id);
    }

    fn refresh_tooltip(&mut self) -> Option<TooltipOverlay> {
        let engine = self.engine.as_ref()?;
        self.tooltip
            .refresh(
                |id| engine.positions(&[id]).remove(id),
                |p| engine.canvas_to_dom(p),
            )
            .cloned()
    }

    pub fn close(mut self) { self.shutdown(); }

    fn shutdown(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.destroy();
            log::info!("graph session {} closed", self.id);
        }
    }
}

impl<E: RenderEngine> Drop for GraphSession<E> {
    fn drop(&mut self) { self.shutdown(); }
}
