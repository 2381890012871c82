use std::collections::HashMap;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke, Vec2};

use crate::graph_utils::graph::{MindMapGraph, NodeId, Point};
use crate::graph_utils::style::{DashPattern, NodeShape};
use crate::render::{EngineEvent, EngineOptions, RenderEngine};

// Simulation steps per frame while stabilizing, at a fixed dt
const STEPS_PER_FRAME: u32 = 5;
const STEP_DT: f32 = 0.016;
// Kinetic energy below this ends stabilization early
const REST_ENERGY: f32 = 0.5;

pub(crate) fn hex(c: &str) -> Color32 {
    Color32::from_hex(c).unwrap_or(Color32::GRAY)
}

struct CanvasNode {
    id: NodeId,
    label: String,
    shape: NodeShape,
    fill: Color32,
    stroke: Color32,
    text: Color32,
    font_size: f32,
    size: f32,
    pos: Pos2,
    vel: Vec2,
}

struct CanvasEdge {
    from: usize,
    to: usize,
    label: String,
    color: Color32,
    dash: DashPattern,
    width: f32,
}

/// egui-painted stand-in for a force-directed network view. World coordinates
/// are the simulation coordinates; the origin maps to the canvas centre.
pub struct CanvasEngine {
    nodes: Vec<CanvasNode>,
    index: HashMap<NodeId, usize>,
    edges: Vec<CanvasEdge>,
    options: EngineOptions,
    iterations: u32,
    stabilized: bool,
    pan: Vec2,
    zoom: f32,
    viewport: Rect,
    fit_pending: bool,
    // screen rects from the last frame, for hit testing
    hit_rects: Vec<Rect>,
    hovered: Option<usize>,
    dragging: Option<usize>,
    last_pointer: Option<Pos2>,
    destroyed: bool,
}

impl Default for CanvasEngine {
    fn default() -> Self { Self::new() }
}

impl CanvasEngine {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            edges: Vec::new(),
            options: EngineOptions::default(),
            iterations: 0,
            stabilized: false,
            pan: Vec2::ZERO,
            zoom: 1.0,
            viewport: Rect::NOTHING,
            fit_pending: true,
            hit_rects: Vec::new(),
            hovered: None,
            dragging: None,
            last_pointer: None,
            destroyed: false,
        }
    }

    /// Lay the canvas out in `rect`; a pending fit applies once it has area.
    pub fn set_viewport(&mut self, rect: Rect) {
        self.viewport = rect;
        if self.fit_pending {
            self.apply_fit();
        }
    }

    /// Scroll-wheel zoom. Returns true when the scale changed.
    pub fn zoom_by(&mut self, scroll: f32) -> bool {
        if scroll == 0.0 {
            return false;
        }
        let factor = (1.0 + scroll * 0.001).clamp(0.9, 1.1);
        let zoom = (self.zoom * factor).clamp(0.1, 3.0);
        let changed = zoom != self.zoom;
        self.zoom = zoom;
        changed
    }

    pub fn pan_by(&mut self, delta: Vec2) -> bool {
        self.pan += delta;
        delta != Vec2::ZERO
    }

    fn to_screen(&self, p: Pos2) -> Pos2 {
        self.viewport.center() + self.pan + p.to_vec2() * self.zoom
    }

    fn from_screen(&self, p: Pos2) -> Pos2 {
        ((p - self.viewport.center() - self.pan) / self.zoom).to_pos2()
    }

    fn apply_fit(&mut self) {
        if self.nodes.is_empty() || !self.viewport.is_positive() {
            return;
        }
        let mut bounds = Rect::NOTHING;
        for n in &self.nodes {
            bounds.extend_with(n.pos);
        }
        let bounds = bounds.expand(60.0);
        let zx = self.viewport.width() / bounds.width().max(1.0);
        let zy = self.viewport.height() / bounds.height().max(1.0);
        self.zoom = zx.min(zy).clamp(0.1, 2.0);
        self.pan = -bounds.center().to_vec2() * self.zoom;
        self.fit_pending = false;
    }

    fn node_at(&self, screen: Pos2) -> Option<usize> {
        // last drawn is on top
        self.hit_rects.iter().rposition(|r| r.contains(screen))
    }

    /// One integration step. While stabilizing all nodes move; in low-energy
    /// mode only the dragged node does.
    fn step(&mut self, dt: f32, pointer_world: Option<Pos2>) -> f32 {
        let phys = self.options.physics;
        let mut forces = vec![Vec2::ZERO; self.nodes.len()];
        let low_energy = phys.freeze_settled;

        if !low_energy {
            // Edge springs: attract if stretched, repel if compressed
            for e in &self.edges {
                let d = self.nodes[e.to].pos - self.nodes[e.from].pos;
                let dist = d.length();
                if dist > 1e-3 {
                    let f = d / dist * (phys.spring_stiffness * (dist - phys.spring_length));
                    forces[e.from] += f;
                    forces[e.to] -= f;
                }
            }
            // Soft separation for close pairs (O(N^2), graphs are one matter in size)
            for i in 0..self.nodes.len() {
                for j in (i + 1)..self.nodes.len() {
                    let d = self.nodes[j].pos - self.nodes[i].pos;
                    let dist = d.length();
                    if dist > 1e-3 && dist < phys.min_separation {
                        let f = d / dist * (phys.repulsion * (phys.min_separation - dist));
                        forces[i] -= f;
                        forces[j] += f;
                    }
                }
            }
        }
        // Drag: spring the dragged node toward the pointer
        if let (Some(i), Some(target)) = (self.dragging, pointer_world) {
            forces[i] += (target - self.nodes[i].pos) * 20.0;
        }

        let mut energy = 0.0;
        for (i, node) in self.nodes.iter_mut().enumerate() {
            if low_energy && Some(i) != self.dragging {
                node.vel = Vec2::ZERO;
                continue;
            }
            let mut v = node.vel + (forces[i] - node.vel * phys.damping) * dt;
            let speed = v.length();
            if speed > phys.max_speed {
                v *= phys.max_speed / speed;
            }
            node.pos += v * dt;
            node.vel = v;
            energy += 0.5 * v.length_sq();
        }
        energy
    }

    /// Paint the network into the remaining space and advance the simulation.
    /// Returns the events raised this frame, in order.
    pub fn show(&mut self, ui: &mut egui::Ui) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        if self.destroyed {
            return events;
        }
        let (rect, resp) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        self.set_viewport(rect);

        let pointer = ui.input(|i| i.pointer.hover_pos()).filter(|p| rect.contains(*p));
        if pointer != self.last_pointer {
            if let Some(p) = pointer {
                events.push(EngineEvent::PointerMove(Point::new(p.x, p.y)));
            }
            self.last_pointer = pointer;
        }

        // Zoom with scroll only when pointer is over the canvas area.
        // Pan and zoom move every projection, so they count as a tick.
        let mut view_changed = false;
        if resp.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            view_changed |= self.zoom_by(scroll);
        }

        // Hover enter/leave
        let hovered = if self.dragging.is_some() { self.hovered } else { pointer.and_then(|p| self.node_at(p)) };
        if hovered != self.hovered {
            if let Some(old) = self.hovered {
                events.push(EngineEvent::BlurNode(self.nodes[old].id.clone()));
            }
            if let Some(new) = hovered {
                events.push(EngineEvent::HoverNode(self.nodes[new].id.clone()));
            }
            self.hovered = hovered;
        }

        // Node drag vs background pan
        if resp.drag_started() && self.options.drag_nodes {
            if let Some(i) = resp.interact_pointer_pos().and_then(|p| self.node_at(p)) {
                self.dragging = Some(i);
                events.push(EngineEvent::DragStart(vec![self.nodes[i].id.clone()]));
            }
        }
        if resp.dragged() && self.dragging.is_none() {
            view_changed |= self.pan_by(resp.drag_delta());
        }
        if resp.drag_stopped() {
            if let Some(i) = self.dragging.take() {
                events.push(EngineEvent::DragEnd(vec![self.nodes[i].id.clone()]));
            }
        }

        // Simulation
        let pointer_world = ui.input(|i| i.pointer.latest_pos()).map(|p| self.from_screen(p));
        let mut moved = false;
        if !self.stabilized {
            let total = self.options.stabilization_iterations;
            let mut energy = f32::INFINITY;
            for _ in 0..STEPS_PER_FRAME {
                if self.iterations >= total {
                    break;
                }
                energy = self.step(STEP_DT, pointer_world);
                self.iterations += 1;
            }
            moved = true;
            events.push(EngineEvent::StabilizationProgress { iterations: self.iterations, total });
            if self.iterations >= total || energy < REST_ENERGY {
                self.stabilized = true;
                events.push(EngineEvent::StabilizationEnd);
            }
        } else if self.dragging.is_some() {
            let dt = ui.input(|i| i.stable_dt).clamp(0.001, 0.033);
            self.step(dt, pointer_world);
            moved = true;
        }
        if moved || view_changed {
            events.push(EngineEvent::Tick);
            ui.ctx().request_repaint();
        }

        self.paint(ui, rect);
        events
    }

    fn paint(&mut self, ui: &egui::Ui, rect: Rect) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_rgb(250, 250, 250));
        let zoom = self.zoom;

        for e in &self.edges {
            let a = self.to_screen(self.nodes[e.from].pos);
            let b = self.to_screen(self.nodes[e.to].pos);
            let stroke = Stroke::new((e.width * zoom).clamp(0.5, 4.0), e.color);
            match e.dash.segments() {
                Some((dash, gap)) => {
                    painter.extend(Shape::dashed_line(&[a, b], stroke, dash * zoom.max(0.5), gap * zoom.max(0.5)));
                }
                None => {
                    painter.line_segment([a, b], stroke);
                }
            }
            // arrow head just short of the target node
            let dir = b - a;
            let len = dir.length();
            if len > 1.0 {
                let u = dir / len;
                let tip = b - u * (self.nodes[e.to].size * 0.5 * zoom + 2.0);
                let n = Vec2::new(-u.y, u.x);
                let head = 8.0 * zoom.clamp(0.5, 1.5);
                painter.add(Shape::convex_polygon(
                    vec![tip, tip - u * head + n * head * 0.5, tip - u * head - n * head * 0.5],
                    e.color,
                    Stroke::NONE,
                ));
            }
            if zoom >= 0.6 && !e.label.is_empty() {
                let mid = a + dir * 0.5;
                let font = FontId::proportional((11.0 * zoom).clamp(8.0, 14.0));
                let galley = painter.layout_no_wrap(e.label.clone(), font, Color32::from_rgb(60, 60, 60));
                let pill = Rect::from_center_size(mid, galley.size() + Vec2::new(6.0, 2.0));
                painter.rect_filled(pill, 4.0, Color32::from_rgba_unmultiplied(255, 255, 255, 220));
                painter.galley(pill.center() - galley.size() * 0.5, galley, Color32::BLACK);
            }
        }

        self.hit_rects.clear();
        for (i, n) in self.nodes.iter().enumerate() {
            let c = self.to_screen(n.pos);
            let r = (n.size * 0.5 * zoom).max(3.0);
            let highlight = self.hovered == Some(i) || self.dragging == Some(i);
            let stroke = Stroke::new(if highlight { 3.0 } else { 1.5 }, n.stroke);
            let font = FontId::proportional((n.font_size * zoom).clamp(8.0, 22.0));
            let hit = match n.shape {
                NodeShape::Box | NodeShape::Ellipse => {
                    let galley = painter.layout_no_wrap(n.label.clone(), font, n.text);
                    let body = Rect::from_center_size(c, galley.size() + Vec2::new(12.0, 8.0) * zoom.max(0.5));
                    let rounding = if n.shape == NodeShape::Box { 4.0 } else { body.height() * 0.5 };
                    painter.rect_filled(body, rounding, n.fill);
                    painter.rect_stroke(body, rounding, stroke, egui::StrokeKind::Inside);
                    painter.galley(body.center() - galley.size() * 0.5, galley, n.text);
                    body
                }
                shape => {
                    match shape {
                        NodeShape::Diamond => painter.add(Shape::convex_polygon(
                            vec![c + Vec2::new(0.0, -r), c + Vec2::new(r, 0.0), c + Vec2::new(0.0, r), c + Vec2::new(-r, 0.0)],
                            n.fill,
                            stroke,
                        )),
                        NodeShape::Triangle => painter.add(Shape::convex_polygon(
                            vec![c + Vec2::new(0.0, -r), c + Vec2::new(r * 0.87, r * 0.5), c + Vec2::new(-r * 0.87, r * 0.5)],
                            n.fill,
                            stroke,
                        )),
                        NodeShape::Hexagon => painter.add(Shape::convex_polygon(
                            (0..6)
                                .map(|k| {
                                    let a = std::f32::consts::TAU * k as f32 / 6.0;
                                    c + Vec2::new(r * a.cos(), r * a.sin())
                                })
                                .collect(),
                            n.fill,
                            stroke,
                        )),
                        NodeShape::Square => {
                            let sq = Rect::from_center_size(c, Vec2::splat(r * 2.0));
                            painter.rect_filled(sq, 0.0, n.fill);
                            painter.rect_stroke(sq, 0.0, stroke, egui::StrokeKind::Inside)
                        }
                        _ => {
                            painter.circle_filled(c, r, n.fill);
                            painter.circle_stroke(c, r, stroke)
                        }
                    };
                    if !n.label.is_empty() {
                        painter.text(c + Vec2::new(0.0, r + 3.0), Align2::CENTER_TOP, &n.label, font, n.text);
                    }
                    Rect::from_center_size(c, Vec2::splat(r * 2.0))
                }
            };
            self.hit_rects.push(hit);
        }
    }
}

impl RenderEngine for CanvasEngine {
    fn set_data(&mut self, graph: &MindMapGraph) {
        self.nodes = graph
            .nodes
            .iter()
            .map(|n| CanvasNode {
                id: n.id.clone(),
                label: n.label.clone(),
                shape: n.shape,
                fill: hex(n.color.background),
                stroke: hex(n.color.border),
                text: hex(n.font.color),
                font_size: if n.font.bold { n.font.size + 1.0 } else { n.font.size },
                size: n.size,
                pos: n.seed.map(|p| Pos2::new(p.x, p.y)).unwrap_or(Pos2::ZERO),
                vel: Vec2::ZERO,
            })
            .collect();
        self.index = self.nodes.iter().enumerate().map(|(i, n)| (n.id.clone(), i)).collect();
        self.edges = graph
            .edges
            .iter()
            .filter_map(|e| {
                Some(CanvasEdge {
                    from: *self.index.get(&e.from)?,
                    to: *self.index.get(&e.to)?,
                    label: e.label.clone(),
                    color: hex(e.color),
                    dash: e.dash,
                    width: e.width,
                })
            })
            .collect();
        self.iterations = 0;
        self.stabilized = self.nodes.is_empty();
        self.hovered = None;
        self.dragging = None;
        self.hit_rects.clear();
    }

    fn set_options(&mut self, options: &EngineOptions) {
        self.options = options.clone();
        if options.is_low_energy() {
            self.stabilized = true;
        }
    }

    fn fit(&mut self, _animate: bool) {
        self.fit_pending = true;
        self.apply_fit();
    }

    fn positions(&self, ids: &[&str]) -> HashMap<NodeId, Point> {
        ids.iter()
            .filter_map(|id| {
                let n = &self.nodes[*self.index.get(*id)?];
                Some((n.id.clone(), Point::new(n.pos.x, n.pos.y)))
            })
            .collect()
    }

    fn canvas_to_dom(&self, point: Point) -> Point {
        let p = self.to_screen(Pos2::new(point.x, point.y));
        Point::new(p.x, p.y)
    }

    fn redraw(&mut self) {
        self.hit_rects.clear();
    }

    fn destroy(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.index.clear();
        self.hit_rects.clear();
        self.hovered = None;
        self.dragging = None;
        self.destroyed = true;
    }
}
