use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Duration;

use eframe::egui::{self, Color32, Pos2, RichText, Sense, Vec2};

use super::canvas::{CanvasEngine, hex};
use crate::fetch::{FALLBACK_MESSAGE, FetchError, MindMapPayload, MindMapSource};
use crate::graph_utils::builder::{BuildSummary, build_graph};
use crate::graph_utils::catalog::Category;
use crate::graph_utils::style::palette;
use crate::graph_utils::visibility::VisibilityFilter;
use crate::persistence::settings::AppSettings;
use crate::render::session::{GraphSession, LayoutPhase};

type FetchResult = Result<MindMapPayload, FetchError>;

fn start_fetch(source: Arc<dyn MindMapSource>, matter_id: String) -> Receiver<FetchResult> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        log::info!("fetching mind map for matter '{}' from {}", matter_id, source.describe());
        let result = source.fetch(&matter_id);
        match &result {
            Ok(payload) => log::info!(
                "mind map for matter '{}' loaded: {} entities, {} relationships",
                payload.matter_id,
                payload.catalog.len(),
                payload.relationships.len()
            ),
            Err(e) => log::error!("mind map fetch failed: {}", e),
        }
        // receiver gone means the app closed; nothing to report
        let _ = tx.send(result);
    });
    rx
}

struct ReadyState {
    payload: MindMapPayload,
    filter: VisibilityFilter,
    summary: BuildSummary,
    session: Option<GraphSession<CanvasEngine>>,
}

enum LoadState {
    Loading(Receiver<FetchResult>),
    Failed(String),
    Ready(Box<ReadyState>),
}

const LEGEND: [(&str, &str); 10] = [
    (palette::BLUE_LIGHT, "Company"),
    (palette::RED_LIGHT, "Company with ATO debt / court cases"),
    (palette::GOOD_BG, "Company with no ATO debt"),
    (palette::GRAY_LIGHT, "Ceased / former"),
    (palette::GREEN_LIGHT, "Person"),
    (palette::ORANGE_LIGHT, "Shareholder"),
    (palette::YELLOW_LIGHT, "Address"),
    (palette::TEAL_LIGHT, "ATO debt cleared"),
    (palette::PURPLE_LIGHT, "Court case"),
    (palette::RED, "Bankruptcy"),
];

pub struct MindMapApp {
    source: Arc<dyn MindMapSource>,
    matter_id: String,
    settings: AppSettings,
    state: LoadState,
}

impl MindMapApp {
    /// Open the mind map for one matter; the single fetch starts immediately.
    pub fn new(source: Arc<dyn MindMapSource>, matter_id: String, settings: AppSettings) -> Self {
        let rx = start_fetch(source.clone(), matter_id.clone());
        Self { source, matter_id, settings, state: LoadState::Loading(rx) }
    }

    fn reload(&mut self) {
        // old session is dropped (and its engine destroyed) with the old state
        if let LoadState::Ready(ready) = &mut self.state {
            if let Some(session) = ready.session.take() {
                session.close();
            }
        }
        let rx = start_fetch(self.source.clone(), self.matter_id.clone());
        self.state = LoadState::Loading(rx);
    }

    fn ready(&self, payload: MindMapPayload) -> Box<ReadyState> {
        let mut ready = Box::new(ReadyState {
            payload,
            filter: self.settings.default_visibility,
            summary: BuildSummary::default(),
            session: None,
        });
        rebuild(&mut ready, &self.settings);
        ready
    }

    fn poll_fetch(&mut self, ctx: &egui::Context) {
        let LoadState::Loading(rx) = &self.state else { return };
        match rx.try_recv() {
            Ok(Ok(payload)) => {
                let ready = self.ready(payload);
                self.state = LoadState::Ready(ready);
            }
            Ok(Err(e)) => self.state = LoadState::Failed(e.user_message()),
            Err(TryRecvError::Disconnected) => self.state = LoadState::Failed(FALLBACK_MESSAGE.to_string()),
            Err(TryRecvError::Empty) => ctx.request_repaint_after(Duration::from_millis(100)),
        }
    }
}

/// Full rebuild: the previous engine is destroyed before the new graph is built.
fn rebuild(ready: &mut ReadyState, settings: &AppSettings) {
    if let Some(session) = ready.session.take() {
        session.close();
    }
    let built = build_graph(
        &ready.payload.catalog,
        &ready.payload.relationships,
        &ready.filter,
        &settings.build_options(),
    );
    ready.summary = built.summary;
    ready.session = Some(GraphSession::open(CanvasEngine::new(), &built.graph, settings.engine_options()));
}

/// Tooltip HTML reduced to plain lines for the overlay.
pub fn html_to_lines(html: &str) -> Vec<String> {
    let normalized = html.replace("<br>", "\n").replace("<br/>", "\n").replace("<br />", "\n");
    let mut plain = String::with_capacity(normalized.len());
    let mut in_tag = false;
    for ch in normalized.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => plain.push(ch),
            _ => {}
        }
    }
    let plain = plain
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    plain.lines().map(str::to_string).filter(|l| !l.trim().is_empty()).collect()
}

impl eframe::App for MindMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_fetch(ctx);

        let mut reload = false;
        let mut needs_rebuild = false;
        match &mut self.state {
            LoadState::Loading(_) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.centered_and_justified(|ui| {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label(format!("Loading mind map for matter {}...", self.matter_id));
                        });
                    });
                });
            }
            LoadState::Failed(message) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(40.0);
                        ui.label(RichText::new(message.as_str()).color(Color32::from_rgb(200, 40, 40)).strong());
                        if ui.button("Retry").clicked() {
                            reload = true;
                        }
                    });
                });
            }
            LoadState::Ready(ready) => {
                egui::SidePanel::left("mind_map_panel").resizable(true).show(ctx, |ui| {
                    let title = ready.payload.matter_name.clone().unwrap_or_else(|| format!("Matter {}", ready.payload.matter_id));
                    ui.heading(title);
                    ui.separator();

                    ui.label(RichText::new("Show").strong());
                    for category in Category::ALL {
                        let mut visible = ready.filter.is_visible(category);
                        if ui.checkbox(&mut visible, category.title()).changed() {
                            ready.filter.set(category, visible);
                            needs_rebuild = true;
                        }
                    }
                    ui.separator();

                    let stats = &ready.payload.stats;
                    ui.label(RichText::new("Totals").strong());
                    ui.small(format!("Companies: {}", stats.total_companies));
                    ui.small(format!("Persons: {} (directors {}, secretaries {}, office holders {})",
                        stats.total_persons, stats.total_directors, stats.total_secretaries, stats.total_office_holders));
                    ui.small(format!("Shareholders: {}", stats.total_shareholders));
                    if let Some(addresses) = stats.total_addresses {
                        ui.small(format!("Addresses: {}", addresses));
                    }
                    ui.small(format!("Relationships: {}", stats.total_relationships));
                    ui.small(format!(
                        "Shown: {} nodes, {} edges, {} clusters",
                        ready.summary.nodes.primary + ready.summary.nodes.synthetic,
                        ready.summary.edges.relationships + ready.summary.edges.derived,
                        ready.summary.components
                    ));
                    if let Some(session) = &ready.session {
                        match session.phase() {
                            LayoutPhase::Stabilizing { iterations, total } => {
                                ui.add(egui::ProgressBar::new(iterations as f32 / total.max(1) as f32).text("Stabilizing"));
                            }
                            LayoutPhase::Settled => {
                                ui.small("Layout settled");
                            }
                        }
                    }
                    ui.horizontal(|ui| {
                        if ui.button("Fit").clicked() {
                            if let Some(session) = ready.session.as_mut() {
                                session.fit(true);
                            }
                        }
                        if ui.button("Reload").clicked() {
                            reload = true;
                        }
                    });
                    ui.separator();

                    ui.label(RichText::new("Legend").strong());
                    for (color, text) in LEGEND {
                        ui.horizontal(|ui| {
                            let (swatch, _) = ui.allocate_exact_size(Vec2::splat(12.0), Sense::hover());
                            ui.painter().rect_filled(swatch, 2.0, hex(color));
                            ui.small(text);
                        });
                    }
                });

                egui::CentralPanel::default().frame(egui::Frame::NONE).show(ctx, |ui| {
                    let Some(session) = ready.session.as_mut() else { return };
                    let events = match session.engine_mut() {
                        Some(engine) => engine.show(ui),
                        None => Vec::new(),
                    };
                    for event in events {
                        session.handle_event(event);
                    }
                });

                if let Some(overlay) = ready.session.as_ref().and_then(|s| s.overlay()) {
                    let lines = html_to_lines(&overlay.content);
                    egui::Area::new(egui::Id::new("mind_map_tooltip"))
                        .order(egui::Order::Tooltip)
                        .fixed_pos(Pos2::new(overlay.x + 14.0, overlay.y + 14.0))
                        .interactable(false)
                        .show(ctx, |ui| {
                            egui::Frame::popup(ui.style()).show(ui, |ui| {
                                for (i, line) in lines.iter().enumerate() {
                                    if i == 0 {
                                        ui.label(RichText::new(line).strong());
                                    } else {
                                        ui.small(line);
                                    }
                                }
                            });
                        });
                }
            }
        }

        if needs_rebuild {
            if let LoadState::Ready(ready) = &mut self.state {
                rebuild(ready, &self.settings);
            }
        }
        if reload {
            self.reload();
        }
    }
}
