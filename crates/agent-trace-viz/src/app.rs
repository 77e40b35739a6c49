//! Main application state and rendering logic.

use std::collections::{HashMap, HashSet};

use agent_trace_core::{edge_hides_icon, display_value, violation_info, Position, DEFAULT_EVENTS_URL};
use eframe::{App, CreationContext};
use egui::{CollapsingHeader, Context, Pos2, Rect, ScrollArea};
use egui_graphs::{
    FruchtermanReingoldWithCenterGravity, FruchtermanReingoldWithCenterGravityState, Graph,
    GraphView, LayoutForceDirected, MetadataFrame,
};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use tracing::{debug, info};

use crate::render::{card_rect, connector_center, connector_points, highlight_color, icon_stack_offset, FadeIn, CARD_SIZE};
use crate::sample::sample_frames;
use crate::settings::{SettingsInteraction, SettingsNavigation, SettingsStyle};
use crate::sidebar::TracePanel;
use crate::state::{PaneClick, ViewerState};
use crate::stream::EventStream;
use crate::ui::{
    draw_connector, draw_node_card, draw_sidebar_toggle, edge_icon, sidebar_toggle_rect,
    violation_popup, PopupAction,
};

// Type aliases for Force-Directed layout with Center Gravity
type ForceLayout = LayoutForceDirected<FruchtermanReingoldWithCenterGravity>;
type ForceState = FruchtermanReingoldWithCenterGravityState;

/// Startup options handed over by the host (native CLI or browser page).
#[derive(Debug, Clone)]
pub struct ViewerOptions {
    pub ws_url: String,
    pub dark_mode: bool,
    pub show_sidebar: bool,
    /// Seed the trace with a built-in sample before any event arrives.
    pub demo: bool,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            ws_url: DEFAULT_EVENTS_URL.to_string(),
            dark_mode: true,
            show_sidebar: true,
            demo: false,
        }
    }
}

/// Everything needed to paint one edge this frame.
struct EdgeDraw {
    id: String,
    points: [Pos2; 4],
    center: Pos2,
    violation: Option<String>,
    show_icon: bool,
    highlighted: bool,
    alpha: f32,
}

/// The live trace viewer.
pub struct TraceViewerApp {
    /// Trace data and inspector selection
    state: ViewerState,
    /// Socket feeding the trace; `None` only if never opened
    stream: Option<EventStream>,
    /// The egui_graphs graph structure
    g: Graph<(), ()>,
    /// Store node id to graph index
    node_lookup: HashMap<String, NodeIndex>,
    /// Store revision the graph was last built from
    synced_revision: Option<u64>,
    /// Interaction settings
    settings_interaction: SettingsInteraction,
    /// Navigation settings
    settings_navigation: SettingsNavigation,
    /// Style settings
    settings_style: SettingsStyle,
    /// Whether to show the sidebar
    show_sidebar: bool,
    /// Current dark mode state
    dark_mode: bool,
    /// Side panel row state
    panel: TracePanel,
    /// Fade-in clock for new nodes and edges
    fade: FadeIn,
    /// The force layout is paused once, on the first frame
    layout_paused: bool,
}

impl TraceViewerApp {
    /// Create the viewer and open its event stream.
    pub fn new(cc: &CreationContext<'_>, options: ViewerOptions) -> Self {
        if options.dark_mode {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
        } else {
            cc.egui_ctx.set_visuals(egui::Visuals::light());
        }

        let mut state = ViewerState::new();
        if options.demo {
            for frame in sample_frames() {
                state.ingest_frame(&frame);
            }
            info!(
                nodes = state.store.nodes().len(),
                edges = state.store.edges().len(),
                "loaded sample trace"
            );
        }

        info!(url = %options.ws_url, "opening event stream");
        let stream = EventStream::connect(options.ws_url, cc.egui_ctx.clone());

        Self {
            state,
            stream: Some(stream),
            g: Graph::from(&StableDiGraph::<(), ()>::new()),
            node_lookup: HashMap::new(),
            synced_revision: None,
            settings_interaction: SettingsInteraction::default(),
            settings_navigation: SettingsNavigation::default(),
            settings_style: SettingsStyle::default(),
            show_sidebar: options.show_sidebar,
            dark_mode: options.dark_mode,
            panel: TracePanel::default(),
            fade: FadeIn::default(),
            layout_paused: false,
        }
    }

    /// Apply whatever the socket delivered since the last frame.
    fn drain_stream(&mut self, ctx: &Context) {
        let Some(stream) = &self.stream else {
            return;
        };
        let updates = stream.poll();
        if updates.is_empty() {
            return;
        }
        for update in updates {
            self.state.handle_update(update);
        }
        ctx.request_repaint();
    }

    /// Copy dragged positions back into the store.
    fn capture_positions(&mut self) {
        for (id, &idx) in &self.node_lookup {
            if let Some(node) = self.g.node(idx) {
                let loc = node.location();
                self.state.store.set_position(id, Position::new(loc.x, loc.y));
            }
        }
    }

    /// Rebuild the egui graph when the store changed.
    fn sync_graph(&mut self) {
        let revision = self.state.store.revision();
        if self.synced_revision == Some(revision) {
            return;
        }
        self.capture_positions();

        let mut graph = StableDiGraph::<(), ()>::new();
        let mut lookup = HashMap::new();
        for node in self.state.store.nodes() {
            lookup.insert(node.id.clone(), graph.add_node(()));
        }

        // One layout edge per node pair; connectors are painted separately
        let mut pairs = HashSet::new();
        for edge in self.state.store.edges() {
            if let (Some(&s), Some(&t)) = (lookup.get(&edge.source), lookup.get(&edge.target)) {
                if pairs.insert((s, t)) {
                    graph.add_edge(s, t, ());
                }
            }
        }

        let mut g = Graph::from(&graph);
        for node in self.state.store.nodes() {
            if let Some(view) = lookup.get(&node.id).and_then(|&idx| g.node_mut(idx)) {
                view.set_location(Pos2::new(node.position.x, node.position.y));
                view.set_label(node.id.clone());
            }
        }

        debug!(
            revision,
            nodes = lookup.len(),
            edges = pairs.len(),
            "graph rebuilt"
        );
        self.g = g;
        self.node_lookup = lookup;
        self.synced_revision = Some(revision);
    }

    fn alpha(&mut self, key: String, now: f64) -> f32 {
        if self.settings_style.fade_in {
            self.fade.alpha(&key, now)
        } else {
            1.0
        }
    }
}

// =============================================================================
// Sidebar Panel UI
// =============================================================================

impl TraceViewerApp {
    fn info_icon(ui: &mut egui::Ui, tip: &str) {
        ui.add_space(4.0);
        ui.small_button("ℹ").on_hover_text(tip);
    }

    fn ui_navigation(&mut self, ui: &mut egui::Ui) {
        CollapsingHeader::new("Navigation")
            .default_open(false)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    if ui
                        .checkbox(
                            &mut self.settings_navigation.fit_to_screen_enabled,
                            "fit_to_screen",
                        )
                        .clicked()
                    {
                        self.settings_navigation.zoom_and_pan_enabled =
                            !self.settings_navigation.zoom_and_pan_enabled;
                    }
                    Self::info_icon(ui, "Keep the whole trace in view");
                });

                ui.add_enabled_ui(self.settings_navigation.fit_to_screen_enabled, |ui| {
                    ui.add(
                        egui::Slider::new(
                            &mut self.settings_navigation.fit_to_screen_padding,
                            0.0..=1.0,
                        )
                        .text("padding"),
                    );
                });

                ui.horizontal(|ui| {
                    if ui
                        .checkbox(
                            &mut self.settings_navigation.zoom_and_pan_enabled,
                            "zoom_and_pan",
                        )
                        .clicked()
                    {
                        self.settings_navigation.fit_to_screen_enabled =
                            !self.settings_navigation.fit_to_screen_enabled;
                    }
                    Self::info_icon(ui, "Manual zoom and pan");
                });

                ui.add_enabled_ui(self.settings_navigation.zoom_and_pan_enabled, |ui| {
                    ui.add(
                        egui::Slider::new(&mut self.settings_navigation.zoom_speed, 0.01..=2.0)
                            .text("zoom_speed"),
                    );
                });

                ui.horizontal(|ui| {
                    ui.checkbox(
                        &mut self.settings_interaction.dragging_enabled,
                        "dragging_enabled",
                    );
                    Self::info_icon(ui, "Drag nodes to reposition");
                });
            });
    }

    fn ui_layout(&mut self, ui: &mut egui::Ui) {
        CollapsingHeader::new("Layout")
            .default_open(false)
            .show(ui, |ui| {
                let mut state = egui_graphs::get_layout_state::<ForceState>(ui, None);

                ui.horizontal(|ui| {
                    ui.checkbox(&mut state.base.is_running, "force layout");
                    Self::info_icon(ui, "Let the simulation move nodes away from their placed positions");
                });

                ui.add_enabled_ui(state.base.is_running, |ui| {
                    ui.add(egui::Slider::new(&mut state.base.dt, 0.001..=0.2).text("dt"));
                    ui.add(egui::Slider::new(&mut state.base.damping, 0.0..=1.0).text("damping"));
                    ui.add(egui::Slider::new(&mut state.base.k_scale, 0.2..=3.0).text("k_scale"));
                    ui.add(
                        egui::Slider::new(&mut state.base.c_repulse, 0.1..=3.0).text("c_repulse"),
                    );
                    ui.checkbox(&mut state.extras.0.enabled, "center gravity");
                });

                egui_graphs::set_layout_state::<ForceState>(ui, state, None);
            });
    }

    fn ui_style(&mut self, ui: &mut egui::Ui) {
        CollapsingHeader::new("Style").show(ui, |ui| {
            ui.horizontal(|ui| {
                let mut dark = ui.ctx().style().visuals.dark_mode;
                if ui.checkbox(&mut dark, "dark mode").changed() {
                    if dark {
                        ui.ctx().set_visuals(egui::Visuals::dark());
                    } else {
                        ui.ctx().set_visuals(egui::Visuals::light());
                    }
                    self.dark_mode = dark;
                }
            });

            ui.checkbox(&mut self.settings_style.node_cards, "node cards");
            ui.checkbox(&mut self.settings_style.fade_in, "fade in");
            ui.horizontal(|ui| {
                ui.checkbox(&mut self.settings_style.edge_gradient, "edge gradient");
                Self::info_icon(ui, "Colour connectors from source (purple) to target (blue)");
            });
        });
    }

    fn ui_stats(&self, ui: &mut egui::Ui) {
        ui.label(format!(
            "{} nodes · {} edges · {} frames",
            self.state.store.nodes().len(),
            self.state.store.edges().len(),
            self.state.frames_applied()
        ));
        if self.state.frames_rejected() > 0 {
            ui.label(
                egui::RichText::new(format!("{} frames rejected", self.state.frames_rejected()))
                    .small()
                    .weak(),
            );
        }
        if let Some(stream) = &self.stream {
            ui.label(egui::RichText::new(stream.url()).small().monospace().weak());
        }
    }
}

// =============================================================================
// Canvas overlays
// =============================================================================

impl TraceViewerApp {
    /// Paint connectors, cards and icons over the graph view, then resolve
    /// clicks on icons, the popup and empty canvas.
    fn draw_trace(&mut self, ui: &mut egui::Ui, graph_rect: Rect) {
        let meta = MetadataFrame::new(None).load(ui);
        let scale = meta.canvas_to_screen_size(1.0);
        let now = ui.input(|i| i.time);

        let mut centers: HashMap<String, Pos2> = HashMap::new();
        for (id, &idx) in &self.node_lookup {
            if let Some(node) = self.g.node(idx) {
                let screen = meta.canvas_to_screen_pos(node.location()) + graph_rect.min.to_vec2();
                centers.insert(id.clone(), screen);
            }
        }

        let half_width = CARD_SIZE.x * scale * 0.5;
        let mut pair_counts: HashMap<(String, String), usize> = HashMap::new();
        let mut draws = Vec::new();
        let edges: Vec<_> = self.state.store.edges().to_vec();
        for edge in &edges {
            let (Some(&src), Some(&tgt)) = (centers.get(&edge.source), centers.get(&edge.target))
            else {
                continue;
            };
            let start = Pos2::new(src.x + half_width, src.y);
            let end = Pos2::new(tgt.x - half_width, tgt.y);

            let key = if edge.source <= edge.target {
                (edge.source.clone(), edge.target.clone())
            } else {
                (edge.target.clone(), edge.source.clone())
            };
            let slot = pair_counts.entry(key).or_insert(0);
            let center = connector_center(start, end) + icon_stack_offset(*slot, scale);
            *slot += 1;

            draws.push(EdgeDraw {
                id: edge.id.clone(),
                points: connector_points(start, end),
                center,
                violation: violation_info(edge).map(display_value),
                show_icon: !edge_hides_icon(edge),
                highlighted: self.state.is_highlighted(edge),
                alpha: self.alpha(format!("edge:{}", edge.id), now),
            });
        }

        let painter = ui.painter_at(graph_rect);
        let highlight = highlight_color(self.dark_mode);
        let width = (2.0 * scale).clamp(1.0, 4.0);
        for draw in &draws {
            draw_connector(
                &painter,
                &draw.points,
                width,
                draw.alpha,
                self.settings_style.edge_gradient,
                draw.highlighted.then_some(highlight),
            );
        }

        let mut card_rects = Vec::new();
        let selected = self.state.selected_pair().cloned();
        let nodes: Vec<_> = self.state.store.nodes().to_vec();
        for node in &nodes {
            let Some(&center) = centers.get(&node.id) else {
                continue;
            };
            let rect = card_rect(center, scale);
            card_rects.push(rect);
            if self.settings_style.node_cards {
                let alpha = self.alpha(format!("node:{}", node.id), now);
                let lit = selected
                    .as_ref()
                    .is_some_and(|pair| pair.source == node.id || pair.target == node.id);
                draw_node_card(&painter, rect, node, alpha, self.dark_mode, lit);
            }
        }

        let mut clicked_icon = None;
        for draw in draws.iter().filter(|d| d.show_icon) {
            if !graph_rect.contains(draw.center) {
                continue;
            }
            let response = edge_icon(ui, &draw.id, draw.center, scale, draw.violation.is_some(), draw.alpha);
            if response.clicked() {
                clicked_icon = Some(draw.id.clone());
            }
        }
        if let Some(id) = &clicked_icon {
            self.state.toggle_popup(id);
        }

        let mut popup_rect = None;
        if let Some(open) = self.state.open_popup().map(str::to_string) {
            let shown = draws
                .iter()
                .find(|d| d.id == open)
                .and_then(|d| d.violation.as_deref().map(|text| (d.center, text)));
            if let Some((center, text)) = shown {
                let action = violation_popup(ui.ctx(), &open, center, text);
                if let PopupAction::Close(_) = action {
                    self.state.close_popup();
                }
                popup_rect = Some(action.rect());
            }
        }

        let (clicked, pos) = ui.input(|i| (i.pointer.primary_clicked(), i.pointer.interact_pos()));
        if clicked {
            if let Some(pos) = pos {
                self.state.handle_pane_click(PaneClick {
                    on_icon: clicked_icon.is_some(),
                    in_popup: popup_rect.is_some_and(|r| r.contains(pos)),
                    on_control: sidebar_toggle_rect(ui.max_rect()).contains(pos),
                    on_card: card_rects.iter().any(|r| r.contains(pos)),
                    in_graph: graph_rect.contains(pos),
                });
            }
        }
    }
}

// =============================================================================
// eframe::App Implementation
// =============================================================================

impl App for TraceViewerApp {
    fn update(&mut self, ctx: &Context, _: &mut eframe::Frame) {
        self.drain_stream(ctx);
        self.sync_graph();

        if ctx.input(|i| i.key_pressed(egui::Key::Tab)) {
            self.show_sidebar = !self.show_sidebar;
        }

        // Right sidebar with the trace table and controls
        if self.show_sidebar {
            egui::SidePanel::right("trace_panel")
                .default_width(360.0)
                .show(ctx, |ui| {
                    ScrollArea::vertical().show(ui, |ui| {
                        self.panel.show(ui, &self.state);
                        ui.separator();

                        self.ui_stats(ui);
                        ui.separator();

                        self.ui_navigation(ui);
                        ui.separator();

                        self.ui_layout(ui);
                        ui.separator();

                        self.ui_style(ui);
                    });
                });
        }

        // Central panel with graph
        egui::CentralPanel::default().show(ctx, |ui| {
            if !self.layout_paused {
                let mut state = egui_graphs::get_layout_state::<ForceState>(ui, None);
                state.base.is_running = false;
                egui_graphs::set_layout_state::<ForceState>(ui, state, None);
                self.layout_paused = true;
            }

            let settings_interaction = egui_graphs::SettingsInteraction::new()
                .with_dragging_enabled(self.settings_interaction.dragging_enabled)
                .with_hover_enabled(self.settings_interaction.hover_enabled)
                .with_node_clicking_enabled(self.settings_interaction.node_clicking_enabled)
                .with_node_selection_enabled(self.settings_interaction.node_selection_enabled);

            let settings_navigation = egui_graphs::SettingsNavigation::new()
                .with_fit_to_screen_enabled(self.settings_navigation.fit_to_screen_enabled)
                .with_zoom_and_pan_enabled(self.settings_navigation.zoom_and_pan_enabled)
                .with_zoom_speed(self.settings_navigation.zoom_speed)
                .with_fit_to_screen_padding(self.settings_navigation.fit_to_screen_padding);

            // Built-in edges are hidden; connectors are painted as beziers
            let settings_style = egui_graphs::SettingsStyle::new()
                .with_labels_always(false)
                .with_node_stroke_hook(|_selected, dragged, _color, _stroke, _style| {
                    if dragged {
                        egui::Stroke::new(2.0, egui::Color32::from_rgb(255, 200, 0))
                    } else {
                        egui::Stroke::NONE
                    }
                })
                .with_edge_stroke_hook(|_selected, _order, _stroke, _style| egui::Stroke::NONE);

            let graph_response = ui.add(
                &mut GraphView::<_, _, _, _, _, _, ForceState, ForceLayout>::new(&mut self.g)
                    .with_interactions(&settings_interaction)
                    .with_navigations(&settings_navigation)
                    .with_styles(&settings_style),
            );

            self.draw_trace(ui, graph_response.rect);
            draw_sidebar_toggle(ui, &mut self.show_sidebar);
        });

        if self.settings_style.fade_in && self.fade.is_animating(ctx.input(|i| i.time)) {
            ctx.request_repaint();
        }
    }
}
