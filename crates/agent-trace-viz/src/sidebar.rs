//! Trace panel: connection indicator and the newest-first edge table.

use std::collections::HashSet;
use std::time::Duration;

use agent_trace_core::{
    clipboard_text, display_value, format_clock, visible_metadata, TraceEdge,
};
use egui::{Color32, RichText};
use serde_json::Value;

use crate::render::{highlight_color, CLEAN_COLOR, ICON_LINKED, ICON_UNLINKED, VIOLATION_COLOR};
use crate::state::ViewerState;

/// How long the "Copied!" note stays under a metadata entry.
const COPIED_SECONDS: f64 = 2.0;

const EXPANDER_WIDTH: f32 = 18.0;
const TIME_WIDTH: f32 = 64.0;

/// Note drawn under the column header while the table has no rows.
pub fn empty_table_note(rows: &[TraceRow]) -> Option<&'static str> {
    rows.is_empty().then_some("No events yet")
}

/// One line of the edge table.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceRow {
    pub edge_id: String,
    pub time: String,
    pub source: String,
    pub target: String,
    pub expandable: bool,
    pub highlighted: bool,
}

/// Table rows for every edge, newest first.
pub fn trace_rows(state: &ViewerState) -> Vec<TraceRow> {
    state
        .store
        .edges_newest_first()
        .into_iter()
        .map(|edge| TraceRow {
            edge_id: edge.id.clone(),
            time: format_clock(edge.created_at),
            source: edge.source.clone(),
            target: edge.target.clone(),
            expandable: edge.has_metadata(),
            highlighted: state.is_highlighted(edge),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
struct CopiedNote {
    edge_id: String,
    key: String,
    at: f64,
}

/// Row expansion and clipboard feedback, kept across frames.
#[derive(Debug, Default)]
pub struct TracePanel {
    expanded: HashSet<String>,
    copied: Option<CopiedNote>,
}

impl TracePanel {
    pub fn toggle_row(&mut self, edge_id: &str) {
        if !self.expanded.remove(edge_id) {
            self.expanded.insert(edge_id.to_string());
        }
    }

    pub fn is_expanded(&self, edge_id: &str) -> bool {
        self.expanded.contains(edge_id)
    }

    pub fn mark_copied(&mut self, edge_id: &str, key: &str, now: f64) {
        self.copied = Some(CopiedNote {
            edge_id: edge_id.to_string(),
            key: key.to_string(),
            at: now,
        });
    }

    /// Whether the note for this entry is still showing at `now`.
    pub fn shows_copied(&self, edge_id: &str, key: &str, now: f64) -> bool {
        self.copied.as_ref().is_some_and(|note| {
            note.edge_id == edge_id && note.key == key && now - note.at < COPIED_SECONDS
        })
    }

    /// Heading with the connection indicator, then the edge table.
    pub fn show(&mut self, ui: &mut egui::Ui, state: &ViewerState) {
        ui.horizontal(|ui| {
            ui.heading("Agent trace");
            let (glyph, color, tip) = if state.is_connected() {
                (ICON_LINKED, CLEAN_COLOR, "Receiving events")
            } else {
                (ICON_UNLINKED, VIOLATION_COLOR, "Disconnected from events server")
            };
            ui.label(RichText::new(glyph).color(color).size(16.0))
                .on_hover_text(tip);
        });
        if let Some(err) = state.last_error() {
            ui.label(RichText::new(err).small().weak());
        }
        ui.separator();

        let rows = trace_rows(state);
        self.header(ui);
        if let Some(note) = empty_table_note(&rows) {
            ui.label(RichText::new(note).weak());
            return;
        }

        let now = ui.input(|i| i.time);
        for (i, row) in rows.iter().enumerate() {
            let fill = if row.highlighted {
                highlight_color(ui.visuals().dark_mode).gamma_multiply(0.2)
            } else if i % 2 == 1 {
                ui.visuals().faint_bg_color
            } else {
                Color32::TRANSPARENT
            };
            egui::Frame::NONE
                .fill(fill)
                .inner_margin(egui::Margin::symmetric(2, 3))
                .show(ui, |ui| {
                    self.row(ui, row);
                    if self.is_expanded(&row.edge_id) {
                        if let Some(edge) = state.store.edge(&row.edge_id) {
                            self.metadata(ui, edge, now);
                        }
                    }
                });
        }

        if self
            .copied
            .as_ref()
            .is_some_and(|note| now - note.at < COPIED_SECONDS)
        {
            ui.ctx()
                .request_repaint_after(Duration::from_millis(250));
        }
    }

    fn header(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.add_space(EXPANDER_WIDTH + ui.spacing().item_spacing.x);
            let name_width = column_width(ui);
            ui.add_sized([TIME_WIDTH, 16.0], egui::Label::new(RichText::new("Time").strong()));
            ui.add_sized([name_width, 16.0], egui::Label::new(RichText::new("Source").strong()));
            ui.add_sized([name_width, 16.0], egui::Label::new(RichText::new("Target").strong()));
        });
    }

    fn row(&mut self, ui: &mut egui::Ui, row: &TraceRow) {
        ui.horizontal(|ui| {
            if row.expandable {
                let arrow = if self.is_expanded(&row.edge_id) { "⏷" } else { "⏵" };
                if ui
                    .add_sized([EXPANDER_WIDTH, 16.0], egui::Button::new(arrow).frame(false))
                    .clicked()
                {
                    self.toggle_row(&row.edge_id);
                }
            } else {
                ui.add_space(EXPANDER_WIDTH);
            }
            let name_width = column_width(ui);
            ui.add_sized([TIME_WIDTH, 16.0], egui::Label::new(RichText::new(&row.time).monospace()));
            ui.add_sized([name_width, 16.0], egui::Label::new(&row.source).truncate())
                .on_hover_text(&row.source);
            ui.add_sized([name_width, 16.0], egui::Label::new(&row.target).truncate())
                .on_hover_text(&row.target);
        });
    }

    fn metadata(&mut self, ui: &mut egui::Ui, edge: &TraceEdge, now: f64) {
        ui.indent(("metadata", &edge.id), |ui| {
            ui.label(RichText::new("Metadata").strong());
            let mut any = false;
            for (key, value) in visible_metadata(edge) {
                any = true;
                let text = display_value(value);
                ui.horizontal(|ui| {
                    ui.label(RichText::new(key).small().strong());
                    if ui.small_button("📋").on_hover_text("Copy").clicked() {
                        ui.ctx().copy_text(clipboard_text(value));
                        self.mark_copied(&edge.id, key, now);
                    }
                });
                if matches!(value, Value::String(_)) {
                    ui.add(egui::Label::new(RichText::new(&text).small()).wrap());
                } else {
                    egui::Frame::group(ui.style()).show(ui, |ui| {
                        ui.label(RichText::new(&text).monospace().small());
                    });
                }
                if self.shows_copied(&edge.id, key, now) {
                    ui.label(RichText::new("Copied!").small().color(CLEAN_COLOR));
                }
            }
            if !any {
                ui.label(RichText::new("No metadata available").weak());
            }
        });
    }
}

fn column_width(ui: &egui::Ui) -> f32 {
    let spacing = ui.spacing().item_spacing.x;
    ((ui.available_width() - TIME_WIDTH - 2.0 * spacing) / 2.0).max(40.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::StreamUpdate;
    use serde_json::json;

    fn state() -> ViewerState {
        let mut state = ViewerState::new();
        state.handle_update(StreamUpdate::Frame(
            json!({
                "type": "add_edge",
                "data": [
                    {"source_node_id": "user", "target_node_id": "app", "created_at": 1629782399.0},
                    {"source_node_id": "app", "target_node_id": "llm", "created_at": 1629782400.0, "prompt": "hi"},
                    {"source_node_id": "llm", "target_node_id": "app", "created_at": 1629782401.0, "hideIcon": true}
                ]
            })
            .to_string(),
        ));
        state
    }

    #[test]
    fn rows_are_newest_first_with_clock_times() {
        let rows = trace_rows(&state());
        let order: Vec<_> = rows.iter().map(|r| r.edge_id.as_str()).collect();
        assert_eq!(
            order,
            ["ellm-app-1629782401", "eapp-llm-1629782400", "euser-app-1629782399"]
        );
        assert_eq!(rows[1].time, "05:20:00");
        // Every edge carries its descriptor, so every row can expand.
        assert!(rows.iter().all(|r| r.expandable));
    }

    #[test]
    fn selected_pair_highlights_both_directions() {
        let mut state = state();
        state.toggle_popup("eapp-llm-1629782400");
        let rows = trace_rows(&state);
        let lit: Vec<_> = rows
            .iter()
            .filter(|r| r.highlighted)
            .map(|r| r.edge_id.as_str())
            .collect();
        assert_eq!(lit, ["ellm-app-1629782401", "eapp-llm-1629782400"]);
    }

    #[test]
    fn empty_table_still_gets_a_note() {
        let empty = trace_rows(&ViewerState::new());
        assert_eq!(empty_table_note(&empty), Some("No events yet"));
        assert_eq!(empty_table_note(&trace_rows(&state())), None);
    }

    #[test]
    fn rows_toggle_open_and_closed() {
        let mut panel = TracePanel::default();
        panel.toggle_row("e1");
        assert!(panel.is_expanded("e1"));
        panel.toggle_row("e1");
        assert!(!panel.is_expanded("e1"));
    }

    #[test]
    fn copied_note_expires_after_two_seconds() {
        let mut panel = TracePanel::default();
        panel.mark_copied("e1", "prompt", 10.0);
        assert!(panel.shows_copied("e1", "prompt", 11.5));
        assert!(!panel.shows_copied("e1", "other", 11.5));
        assert!(!panel.shows_copied("e1", "prompt", 12.0));
    }
}
