//! Viewer state that does not depend on an egui context.

use agent_trace_core::{ApplyOutcome, NodePair, TraceEdge, TraceError, TraceEvent, TraceStore};
use tracing::{debug, error, info, warn};

use crate::stream::StreamUpdate;

/// Where a primary click on the trace pane landed this frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PaneClick {
    /// On an edge icon; the icon handles it.
    pub on_icon: bool,
    /// Inside the open popup, including its close button.
    pub in_popup: bool,
    /// On a floating control such as the panel toggle.
    pub on_control: bool,
    /// On a node card.
    pub on_card: bool,
    /// Inside the graph area.
    pub in_graph: bool,
}

/// Trace data plus the inspector's selection state.
#[derive(Debug, Default)]
pub struct ViewerState {
    pub store: TraceStore,
    connected: bool,
    last_error: Option<String>,
    selected_pair: Option<NodePair>,
    open_popup: Option<String>,
    frames_applied: u64,
    frames_rejected: u64,
}

impl ViewerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one stream update. Returns true when the trace changed.
    pub fn handle_update(&mut self, update: StreamUpdate) -> bool {
        match update {
            StreamUpdate::Connected => {
                self.connected = true;
                self.last_error = None;
                false
            }
            StreamUpdate::Disconnected(reason) => {
                self.connected = false;
                self.last_error = reason;
                false
            }
            StreamUpdate::Frame(text) => self.ingest_frame(&text),
        }
    }

    /// Decode and apply a raw frame. Bad frames are logged and dropped.
    pub fn ingest_frame(&mut self, text: &str) -> bool {
        match TraceEvent::parse(text) {
            Ok(event) => {
                let name = event.name();
                let outcome = self.apply(event);
                debug!(
                    event = name,
                    nodes_added = outcome.nodes_added,
                    nodes_updated = outcome.nodes_updated,
                    edges_added = outcome.edges_added,
                    edges_skipped = outcome.edges_skipped,
                    "frame applied"
                );
                outcome.changed()
            }
            Err(TraceError::UnknownEventType(kind)) => {
                warn!(%kind, "unknown message type");
                self.frames_rejected += 1;
                false
            }
            Err(e) => {
                error!(error = %e, "error parsing websocket message");
                self.frames_rejected += 1;
                false
            }
        }
    }

    pub fn apply(&mut self, event: TraceEvent) -> ApplyOutcome {
        self.frames_applied += 1;
        self.store.apply(event)
    }

    /// Icon click: toggle this edge's popup and select its endpoints.
    pub fn toggle_popup(&mut self, edge_id: &str) {
        let Some(edge) = self.store.edge(edge_id) else {
            return;
        };
        self.selected_pair = Some(NodePair::of(edge));
        if self.open_popup.as_deref() == Some(edge_id) {
            self.open_popup = None;
        } else {
            info!(edge_id, "inspecting edge");
            self.open_popup = Some(edge_id.to_string());
        }
    }

    pub fn close_popup(&mut self) {
        self.open_popup = None;
    }

    /// Click on empty canvas.
    pub fn clear_selection(&mut self) {
        self.selected_pair = None;
        self.open_popup = None;
    }

    /// Dismiss the popup on outside clicks, and the selection too when the
    /// click hit bare canvas.
    pub fn handle_pane_click(&mut self, click: PaneClick) {
        if click.on_icon || click.in_popup || click.on_control {
            return;
        }
        self.close_popup();
        if click.in_graph && !click.on_card {
            self.clear_selection();
        }
    }

    pub fn is_highlighted(&self, edge: &TraceEdge) -> bool {
        self.selected_pair
            .as_ref()
            .is_some_and(|pair| pair.matches(edge))
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn selected_pair(&self) -> Option<&NodePair> {
        self.selected_pair.as_ref()
    }

    pub fn open_popup(&self) -> Option<&str> {
        self.open_popup.as_deref()
    }

    pub fn frames_applied(&self) -> u64 {
        self.frames_applied
    }

    pub fn frames_rejected(&self) -> u64 {
        self.frames_rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frame(value: serde_json::Value) -> StreamUpdate {
        StreamUpdate::Frame(value.to_string())
    }

    fn populated() -> ViewerState {
        let mut state = ViewerState::new();
        state.handle_update(frame(json!({
            "type": "add_node",
            "data": [
                {"node_id": "app", "node_type": "app"},
                {"node_id": "llama3.1", "node_type": "llm"}
            ]
        })));
        state.handle_update(frame(json!({
            "type": "add_edge",
            "data": [
                {"source_node_id": "app", "target_node_id": "llama3.1", "created_at": 10.0},
                {"source_node_id": "llama3.1", "target_node_id": "app", "created_at": 11.0}
            ]
        })));
        state
    }

    #[test]
    fn connection_follows_socket_lifecycle() {
        let mut state = ViewerState::new();
        assert!(!state.is_connected());
        state.handle_update(StreamUpdate::Connected);
        assert!(state.is_connected());
        state.handle_update(StreamUpdate::Disconnected(Some("reset".into())));
        assert!(!state.is_connected());
        assert_eq!(state.last_error(), Some("reset"));
    }

    #[test]
    fn bad_frames_are_counted_not_applied() {
        let mut state = ViewerState::new();
        assert!(!state.handle_update(StreamUpdate::Frame("{".into())));
        assert!(!state.handle_update(frame(json!({"type": "delete_all", "data": []}))));
        assert_eq!(state.frames_rejected(), 2);
        assert!(state.store.is_empty());
    }

    #[test]
    fn icon_click_selects_pair_and_toggles_popup() {
        let mut state = populated();
        state.toggle_popup("eapp-llama3.1-10");
        assert_eq!(state.open_popup(), Some("eapp-llama3.1-10"));

        let reverse = state.store.edge("ellama3.1-app-11").unwrap().clone();
        assert!(state.is_highlighted(&reverse));

        state.toggle_popup("eapp-llama3.1-10");
        assert_eq!(state.open_popup(), None);
        assert!(state.selected_pair().is_some());

        state.clear_selection();
        assert!(!state.is_highlighted(&reverse));
    }

    #[test]
    fn closing_popup_from_inside_keeps_selection() {
        let mut state = populated();
        state.toggle_popup("eapp-llama3.1-10");
        // The close button already dismissed it; the same click must not
        // count as a canvas click.
        state.close_popup();
        state.handle_pane_click(PaneClick {
            in_popup: true,
            in_graph: true,
            ..Default::default()
        });
        assert_eq!(state.open_popup(), None);
        assert!(state.selected_pair().is_some());
    }

    #[test]
    fn panel_toggle_click_leaves_selection_alone() {
        let mut state = populated();
        state.toggle_popup("eapp-llama3.1-10");
        state.handle_pane_click(PaneClick {
            on_control: true,
            in_graph: true,
            ..Default::default()
        });
        assert_eq!(state.open_popup(), Some("eapp-llama3.1-10"));
        assert!(state.selected_pair().is_some());
    }

    #[test]
    fn outside_clicks_dismiss_popup_then_selection() {
        let mut state = populated();
        state.toggle_popup("eapp-llama3.1-10");
        state.handle_pane_click(PaneClick {
            on_card: true,
            in_graph: true,
            ..Default::default()
        });
        assert_eq!(state.open_popup(), None);
        assert!(state.selected_pair().is_some());

        state.handle_pane_click(PaneClick {
            in_graph: true,
            ..Default::default()
        });
        assert!(state.selected_pair().is_none());
    }

    #[test]
    fn duplicate_frames_report_no_change() {
        let mut state = populated();
        let again = frame(json!({
            "type": "add_edge",
            "data": [{"source_node_id": "app", "target_node_id": "llama3.1", "created_at": 10.0}]
        }));
        assert!(!state.handle_update(again));
        assert_eq!(state.store.edges().len(), 2);
    }
}
