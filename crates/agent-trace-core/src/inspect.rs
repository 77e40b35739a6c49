//! Helpers for inspecting edges in the popup and side panel.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::model::TraceEdge;
use crate::APP_NODE_ID;

/// The pair of nodes picked by clicking an edge icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePair {
    pub source: String,
    pub target: String,
}

impl NodePair {
    pub fn of(edge: &TraceEdge) -> Self {
        Self {
            source: edge.source.clone(),
            target: edge.target.clone(),
        }
    }

    /// True when `edge` joins the same two nodes, in either direction.
    pub fn matches(&self, edge: &TraceEdge) -> bool {
        (edge.source == self.source && edge.target == self.target)
            || (edge.source == self.target && edge.target == self.source)
    }
}

/// Truthiness as the trace payloads use it: null, false, 0 and "" are
/// falsy; containers are truthy even when empty.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Whether the edge gets no inspection icon: user-to-app edges, or edges
/// flagged with `hideIcon`.
pub fn edge_hides_icon(edge: &TraceEdge) -> bool {
    edge.data.get("hideIcon").is_some_and(is_truthy)
        || (edge.source == "user" && edge.target == APP_NODE_ID)
}

/// The edge's `violation_info`, if present and truthy.
pub fn violation_info(edge: &TraceEdge) -> Option<&Value> {
    edge.data.get("violation_info").filter(|v| is_truthy(v))
}

/// Text for a metadata value: strings verbatim (`-` when empty), everything
/// else as two-space indented JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) if s.is_empty() => "-".to_string(),
        other => clipboard_text(other),
    }
}

/// Text the copy button puts on the clipboard. Same as [`display_value`]
/// except that an empty string stays empty.
pub fn clipboard_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// Metadata entries worth showing, in received order.
pub fn visible_metadata(edge: &TraceEdge) -> impl Iterator<Item = (&str, &Value)> {
    edge.data
        .iter()
        .filter(|(_, v)| is_truthy(v))
        .map(|(k, v)| (k.as_str(), v))
}

/// Epoch seconds as a UTC wall-clock `HH:MM:SS`, or `N/A`.
pub fn format_clock(created_at: Option<f64>) -> String {
    let Some(secs) = created_at.filter(|t| *t != 0.0 && t.is_finite()) else {
        return "N/A".to_string();
    };
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9) as u32;
    DateTime::<Utc>::from_timestamp(whole as i64, nanos)
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}
