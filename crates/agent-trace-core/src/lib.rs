//! Core domain types for the agent trace viewer.
//!
//! The trace is a directed graph of applications, models, tools and MCP
//! servers. Everything here is UI-agnostic: the viewer crate feeds raw
//! WebSocket frames into a [`TraceStore`] and renders whatever it holds.

mod error;
mod event;
mod inspect;
mod layout;
mod model;
mod store;

pub use error::{TraceError, TraceResult};
pub use event::{EdgeDescriptor, NodeDescriptor, NodeUpdate, TraceEvent};
pub use inspect::{
    clipboard_text, display_value, edge_hides_icon, format_clock, is_truthy, violation_info,
    visible_metadata, NodePair,
};
pub use layout::{alternating_y, initial_position, tool_y};
pub use model::{EdgeKind, NodeKind, Position, TraceEdge, TraceNode};
pub use store::{resolve_node_id, ApplyOutcome, TraceStore};

/// Default event source: the trace server on its usual local port.
pub const DEFAULT_EVENTS_URL: &str = "ws://127.0.0.1:8000/ws";

/// Node id the trace server uses for the instrumented application.
pub const APP_NODE_ID: &str = "app";
