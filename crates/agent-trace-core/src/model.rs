//! Nodes and edges of an agent trace.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of participant in the trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A language model endpoint.
    Llm,
    /// A tool exposed to the model.
    Tool,
    /// The instrumented application.
    App,
    /// An MCP server hosting tools.
    McpServer,
    /// Anything the trace server sends that we do not recognise.
    #[default]
    #[serde(other)]
    Other,
}

impl NodeKind {
    /// Title shown on the node card.
    pub fn title(&self) -> &'static str {
        match self {
            NodeKind::Llm => "llm",
            NodeKind::Tool => "tool",
            NodeKind::App => "app",
            NodeKind::McpServer => "mcp_server",
            NodeKind::Other => "other",
        }
    }
}

/// Kind of interaction an edge records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    ModelGenerate,
    ToolCall,
    McpCall,
    #[serde(other)]
    Other,
}

/// Canvas coordinates.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A node as held by the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceNode {
    /// Upstream identifier, e.g. a model name or tool name.
    pub id: String,
    pub kind: NodeKind,
    /// Epoch seconds, when the trace server supplied one.
    pub created_at: Option<f64>,
    /// Free-form fields such as `tool_description` or `host_node`.
    pub metadata: Map<String, Value>,
    /// Current canvas position.
    pub position: Position,
}

/// An edge as held by the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceEdge {
    /// `e{source}-{target}-{created_at}`, computed after node-id reconciliation.
    pub id: String,
    pub source: String,
    pub target: String,
    pub created_at: Option<f64>,
    /// The descriptor exactly as received.
    pub data: Map<String, Value>,
}

impl TraceEdge {
    /// Sort key for the side panel; a missing timestamp sorts as zero.
    pub fn sort_time(&self) -> f64 {
        self.created_at.unwrap_or(0.0)
    }

    pub fn kind(&self) -> Option<EdgeKind> {
        self.data
            .get("edge_type")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn has_metadata(&self) -> bool {
        !self.data.is_empty()
    }
}
