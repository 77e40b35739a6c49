//! Initial placement for newly announced nodes.
//!
//! Cosmetic only: models below the app, MCP servers above, tools in a column
//! to the right fanning out alternately above and below the first tool.

use crate::model::{NodeKind, Position};

const TOOL_COLUMN_X: f32 = 600.0;
const TOOL_SPACING: f32 = 150.0;
const OTHER_COLUMN_X: f32 = -300.0;
const OTHER_SPACING: f32 = 200.0;

/// Vertical offset of the `n`-th tool: 0, -150, 150, -300, 300, ...
pub fn tool_y(n: usize) -> f32 {
    if n == 0 {
        return 0.0;
    }
    let sign = if n % 2 == 1 { -1.0 } else { 1.0 };
    sign * TOOL_SPACING * n.div_ceil(2) as f32
}

/// Vertical offset alternating around zero: 0, 0, 200, -200, 400, ...
pub fn alternating_y(index: usize) -> f32 {
    let sign = if index % 2 == 0 { 1.0 } else { -1.0 };
    sign * OTHER_SPACING * (index / 2) as f32
}

/// Position for a new node of `kind`, given how many nodes of the same kind
/// already exist.
pub fn initial_position(kind: NodeKind, existing_of_kind: usize) -> Position {
    match kind {
        NodeKind::Llm => Position::new(0.0, 300.0),
        NodeKind::McpServer => Position::new(0.0, -200.0),
        NodeKind::App => Position::new(0.0, 0.0),
        NodeKind::Tool => Position::new(TOOL_COLUMN_X, tool_y(existing_of_kind)),
        NodeKind::Other => Position::new(OTHER_COLUMN_X, alternating_y(existing_of_kind)),
    }
}
