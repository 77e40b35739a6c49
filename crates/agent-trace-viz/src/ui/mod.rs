//! UI components for the trace canvas.
//!
//! This module contains rendering functions for overlays and widgets.

mod edge;
mod overlays;

pub use edge::{draw_connector, edge_icon, violation_popup, PopupAction};
pub use overlays::{draw_node_card, draw_sidebar_toggle, sidebar_toggle_rect};
