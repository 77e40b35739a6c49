//! Node/edge rendering helpers: colours, glyphs and connector geometry.

use std::collections::HashMap;

use agent_trace_core::NodeKind;
use egui::{Color32, Pos2, Rect, Vec2};

/// Canvas-space size of a node card before zoom.
pub const CARD_SIZE: Vec2 = Vec2::new(170.0, 54.0);

/// Gradient ends for connectors (#ae53ba -> #2a8af6).
pub const EDGE_GRADIENT_START: Color32 = Color32::from_rgb(0xae, 0x53, 0xba);
pub const EDGE_GRADIENT_END: Color32 = Color32::from_rgb(0x2a, 0x8a, 0xf6);

/// Icon colours for inspected edges (#dc3545 / #198754).
pub const VIOLATION_COLOR: Color32 = Color32::from_rgb(0xdc, 0x35, 0x45);
pub const CLEAN_COLOR: Color32 = Color32::from_rgb(0x19, 0x87, 0x54);

/// Seconds a new node or edge takes to fade in.
pub const FADE_SECONDS: f64 = 0.5;

/// Segments used to flatten a connector for the gradient stroke.
const CONNECTOR_SEGMENTS: usize = 24;

pub const ICON_PACKAGE_SEARCH: &str = "🔎";
pub const ICON_PACKAGE_OPEN: &str = "📦";
pub const ICON_LINKED: &str = "🔗";
pub const ICON_UNLINKED: &str = "⛓";

pub fn node_icon(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Llm => "🧠",
        NodeKind::Tool => "🔧",
        NodeKind::App => "⚛",
        NodeKind::McpServer => "🖧",
        NodeKind::Other => "●",
    }
}

/// Small badge on the card corner: where the node runs.
pub fn node_top_icon(kind: NodeKind) -> Option<&'static str> {
    match kind {
        NodeKind::Llm => Some("☁"),
        NodeKind::App | NodeKind::Tool => Some("⬡"),
        NodeKind::McpServer | NodeKind::Other => None,
    }
}

pub fn node_accent(kind: NodeKind, dark_mode: bool) -> Color32 {
    let (dark, light) = match kind {
        NodeKind::Llm => (Color32::from_rgb(176, 90, 255), Color32::from_rgb(130, 60, 200)),
        NodeKind::Tool => (Color32::from_rgb(42, 138, 246), Color32::from_rgb(20, 100, 200)),
        NodeKind::App => (Color32::from_rgb(0, 212, 200), Color32::from_rgb(0, 150, 140)),
        NodeKind::McpServer => (Color32::from_rgb(255, 170, 0), Color32::from_rgb(200, 130, 0)),
        NodeKind::Other => (Color32::from_rgb(140, 140, 160), Color32::from_rgb(100, 100, 120)),
    };
    if dark_mode {
        dark
    } else {
        light
    }
}

pub fn card_fill(dark_mode: bool) -> Color32 {
    if dark_mode {
        Color32::from_rgb(22, 22, 28)
    } else {
        Color32::from_rgb(248, 248, 252)
    }
}

pub fn highlight_color(dark_mode: bool) -> Color32 {
    if dark_mode {
        Color32::from_rgb(0, 212, 255)
    } else {
        Color32::from_rgb(0, 150, 200)
    }
}

/// Card rectangle centred on a node, scaled to screen.
pub fn card_rect(center: Pos2, scale: f32) -> Rect {
    Rect::from_center_size(center, CARD_SIZE * scale)
}

/// Control offset for a bezier handle, as xyflow computes it.
fn control_offset(distance: f32) -> f32 {
    const CURVATURE: f32 = 0.25;
    if distance >= 0.0 {
        0.5 * distance
    } else {
        CURVATURE * 25.0 * (-distance).sqrt()
    }
}

/// Cubic bezier from a right-facing source handle to a left-facing target
/// handle. Returns `[start, control1, control2, end]`.
pub fn connector_points(source: Pos2, target: Pos2) -> [Pos2; 4] {
    let offset = control_offset(target.x - source.x);
    [
        source,
        Pos2::new(source.x + offset, source.y),
        Pos2::new(target.x - offset, target.y),
        target,
    ]
}

/// Midpoint of the two handles, where the inspection icon sits.
pub fn connector_center(source: Pos2, target: Pos2) -> Pos2 {
    source.lerp(target, 0.5)
}

fn cubic_at(points: &[Pos2; 4], t: f32) -> Pos2 {
    let u = 1.0 - t;
    let [p0, p1, p2, p3] = [
        points[0].to_vec2(),
        points[1].to_vec2(),
        points[2].to_vec2(),
        points[3].to_vec2(),
    ];
    (p0 * (u * u * u) + p1 * (3.0 * u * u * t) + p2 * (3.0 * u * t * t) + p3 * (t * t * t))
        .to_pos2()
}

/// Flattened connector, `CONNECTOR_SEGMENTS + 1` points from source to target.
pub fn sample_connector(points: &[Pos2; 4]) -> Vec<Pos2> {
    (0..=CONNECTOR_SEGMENTS)
        .map(|i| cubic_at(points, i as f32 / CONNECTOR_SEGMENTS as f32))
        .collect()
}

pub fn gradient_at(t: f32) -> Color32 {
    lerp_color(EDGE_GRADIENT_START, EDGE_GRADIENT_END, t)
}

fn lerp_color(a: Color32, b: Color32, t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Color32::from_rgba_unmultiplied(
        mix(a.r(), b.r()),
        mix(a.g(), b.g()),
        mix(a.b(), b.b()),
        mix(a.a(), b.a()),
    )
}

/// Vertical offset for the `index`-th icon among edges sharing a node pair,
/// so parallel edges do not stack their icons.
pub fn icon_stack_offset(index: usize, scale: f32) -> Vec2 {
    Vec2::new(0.0, index as f32 * 24.0 * scale.clamp(0.6, 1.5))
}

/// Remembers when each item first appeared so it can fade in.
#[derive(Debug, Default)]
pub struct FadeIn {
    first_seen: HashMap<String, f64>,
}

impl FadeIn {
    /// Opacity in `0.0..=1.0` for `id` at time `now` (seconds).
    pub fn alpha(&mut self, id: &str, now: f64) -> f32 {
        let start = *self.first_seen.entry(id.to_string()).or_insert(now);
        ((now - start) / FADE_SECONDS).clamp(0.0, 1.0) as f32
    }

    /// True while anything seen so far is still fading.
    pub fn is_animating(&self, now: f64) -> bool {
        self.first_seen
            .values()
            .any(|&start| now - start < FADE_SECONDS)
    }
}
