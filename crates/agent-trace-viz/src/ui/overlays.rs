//! Overlay rendering for node cards and the sidebar toggle.

use agent_trace_core::TraceNode;
use egui::text::{LayoutJob, TextWrapping};
use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Stroke, TextFormat};

use crate::render::{card_fill, highlight_color, node_accent, node_icon, node_top_icon};

fn single_line(painter: &Painter, text: &str, font: FontId, color: Color32, max_width: f32) -> std::sync::Arc<egui::Galley> {
    let mut job = LayoutJob::single_section(
        text.to_owned(),
        TextFormat {
            font_id: font,
            color,
            ..Default::default()
        },
    );
    job.wrap = TextWrapping::truncate_at_width(max_width);
    painter.layout_job(job)
}

/// Draw a node card: type icon, title and id, with an optional badge.
///
/// Painted rather than laid out as widgets so pointer input still reaches the
/// graph view underneath (dragging works through the card).
pub fn draw_node_card(
    painter: &Painter,
    rect: Rect,
    node: &TraceNode,
    alpha: f32,
    dark_mode: bool,
    highlighted: bool,
) {
    let scale = rect.height() / crate::render::CARD_SIZE.y;
    let accent = node_accent(node.kind, dark_mode).gamma_multiply(alpha);
    let text_color = if dark_mode {
        Color32::from_gray(230)
    } else {
        Color32::from_gray(30)
    }
    .gamma_multiply(alpha);
    let muted = Color32::GRAY.gamma_multiply(alpha);

    let stroke = if highlighted {
        Stroke::new(2.5 * scale.max(0.5), highlight_color(dark_mode).gamma_multiply(alpha))
    } else {
        Stroke::new(1.5 * scale.max(0.5), accent)
    };
    painter.rect(
        rect,
        6.0 * scale,
        card_fill(dark_mode).gamma_multiply(alpha),
        stroke,
        egui::StrokeKind::Inside,
    );

    let pad = 8.0 * scale;
    let icon_size = (22.0 * scale).clamp(6.0, 40.0);
    let icon_center = Pos2::new(rect.left() + pad + icon_size * 0.5, rect.center().y);
    painter.text(
        icon_center,
        Align2::CENTER_CENTER,
        node_icon(node.kind),
        FontId::proportional(icon_size),
        accent,
    );

    let text_left = icon_center.x + icon_size * 0.5 + pad;
    let text_width = (rect.right() - pad - text_left).max(1.0);
    let title_size = (13.0 * scale).clamp(5.0, 22.0);
    let sub_size = (10.0 * scale).clamp(4.0, 18.0);

    let title = single_line(
        painter,
        node.kind.title(),
        FontId::proportional(title_size),
        text_color,
        text_width,
    );
    let sub = single_line(
        painter,
        &node.id,
        FontId::monospace(sub_size),
        muted,
        text_width,
    );
    let block_height = title.size().y + sub.size().y;
    let top = rect.center().y - block_height * 0.5;
    painter.galley(Pos2::new(text_left, top), title.clone(), text_color);
    painter.galley(Pos2::new(text_left, top + title.size().y), sub, muted);

    if let Some(badge) = node_top_icon(node.kind) {
        let badge_radius = 9.0 * scale;
        let badge_center = Pos2::new(rect.right() - badge_radius * 0.4, rect.top() + badge_radius * 0.4);
        painter.circle(
            badge_center,
            badge_radius,
            card_fill(dark_mode).gamma_multiply(alpha),
            Stroke::new(1.0, accent),
        );
        painter.text(
            badge_center,
            Align2::CENTER_CENTER,
            badge,
            FontId::proportional(badge_radius * 1.2),
            accent,
        );
    }
}

/// Where the sidebar toggle sits inside `g_rect`.
pub fn sidebar_toggle_rect(g_rect: egui::Rect) -> egui::Rect {
    let btn_size = egui::vec2(32.0, 32.0);
    let right_margin = 10.0;
    let bottom_margin = 10.0;

    let toggle_pos = egui::pos2(
        g_rect.right() - right_margin - btn_size.x,
        g_rect.bottom() - bottom_margin - btn_size.y,
    );
    egui::Rect::from_min_size(toggle_pos, btn_size)
}

/// Draw the sidebar toggle button in the bottom-right corner.
pub fn draw_sidebar_toggle(ui: &mut egui::Ui, show_sidebar: &mut bool) {
    let g_rect = ui.max_rect();
    let btn = sidebar_toggle_rect(g_rect);

    let (arrow, tip) = if *show_sidebar {
        ("▶", "Hide trace panel")
    } else {
        ("◀", "Show trace panel")
    };

    egui::Area::new(egui::Id::new("trace_panel_toggle_btn"))
        .order(egui::Order::Foreground)
        .fixed_pos(btn.min)
        .movable(false)
        .show(ui.ctx(), |ui_area| {
            ui_area.set_clip_rect(g_rect);
            let arrow_text = egui::RichText::new(arrow).size(18.0);
            let response = ui_area.add_sized(btn.size(), egui::Button::new(arrow_text));
            if response.on_hover_text(tip).clicked() {
                *show_sidebar = !*show_sidebar;
            }
        });
}
