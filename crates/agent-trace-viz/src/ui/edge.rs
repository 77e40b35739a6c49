//! Connector painting, the inspection icon and the violation popup.

use egui::epaint::PathShape;
use egui::{Align2, Color32, FontId, Pos2, Rect, RichText, Sense, Stroke};

use crate::render::{
    gradient_at, sample_connector, CLEAN_COLOR, ICON_PACKAGE_OPEN, ICON_PACKAGE_SEARCH,
    VIOLATION_COLOR,
};

const POPUP_WIDTH: f32 = 250.0;
const POPUP_HEIGHT: f32 = 160.0;
const POPUP_OFFSET_X: f32 = 15.0;
const POPUP_BODY_HEIGHT: f32 = 100.0;
const ICON_HIT_SIZE: f32 = 22.0;

/// Paint a bezier connector with an optional source-to-target gradient and
/// a marker at the target end.
pub fn draw_connector(
    painter: &egui::Painter,
    points: &[Pos2; 4],
    width: f32,
    alpha: f32,
    gradient: bool,
    highlight: Option<Color32>,
) {
    let samples = sample_connector(points);
    let segments = samples.len().saturating_sub(1).max(1);

    if let Some(color) = highlight {
        painter.add(PathShape::line(
            samples.clone(),
            Stroke::new(width + 3.0, color.gamma_multiply(0.35 * alpha)),
        ));
    }

    if gradient {
        for (i, pair) in samples.windows(2).enumerate() {
            let color = gradient_at(i as f32 / segments as f32).gamma_multiply(alpha);
            painter.line_segment([pair[0], pair[1]], Stroke::new(width, color));
        }
    } else {
        painter.add(PathShape::line(
            samples,
            Stroke::new(width, Color32::GRAY.gamma_multiply(alpha)),
        ));
    }

    let end_color = if gradient {
        gradient_at(1.0)
    } else {
        Color32::GRAY
    };
    painter.circle_filled(points[3], width * 1.8, end_color.gamma_multiply(alpha));
}

/// Inspection icon at `center`. Red when the edge carries a violation,
/// green otherwise; swaps to the open glyph while hovered.
pub fn edge_icon(ui: &mut egui::Ui, edge_id: &str, center: Pos2, scale: f32, violation: bool, alpha: f32) -> egui::Response {
    let size = ICON_HIT_SIZE * scale.clamp(0.6, 1.5);
    let rect = Rect::from_center_size(center, egui::vec2(size, size));
    let response = ui
        .interact(rect, ui.id().with(("edge_icon", edge_id)), Sense::click())
        .on_hover_cursor(egui::CursorIcon::PointingHand);

    let glyph = if response.hovered() {
        ICON_PACKAGE_OPEN
    } else {
        ICON_PACKAGE_SEARCH
    };
    let color = if violation {
        VIOLATION_COLOR
    } else {
        CLEAN_COLOR
    };
    let painter = ui.painter();
    painter.circle_filled(center, size * 0.55, ui.visuals().extreme_bg_color.gamma_multiply(alpha));
    painter.circle_stroke(center, size * 0.55, Stroke::new(1.0, color.gamma_multiply(alpha)));
    painter.text(
        center,
        Align2::CENTER_CENTER,
        glyph,
        FontId::proportional(size * 0.7),
        color.gamma_multiply(alpha),
    );
    response
}

/// What the user did with an open popup this frame. Both carry the area the
/// popup covered, so the click that closed it is not seen as a canvas click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupAction {
    Open(Rect),
    Close(Rect),
}

impl PopupAction {
    pub fn rect(&self) -> Rect {
        match self {
            PopupAction::Open(rect) | PopupAction::Close(rect) => *rect,
        }
    }
}

/// Popup to the right of the edge icon listing the violation text.
pub fn violation_popup(ctx: &egui::Context, edge_id: &str, anchor: Pos2, text: &str) -> PopupAction {
    let pos = Pos2::new(anchor.x + POPUP_OFFSET_X, anchor.y - POPUP_HEIGHT * 0.5);
    let mut close = false;

    let area = egui::Area::new(egui::Id::new(("violation_popup", edge_id)))
        .order(egui::Order::Foreground)
        .fixed_pos(pos)
        .movable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.set_width(POPUP_WIDTH);
                ui.set_max_height(POPUP_HEIGHT);
                ui.horizontal(|ui| {
                    ui.label(RichText::new("violation_info").strong());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("×").on_hover_text("Close").clicked() {
                            close = true;
                        }
                    });
                });
                ui.separator();
                egui::ScrollArea::vertical()
                    .max_height(POPUP_BODY_HEIGHT)
                    .show(ui, |ui| {
                        ui.label(RichText::new(text).color(VIOLATION_COLOR).small());
                    });
            });
        });

    if close {
        PopupAction::Close(area.response.rect)
    } else {
        PopupAction::Open(area.response.rect)
    }
}
