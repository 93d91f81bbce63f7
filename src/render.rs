use crate::dimensions::Dimensions;
use crate::touchmouse::grid::Grid;
use crate::touchmouse::walker::is_active;
use crate::touchmouse::{GRID_HEIGHT, GRID_WIDTH};
use egui::{Color32, FontId, Painter, Pos2, Rect, Stroke, StrokeKind, Vec2};

pub const MAGENTA: Color32 = Color32::from_rgb(255, 0, 182);
pub const ORANGE: Color32 = Color32::from_rgb(255, 101, 0);
pub const IDLE_GRAY: Color32 = Color32::from_rgb(200, 200, 200);
const INACTIVE_CELL: Color32 = Color32::from_rgb(235, 235, 235);

fn fade(color: Color32, alpha: f32) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), (255.0 * alpha) as u8)
}

pub fn draw_grid(painter: &Painter, grid: &Grid, dims: &Dimensions, corner: Pos2, cell: f32) {
    for y in 0..GRID_HEIGHT {
        for x in 0..GRID_WIDTH {
            let origin = dims.get_cell_origin(corner, cell, x, y);
            let rect = Rect::from_min_size(origin, Vec2::splat(cell));
            if !is_active(x, y) {
                let stroke = Stroke::new(1.0, INACTIVE_CELL);
                painter.rect_stroke(rect, 0.0, stroke, StrokeKind::Inside);
                continue;
            }
            let value = grid.get(x, y);
            if value > 0 {
                painter.rect_filled(rect, 0.0, fade(MAGENTA, value as f32 / 255.0));
            }
            let stroke = Stroke::new(1.0, IDLE_GRAY);
            painter.rect_stroke(rect, 0.0, stroke, StrokeKind::Inside);
        }
    }
}

pub fn draw_grid_boundary(painter: &Painter, corner: Pos2, cell: f32) {
    painter.rect_stroke(
        Rect::from_min_size(
            corner,
            Vec2::new(GRID_WIDTH as f32 * cell, GRID_HEIGHT as f32 * cell),
        ),
        0.0,
        Stroke::new(1.0, ORANGE),
        StrokeKind::Outside,
    );
}

pub fn draw_contact_indicator(painter: &Painter, pressed: bool, pos: Pos2) {
    let color = if pressed { MAGENTA } else { IDLE_GRAY };
    painter.text(
        pos,
        egui::Align2::CENTER_TOP,
        if pressed { "CONTACT" } else { "no contact" },
        FontId::monospace(14.0),
        color,
    );
}

pub fn draw_status_line(painter: &Painter, text: &str, pos: Pos2, color: Color32) {
    painter.text(
        pos,
        egui::Align2::CENTER_TOP,
        text,
        FontId::monospace(10.0),
        color,
    );
}
