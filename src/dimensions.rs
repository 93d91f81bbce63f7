use crate::touchmouse::{GRID_HEIGHT, GRID_WIDTH};
use egui::Pos2;

pub struct Dimensions {
    pub screen_width: f32,
    pub screen_height: f32,
    pub margin: f32,
    /// Space kept free under the grid for the status lines.
    pub footer_height: f32,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            screen_width: 640.0,
            screen_height: 560.0,
            margin: 15.0,
            footer_height: 80.0,
        }
    }
}

impl Dimensions {
    /// Side length of one square grid cell.
    pub fn get_cell_size(&self) -> f32 {
        let avail_w = self.screen_width - self.margin * 2.0;
        let avail_h = self.screen_height - self.margin * 2.0 - self.footer_height;
        (avail_w / GRID_WIDTH as f32)
            .min(avail_h / GRID_HEIGHT as f32)
            .max(1.0)
    }

    /// Top-left corner of the grid, centred horizontally.
    pub fn get_grid_corner(&self, cell: f32) -> Pos2 {
        let avail_h = self.screen_height - self.footer_height;
        Pos2::new(
            self.screen_width / 2.0 - (GRID_WIDTH as f32 / 2.0) * cell,
            (avail_h / 2.0 - (GRID_HEIGHT as f32 / 2.0) * cell).max(self.margin),
        )
    }

    pub fn get_cell_origin(&self, corner: Pos2, cell: f32, x: usize, y: usize) -> Pos2 {
        Pos2::new(corner.x + x as f32 * cell, corner.y + y as f32 * cell)
    }
}
