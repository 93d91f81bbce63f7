use crate::dimensions::Dimensions;
use crate::render;
use crate::touchmouse::backend::DecoderHandle;

pub struct TouchviewApp {
    decoder: DecoderHandle,
    dims: Dimensions,
    show_raw: bool,
    /// Set once the decoder thread has exited.
    worker_status: Option<String>,
}

impl TouchviewApp {
    pub fn new(decoder: DecoderHandle, show_raw: bool) -> Self {
        Self {
            decoder,
            dims: Dimensions::default(),
            show_raw,
            worker_status: None,
        }
    }

    fn check_worker(&mut self) {
        if self.worker_status.is_some() || !self.decoder.is_finished() {
            return;
        }
        self.worker_status = Some(match self.decoder.stop_and_join() {
            Ok(()) => "decoder stopped".to_string(),
            Err(e) => format!("decoder failed: {}", e),
        });
    }
}

impl eframe::App for TouchviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Only the current state is drawn, so queued transitions are discarded
        while self.decoder.events.try_recv().is_ok() {}
        self.check_worker();

        let published = &self.decoder.published;
        let grid = published.grid.snapshot();
        let last_report = published.last_report.snapshot();
        let pressed = published.contact.snapshot().map_or(false, |c| c.pressed);

        let screen_rect = ctx.screen_rect();
        self.dims.screen_width = screen_rect.width();
        self.dims.screen_height = screen_rect.height();

        let cell = self.dims.get_cell_size();
        let corner = self.dims.get_grid_corner(cell);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(egui::Color32::WHITE))
            .show(ctx, |ui| {
                let painter = ui.painter();

                render::draw_grid(painter, &grid, &self.dims, corner, cell);
                render::draw_grid_boundary(painter, corner, cell);

                let center_x = self.dims.screen_width / 2.0;
                let mut y = corner.y + cell * crate::touchmouse::GRID_HEIGHT as f32 + 8.0;
                render::draw_contact_indicator(painter, pressed, egui::Pos2::new(center_x, y));
                y += 20.0;

                if self.show_raw {
                    if let Some(report) = &*last_report {
                        render::draw_status_line(
                            painter,
                            &report.hex_dump(),
                            egui::Pos2::new(center_x, y),
                            egui::Color32::DARK_GRAY,
                        );
                        y += 16.0;
                    }
                }

                if let Some(status) = &self.worker_status {
                    render::draw_status_line(
                        painter,
                        status,
                        egui::Pos2::new(center_x, y),
                        render::ORANGE,
                    );
                }
            });

        // Request continuous repaint for animation
        ctx.request_repaint();
    }
}
