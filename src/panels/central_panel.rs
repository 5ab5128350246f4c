use egui::{Color32, Rect, Sense, Stroke};

use crate::app::PixelApp;
use crate::texture_manager::{color_image, TextureKind};

/// Grid lines are only drawn once cells are at least this large.
const GRID_LINE_MIN_ZOOM: u32 = 8;

pub fn central_panel(app: &mut PixelApp, ctx: &egui::Context) {
    egui::CentralPanel::default()
        .frame(egui::Frame::default().fill(Color32::from_gray(18)))
        .show(ctx, |ui| {
            let available = ui.available_rect_before_wrap();
            let canvas_rect = Rect::from_center_size(available.center(), app.session().canvas_size());
            ui.allocate_rect(available, Sense::hover());

            app.session_mut().set_canvas_bounds(canvas_rect);
            app.input_mut().set_canvas_rect(canvas_rect);

            let events = app.input_mut().process_input(ctx);
            for event in &events {
                app.session_mut().handle_input(event);
            }

            let painter = ui.painter_at(available);
            painter.rect_filled(canvas_rect, 0.0, Color32::from_gray(40));

            let (session, textures) = app.render_parts();
            let canvas = textures.get_or_create_texture(
                TextureKind::Canvas,
                session.revision(),
                || color_image(&session.compose_canvas()),
                ctx,
            );
            match canvas {
                Ok(id) => {
                    painter.image(
                        id,
                        canvas_rect,
                        Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        Color32::WHITE,
                    );
                }
                Err(err) => log::error!("Canvas texture: {err}"),
            }

            let zoom = session.zoom() as f32;
            let [w, h] = session.pixels().size();
            if session.zoom() >= GRID_LINE_MIN_ZOOM {
                let line = Stroke::new(1.0, Color32::from_white_alpha(12));
                for x in 1..w {
                    let sx = canvas_rect.min.x + x as f32 * zoom;
                    painter.vline(sx, canvas_rect.y_range(), line);
                }
                for y in 1..h {
                    let sy = canvas_rect.min.y + y as f32 * zoom;
                    painter.hline(canvas_rect.x_range(), sy, line);
                }
            }

            // Line tool rubber band
            if let Some(cells) = session.line_preview() {
                let color = session.color().gamma_multiply(0.6);
                for cell in cells {
                    let min = canvas_rect.min + egui::vec2(cell.x as f32 * zoom, cell.y as f32 * zoom);
                    painter.rect_filled(Rect::from_min_size(min, egui::vec2(zoom, zoom)), 0.0, color);
                }
            }

            painter.rect_stroke(canvas_rect, 0.0, Stroke::new(1.0, Color32::from_gray(90)));

            if !events.is_empty() {
                ctx.request_repaint();
            }
        });
}
