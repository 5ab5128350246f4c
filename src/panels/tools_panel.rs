use egui::{Color32, Ui};

use crate::app::PixelApp;
use crate::components::ToolButton;
use crate::layer::ActiveLayer;
use crate::raster::GridPreset;
use crate::state::settings::{MAX_ZOOM, MIN_ZOOM};
use crate::texture_manager::{color_image, TextureKind};
use crate::tools::{BrushSize, ToolKind};

pub fn tools_panel(app: &mut PixelApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(220.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                tool_section(app, ui);
                ui.separator();
                color_section(app, ui);
                ui.separator();
                canvas_section(app, ui);
                ui.separator();
                layer_section(app, ui);
                ui.separator();
                history_section(app, ui);
                ui.separator();
                collaborator_section(app, ui);

                if let Some(status) = &app.status {
                    ui.separator();
                    ui.small(status.as_str());
                }
            });
        });
}

fn tool_section(app: &mut PixelApp, ui: &mut Ui) {
    ui.heading("Tools");
    let active = app.session().tool();
    ui.horizontal_wrapped(|ui| {
        for tool in ToolKind::ALL {
            if ToolButton::new(tool, tool == active).show(ui).clicked() {
                log::info!("Tool selected from UI: {}", tool.name());
                app.session_mut().set_tool(tool);
            }
        }
    });

    let mut size = app.session().brush_size().get();
    let slider = egui::Slider::new(&mut size, BrushSize::MIN..=BrushSize::MAX).text("Brush");
    if ui.add(slider).changed() {
        if let Err(err) = app.session_mut().set_brush_size(size) {
            app.report("Brush size", err);
        }
    }

    let mut symmetry = app.session().symmetry();
    if ui.checkbox(&mut symmetry, "Mirror X").changed() {
        app.session_mut().set_symmetry(symmetry);
    }
}

fn color_section(app: &mut PixelApp, ui: &mut Ui) {
    ui.heading("Colour");
    ui.horizontal(|ui| {
        let mut color: Color32 = app.session().color();
        if ui.color_edit_button_srgba(&mut color).changed() {
            app.session_mut().set_color(color);
            app.hex_input = app.session().color_hex();
        }

        let response = ui.add(egui::TextEdit::singleline(&mut app.hex_input).desired_width(80.0));
        if response.lost_focus() {
            let hex = app.hex_input.clone();
            if let Err(err) = app.session_mut().set_color_hex(&hex) {
                app.report("Colour", err);
            }
            app.hex_input = app.session().color_hex();
        } else if !response.has_focus() {
            // Follow picker changes made on the canvas
            app.hex_input = app.session().color_hex();
        }
    });
}

fn canvas_section(app: &mut PixelApp, ui: &mut Ui) {
    ui.heading("Canvas");
    let current = app.session().preset();
    ui.horizontal(|ui| {
        for preset in GridPreset::ALL {
            if ui.selectable_label(preset == current, preset.label()).clicked() {
                app.session_mut().set_preset(preset);
            }
        }
    });

    ui.horizontal(|ui| {
        let zoom = app.session().zoom();
        if ui.add_enabled(zoom > MIN_ZOOM, egui::Button::new("−")).clicked() {
            app.session_mut().zoom_out();
        }
        ui.label(format!("{}×", zoom));
        if ui.add_enabled(zoom < MAX_ZOOM, egui::Button::new("+")).clicked() {
            app.session_mut().zoom_in();
        }
    });

    ui.label("Preview");
    let (session, textures) = app.render_parts();
    let version = session.preview_version();
    let preview = textures.get_or_create_texture(
        TextureKind::Preview,
        version,
        || color_image(session.preview()),
        ui.ctx(),
    );
    let [w, h] = session.pixels().size();
    match preview {
        Ok(id) => {
            ui.image((id, egui::vec2(w as f32 * 2.0, h as f32 * 2.0)));
        }
        Err(err) => log::error!("Preview texture: {err}"),
    }
}

fn layer_section(app: &mut PixelApp, ui: &mut Ui) {
    ui.heading("Layers");
    let active = app.session().active_layer();
    ui.horizontal(|ui| {
        for layer in [ActiveLayer::Pixel, ActiveLayer::Sketch] {
            if ui.selectable_label(layer == active, layer.label()).clicked() {
                app.session_mut().set_active_layer(layer);
            }
        }
    });

    let mut sketch_opacity = app.session().sketch().opacity.get();
    if ui
        .add(egui::Slider::new(&mut sketch_opacity, 0.0..=1.0).text("Sketch"))
        .changed()
    {
        if let Err(err) = app.session_mut().set_sketch_opacity(sketch_opacity) {
            app.report("Sketch opacity", err);
        }
    }

    let mut reference_opacity = app.session().reference_opacity().get();
    if ui
        .add(egui::Slider::new(&mut reference_opacity, 0.0..=1.0).text("Reference"))
        .changed()
    {
        if let Err(err) = app.session_mut().set_reference_opacity(reference_opacity) {
            app.report("Reference opacity", err);
        }
    }

    ui.horizontal(|ui| {
        if ui.button(format!("Clear {}", active.label())).clicked() {
            app.show_clear_modal = true;
        }
        let has_reference = app.session().reference().is_some();
        if ui.add_enabled(has_reference, egui::Button::new("Drop reference")).clicked() {
            app.session_mut().clear_reference();
        }
    });
    ui.small("Drop an image file on the window to use it as a reference.");
}

fn history_section(app: &mut PixelApp, ui: &mut Ui) {
    ui.horizontal(|ui| {
        let can_undo = app.session().history().can_undo();
        let can_redo = app.session().history().can_redo();

        if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
            app.undo();
        }
        if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
            app.redo();
        }
        let export = ui.add_enabled(PixelApp::can_export_files(), egui::Button::new("Export PNG"));
        if export.clicked() {
            app.export();
        }
    });

    let history = app.session().history();
    ui.small(format!(
        "Undo: {}  Redo: {}",
        history.undo_depth(),
        history.redo_depth()
    ));
}

fn collaborator_section(app: &mut PixelApp, ui: &mut Ui) {
    ui.heading("Assistant");
    ui.add(egui::TextEdit::singleline(&mut app.reference_subject).hint_text("Describe a reference"));
    ui.horizontal(|ui| {
        let can_generate = !app.is_generating() && !app.reference_subject.trim().is_empty();
        if ui.add_enabled(can_generate, egui::Button::new("Generate")).clicked() {
            app.request_reference();
        }
        if app.is_generating() {
            ui.spinner();
        }
    });

    ui.horizontal(|ui| {
        if ui.add_enabled(!app.is_critiquing(), egui::Button::new("Critique")).clicked() {
            app.request_critique();
        }
        if app.is_critiquing() {
            ui.spinner();
        }
    });
    if let Some(text) = &app.critique {
        ui.label(text.as_str());
    }
}
