use std::io::Cursor;

use egui::{pos2, Color32, Pos2, Rect};
use image::{ImageFormat, Rgba, RgbaImage};
use pixel_studio::event::AutosaveSlot;
use pixel_studio::{ActiveLayer, EditorError, EditorSession, GridPreset, SessionSettings, ToolKind};

fn session() -> EditorSession {
    let mut session = EditorSession::new(GridPreset::Head);
    session.set_canvas_bounds(Rect::from_min_size(pos2(0.0, 0.0), egui::vec2(32.0, 32.0)));
    session
}

fn cell(x: i32, y: i32) -> Pos2 {
    pos2(x as f32 + 0.5, y as f32 + 0.5)
}

fn png(image: &RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
    bytes
}

#[test]
fn test_export_contains_pixel_layer_only() {
    let mut s = session();
    s.set_color(Color32::RED);
    s.pointer_down(cell(0, 0));
    s.pointer_up();

    s.set_active_layer(ActiveLayer::Sketch);
    s.pointer_down(cell(10, 10));
    s.pointer_move(cell(20, 10));
    s.pointer_up();
    s.set_reference(pixel_studio::ReferenceLayer::new(
        "solid",
        RgbaImage::from_pixel(4, 4, Rgba([0, 255, 0, 255])),
    ));

    let decoded = image::load_from_memory(&s.export_png().unwrap()).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (32, 32));
    assert_eq!(decoded.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(decoded.get_pixel(15, 10).0[3], 0);
}

#[test]
fn test_export_file_name() {
    let s = EditorSession::new(GridPreset::Body);
    let name = s.export_file_name();
    assert!(name.starts_with("graal_pro_body_"));
    assert!(name.ends_with(".png"));
}

#[test]
fn test_sketch_gestures_leave_pixels_and_history_alone() {
    let mut s = session();
    let autosave = AutosaveSlot::new();
    s.subscribe(Box::new(autosave.clone()));
    s.set_color(Color32::BLUE);
    s.set_active_layer(ActiveLayer::Sketch);

    s.pointer_down(cell(4, 4));
    s.pointer_up();
    s.set_tool(ToolKind::Fill);
    s.pointer_down(cell(20, 20));
    s.pointer_up();

    assert!(s.pixels().is_blank());
    assert!(!s.history().can_undo());
    assert!(autosave.latest().is_none());
    // Cell (4,4) covers sketch pixels 128..160
    assert_eq!(s.sketch().sample(pos2(144.0, 144.0)), Some(Color32::BLUE));

    s.clear_sketch();
    assert!(s.sketch().is_blank());
}

#[test]
fn test_pixel_layer_dims_while_sketching() {
    let mut s = session();
    s.set_color(Color32::RED);
    s.pointer_down(cell(1, 1));
    s.pointer_up();

    assert_eq!(s.compose(1).get_pixel(1, 1).0, [255, 0, 0, 255]);

    s.set_active_layer(ActiveLayer::Sketch);
    let px = s.compose(1).get_pixel(1, 1).0;
    assert_eq!(px[0], 255);
    assert_eq!(px[3], 204);
}

#[test]
fn test_canvas_composite_keeps_sketch_detail() {
    let mut s = session();
    s.set_color(Color32::BLUE);
    s.set_active_layer(ActiveLayer::Sketch);
    s.pointer_down(cell(4, 4));
    s.pointer_up();

    let canvas = s.compose_canvas();
    let [w, h] = s.sketch().size();
    assert_eq!(canvas.dimensions(), (w as u32, h as u32));
    // The stamp is smaller than the cell it sits in
    assert_eq!(canvas.get_pixel(144, 144).0, [0, 0, 255, 255]);
    assert_eq!(canvas.get_pixel(129, 129).0[3], 0);
}

#[test]
fn test_load_pixels_quantizes_and_scales() {
    let mut s = session();
    s.pointer_down(cell(0, 0));
    s.pointer_up();

    let mut source = RgbaImage::new(64, 64);
    for (x, _, px) in source.enumerate_pixels_mut() {
        *px = if x < 32 { Rgba([10, 20, 30, 200]) } else { Rgba([10, 20, 30, 60]) };
    }
    s.load_pixels(&png(&source)).unwrap();

    assert_eq!(s.pixels().get(0, 0), Some(Color32::from_rgb(10, 20, 30)));
    assert_eq!(s.pixels().get(31, 31), Some(Color32::TRANSPARENT));
    assert!(!s.history().can_undo());
}

#[test]
fn test_load_pixels_rejects_garbage_without_changes() {
    let mut s = session();
    s.set_color(Color32::RED);
    s.pointer_down(cell(5, 5));
    s.pointer_up();
    let before = s.pixels().clone();

    assert!(matches!(s.load_pixels(b"definitely not a png"), Err(EditorError::Image(_))));
    assert_eq!(s.pixels(), &before);
    assert!(s.history().can_undo());
}

#[test]
fn test_reference_opacity_applies_to_new_references() {
    let mut s = session();
    s.set_reference_opacity(0.9).unwrap();
    s.load_reference("ref", &png(&RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255]))))
        .unwrap();
    assert_eq!(s.reference().map(|r| r.opacity.get()), Some(0.9));

    s.clear_reference();
    assert!(s.reference().is_none());
}

#[test]
fn test_opacity_is_clamped_and_nan_rejected() {
    let mut s = session();
    s.set_sketch_opacity(3.0).unwrap();
    assert_eq!(s.sketch().opacity.get(), 1.0);
    assert!(matches!(s.set_sketch_opacity(f32::NAN), Err(EditorError::InvalidOpacity(_))));
    assert_eq!(s.sketch().opacity.get(), 1.0);
}

#[test]
fn test_settings_round_trip_and_validation() {
    let mut s = session();
    s.set_tool(ToolKind::Line);
    s.set_color_hex("#12ab34").unwrap();
    s.set_brush_size(4).unwrap();
    s.set_symmetry(true);
    s.zoom_in();
    let settings = s.settings();
    assert_eq!(settings.color, "#12ab34");
    assert_eq!(settings.zoom, 14);

    let mut other = EditorSession::default();
    other.apply_settings(&settings).unwrap();
    assert_eq!(other.settings(), settings);

    let bad = SessionSettings { color: "nope".into(), brush_size: 2, ..SessionSettings::default() };
    assert!(other.apply_settings(&bad).is_err());
    assert_eq!(other.brush_size().get(), 4);
}

#[test]
fn test_brush_size_bounds() {
    let mut s = session();
    assert!(matches!(s.set_brush_size(0), Err(EditorError::InvalidBrushSize(0))));
    assert!(matches!(s.set_brush_size(11), Err(EditorError::InvalidBrushSize(11))));
    assert_eq!(s.brush_size().get(), 1);
}

#[test]
fn test_zoom_is_clamped() {
    let mut s = session();
    for _ in 0..100 {
        s.zoom_in();
    }
    assert_eq!(s.zoom(), 60);
    for _ in 0..100 {
        s.zoom_out();
    }
    assert_eq!(s.zoom(), 4);
}
