use egui::{pos2, Color32, Pos2, Rect};
use pixel_studio::color::EMPTY;
use pixel_studio::{EditorSession, GridPreset, ToolKind};

/// Session whose canvas maps one display unit onto one grid cell.
fn session(preset: GridPreset) -> EditorSession {
    let mut session = EditorSession::new(preset);
    let [w, h] = preset.size();
    session.set_canvas_bounds(Rect::from_min_size(pos2(0.0, 0.0), egui::vec2(w as f32, h as f32)));
    session
}

fn cell(x: i32, y: i32) -> Pos2 {
    pos2(x as f32 + 0.5, y as f32 + 0.5)
}

#[test]
fn test_fill_on_empty_grid_covers_everything() {
    let mut s = session(GridPreset::Head);
    s.set_tool(ToolKind::Fill);
    s.set_color(Color32::RED);

    s.pointer_down(cell(0, 0));
    s.pointer_up();

    assert!(s.pixels().pixels().iter().all(|&c| c == Color32::RED));
}

#[test]
fn test_fill_with_same_color_is_noop() {
    let mut s = session(GridPreset::Head);
    s.set_color(Color32::RED);
    s.set_tool(ToolKind::Fill);
    s.pointer_down(cell(0, 0));
    s.pointer_up();
    let before = s.pixels().clone();

    let outcome = s.pointer_down(cell(7, 7));
    s.pointer_up();
    assert!(!outcome.pixels_changed);
    assert_eq!(s.pixels(), &before);
}

#[test]
fn test_fast_pencil_drag_leaves_no_gaps() {
    let mut s = session(GridPreset::Head);
    s.set_color(Color32::GREEN);

    s.pointer_down(cell(5, 5));
    s.pointer_move(cell(10, 5));
    s.pointer_up();

    for x in 5..=10 {
        assert_eq!(s.pixels().get(x, 5), Some(Color32::GREEN), "gap at x={x}");
    }
    assert_eq!(s.pixels().get(4, 5), Some(EMPTY));
    assert_eq!(s.pixels().get(11, 5), Some(EMPTY));
}

#[test]
fn test_symmetry_mirrors_across_vertical_axis() {
    let mut s = session(GridPreset::Head);
    s.set_symmetry(true);
    s.set_color(Color32::BLUE);

    s.pointer_down(cell(2, 10));
    s.pointer_up();

    assert_eq!(s.pixels().get(2, 10), Some(Color32::BLUE));
    assert_eq!(s.pixels().get(29, 10), Some(Color32::BLUE));
}

#[test]
fn test_symmetry_on_body_preset_stroke() {
    let mut s = session(GridPreset::Body);
    s.set_symmetry(true);
    s.set_color(Color32::YELLOW);

    s.pointer_down(cell(0, 60));
    s.pointer_move(cell(3, 60));
    s.pointer_up();

    for x in 0..=3 {
        assert_eq!(s.pixels().get(x, 60), Some(Color32::YELLOW));
        assert_eq!(s.pixels().get(31 - x, 60), Some(Color32::YELLOW));
    }
}

#[test]
fn test_eraser_clears_cells() {
    let mut s = session(GridPreset::Head);
    s.set_color(Color32::RED);
    s.set_brush_size(3).unwrap();
    s.pointer_down(cell(10, 10));
    s.pointer_up();
    assert_eq!(s.pixels().get(11, 11), Some(Color32::RED));

    s.set_tool(ToolKind::Eraser);
    s.set_brush_size(1).unwrap();
    s.pointer_down(cell(11, 11));
    s.pointer_up();
    assert_eq!(s.pixels().get(11, 11), Some(EMPTY));
    assert_eq!(s.pixels().get(10, 10), Some(Color32::RED));
}

#[test]
fn test_picker_takes_color_and_switches_to_pencil() {
    let mut s = session(GridPreset::Head);
    let teal = Color32::from_rgb(0, 128, 128);
    s.set_color(teal);
    s.pointer_down(cell(4, 4));
    s.pointer_up();

    s.set_color(Color32::WHITE);
    s.set_tool(ToolKind::Picker);
    let outcome = s.pointer_down(cell(4, 4));
    s.pointer_up();

    assert_eq!(outcome.picked, Some(teal));
    assert_eq!(s.color(), teal);
    assert_eq!(s.tool(), ToolKind::Pencil);
}

#[test]
fn test_picker_on_empty_pixel_changes_nothing() {
    let mut s = session(GridPreset::Head);
    s.set_color(Color32::RED);
    s.set_tool(ToolKind::Picker);

    let outcome = s.pointer_down(cell(20, 20));
    s.pointer_up();

    assert_eq!(outcome.picked, None);
    assert_eq!(s.color(), Color32::RED);
    assert_eq!(s.tool(), ToolKind::Picker);
}

#[test]
fn test_out_of_bounds_input_is_ignored() {
    let mut s = session(GridPreset::Head);
    s.set_color(Color32::RED);

    s.pointer_down(pos2(-3.0, 5.0));
    s.pointer_move(pos2(40.0, 5.0));
    s.pointer_up();
    assert!(s.pixels().is_blank());
    assert!(!s.history().can_undo());

    s.set_tool(ToolKind::Fill);
    s.pointer_down(pos2(100.0, 100.0));
    s.pointer_up();
    assert!(s.pixels().is_blank());
}

#[test]
fn test_line_tool_commits_on_release() {
    let mut s = session(GridPreset::Head);
    s.set_tool(ToolKind::Line);
    s.set_color(Color32::RED);

    s.pointer_down(cell(1, 1));
    s.pointer_move(cell(8, 4));
    assert!(s.pixels().is_blank());
    assert!(s.line_preview().is_some());

    s.pointer_up();
    assert_eq!(s.pixels().get(1, 1), Some(Color32::RED));
    assert_eq!(s.pixels().get(8, 4), Some(Color32::RED));
    assert!(s.line_preview().is_none());
}

#[test]
fn test_pointer_leave_ends_gesture() {
    let mut s = session(GridPreset::Head);
    s.pointer_down(cell(3, 3));
    assert!(s.gesture_state() != Default::default());

    s.pointer_leave();
    assert_eq!(s.gesture_state(), Default::default());
    assert!(s.history().can_undo());

    // Further moves without a press do nothing
    s.pointer_move(cell(9, 9));
    assert_eq!(s.pixels().get(9, 9), Some(EMPTY));
}
