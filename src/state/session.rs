use std::sync::Arc;

use egui::{Color32, Pos2, Rect};
use image::RgbaImage;
use uuid::Uuid;

use crate::color::{self, DEFAULT_COLOR};
use crate::compositor::{LayerCompositor, LayerStack};
use crate::error::EditorResult;
use crate::event::{EditorEvent, EventBus, EventHandler, HistoryEvent, LayerEvent, LayerKind};
use crate::export;
use crate::geometry::{CoordinateMapper, GridPos};
use crate::history::HistoryManager;
use crate::input::InputEvent;
use crate::layer::{
    ActiveLayer, Opacity, ReferenceLayer, SketchLayer, DEFAULT_REFERENCE_OPACITY, SKETCH_SCALE,
};
use crate::raster::{GridPreset, RasterBuffer};
use crate::tools::{BrushSize, GestureOutcome, GestureState, ToolContext, ToolDispatcher, ToolKind};
use crate::util::time;

use super::settings::{self, SessionSettings};

/// One editing session: the pixel grid, its guides, history and tool state.
///
/// All mutation goes through `&mut self`; there is no hidden global state.
/// Pointer positions are in display space and are mapped through the canvas
/// bounds last given to [`EditorSession::set_canvas_bounds`].
#[derive(Debug)]
pub struct EditorSession {
    id: Uuid,
    preset: GridPreset,
    pixels: RasterBuffer,
    history: HistoryManager,
    dispatcher: ToolDispatcher,
    compositor: LayerCompositor,
    sketch: SketchLayer,
    reference: Option<ReferenceLayer>,
    /// Applied to every reference as it is set
    reference_opacity: Opacity,
    tool: ToolKind,
    color: Color32,
    brush: BrushSize,
    symmetry: bool,
    zoom: u32,
    active_layer: ActiveLayer,
    mapper: CoordinateMapper,
    /// Bumped on any visible change, across all layers
    revision: u64,
    events: EventBus,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(GridPreset::default())
    }
}

impl EditorSession {
    pub fn new(preset: GridPreset) -> Self {
        let pixels = RasterBuffer::from_preset(preset);
        let zoom = settings::DEFAULT_ZOOM;
        Self {
            id: Uuid::new_v4(),
            preset,
            history: HistoryManager::new(&pixels),
            compositor: LayerCompositor::new(&pixels),
            dispatcher: ToolDispatcher::new(),
            sketch: SketchLayer::new(preset),
            reference: None,
            reference_opacity: Opacity::new(DEFAULT_REFERENCE_OPACITY).unwrap_or(Opacity::OPAQUE),
            tool: ToolKind::default(),
            color: DEFAULT_COLOR,
            brush: BrushSize::default(),
            symmetry: false,
            zoom,
            active_layer: ActiveLayer::Pixel,
            mapper: CoordinateMapper::new(Rect::from_min_size(
                Pos2::ZERO,
                egui::vec2(
                    (preset.width() as u32 * zoom) as f32,
                    (preset.height() as u32 * zoom) as f32,
                ),
            )),
            revision: 0,
            events: EventBus::new(),
            pixels,
        }
    }

    // ---- accessors ----

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn preset(&self) -> GridPreset {
        self.preset
    }

    pub fn pixels(&self) -> &RasterBuffer {
        &self.pixels
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn sketch(&self) -> &SketchLayer {
        &self.sketch
    }

    pub fn reference(&self) -> Option<&ReferenceLayer> {
        self.reference.as_ref()
    }

    pub fn reference_opacity(&self) -> Opacity {
        self.reference_opacity
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn color_hex(&self) -> String {
        color::to_hex(self.color)
    }

    pub fn brush_size(&self) -> BrushSize {
        self.brush
    }

    pub fn symmetry(&self) -> bool {
        self.symmetry
    }

    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    pub fn active_layer(&self) -> ActiveLayer {
        self.active_layer
    }

    pub fn gesture_state(&self) -> GestureState {
        self.dispatcher.state()
    }

    pub fn line_preview(&self) -> Option<Vec<GridPos>> {
        self.dispatcher.line_preview()
    }

    pub fn mapper(&self) -> CoordinateMapper {
        self.mapper
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Native-resolution thumbnail of the pixel layer
    pub fn preview(&self) -> &RgbaImage {
        self.compositor.preview()
    }

    pub fn preview_version(&self) -> u64 {
        self.compositor.version()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.events.subscribe(handler);
    }

    /// On-screen size of the canvas at the current zoom.
    pub fn canvas_size(&self) -> egui::Vec2 {
        egui::vec2(
            (self.preset.width() as u32 * self.zoom) as f32,
            (self.preset.height() as u32 * self.zoom) as f32,
        )
    }

    // ---- configuration ----

    /// Where the canvas is drawn on screen.
    pub fn set_canvas_bounds(&mut self, bounds: Rect) {
        self.mapper = CoordinateMapper::new(bounds);
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        if tool == self.tool {
            return;
        }
        let old = std::mem::replace(&mut self.tool, tool);
        self.events.emit(EditorEvent::ToolChanged { old, new: tool });
    }

    /// Sets the active colour; alpha is forced to opaque.
    pub fn set_color(&mut self, color: Color32) {
        let color = color::opaque(color);
        if color != self.color {
            self.color = color;
            self.events.emit(EditorEvent::ColorChanged { color });
        }
    }

    pub fn set_color_hex(&mut self, hex: &str) -> EditorResult<()> {
        let color = color::parse_hex(hex)?;
        self.set_color(color);
        Ok(())
    }

    pub fn set_brush_size(&mut self, size: u8) -> EditorResult<()> {
        self.brush = BrushSize::new(size).inspect_err(|e| log::warn!("{e}"))?;
        Ok(())
    }

    pub fn set_symmetry(&mut self, enabled: bool) {
        self.symmetry = enabled;
    }

    /// Routes subsequent gestures to another layer. A gesture in flight is
    /// completed on its original layer first.
    pub fn set_active_layer(&mut self, layer: ActiveLayer) {
        if layer == self.active_layer {
            return;
        }
        self.pointer_up();
        self.active_layer = layer;
        self.revision += 1;
        self.events.emit(EditorEvent::LayerChanged(LayerEvent::ActiveChanged(layer)));
    }

    pub fn set_sketch_opacity(&mut self, opacity: f32) -> EditorResult<()> {
        self.sketch.opacity = Opacity::new(opacity)?;
        self.revision += 1;
        self.events.emit(EditorEvent::LayerChanged(LayerEvent::OpacityChanged {
            layer: LayerKind::Sketch,
            opacity: self.sketch.opacity.get(),
        }));
        Ok(())
    }

    /// Applies to the current reference and to references loaded later.
    pub fn set_reference_opacity(&mut self, opacity: f32) -> EditorResult<()> {
        let opacity = Opacity::new(opacity)?;
        if let Some(reference) = &mut self.reference {
            reference.opacity = opacity;
        }
        self.reference_opacity = opacity;
        self.revision += 1;
        self.events.emit(EditorEvent::LayerChanged(LayerEvent::OpacityChanged {
            layer: LayerKind::Reference,
            opacity: opacity.get(),
        }));
        Ok(())
    }

    pub fn set_zoom(&mut self, zoom: u32) {
        self.zoom = settings::clamp_zoom(zoom);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + settings::ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom.saturating_sub(settings::ZOOM_STEP));
    }

    /// Switches grid preset. The pixel grid and sketch are reinitialised
    /// and history restarts from the empty grid.
    pub fn set_preset(&mut self, preset: GridPreset) {
        if preset == self.preset {
            return;
        }
        self.pointer_up();
        log::info!("Switching grid preset {:?} -> {:?}", self.preset, preset);

        self.preset = preset;
        self.pixels = RasterBuffer::from_preset(preset);
        let sketch_opacity = self.sketch.opacity;
        self.sketch = SketchLayer::new(preset);
        self.sketch.opacity = sketch_opacity;
        self.history.reset(&self.pixels);
        self.pixels_changed();

        self.events.emit(EditorEvent::PresetChanged { preset });
        self.events.emit(EditorEvent::HistoryChanged(HistoryEvent::Reset));
        self.emit_autosave();
    }

    // ---- gestures ----

    pub fn handle_input(&mut self, event: &InputEvent) -> GestureOutcome {
        match *event {
            InputEvent::PointerDown { pos } => self.pointer_down(pos),
            InputEvent::PointerMove { pos } => self.pointer_move(pos),
            InputEvent::PointerUp => self.pointer_up(),
            InputEvent::PointerLeave => self.pointer_leave(),
        }
    }

    pub fn pointer_down(&mut self, pos: Pos2) -> GestureOutcome {
        // A dangling gesture is snapshotted before the new one paints
        if self.dispatcher.is_dragging() {
            self.pointer_up();
        }
        let tool = self.tool;
        let outcome = self.with_tools(|dispatcher, ctx| dispatcher.start(pos, ctx));
        self.after_gesture(outcome);
        if self.dispatcher.is_dragging() {
            self.events.emit(EditorEvent::GestureStarted {
                tool,
                layer: self.active_layer,
            });
        }
        outcome
    }

    pub fn pointer_move(&mut self, pos: Pos2) -> GestureOutcome {
        let outcome = self.with_tools(|dispatcher, ctx| dispatcher.move_to(pos, ctx));
        self.after_gesture(outcome);
        outcome
    }

    pub fn pointer_up(&mut self) -> GestureOutcome {
        let outcome = self.with_tools(|dispatcher, ctx| dispatcher.end(ctx));
        self.after_gesture(outcome);
        outcome
    }

    /// Leaving the canvas ends the gesture exactly like a release.
    pub fn pointer_leave(&mut self) -> GestureOutcome {
        self.pointer_up()
    }

    fn with_tools<R>(&mut self, f: impl FnOnce(&mut ToolDispatcher, &mut ToolContext<'_>) -> R) -> R {
        let mut ctx = ToolContext {
            mapper: self.mapper,
            layer: self.active_layer,
            tool: &mut self.tool,
            color: &mut self.color,
            brush: self.brush,
            symmetry: self.symmetry,
            pixels: &mut self.pixels,
            sketch: &mut self.sketch,
        };
        f(&mut self.dispatcher, &mut ctx)
    }

    fn after_gesture(&mut self, outcome: GestureOutcome) {
        if outcome.pixels_changed {
            self.pixels_changed();
        }
        if outcome.sketch_changed {
            self.revision += 1;
        }
        if let Some(color) = outcome.picked {
            self.events.emit(EditorEvent::ColorChanged { color });
            self.events.emit(EditorEvent::ToolChanged {
                old: ToolKind::Picker,
                new: self.tool,
            });
        }
        if let Some(layer) = outcome.finished {
            if layer == ActiveLayer::Pixel {
                self.history.snapshot(&self.pixels);
                self.events.emit(EditorEvent::HistoryChanged(HistoryEvent::Snapshot {
                    depth: self.history.undo_depth(),
                }));
            }
            self.events.emit(EditorEvent::GestureCompleted { layer });
            if layer == ActiveLayer::Pixel {
                self.emit_autosave();
            }
        }
    }

    // ---- history ----

    /// Restores the previous snapshot. No-op (returns `false`) at the oldest.
    pub fn undo(&mut self) -> EditorResult<bool> {
        self.pointer_up();
        if !self.history.undo(&mut self.pixels)? {
            return Ok(false);
        }
        self.pixels_changed();
        self.events.emit(EditorEvent::HistoryChanged(HistoryEvent::Undone {
            depth: self.history.undo_depth(),
        }));
        self.emit_autosave();
        Ok(true)
    }

    pub fn redo(&mut self) -> EditorResult<bool> {
        self.pointer_up();
        if !self.history.redo(&mut self.pixels)? {
            return Ok(false);
        }
        self.pixels_changed();
        self.events.emit(EditorEvent::HistoryChanged(HistoryEvent::Redone {
            depth: self.history.undo_depth(),
        }));
        self.emit_autosave();
        Ok(true)
    }

    // ---- layers ----

    /// Empties the pixel grid. Callers confirm with the user first; only
    /// the remaining history can bring the drawing back.
    pub fn clear_pixels(&mut self) {
        self.pointer_up();
        self.pixels.clear();
        self.history.snapshot(&self.pixels);
        self.pixels_changed();
        self.events.emit(EditorEvent::LayerChanged(LayerEvent::Cleared(LayerKind::Pixel)));
        self.events.emit(EditorEvent::HistoryChanged(HistoryEvent::Snapshot {
            depth: self.history.undo_depth(),
        }));
        self.emit_autosave();
    }

    pub fn clear_sketch(&mut self) {
        self.pointer_up();
        self.sketch.clear();
        self.revision += 1;
        self.events.emit(EditorEvent::LayerChanged(LayerEvent::Cleared(LayerKind::Sketch)));
    }

    /// Clears whichever layer is currently active.
    pub fn clear_active_layer(&mut self) {
        match self.active_layer {
            ActiveLayer::Pixel => self.clear_pixels(),
            ActiveLayer::Sketch => self.clear_sketch(),
        }
    }

    /// Replaces the drawing with an encoded image scaled to the grid.
    ///
    /// Used to restore a previously saved drawing. History restarts here.
    pub fn load_pixels(&mut self, bytes: &[u8]) -> EditorResult<()> {
        let image = export::decode_for_grid(bytes, self.pixels.size())?;
        self.load_grid_image(&image)
    }

    /// Replaces the drawing with an image already sized to the grid.
    pub(crate) fn load_grid_image(&mut self, image: &RgbaImage) -> EditorResult<()> {
        self.pointer_up();
        self.pixels.load_rgba(image)?;
        self.history.reset(&self.pixels);
        self.pixels_changed();
        log::info!("Loaded drawing into {:?} grid", self.preset);
        self.events.emit(EditorEvent::LayerChanged(LayerEvent::Loaded(LayerKind::Pixel)));
        self.events.emit(EditorEvent::HistoryChanged(HistoryEvent::Reset));
        self.emit_autosave();
        Ok(())
    }

    pub fn load_sketch(&mut self, bytes: &[u8]) -> EditorResult<()> {
        let guide = image::load_from_memory(bytes)?.to_rgba8();
        self.pointer_up();
        self.sketch.load(&guide);
        self.revision += 1;
        self.events.emit(EditorEvent::LayerChanged(LayerEvent::Loaded(LayerKind::Sketch)));
        Ok(())
    }

    pub fn load_reference(&mut self, label: &str, bytes: &[u8]) -> EditorResult<()> {
        let reference = ReferenceLayer::decode(label, bytes)?;
        self.set_reference(reference);
        Ok(())
    }

    pub fn set_reference(&mut self, mut reference: ReferenceLayer) {
        reference.opacity = self.reference_opacity;
        log::info!("Reference layer set: {:?}", reference.label);
        self.reference = Some(reference);
        self.revision += 1;
        self.events.emit(EditorEvent::LayerChanged(LayerEvent::Loaded(LayerKind::Reference)));
    }

    pub fn clear_reference(&mut self) {
        if self.reference.take().is_some() {
            self.revision += 1;
            self.events.emit(EditorEvent::LayerChanged(LayerEvent::Cleared(LayerKind::Reference)));
        }
    }

    // ---- output ----

    /// Composite at the sketch layer's resolution, for on-screen display.
    pub fn compose_canvas(&self) -> RgbaImage {
        self.compose(SKETCH_SCALE)
    }

    /// Full display composite at `scale` pixels per cell.
    pub fn compose(&self, scale: usize) -> RgbaImage {
        self.compositor.compose(
            LayerStack {
                pixels: &self.pixels,
                sketch: Some(&self.sketch),
                reference: self.reference.as_ref(),
                active: self.active_layer,
            },
            scale,
        )
    }

    /// PNG of the pixel layer only.
    pub fn export_png(&self) -> EditorResult<Vec<u8>> {
        export::export_png(&self.pixels)
    }

    pub fn export_file_name(&self) -> String {
        export::export_file_name(self.preset, time::timestamp_millis())
    }

    pub fn settings(&self) -> SessionSettings {
        SessionSettings {
            preset: self.preset,
            tool: self.tool,
            color: self.color_hex(),
            brush_size: self.brush.get(),
            symmetry: self.symmetry,
            sketch_opacity: self.sketch.opacity.get(),
            reference_opacity: self.reference_opacity.get(),
            zoom: self.zoom,
            active_layer: self.active_layer,
        }
    }

    /// Validates everything before changing anything.
    pub fn apply_settings(&mut self, settings: &SessionSettings) -> EditorResult<()> {
        let color = color::parse_hex(&settings.color)?;
        let brush = BrushSize::new(settings.brush_size)?;
        let sketch_opacity = Opacity::new(settings.sketch_opacity)?;
        let reference_opacity = Opacity::new(settings.reference_opacity)?;

        self.set_preset(settings.preset);
        self.set_tool(settings.tool);
        self.set_color(color);
        self.brush = brush;
        self.symmetry = settings.symmetry;
        self.set_zoom(settings.zoom);
        self.set_active_layer(settings.active_layer);
        self.set_sketch_opacity(sketch_opacity.get())?;
        self.set_reference_opacity(reference_opacity.get())?;
        Ok(())
    }

    fn pixels_changed(&mut self) {
        self.compositor.refresh_preview(&self.pixels);
        self.revision += 1;
    }

    fn emit_autosave(&self) {
        if !self.events.has_subscribers() {
            return;
        }
        match self.export_png() {
            Ok(png) => {
                log::debug!("Autosave: {} bytes", png.len());
                self.events.emit(EditorEvent::Autosave { png: Arc::new(png) });
            }
            Err(err) => log::error!("Autosave encoding failed: {err}"),
        }
    }
}
