use egui::{Color32, Pos2};

use crate::color::{self, EMPTY};
use crate::geometry::{line_points, CoordinateMapper, GridPos};
use crate::layer::{ActiveLayer, SketchLayer, SKETCH_BRUSH_FACTOR};
use crate::raster::RasterBuffer;

use super::{flood_fill, paint_footprint, paint_segment, sample, BrushSize, ToolKind};

/// Everything a gesture may read or mutate, borrowed from the session.
pub struct ToolContext<'a> {
    pub mapper: CoordinateMapper,
    pub layer: ActiveLayer,
    pub tool: &'a mut ToolKind,
    pub color: &'a mut Color32,
    pub brush: BrushSize,
    pub symmetry: bool,
    pub pixels: &'a mut RasterBuffer,
    pub sketch: &'a mut SketchLayer,
}

/// Where an in-flight gesture draws, in that surface's own coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokeTarget {
    Pixel { anchor: GridPos, last: GridPos },
    Sketch { anchor: Pos2, last: Pos2 },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging {
        /// Tool captured at gesture start; later tool switches do not affect it
        tool: ToolKind,
        target: StrokeTarget,
    },
}

/// What a single pointer event did.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureOutcome {
    pub pixels_changed: bool,
    pub sketch_changed: bool,
    /// Colour taken by the picker, which also switched the tool to Pencil
    pub picked: Option<Color32>,
    /// Set when a gesture on this layer was completed by the event
    pub finished: Option<ActiveLayer>,
}

impl GestureOutcome {
    fn merge(mut self, other: GestureOutcome) -> Self {
        self.pixels_changed |= other.pixels_changed;
        self.sketch_changed |= other.sketch_changed;
        self.picked = other.picked.or(self.picked);
        self.finished = other.finished.or(self.finished);
        self
    }
}

/// Routes start/move/end events to the active tool.
#[derive(Debug, Default)]
pub struct ToolDispatcher {
    state: GestureState,
}

impl ToolDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GestureState::Dragging { .. })
    }

    /// Cells the Line tool would paint if released now.
    pub fn line_preview(&self) -> Option<Vec<GridPos>> {
        match self.state {
            GestureState::Dragging {
                tool: ToolKind::Line,
                target: StrokeTarget::Pixel { anchor, last },
            } => Some(line_points(anchor, last)),
            _ => None,
        }
    }

    /// Pointer press. A gesture still in flight is completed first.
    pub fn start(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> GestureOutcome {
        let mut outcome = self.end(ctx);
        let tool = *ctx.tool;

        let target = match ctx.layer {
            ActiveLayer::Pixel => {
                // Presses off the grid never start a gesture
                let Some(at) = ctx
                    .mapper
                    .to_grid(pos, ctx.pixels.size())
                    .filter(|at| ctx.pixels.contains(at.x, at.y))
                else {
                    return outcome;
                };
                outcome = outcome.merge(start_on_pixels(tool, at, ctx));
                StrokeTarget::Pixel { anchor: at, last: at }
            }
            ActiveLayer::Sketch => {
                let Some(at) = ctx.mapper.to_surface(pos, ctx.sketch.size()) else {
                    return outcome;
                };
                outcome = outcome.merge(start_on_sketch(tool, at, ctx));
                StrokeTarget::Sketch { anchor: at, last: at }
            }
        };

        log::debug!("Gesture started: {} on {:?}", tool.name(), ctx.layer);
        self.state = GestureState::Dragging { tool, target };
        outcome
    }

    /// Pointer drag. Ignored while idle.
    pub fn move_to(&mut self, pos: Pos2, ctx: &mut ToolContext<'_>) -> GestureOutcome {
        let GestureState::Dragging { tool, target } = &mut self.state else {
            return GestureOutcome::default();
        };
        let mut outcome = GestureOutcome::default();

        match target {
            StrokeTarget::Pixel { last, .. } => {
                let Some(at) = ctx.mapper.to_grid(pos, ctx.pixels.size()) else {
                    return outcome;
                };
                if tool.uses_brush() {
                    let written = paint_segment(
                        ctx.pixels,
                        *last,
                        at,
                        ctx.brush,
                        brush_color(*tool, *ctx.color),
                        ctx.symmetry,
                    );
                    outcome.pixels_changed = written > 0;
                }
                *last = at;
            }
            StrokeTarget::Sketch { last, .. } => {
                let Some(at) = ctx.mapper.to_surface(pos, ctx.sketch.size()) else {
                    return outcome;
                };
                if tool.uses_brush() {
                    ctx.sketch
                        .stroke(*last, at, sketch_diameter(ctx.brush), sketch_color(*tool, *ctx.color));
                    outcome.sketch_changed = true;
                }
                *last = at;
            }
        }
        outcome
    }

    /// Pointer release or leave. Completes the gesture; Line draws here.
    pub fn end(&mut self, ctx: &mut ToolContext<'_>) -> GestureOutcome {
        let GestureState::Dragging { tool, target } = std::mem::take(&mut self.state) else {
            return GestureOutcome::default();
        };
        let mut outcome = GestureOutcome::default();

        match target {
            StrokeTarget::Pixel { anchor, last } => {
                if tool == ToolKind::Line {
                    let color = color::opaque(*ctx.color);
                    let written = line_points(anchor, last)
                        .into_iter()
                        .filter(|p| ctx.pixels.set(p.x, p.y, color))
                        .count();
                    outcome.pixels_changed = written > 0;
                }
                outcome.finished = Some(ActiveLayer::Pixel);
            }
            StrokeTarget::Sketch { anchor, last } => {
                if tool == ToolKind::Line {
                    ctx.sketch
                        .stroke(anchor, last, sketch_diameter(ctx.brush), Some(color::opaque(*ctx.color)));
                    outcome.sketch_changed = true;
                }
                outcome.finished = Some(ActiveLayer::Sketch);
            }
        }

        log::debug!("Gesture finished: {}", tool.name());
        outcome
    }
}

fn start_on_pixels(tool: ToolKind, at: GridPos, ctx: &mut ToolContext<'_>) -> GestureOutcome {
    let mut outcome = GestureOutcome::default();
    match tool {
        ToolKind::Pencil | ToolKind::Eraser => {
            let written = paint_footprint(
                ctx.pixels,
                at,
                ctx.brush,
                brush_color(tool, *ctx.color),
                ctx.symmetry,
            );
            outcome.pixels_changed = written > 0;
        }
        ToolKind::Picker => {
            if let Some(picked) = sample(ctx.pixels, at) {
                apply_pick(picked, ctx, &mut outcome);
            }
        }
        ToolKind::Fill => {
            outcome.pixels_changed = flood_fill(ctx.pixels, at, color::opaque(*ctx.color)) > 0;
        }
        ToolKind::Line => {}
    }
    outcome
}

fn start_on_sketch(tool: ToolKind, at: Pos2, ctx: &mut ToolContext<'_>) -> GestureOutcome {
    let mut outcome = GestureOutcome::default();
    match tool {
        ToolKind::Pencil | ToolKind::Eraser => {
            ctx.sketch
                .stamp(at, sketch_diameter(ctx.brush), sketch_color(tool, *ctx.color));
            outcome.sketch_changed = true;
        }
        ToolKind::Picker => {
            if let Some(picked) = ctx.sketch.sample(at) {
                apply_pick(picked, ctx, &mut outcome);
            }
        }
        // Fill only targets the pixel grid
        ToolKind::Fill | ToolKind::Line => {}
    }
    outcome
}

fn apply_pick(picked: Color32, ctx: &mut ToolContext<'_>, outcome: &mut GestureOutcome) {
    *ctx.color = picked;
    *ctx.tool = ToolKind::Pencil;
    outcome.picked = Some(picked);
}

fn brush_color(tool: ToolKind, color: Color32) -> Color32 {
    if tool == ToolKind::Eraser {
        EMPTY
    } else {
        color::opaque(color)
    }
}

fn sketch_color(tool: ToolKind, color: Color32) -> Option<Color32> {
    (tool != ToolKind::Eraser).then(|| color::opaque(color))
}

fn sketch_diameter(brush: BrushSize) -> f32 {
    brush.get() as f32 * SKETCH_BRUSH_FACTOR
}
