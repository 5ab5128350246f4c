use egui::{Context, PointerButton, Pos2, Rect};

/// Pointer events for the canvas, in screen coordinates.
///
/// Only the primary button drives gestures; extra touches and other
/// buttons are ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { pos: Pos2 },
    PointerMove { pos: Pos2 },
    PointerUp,
    /// Pointer left the canvas; treated like a release
    PointerLeave,
}

/// One frame's worth of raw pointer state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerSample {
    pub pos: Option<Pos2>,
    pub pressed: bool,
    pub down: bool,
    pub released: bool,
}

impl PointerSample {
    /// Reads the primary button from egui's input state.
    pub fn from_context(ctx: &Context) -> Self {
        ctx.input(|input| Self {
            pos: input.pointer.hover_pos(),
            pressed: input.pointer.button_pressed(PointerButton::Primary),
            down: input.pointer.button_down(PointerButton::Primary),
            released: input.pointer.button_released(PointerButton::Primary),
        })
    }
}

/// Turns raw egui pointer input into canvas [`InputEvent`]s.
#[derive(Debug, Default)]
pub struct InputHandler {
    canvas_rect: Option<Rect>,
    last_pos: Option<Pos2>,
    /// A press that began on the canvas is still held
    active: bool,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.canvas_rect = Some(rect);
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn process_input(&mut self, ctx: &Context) -> Vec<InputEvent> {
        self.process_sample(PointerSample::from_context(ctx))
    }

    pub fn process_sample(&mut self, sample: PointerSample) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let on_canvas = |pos: Pos2| self.canvas_rect.is_some_and(|rect| rect.contains(pos));

        if self.active {
            match sample.pos {
                Some(pos) if on_canvas(pos) => {
                    if Some(pos) != self.last_pos {
                        events.push(InputEvent::PointerMove { pos });
                    }
                    if sample.released || !sample.down {
                        events.push(InputEvent::PointerUp);
                        self.active = false;
                    }
                }
                _ => {
                    log::trace!("Pointer left canvas mid-gesture");
                    events.push(InputEvent::PointerLeave);
                    self.active = false;
                }
            }
        } else if sample.pressed {
            if let Some(pos) = sample.pos.filter(|p| on_canvas(*p)) {
                events.push(InputEvent::PointerDown { pos });
                self.active = true;
                // press and release within a single frame
                if sample.released {
                    events.push(InputEvent::PointerUp);
                    self.active = false;
                }
            }
        }

        self.last_pos = sample.pos;
        events
    }
}
