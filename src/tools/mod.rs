use serde::{Deserialize, Serialize};

use crate::error::{EditorError, EditorResult};

mod brush;
mod dispatcher;
mod fill;
mod picker;

pub use brush::{mirror_x, paint_footprint, paint_segment};
pub use dispatcher::{GestureOutcome, GestureState, ToolContext, ToolDispatcher};
pub use fill::flood_fill;
pub use picker::sample;

/// The tools that can act on the canvas. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ToolKind {
    #[default]
    Pencil,
    Eraser,
    Picker,
    Fill,
    Line,
}

impl ToolKind {
    pub const ALL: [ToolKind; 5] = [
        ToolKind::Pencil,
        ToolKind::Eraser,
        ToolKind::Picker,
        ToolKind::Fill,
        ToolKind::Line,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Pencil => "Pencil",
            Self::Eraser => "Eraser",
            Self::Picker => "Picker",
            Self::Fill => "Fill",
            Self::Line => "Line",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Pencil => "✏",
            Self::Eraser => "⌫",
            Self::Picker => "💉",
            Self::Fill => "🪣",
            Self::Line => "╱",
        }
    }

    /// Pencil and Eraser stamp a brush footprint and honour symmetry.
    pub fn uses_brush(self) -> bool {
        matches!(self, Self::Pencil | Self::Eraser)
    }
}

/// Side length of the square Pencil/Eraser footprint, 1..=10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct BrushSize(u8);

impl BrushSize {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(size: u8) -> EditorResult<Self> {
        if (Self::MIN..=Self::MAX).contains(&size) {
            Ok(Self(size))
        } else {
            Err(EditorError::InvalidBrushSize(size))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for BrushSize {
    fn default() -> Self {
        Self(1)
    }
}

impl TryFrom<u8> for BrushSize {
    type Error = EditorError;

    fn try_from(size: u8) -> EditorResult<Self> {
        Self::new(size)
    }
}

impl From<BrushSize> for u8 {
    fn from(size: BrushSize) -> u8 {
        size.0
    }
}
