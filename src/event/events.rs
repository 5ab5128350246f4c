use std::sync::Arc;

use egui::Color32;

use crate::layer::ActiveLayer;
use crate::raster::GridPreset;
use crate::tools::ToolKind;

/// The three fixed layer roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Pixel,
    Sketch,
    Reference,
}

impl From<ActiveLayer> for LayerKind {
    fn from(layer: ActiveLayer) -> Self {
        match layer {
            ActiveLayer::Pixel => Self::Pixel,
            ActiveLayer::Sketch => Self::Sketch,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEvent {
    Snapshot { depth: usize },
    Undone { depth: usize },
    Redone { depth: usize },
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayerEvent {
    Cleared(LayerKind),
    Loaded(LayerKind),
    OpacityChanged { layer: LayerKind, opacity: f32 },
    ActiveChanged(ActiveLayer),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    GestureStarted {
        tool: ToolKind,
        layer: ActiveLayer,
    },
    GestureCompleted {
        layer: ActiveLayer,
    },
    ToolChanged {
        old: ToolKind,
        new: ToolKind,
    },
    ColorChanged {
        color: Color32,
    },
    PresetChanged {
        preset: GridPreset,
    },
    HistoryChanged(HistoryEvent),
    LayerChanged(LayerEvent),
    /// PNG of the pixel layer, emitted whenever it settles into a new state
    Autosave {
        png: Arc<Vec<u8>>,
    },
}
