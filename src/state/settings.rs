use serde::{Deserialize, Serialize};

use crate::color::{self, DEFAULT_COLOR};
use crate::layer::{ActiveLayer, DEFAULT_REFERENCE_OPACITY, DEFAULT_SKETCH_OPACITY};
use crate::raster::GridPreset;
use crate::tools::ToolKind;

pub const MIN_ZOOM: u32 = 4;
pub const MAX_ZOOM: u32 = 60;
pub const ZOOM_STEP: u32 = 2;
pub const DEFAULT_ZOOM: u32 = 12;

/// User-facing configuration of an editing session.
///
/// Everything here is plain data; [`super::EditorSession::apply_settings`]
/// validates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // new fields fall back to defaults when reading old files
pub struct SessionSettings {
    pub preset: GridPreset,
    pub tool: ToolKind,
    /// `#rrggbb`
    pub color: String,
    pub brush_size: u8,
    pub symmetry: bool,
    pub sketch_opacity: f32,
    pub reference_opacity: f32,
    pub zoom: u32,
    pub active_layer: ActiveLayer,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            preset: GridPreset::Head,
            tool: ToolKind::Pencil,
            color: color::to_hex(DEFAULT_COLOR),
            brush_size: 1,
            symmetry: false,
            sketch_opacity: DEFAULT_SKETCH_OPACITY,
            reference_opacity: DEFAULT_REFERENCE_OPACITY,
            zoom: DEFAULT_ZOOM,
            active_layer: ActiveLayer::Pixel,
        }
    }
}

/// Snaps a zoom level into range.
pub fn clamp_zoom(zoom: u32) -> u32 {
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: SessionSettings = serde_json::from_str(r#"{"preset":"Body","brush_size":3}"#).unwrap();
        assert_eq!(settings.preset, GridPreset::Body);
        assert_eq!(settings.brush_size, 3);
        assert_eq!(settings.zoom, DEFAULT_ZOOM);
        assert_eq!(settings.color, "#ffffff");
    }

    #[test]
    fn test_zoom_clamp() {
        assert_eq!(clamp_zoom(0), MIN_ZOOM);
        assert_eq!(clamp_zoom(100), MAX_ZOOM);
        assert_eq!(clamp_zoom(20), 20);
    }
}
