use egui::{Color32, Pos2};
use image::{imageops::FilterType, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EditorError, EditorResult};
use crate::raster::GridPreset;

/// Sketch cells per grid cell along each axis.
pub const SKETCH_SCALE: usize = 32;

/// Sketch strokes are this many times wider than the brush size.
pub const SKETCH_BRUSH_FACTOR: f32 = 4.0;

pub const DEFAULT_SKETCH_OPACITY: f32 = 0.3;
pub const DEFAULT_REFERENCE_OPACITY: f32 = 0.4;

/// Which layer receives pointer gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ActiveLayer {
    #[default]
    Pixel,
    Sketch,
}

impl ActiveLayer {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pixel => "Pixel Art",
            Self::Sketch => "Sketch",
        }
    }
}

/// Display opacity in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Opacity(f32);

impl Opacity {
    pub const OPAQUE: Opacity = Opacity(1.0);

    /// Clamps into range; rejects NaN and infinities.
    pub fn new(value: f32) -> EditorResult<Self> {
        if !value.is_finite() {
            return Err(EditorError::InvalidOpacity(value));
        }
        Ok(Self(value.clamp(0.0, 1.0)))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

/// Freehand guide drawn at a finer resolution than the pixel grid.
///
/// Display-only: never part of history or export.
#[derive(Clone)]
pub struct SketchLayer {
    pub id: Uuid,
    pub opacity: Opacity,
    image: RgbaImage,
}

impl SketchLayer {
    pub fn new(preset: GridPreset) -> Self {
        Self {
            id: Uuid::new_v4(),
            opacity: Opacity(DEFAULT_SKETCH_OPACITY),
            image: RgbaImage::new(
                (preset.width() * SKETCH_SCALE) as u32,
                (preset.height() * SKETCH_SCALE) as u32,
            ),
        }
    }

    pub fn size(&self) -> [usize; 2] {
        [self.image.width() as usize, self.image.height() as usize]
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn is_blank(&self) -> bool {
        self.image.pixels().all(|p| p.0[3] == 0)
    }

    pub fn clear(&mut self) {
        self.image.fill(0);
    }

    /// Replaces the sketch with an external guide image, stretched to fit.
    pub fn load(&mut self, guide: &RgbaImage) {
        let [w, h] = self.size();
        self.image = image::imageops::resize(guide, w as u32, h as u32, FilterType::Triangle);
        log::info!("Loaded sketch guide {}x{} into {}x{}", guide.width(), guide.height(), w, h);
    }

    pub fn sample(&self, pos: Pos2) -> Option<Color32> {
        if pos.x < 0.0 || pos.y < 0.0 {
            return None;
        }
        let (x, y) = (pos.x as u32, pos.y as u32);
        let px = self.image.get_pixel_checked(x, y)?;
        let [r, g, b, a] = px.0;
        (a > 0).then(|| Color32::from_rgb(r, g, b))
    }

    /// Stamps a round dab. `None` erases.
    pub fn stamp(&mut self, center: Pos2, diameter: f32, color: Option<Color32>) {
        let radius = (diameter / 2.0).max(0.5);
        let value = match color {
            Some(c) => Rgba([c.r(), c.g(), c.b(), 255]),
            None => Rgba([0, 0, 0, 0]),
        };

        let [w, h] = self.size();
        let x0 = (center.x - radius).floor().max(0.0) as usize;
        let y0 = (center.y - radius).floor().max(0.0) as usize;
        let x1 = ((center.x + radius).ceil().max(0.0) as usize).min(w);
        let y1 = ((center.y + radius).ceil().max(0.0) as usize).min(h);

        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - center.x;
                let dy = y as f32 + 0.5 - center.y;
                if dx * dx + dy * dy <= radius * radius {
                    self.image.put_pixel(x as u32, y as u32, value);
                }
            }
        }
    }

    /// Round-capped stroke from `from` to `to`.
    pub fn stroke(&mut self, from: Pos2, to: Pos2, diameter: f32, color: Option<Color32>) {
        let spacing = (diameter / 4.0).max(0.5);
        let distance = from.distance(to);
        let steps = (distance / spacing).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            self.stamp(from.lerp(to, t), diameter, color);
        }
    }
}

impl std::fmt::Debug for SketchLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SketchLayer")
            .field("id", &self.id)
            .field("size", &self.size())
            .field("opacity", &self.opacity)
            .finish()
    }
}

/// Externally supplied reference image shown beneath everything else.
#[derive(Clone)]
pub struct ReferenceLayer {
    pub id: Uuid,
    /// Where the image came from, e.g. the generation prompt
    pub label: String,
    pub opacity: Opacity,
    image: RgbaImage,
}

impl ReferenceLayer {
    pub fn new(label: impl Into<String>, image: RgbaImage) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            opacity: Opacity(DEFAULT_REFERENCE_OPACITY),
            image,
        }
    }

    /// Decodes any format the `image` crate recognises.
    pub fn decode(label: impl Into<String>, bytes: &[u8]) -> EditorResult<Self> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        log::debug!("Decoded reference image {}x{}", image.width(), image.height());
        Ok(Self::new(label, image))
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

impl std::fmt::Debug for ReferenceLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceLayer")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("size", &[self.image.width(), self.image.height()])
            .field("opacity", &self.opacity)
            .finish()
    }
}
