use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::color::{self, EMPTY};
use crate::error::{EditorError, EditorResult};

/// The two supported grid presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GridPreset {
    /// 32×32 character head
    #[default]
    Head,
    /// 32×64 character body
    Body,
}

impl GridPreset {
    pub const ALL: [GridPreset; 2] = [GridPreset::Head, GridPreset::Body];

    pub fn width(self) -> usize {
        32
    }

    pub fn height(self) -> usize {
        match self {
            Self::Head => 32,
            Self::Body => 64,
        }
    }

    /// `[width, height]`, the order egui and `image` use for sizes
    pub fn size(self) -> [usize; 2] {
        [self.width(), self.height()]
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Body => "body",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Head => "Head (32x32)",
            Self::Body => "Body (32x64)",
        }
    }
}

/// An immutable copy of the whole grid at one instant.
#[derive(Clone, PartialEq, Eq)]
pub struct Snapshot {
    size: [usize; 2],
    pixels: Box<[Color32]>,
}

impl Snapshot {
    pub fn size(&self) -> [usize; 2] {
        self.size
    }

    pub fn pixels(&self) -> &[Color32] {
        &self.pixels
    }
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("size", &self.size)
            .field("pixels", &format!("<{} cells>", self.pixels.len()))
            .finish()
    }
}

/// Dense RGBA grid owned by the editing session.
///
/// Every cell is either [`EMPTY`] or fully opaque. Coordinates are signed so
/// callers can hand over raw mapped positions; anything outside the grid is
/// ignored on write and reads back as `None`.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Color32>,
}

impl RasterBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![EMPTY; width * height],
        }
    }

    pub fn from_preset(preset: GridPreset) -> Self {
        Self::new(preset.width(), preset.height())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> [usize; 2] {
        [self.width, self.height]
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.contains(x, y)
            .then(|| y as usize * self.width + x as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Color32> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Writes a cell. Returns `false` (and changes nothing) when out of bounds.
    pub fn set(&mut self, x: i32, y: i32, color: Color32) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.pixels[i] = color;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.pixels.fill(EMPTY);
    }

    pub fn pixels(&self) -> &[Color32] {
        &self.pixels
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|&c| color::is_empty(c))
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            size: self.size(),
            pixels: self.pixels.clone().into_boxed_slice(),
        }
    }

    /// Replaces the live contents with a snapshot, bit for bit.
    pub fn restore(&mut self, snapshot: &Snapshot) -> EditorResult<()> {
        if snapshot.size != self.size() {
            return Err(EditorError::DimensionMismatch {
                expected: self.size(),
                actual: snapshot.size,
            });
        }
        self.pixels.copy_from_slice(&snapshot.pixels);
        Ok(())
    }

    /// Straight (unpremultiplied) RGBA bytes, row-major.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|c| c.to_srgba_unmultiplied())
            .collect()
    }

    /// Copies an RGBA image of the same size into the grid, quantizing alpha.
    pub fn load_rgba(&mut self, image: &image::RgbaImage) -> EditorResult<()> {
        let actual = [image.width() as usize, image.height() as usize];
        if actual != self.size() {
            return Err(EditorError::DimensionMismatch {
                expected: self.size(),
                actual,
            });
        }
        for (dst, px) in self.pixels.iter_mut().zip(image.pixels()) {
            let [r, g, b, a] = px.0;
            *dst = color::quantize_alpha(r, g, b, a);
        }
        Ok(())
    }
}

impl std::fmt::Debug for RasterBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}
