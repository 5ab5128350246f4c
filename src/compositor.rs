use image::{Rgba, RgbaImage};

use crate::layer::{ActiveLayer, Opacity, ReferenceLayer, SketchLayer};
use crate::raster::RasterBuffer;

/// Reference images are darkened to this fraction of their brightness.
pub const REFERENCE_BRIGHTNESS: f32 = 0.75;

/// Pixel layer opacity while the sketch layer is being edited.
pub const PIXEL_OPACITY_WHILE_SKETCHING: f32 = 0.8;

/// The layers to merge, back to front: reference, sketch, pixels.
#[derive(Clone, Copy)]
pub struct LayerStack<'a> {
    pub pixels: &'a RasterBuffer,
    pub sketch: Option<&'a SketchLayer>,
    pub reference: Option<&'a ReferenceLayer>,
    pub active: ActiveLayer,
}

/// Merges the layers for display and keeps a cheap native-size preview.
#[derive(Debug)]
pub struct LayerCompositor {
    preview: RgbaImage,
    /// Bumped on every preview refresh, used as a texture cache key
    version: u64,
}

impl LayerCompositor {
    pub fn new(pixels: &RasterBuffer) -> Self {
        let mut compositor = Self {
            preview: RgbaImage::new(1, 1),
            version: 0,
        };
        compositor.refresh_preview(pixels);
        compositor
    }

    /// Re-renders the unscaled thumbnail of the pixel layer.
    pub fn refresh_preview(&mut self, pixels: &RasterBuffer) {
        let [w, h] = pixels.size();
        self.preview = RgbaImage::from_raw(w as u32, h as u32, pixels.to_rgba_bytes())
            .unwrap_or_else(|| RgbaImage::new(w as u32, h as u32));
        self.version += 1;
    }

    pub fn preview(&self) -> &RgbaImage {
        &self.preview
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Renders all layers at `scale` display pixels per grid cell.
    pub fn compose(&self, stack: LayerStack<'_>, scale: usize) -> RgbaImage {
        let scale = scale.max(1);
        let [gw, gh] = stack.pixels.size();
        let (w, h) = ((gw * scale) as u32, (gh * scale) as u32);
        let mut out = RgbaImage::new(w, h);

        if let Some(reference) = stack.reference {
            draw_reference(&mut out, reference);
        }

        if let Some(sketch) = stack.sketch {
            let opacity = match stack.active {
                ActiveLayer::Sketch => Opacity::OPAQUE,
                ActiveLayer::Pixel => sketch.opacity,
            };
            draw_stretched(&mut out, sketch.image(), opacity.get(), 1.0);
        }

        let pixel_opacity = match stack.active {
            ActiveLayer::Pixel => 1.0,
            ActiveLayer::Sketch => PIXEL_OPACITY_WHILE_SKETCHING,
        };
        for (x, y, dst) in out.enumerate_pixels_mut() {
            let gx = (x as usize / scale) as i32;
            let gy = (y as usize / scale) as i32;
            if let Some(cell) = stack.pixels.get(gx, gy) {
                blend(dst, cell.to_srgba_unmultiplied(), pixel_opacity, 1.0);
            }
        }

        out
    }
}

/// Fits the reference inside `out` preserving aspect ratio, centred.
fn draw_reference(out: &mut RgbaImage, reference: &ReferenceLayer) {
    let src = reference.image();
    if src.width() == 0 || src.height() == 0 {
        return;
    }
    let (ow, oh) = (out.width() as f32, out.height() as f32);
    let fit = (ow / src.width() as f32).min(oh / src.height() as f32);
    let (dw, dh) = (src.width() as f32 * fit, src.height() as f32 * fit);
    let (left, top) = ((ow - dw) / 2.0, (oh - dh) / 2.0);
    let opacity = reference.opacity.get();

    for (x, y, dst) in out.enumerate_pixels_mut() {
        let fx = (x as f32 + 0.5 - left) / fit;
        let fy = (y as f32 + 0.5 - top) / fit;
        if fx < 0.0 || fy < 0.0 {
            continue;
        }
        if let Some(px) = src.get_pixel_checked(fx as u32, fy as u32) {
            blend(dst, px.0, opacity, REFERENCE_BRIGHTNESS);
        }
    }
}

/// Nearest-neighbour stretch of `src` over the whole of `out`.
fn draw_stretched(out: &mut RgbaImage, src: &RgbaImage, opacity: f32, brightness: f32) {
    if opacity <= 0.0 {
        return;
    }
    let sx = src.width() as f32 / out.width() as f32;
    let sy = src.height() as f32 / out.height() as f32;
    for (x, y, dst) in out.enumerate_pixels_mut() {
        let px = src.get_pixel_checked(((x as f32 + 0.5) * sx) as u32, ((y as f32 + 0.5) * sy) as u32);
        if let Some(px) = px {
            blend(dst, px.0, opacity, brightness);
        }
    }
}

/// Straight-alpha "over".
fn blend(dst: &mut Rgba<u8>, src: [u8; 4], opacity: f32, brightness: f32) {
    let sa = src[3] as f32 / 255.0 * opacity;
    if sa <= 0.0 {
        return;
    }
    let da = dst.0[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);

    for i in 0..3 {
        let s = src[i] as f32 / 255.0 * brightness;
        let d = dst.0[i] as f32 / 255.0;
        let c = (s * sa + d * da * (1.0 - sa)) / out_a;
        dst.0[i] = (c * 255.0).round().clamp(0.0, 255.0) as u8;
    }
    dst.0[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::GridPreset;
    use egui::Color32;

    fn stack(pixels: &RasterBuffer) -> LayerStack<'_> {
        LayerStack {
            pixels,
            sketch: None,
            reference: None,
            active: ActiveLayer::Pixel,
        }
    }

    #[test]
    fn test_preview_tracks_pixels() {
        let mut pixels = RasterBuffer::from_preset(GridPreset::Body);
        let mut compositor = LayerCompositor::new(&pixels);
        let v0 = compositor.version();
        assert_eq!(compositor.preview().dimensions(), (32, 64));

        pixels.set(3, 40, Color32::RED);
        compositor.refresh_preview(&pixels);
        assert_eq!(compositor.version(), v0 + 1);
        assert_eq!(compositor.preview().get_pixel(3, 40).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_scaled_pixels_are_opaque_blocks() {
        let mut pixels = RasterBuffer::from_preset(GridPreset::Head);
        pixels.set(1, 0, Color32::RED);
        let compositor = LayerCompositor::new(&pixels);
        let out = compositor.compose(stack(&pixels), 4);
        assert_eq!(out.dimensions(), (128, 128));
        assert_eq!(out.get_pixel(4, 0).0, [255, 0, 0, 255]);
        assert_eq!(out.get_pixel(7, 3).0, [255, 0, 0, 255]);
        assert_eq!(out.get_pixel(3, 0).0[3], 0);
    }

    #[test]
    fn test_reference_is_dimmed_and_translucent() {
        let pixels = RasterBuffer::from_preset(GridPreset::Head);
        let reference = ReferenceLayer::new("white", RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255])));
        let compositor = LayerCompositor::new(&pixels);
        let mut layers = stack(&pixels);
        layers.reference = Some(&reference);

        let out = compositor.compose(layers, 1);
        let px = out.get_pixel(16, 16).0;
        assert_eq!(px[3], (0.4f32 * 255.0).round() as u8);
        assert_eq!(px[0], (0.75f32 * 255.0).round() as u8);
    }

    #[test]
    fn test_reference_is_letterboxed() {
        let pixels = RasterBuffer::from_preset(GridPreset::Body);
        let reference = ReferenceLayer::new("square", RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255])));
        let compositor = LayerCompositor::new(&pixels);
        let mut layers = stack(&pixels);
        layers.reference = Some(&reference);

        // 32x64 canvas, square image fits as 32x32 centred vertically
        let out = compositor.compose(layers, 1);
        assert_eq!(out.get_pixel(0, 10).0[3], 0);
        assert!(out.get_pixel(0, 20).0[3] > 0);
        assert!(out.get_pixel(31, 47).0[3] > 0);
        assert_eq!(out.get_pixel(0, 50).0[3], 0);
    }

    #[test]
    fn test_pixels_cover_sketch() {
        let mut pixels = RasterBuffer::from_preset(GridPreset::Head);
        pixels.set(0, 0, Color32::RED);
        let mut sketch = SketchLayer::new(GridPreset::Head);
        sketch.stamp(egui::pos2(16.0, 16.0), 200.0, Some(Color32::BLUE));
        let compositor = LayerCompositor::new(&pixels);
        let mut layers = stack(&pixels);
        layers.sketch = Some(&sketch);

        let out = compositor.compose(layers, 1);
        assert_eq!(out.get_pixel(0, 0).0, [255, 0, 0, 255]);
        // Sketch shows through empty cells at its guide opacity
        let blue = out.get_pixel(1, 1).0;
        assert_eq!(blue[2], 255);
        assert_eq!(blue[3], (0.3f32 * 255.0).round() as u8);

        layers.active = ActiveLayer::Sketch;
        let out = compositor.compose(layers, 1);
        assert_eq!(out.get_pixel(1, 1).0[3], 255);
        // Pixel layer is faded over an opaque sketch, so red mixes with blue
        let mixed = out.get_pixel(0, 0).0;
        assert!(mixed[0] > 150 && mixed[2] > 0);
    }
}
