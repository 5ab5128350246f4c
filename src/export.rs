use std::io::Cursor;

use image::{imageops::FilterType, ImageFormat, RgbaImage};

use crate::error::EditorResult;
use crate::raster::{GridPreset, RasterBuffer};

/// Encodes the pixel grid as a PNG at native resolution.
///
/// Only the pixel layer is included; empty cells stay transparent.
pub fn export_png(pixels: &RasterBuffer) -> EditorResult<Vec<u8>> {
    let [w, h] = pixels.size();
    let image = RgbaImage::from_raw(w as u32, h as u32, pixels.to_rgba_bytes())
        .unwrap_or_else(|| RgbaImage::new(w as u32, h as u32));

    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Decodes an encoded image and scales it onto a grid of `size` cells.
///
/// Nearest-neighbour keeps hard pixel edges; alpha is quantized later when
/// the result is loaded into a [`RasterBuffer`].
pub fn decode_for_grid(bytes: &[u8], size: [usize; 2]) -> EditorResult<RgbaImage> {
    let decoded = image::load_from_memory(bytes)?.to_rgba8();
    let (w, h) = (size[0] as u32, size[1] as u32);
    if decoded.dimensions() == (w, h) {
        return Ok(decoded);
    }
    log::debug!(
        "Scaling {}x{} image onto {}x{} grid",
        decoded.width(),
        decoded.height(),
        w,
        h
    );
    Ok(image::imageops::resize(&decoded, w, h, FilterType::Nearest))
}

/// Suggested download name, e.g. `graal_pro_head_1700000000000.png`.
pub fn export_file_name(preset: GridPreset, timestamp_millis: u64) -> String {
    format!("graal_pro_{}_{}.png", preset.name(), timestamp_millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Color32;

    #[test]
    fn test_export_is_native_resolution_png() {
        let mut pixels = RasterBuffer::from_preset(GridPreset::Body);
        pixels.set(0, 0, Color32::RED);
        let bytes = export_png(&pixels).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");

        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (32, 64));
        assert_eq!(decoded.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(decoded.get_pixel(1, 0).0[3], 0);
    }

    #[test]
    fn test_decode_scales_to_grid() {
        let big = RgbaImage::from_pixel(64, 64, image::Rgba([9, 8, 7, 255]));
        let mut bytes = Vec::new();
        big.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();

        let scaled = decode_for_grid(&bytes, [32, 32]).unwrap();
        assert_eq!(scaled.dimensions(), (32, 32));
        assert_eq!(scaled.get_pixel(5, 5).0, [9, 8, 7, 255]);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_for_grid(b"not an image", [32, 32]).is_err());
    }

    #[test]
    fn test_file_name() {
        assert_eq!(export_file_name(GridPreset::Body, 42), "graal_pro_body_42.png");
    }
}
