use egui::Color32;

use crate::color;
use crate::geometry::GridPos;
use crate::raster::RasterBuffer;

/// Eyedropper read. Empty cells and out-of-range positions have no colour.
pub fn sample(buffer: &RasterBuffer, at: GridPos) -> Option<Color32> {
    buffer.get(at.x, at.y).filter(|&c| !color::is_empty(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample() {
        let mut buffer = RasterBuffer::new(4, 4);
        let teal = Color32::from_rgb(0, 128, 128);
        buffer.set(1, 2, teal);
        assert_eq!(sample(&buffer, GridPos::new(1, 2)), Some(teal));
        assert_eq!(sample(&buffer, GridPos::new(0, 0)), None);
        assert_eq!(sample(&buffer, GridPos::new(9, 9)), None);
    }
}
