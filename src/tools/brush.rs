use egui::Color32;

use crate::geometry::{line_points, GridPos};
use crate::raster::RasterBuffer;

use super::BrushSize;

/// Reflection across the vertical centre axis.
pub fn mirror_x(width: usize, x: i32) -> i32 {
    width as i32 - 1 - x
}

/// Stamps the centred square footprint at `center`.
///
/// For even sizes the extra row/column falls on the positive side. With
/// `symmetry` every written cell is also written at its mirror position.
/// Returns the number of in-bounds cells written.
pub fn paint_footprint(
    buffer: &mut RasterBuffer,
    center: GridPos,
    size: BrushSize,
    color: Color32,
    symmetry: bool,
) -> usize {
    let size = size.get() as i32;
    let half = (size - 1) / 2;
    let width = buffer.width();
    let mut written = 0;

    for dy in 0..size {
        for dx in 0..size {
            let x = center.x - half + dx;
            let y = center.y - half + dy;
            if buffer.set(x, y, color) {
                written += 1;
            }
            if symmetry {
                let mx = mirror_x(width, x);
                if mx != x && buffer.set(mx, y, color) {
                    written += 1;
                }
            }
        }
    }
    written
}

/// Paints the footprint on every cell of the segment `from..=to`.
///
/// Adjacent cells need no interpolation, so only `to` is stamped then.
pub fn paint_segment(
    buffer: &mut RasterBuffer,
    from: GridPos,
    to: GridPos,
    size: BrushSize,
    color: Color32,
    symmetry: bool,
) -> usize {
    if from.is_adjacent(to) {
        return paint_footprint(buffer, to, size, color, symmetry);
    }
    line_points(from, to)
        .into_iter()
        .map(|p| paint_footprint(buffer, p, size, color, symmetry))
        .sum()
}
