use egui::Color32;

use crate::geometry::GridPos;
use crate::raster::RasterBuffer;

/// 4-connected flood fill with exact RGBA matching.
///
/// Uses an explicit stack, so the worst case is `O(width * height)` work and
/// constant call depth. That is fine for the 32×64 presets; larger grids
/// would want a scanline variant. Returns the number of cells recoloured.
pub fn flood_fill(buffer: &mut RasterBuffer, seed: GridPos, fill: Color32) -> usize {
    let Some(target) = buffer.get(seed.x, seed.y) else {
        return 0;
    };
    if target == fill {
        return 0;
    }

    let mut filled = 0;
    let mut stack = vec![seed];
    while let Some(p) = stack.pop() {
        if buffer.get(p.x, p.y) != Some(target) {
            continue;
        }
        buffer.set(p.x, p.y, fill);
        filled += 1;

        stack.push(GridPos::new(p.x - 1, p.y));
        stack.push(GridPos::new(p.x + 1, p.y));
        stack.push(GridPos::new(p.x, p.y - 1));
        stack.push(GridPos::new(p.x, p.y + 1));
    }

    log::debug!("Flood fill from ({}, {}) recoloured {} cells", seed.x, seed.y, filled);
    filled
}
