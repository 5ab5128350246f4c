use egui::{Pos2, Rect};
use serde::{Deserialize, Serialize};

/// A logical cell coordinate. May lie outside the grid; tools check bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// True when `other` is this cell or one of its eight neighbours.
    pub fn is_adjacent(self, other: GridPos) -> bool {
        (self.x - other.x).abs() <= 1 && (self.y - other.y).abs() <= 1
    }
}

impl From<(i32, i32)> for GridPos {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Converts display-space pointer positions into logical coordinates.
///
/// `bounds` is the on-screen rectangle the canvas element occupies. The
/// mapping is a plain linear scale, so whatever zoom the host applied is
/// already folded into `bounds`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    pub bounds: Rect,
}

impl CoordinateMapper {
    pub fn new(bounds: Rect) -> Self {
        Self { bounds }
    }

    /// Centres a `grid * zoom` canvas inside `available`.
    pub fn centered(available: Rect, grid: [usize; 2], zoom: f32) -> Self {
        let size = egui::vec2(grid[0] as f32 * zoom, grid[1] as f32 * zoom);
        Self::new(Rect::from_center_size(available.center(), size))
    }

    /// Scales into a surface of `surface` logical units without flooring.
    ///
    /// Returns `None` while the canvas has no visible extent.
    pub fn to_surface(&self, pos: Pos2, surface: [usize; 2]) -> Option<Pos2> {
        let rendered = self.bounds.size();
        if rendered.x <= 0.0 || rendered.y <= 0.0 {
            return None;
        }
        let x = (pos.x - self.bounds.min.x) * surface[0] as f32 / rendered.x;
        let y = (pos.y - self.bounds.min.y) * surface[1] as f32 / rendered.y;
        Some(egui::pos2(x, y))
    }

    /// Maps to an integer grid cell. The result is not clamped.
    pub fn to_grid(&self, pos: Pos2, grid: [usize; 2]) -> Option<GridPos> {
        self.to_surface(pos, grid)
            .map(|p| GridPos::new(p.x.floor() as i32, p.y.floor() as i32))
    }
}
