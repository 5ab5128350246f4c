use super::GridPos;

/// Integer Bresenham walk from `start` to `end`, both endpoints included.
///
/// On its own the walk is direction dependent: ties in the error term are
/// broken towards the start point. Use [`line_points`] when the result must
/// not depend on which end the segment was started from.
#[derive(Debug, Clone)]
pub struct LineIter {
    x: i32,
    y: i32,
    end: GridPos,
    dx: i32,
    dy: i32,
    sx: i32,
    sy: i32,
    err: i32,
    done: bool,
}

impl LineIter {
    pub fn new(start: GridPos, end: GridPos) -> Self {
        let dx = (end.x - start.x).abs();
        let dy = -(end.y - start.y).abs();
        Self {
            x: start.x,
            y: start.y,
            end,
            dx,
            dy,
            sx: if start.x < end.x { 1 } else { -1 },
            sy: if start.y < end.y { 1 } else { -1 },
            err: dx + dy,
            done: false,
        }
    }
}

impl Iterator for LineIter {
    type Item = GridPos;

    fn next(&mut self) -> Option<GridPos> {
        if self.done {
            return None;
        }

        let current = GridPos::new(self.x, self.y);
        if self.x == self.end.x && self.y == self.end.y {
            self.done = true;
            return Some(current);
        }

        let e2 = 2 * self.err;
        if e2 >= self.dy {
            self.err += self.dy;
            self.x += self.sx;
        }
        if e2 <= self.dx {
            self.err += self.dx;
            self.y += self.sy;
        }
        Some(current)
    }
}

/// Every lattice point between `a` and `b`, ordered from `a` to `b`.
///
/// The point set is identical for `(a, b)` and `(b, a)`: the walk always
/// starts at the lexicographically smaller endpoint and is reversed
/// afterwards when needed.
pub fn line_points(a: GridPos, b: GridPos) -> Vec<GridPos> {
    if (a.x, a.y) <= (b.x, b.y) {
        LineIter::new(a, b).collect()
    } else {
        let mut points: Vec<GridPos> = LineIter::new(b, a).collect();
        points.reverse();
        points
    }
}
