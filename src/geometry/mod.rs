mod line;
mod mapper;

pub use line::{line_points, LineIter};
pub use mapper::{CoordinateMapper, GridPos};
