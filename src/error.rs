use thiserror::Error;

use crate::collab::CollaboratorError;
use crate::state::PersistenceError;

/// Errors surfaced by the editing engine.
///
/// Out-of-bounds coordinates, picking an empty pixel and undoing with no
/// history are deliberately not errors; those operations are silent no-ops.
#[derive(Debug, Error)]
pub enum EditorError {
    /// Brush sizes outside 1..=10
    #[error("Brush size {0} is outside the supported range 1..=10")]
    InvalidBrushSize(u8),

    /// Opacity must be a finite number
    #[error("Opacity must be a finite number, got {0}")]
    InvalidOpacity(f32),

    /// Colour string could not be parsed as `#rrggbb`
    #[error("Invalid hex colour: {0:?}")]
    InvalidHexColor(String),

    /// A snapshot or decoded image does not match the grid it is applied to
    #[error("Dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: [usize; 2],
        actual: [usize; 2],
    },

    #[error("Image codec failure: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

/// Result type for engine operations
pub type EditorResult<T> = Result<T, EditorError>;
