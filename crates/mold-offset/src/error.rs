//! Error types for offset operations.

use mold_types::Point3;
use thiserror::Error;

/// Result type for offset operations.
pub type OffsetResult<T> = Result<T, OffsetError>;

/// Errors that can occur while offsetting a mesh.
#[derive(Debug, Error)]
pub enum OffsetError {
    /// Mesh has no faces.
    #[error("mesh is empty")]
    EmptyMesh,

    /// Offset distance is not finite or not positive.
    #[error("invalid offset distance: {0}")]
    InvalidDistance(String),

    /// The requested distance degenerates the surface.
    #[error("degenerate offset at element {element} near ({x:.3}, {y:.3}, {z:.3}): {detail}")]
    DegenerateOffset {
        /// Index of the offending vertex or face.
        element: usize,
        /// X coordinate of the offending location.
        x: f64,
        /// Y coordinate of the offending location.
        y: f64,
        /// Z coordinate of the offending location.
        z: f64,
        /// What degenerated.
        detail: String,
    },
}

impl OffsetError {
    pub(crate) fn degenerate(element: usize, at: Point3<f64>, detail: impl Into<String>) -> Self {
        Self::DegenerateOffset {
            element,
            x: at.x,
            y: at.y,
            z: at.z,
            detail: detail.into(),
        }
    }
}
