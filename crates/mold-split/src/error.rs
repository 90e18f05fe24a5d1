//! Error types for plane splitting.

use thiserror::Error;

/// Result type for split operations.
pub type SplitResult<T> = Result<T, SplitError>;

/// Errors that can occur while splitting a mesh.
#[derive(Debug, Error)]
pub enum SplitError {
    /// Mesh has no faces.
    #[error("mesh is empty")]
    EmptyMesh,

    /// The plane does not pass through the mesh interior, or the cut
    /// cannot be closed into cap loops.
    #[error("mesh cannot be split by this plane: {detail}")]
    UnsplittableGeometry {
        /// What went wrong.
        detail: String,
    },
}

impl SplitError {
    pub(crate) fn unsplittable(detail: impl Into<String>) -> Self {
        Self::UnsplittableGeometry {
            detail: detail.into(),
        }
    }
}
