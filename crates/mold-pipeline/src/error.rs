//! Error types for mold generation.

use thiserror::Error;

/// Result type alias for mold generation.
pub type MoldResult<T> = Result<T, MoldError>;

/// Errors that can occur during mold generation.
#[derive(Debug, Error)]
pub enum MoldError {
    /// The input mesh is not a closed manifold solid.
    #[error(
        "input mesh is not a closed solid: {boundary_edges} boundary edges, \
         {non_manifold_edges} non-manifold edges"
    )]
    InvalidInput {
        /// Edges bounding exactly one face.
        boundary_edges: usize,
        /// Edges shared by three or more faces.
        non_manifold_edges: usize,
    },

    /// Invalid mold parameters.
    #[error("invalid mold parameters: {0}")]
    InvalidParams(String),

    /// The offset stage failed.
    #[error("offset failed: {0}")]
    Offset(#[from] mold_offset::OffsetError),

    /// A boolean stage failed.
    #[error("boolean operation failed: {0}")]
    Boolean(#[from] mold_boolean::BooleanError),

    /// The parting split failed.
    #[error("parting split failed: {0}")]
    Split(#[from] mold_split::SplitError),

    /// Feature planning failed.
    #[error("feature planning failed: {0}")]
    Feature(#[from] mold_features::FeatureError),
}

impl MoldError {
    /// Create an invalid params error.
    #[must_use]
    pub fn invalid_params(details: impl Into<String>) -> Self {
        Self::InvalidParams(details.into())
    }
}
