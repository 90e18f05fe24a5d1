//! Error types for boolean operations.

use mold_types::Point3;
use thiserror::Error;

/// Errors that can occur during boolean operations.
#[derive(Debug, Error)]
pub enum BooleanError {
    /// One or both input meshes are empty.
    #[error("empty mesh: {details}")]
    EmptyMesh {
        /// Description of which mesh is empty.
        details: String,
    },

    /// The assembled result could not be closed into a 2-manifold.
    ///
    /// Raised after stitching when boundary edges remain that cannot
    /// be chained into closed loops, or when edges end up with more
    /// than two incident faces.
    #[error(
        "non-manifold result: {open_edge_count} open edge(s) remain, \
         e.g. ({edge_start:?}) -> ({edge_end:?})"
    )]
    NonManifoldResult {
        /// Number of boundary edges that could not be closed.
        open_edge_count: usize,
        /// One endpoint of a sample open edge.
        edge_start: Point3<f64>,
        /// The other endpoint of the sample open edge.
        edge_end: Point3<f64>,
    },
}

/// Result type for boolean operations.
pub type BooleanResult<T> = Result<T, BooleanError>;
