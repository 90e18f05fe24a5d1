//! Error types for feature planning.

use thiserror::Error;

/// Result type for feature planning.
pub type FeatureResult<T> = Result<T, FeatureError>;

/// Errors that can occur while planning mold features.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// A parameter is out of range.
    #[error("invalid feature parameter: {0}")]
    InvalidParameter(String),

    /// A clearance rule cannot be satisfied with the given geometry.
    #[error("insufficient space for {constraint}: distance {distance:.3} mm, need {required:.3} mm")]
    InsufficientSpace {
        /// Which clearance rule failed.
        constraint: String,
        /// The actual distance found.
        distance: f64,
        /// The minimum distance the rule requires.
        required: f64,
    },
}
