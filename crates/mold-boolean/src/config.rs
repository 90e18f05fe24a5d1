//! Configuration and presets for boolean operations.
//!
//! [`BooleanConfig`] controls tolerances, cleanup and parallelism.
//! Presets cover the common cases:
//!
//! - [`BooleanConfig::default()`] - balanced settings for general use
//! - [`BooleanConfig::for_scans()`] - looser tolerances for noisy scan data
//! - [`BooleanConfig::for_cad()`] - tighter tolerances for exact geometry
//! - [`BooleanConfig::strict()`] - tightest settings, may fail on imperfect input
//!
//! # Example
//!
//! ```
//! use mold_boolean::{BooleanConfig, CleanupLevel};
//!
//! let config = BooleanConfig::for_cad()
//!     .with_cleanup(CleanupLevel::Full)
//!     .with_parallel(false);
//! ```

/// Level of cleanup applied to the assembled result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanupLevel {
    /// No cleanup, return the raw assembled faces.
    None,

    /// Weld vertices and drop degenerate triangles.
    Fast,

    /// Weld, drop degenerates and unreferenced vertices, close
    /// residual boundary loops, and verify the result is a closed
    /// manifold. This is the default: the mold pipeline feeds each
    /// boolean result into the next stage, so every intermediate must
    /// be watertight.
    #[default]
    Full,
}

/// Configuration for boolean operations.
#[derive(Debug, Clone)]
pub struct BooleanConfig {
    /// Vertices within this distance are merged during cleanup.
    pub weld_tolerance: f64,

    /// Tolerance for edge-triangle intersection detection.
    pub edge_tolerance: f64,

    /// Tolerance for inside/outside ray classification.
    pub classification_tolerance: f64,

    /// Level of cleanup to apply to results.
    pub cleanup: CleanupLevel,

    /// Whether to use parallel processing (via rayon).
    pub parallel: bool,

    /// Maximum triangles per BVH leaf.
    pub bvh_leaf_size: usize,
}

impl Default for BooleanConfig {
    fn default() -> Self {
        Self {
            weld_tolerance: 1e-6,
            edge_tolerance: 1e-8,
            classification_tolerance: 1e-7,
            cleanup: CleanupLevel::default(),
            parallel: true,
            bvh_leaf_size: 8,
        }
    }
}

impl BooleanConfig {
    /// Configuration for noisy scan data.
    ///
    /// Looser tolerances absorb the jitter of scanned surfaces.
    ///
    /// # Example
    ///
    /// ```
    /// use mold_boolean::BooleanConfig;
    ///
    /// let config = BooleanConfig::for_scans();
    /// assert!(config.weld_tolerance > BooleanConfig::default().weld_tolerance);
    /// ```
    #[must_use]
    pub fn for_scans() -> Self {
        Self {
            weld_tolerance: 1e-4,
            edge_tolerance: 1e-6,
            classification_tolerance: 1e-5,
            ..Self::default()
        }
    }

    /// Configuration for exact CAD-style geometry.
    ///
    /// # Example
    ///
    /// ```
    /// use mold_boolean::BooleanConfig;
    ///
    /// let config = BooleanConfig::for_cad();
    /// assert!(config.weld_tolerance < BooleanConfig::default().weld_tolerance);
    /// ```
    #[must_use]
    pub fn for_cad() -> Self {
        Self {
            weld_tolerance: 1e-8,
            edge_tolerance: 1e-10,
            classification_tolerance: 1e-9,
            ..Self::default()
        }
    }

    /// Tightest tolerances. May fail on imperfect input.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            weld_tolerance: 1e-10,
            edge_tolerance: 1e-12,
            classification_tolerance: 1e-11,
            bvh_leaf_size: 4,
            ..Self::default()
        }
    }

    /// Set the cleanup level.
    #[must_use]
    pub fn with_cleanup(mut self, level: CleanupLevel) -> Self {
        self.cleanup = level;
        self
    }

    /// Enable or disable parallel processing.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the vertex weld tolerance.
    #[must_use]
    pub fn with_weld_tolerance(mut self, tolerance: f64) -> Self {
        self.weld_tolerance = tolerance.abs();
        self
    }

    /// Set the maximum BVH leaf size (clamped to at least 1).
    #[must_use]
    pub fn with_bvh_leaf_size(mut self, size: usize) -> Self {
        self.bvh_leaf_size = size.max(1);
        self
    }
}

/// Boolean operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    /// A ∪ B: everything of A outside B plus everything of B outside A.
    Union,

    /// A − B: everything of A outside B plus the part of B inside A,
    /// inverted to form the cavity wall.
    Difference,

    /// A ∩ B: the part of A inside B plus the part of B inside A.
    Intersection,
}

impl std::fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Union => write!(f, "union"),
            Self::Difference => write!(f, "difference"),
            Self::Intersection => write!(f, "intersection"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = BooleanConfig::default();
        assert_eq!(config.cleanup, CleanupLevel::Full);
        assert!(config.parallel);
    }

    #[test]
    fn preset_tolerance_ordering() {
        let default = BooleanConfig::default();
        let scans = BooleanConfig::for_scans();
        let cad = BooleanConfig::for_cad();
        let strict = BooleanConfig::strict();

        assert!(scans.weld_tolerance > default.weld_tolerance);
        assert!(cad.weld_tolerance < default.weld_tolerance);
        assert!(strict.weld_tolerance < cad.weld_tolerance);
    }

    #[test]
    fn builder_methods() {
        let config = BooleanConfig::default()
            .with_cleanup(CleanupLevel::Fast)
            .with_parallel(false)
            .with_weld_tolerance(-1e-5)
            .with_bvh_leaf_size(0);

        assert_eq!(config.cleanup, CleanupLevel::Fast);
        assert!(!config.parallel);
        assert!(config.weld_tolerance > 0.0);
        assert_eq!(config.bvh_leaf_size, 1);
    }

    #[test]
    fn op_display() {
        assert_eq!(format!("{}", BooleanOp::Difference), "difference");
    }
}
