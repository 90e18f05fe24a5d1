//! Mold generation parameters.

use mold_features::FeatureParams;
use mold_types::Axis;

use crate::error::{MoldError, MoldResult};

/// Parameters for two-part mold generation.
///
/// The derived defaults follow the wall thickness: keys are a fifth of
/// the wall in radius and a full wall in height, the spout a third of
/// the wall in radius. Set the `_mm` overrides to break those ratios.
///
/// # Example
///
/// ```
/// use mold_pipeline::MoldParams;
///
/// let params = MoldParams::default()
///     .with_wall_thickness(8.0)
///     .with_key_count(6);
/// assert_eq!(params.key_count, 6);
/// ```
#[derive(Debug, Clone)]
pub struct MoldParams {
    /// Wall thickness of the mold block around the part, mm.
    pub wall_thickness_mm: f64,
    /// Number of alignment keys (0 disables keys).
    pub key_count: usize,
    /// Key base radius, mm. `None` derives wall / 5.
    pub key_radius_mm: Option<f64>,
    /// Extra radius on each recess so the halves mate without force.
    pub recess_clearance_mm: f64,
    /// Pour spout radius at the parting plane, mm. `None` derives wall / 3.
    pub spout_radius_mm: Option<f64>,
    /// Segment count for keys, recesses and the spout.
    pub segments: usize,
    /// Parting plane axis. `None` picks the part's longest axis,
    /// preferring Z on ties.
    pub parting_axis: Option<Axis>,
    /// Run the heavy stages on multiple threads.
    pub parallel: bool,
}

impl Default for MoldParams {
    fn default() -> Self {
        Self {
            wall_thickness_mm: 10.0,
            key_count: 4,
            key_radius_mm: None,
            recess_clearance_mm: 0.2,
            spout_radius_mm: None,
            segments: 32,
            parting_axis: None,
            parallel: true,
        }
    }
}

impl MoldParams {
    /// Set the wall thickness in mm.
    #[must_use]
    pub fn with_wall_thickness(mut self, mm: f64) -> Self {
        self.wall_thickness_mm = mm;
        self
    }

    /// Set the number of alignment keys.
    #[must_use]
    pub fn with_key_count(mut self, count: usize) -> Self {
        self.key_count = count;
        self
    }

    /// Override the derived key radius.
    #[must_use]
    pub fn with_key_radius(mut self, mm: f64) -> Self {
        self.key_radius_mm = Some(mm);
        self
    }

    /// Override the derived spout radius.
    #[must_use]
    pub fn with_spout_radius(mut self, mm: f64) -> Self {
        self.spout_radius_mm = Some(mm);
        self
    }

    /// Fix the parting plane to an axis instead of auto-picking.
    #[must_use]
    pub fn with_parting_axis(mut self, axis: Axis) -> Self {
        self.parting_axis = Some(axis);
        self
    }

    /// Enable or disable multi-threaded stages.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// The effective key radius after derivation.
    #[must_use]
    pub fn key_radius(&self) -> f64 {
        self.key_radius_mm
            .unwrap_or(self.wall_thickness_mm / 5.0)
    }

    /// The effective spout radius after derivation.
    #[must_use]
    pub fn spout_radius(&self) -> f64 {
        self.spout_radius_mm
            .unwrap_or(self.wall_thickness_mm / 3.0)
    }

    pub(crate) fn validate(&self) -> MoldResult<()> {
        if !self.wall_thickness_mm.is_finite() || self.wall_thickness_mm <= 0.0 {
            return Err(MoldError::invalid_params(format!(
                "wall thickness must be positive, got {}",
                self.wall_thickness_mm
            )));
        }
        if self.segments < 3 {
            return Err(MoldError::invalid_params(format!(
                "segments must be at least 3, got {}",
                self.segments
            )));
        }
        Ok(())
    }

    pub(crate) fn feature_params(&self) -> FeatureParams {
        FeatureParams {
            key_count: self.key_count,
            key_radius: self.key_radius(),
            key_height: self.wall_thickness_mm,
            recess_clearance: self.recess_clearance_mm,
            spout_radius: self.spout_radius(),
            segments: self.segments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn radii_derive_from_wall() {
        let params = MoldParams::default().with_wall_thickness(15.0);
        assert_relative_eq!(params.key_radius(), 3.0);
        assert_relative_eq!(params.spout_radius(), 5.0);
    }

    #[test]
    fn overrides_win_over_derivation() {
        let params = MoldParams::default()
            .with_key_radius(1.5)
            .with_spout_radius(2.5);
        assert_relative_eq!(params.key_radius(), 1.5);
        assert_relative_eq!(params.spout_radius(), 2.5);
    }

    #[test]
    fn rejects_nonpositive_wall() {
        let params = MoldParams::default().with_wall_thickness(0.0);
        assert!(matches!(
            params.validate(),
            Err(MoldError::InvalidParams(_))
        ));
    }

    #[test]
    fn rejects_degenerate_segments() {
        let mut params = MoldParams::default();
        params.segments = 2;
        assert!(matches!(
            params.validate(),
            Err(MoldError::InvalidParams(_))
        ));
    }
}
