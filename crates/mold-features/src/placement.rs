//! Key, recess and spout placement on the parting plane.
//!
//! Keys sit evenly along the perimeter of a rectangle inset from the
//! block's plane cross-section; the spout rises from the cavity
//! center through the block top. All placement happens in the plane's
//! 2D basis, with clearance rules checked before any mesh is built.

use crate::error::{FeatureError, FeatureResult};
use mold_types::{frustum, Aabb, IndexedMesh, Plane, Point3};
use tracing::debug;

/// Parameters for feature planning.
#[derive(Debug, Clone)]
pub struct FeatureParams {
    /// Number of alignment keys (0 disables keys).
    pub key_count: usize,
    /// Base radius of each key, mm.
    pub key_radius: f64,
    /// Key height, mm; keys are centered on the parting plane.
    pub key_height: f64,
    /// Extra radius on each recess so the halves mate without force.
    pub recess_clearance: f64,
    /// Spout radius at the parting plane, mm.
    pub spout_radius: f64,
    /// Segment count for round primitives.
    pub segments: usize,
}

/// Key tops shrink to this fraction of the base radius for demolding.
const KEY_TAPER: f64 = 0.8;

/// The spout widens to this multiple of its plane radius at the top.
const SPOUT_FLARE: f64 = 1.5;

impl FeatureParams {
    /// Defaults derived from a wall thickness, matching the ratios of
    /// the mold block itself.
    #[must_use]
    pub fn for_wall(wall_thickness: f64) -> Self {
        Self {
            key_count: 4,
            key_radius: wall_thickness / 5.0,
            key_height: wall_thickness,
            recess_clearance: 0.2,
            spout_radius: wall_thickness / 3.0,
            segments: 32,
        }
    }

    fn validate(&self) -> FeatureResult<()> {
        if self.key_count > 0 && self.key_radius <= 0.0 {
            return Err(FeatureError::InvalidParameter(format!(
                "key radius must be positive, got {}",
                self.key_radius
            )));
        }
        if self.key_height <= 0.0 {
            return Err(FeatureError::InvalidParameter(format!(
                "key height must be positive, got {}",
                self.key_height
            )));
        }
        if self.recess_clearance < 0.0 {
            return Err(FeatureError::InvalidParameter(format!(
                "recess clearance must not be negative, got {}",
                self.recess_clearance
            )));
        }
        if self.spout_radius <= 0.0 {
            return Err(FeatureError::InvalidParameter(format!(
                "spout radius must be positive, got {}",
                self.spout_radius
            )));
        }
        Ok(())
    }
}

/// The planned feature solids, ready for the boolean stages.
#[derive(Debug)]
pub struct FeaturePlan {
    /// Key frustums, unioned into the bottom half.
    pub keys: Vec<IndexedMesh>,
    /// Matching recess frustums, subtracted from the top half.
    pub recesses: Vec<IndexedMesh>,
    /// Pour spout, subtracted from the top half.
    pub spout: IndexedMesh,
    /// Key centers in plane coordinates, one per key.
    pub key_centers: Vec<(f64, f64)>,
}

/// An axis-aligned rectangle in the plane's `(u, v)` basis.
#[derive(Debug, Clone, Copy)]
struct Rect {
    min_u: f64,
    min_v: f64,
    max_u: f64,
    max_v: f64,
}

impl Rect {
    fn from_bounds(bounds: &Aabb, plane: &Plane) -> Self {
        let mut rect = Self {
            min_u: f64::INFINITY,
            min_v: f64::INFINITY,
            max_u: f64::NEG_INFINITY,
            max_v: f64::NEG_INFINITY,
        };
        for corner in corners(bounds) {
            let (u, v) = plane.to_plane_coords(&corner);
            rect.min_u = rect.min_u.min(u);
            rect.min_v = rect.min_v.min(v);
            rect.max_u = rect.max_u.max(u);
            rect.max_v = rect.max_v.max(v);
        }
        rect
    }

    fn inset(&self, margin: f64) -> Self {
        Self {
            min_u: self.min_u + margin,
            min_v: self.min_v + margin,
            max_u: self.max_u - margin,
            max_v: self.max_v - margin,
        }
    }

    fn is_valid(&self) -> bool {
        self.min_u < self.max_u && self.min_v < self.max_v
    }

    fn width(&self) -> f64 {
        self.max_u - self.min_u
    }

    fn height(&self) -> f64 {
        self.max_v - self.min_v
    }

    /// Distance from an outside point to the rectangle; 0 inside.
    fn distance_outside(&self, u: f64, v: f64) -> f64 {
        let du = (self.min_u - u).max(u - self.max_u).max(0.0);
        let dv = (self.min_v - v).max(v - self.max_v).max(0.0);
        du.hypot(dv)
    }

    /// Distance from an inside point to the nearest edge; negative
    /// outside.
    fn distance_inside(&self, u: f64, v: f64) -> f64 {
        (u - self.min_u)
            .min(self.max_u - u)
            .min(v - self.min_v)
            .min(self.max_v - v)
    }

    /// Point at arc length `t` along the perimeter, walking
    /// counterclockwise from `(min_u, min_v)`.
    fn perimeter_point(&self, t: f64) -> (f64, f64) {
        let w = self.width();
        let h = self.height();
        let t = t.rem_euclid(2.0 * (w + h));
        if t < w {
            (self.min_u + t, self.min_v)
        } else if t < w + h {
            (self.max_u, self.min_v + (t - w))
        } else if t < 2.0 * w + h {
            (self.max_u - (t - w - h), self.max_v)
        } else {
            (self.min_u, self.max_v - (t - 2.0 * w - h))
        }
    }
}

fn corners(bounds: &Aabb) -> [Point3<f64>; 8] {
    let (lo, hi) = (bounds.min, bounds.max);
    [
        Point3::new(lo.x, lo.y, lo.z),
        Point3::new(hi.x, lo.y, lo.z),
        Point3::new(lo.x, hi.y, lo.z),
        Point3::new(hi.x, hi.y, lo.z),
        Point3::new(lo.x, lo.y, hi.z),
        Point3::new(hi.x, lo.y, hi.z),
        Point3::new(lo.x, hi.y, hi.z),
        Point3::new(hi.x, hi.y, hi.z),
    ]
}

/// Plan the alignment keys, recesses and pour spout.
///
/// `input_bounds` is the cast part's bounding box (the cavity
/// silhouette), `block_bounds` the mold block's. Clearance rules,
/// checked in order, each failing with
/// [`FeatureError::InsufficientSpace`]:
///
/// 1. key boundary to cavity silhouette at least one key diameter,
/// 2. key boundary inside the block exterior,
/// 3. key centers pairwise at least two radii plus one diameter apart,
/// 4. spout boundary to every key boundary at least one key radius.
///
/// # Errors
///
/// [`FeatureError::InvalidParameter`] for out-of-range parameters,
/// [`FeatureError::InsufficientSpace`] when a clearance rule fails.
#[allow(clippy::cast_precision_loss)]
pub fn plan_features(
    input_bounds: &Aabb,
    block_bounds: &Aabb,
    plane: &Plane,
    params: &FeatureParams,
) -> FeatureResult<FeaturePlan> {
    params.validate()?;

    let block_rect = Rect::from_bounds(block_bounds, plane);
    let silhouette = Rect::from_bounds(input_bounds, plane);
    let ring = block_rect.inset(2.0 * params.key_radius);

    if params.key_count > 0 && !ring.is_valid() {
        return Err(FeatureError::InsufficientSpace {
            constraint: "key placement ring inside the block".to_string(),
            distance: block_rect.width().min(block_rect.height()),
            required: 4.0 * params.key_radius,
        });
    }

    let perimeter = 2.0 * (ring.width() + ring.height());
    let key_centers: Vec<(f64, f64)> = (0..params.key_count)
        .map(|i| ring.perimeter_point(perimeter * i as f64 / params.key_count as f64))
        .collect();

    let spout_uv = {
        let input_center = input_bounds.center();
        plane.to_plane_coords(&input_center)
    };

    check_clearances(&key_centers, &silhouette, &block_rect, spout_uv, params)?;

    let keys = key_centers
        .iter()
        .map(|&(u, v)| key_frustum(plane, u, v, params, 0.0))
        .collect();
    let recesses = key_centers
        .iter()
        .map(|&(u, v)| key_frustum(plane, u, v, params, params.recess_clearance))
        .collect();
    let spout = spout_frustum(plane, spout_uv, block_bounds, params);

    debug!(
        keys = params.key_count,
        spout_u = spout_uv.0,
        spout_v = spout_uv.1,
        "feature plan ready"
    );

    Ok(FeaturePlan {
        keys,
        recesses,
        spout,
        key_centers,
    })
}

fn check_clearances(
    key_centers: &[(f64, f64)],
    silhouette: &Rect,
    block_rect: &Rect,
    spout_uv: (f64, f64),
    params: &FeatureParams,
) -> FeatureResult<()> {
    let r = params.key_radius;

    for &(u, v) in key_centers {
        let to_cavity = silhouette.distance_outside(u, v) - r;
        if to_cavity < 2.0 * r {
            return Err(FeatureError::InsufficientSpace {
                constraint: "key to cavity silhouette".to_string(),
                distance: to_cavity,
                required: 2.0 * r,
            });
        }

        let to_exterior = block_rect.distance_inside(u, v) - r;
        if to_exterior <= 0.0 {
            return Err(FeatureError::InsufficientSpace {
                constraint: "key inside block exterior".to_string(),
                distance: to_exterior,
                required: 0.0,
            });
        }
    }

    for (i, &(u0, v0)) in key_centers.iter().enumerate() {
        for &(u1, v1) in &key_centers[i + 1..] {
            let gap = (u1 - u0).hypot(v1 - v0);
            if gap < 4.0 * r {
                return Err(FeatureError::InsufficientSpace {
                    constraint: "key center spacing".to_string(),
                    distance: gap,
                    required: 4.0 * r,
                });
            }
        }
    }

    for &(u, v) in key_centers {
        let gap = (u - spout_uv.0).hypot(v - spout_uv.1) - params.spout_radius - r;
        if gap < r {
            return Err(FeatureError::InsufficientSpace {
                constraint: "spout to key".to_string(),
                distance: gap,
                required: r,
            });
        }
    }

    Ok(())
}

/// A key (or, with `extra > 0`, its recess) centered on the plane.
fn key_frustum(plane: &Plane, u: f64, v: f64, params: &FeatureParams, extra: f64) -> IndexedMesh {
    let center = plane.from_plane_coords(u, v);
    let base = center - plane.normal * (params.key_height / 2.0);
    frustum(
        base,
        plane.normal,
        params.key_radius + extra,
        KEY_TAPER * params.key_radius + extra,
        params.key_height,
        params.segments,
    )
}

/// The pour spout: a flaring frustum from just below the plane to
/// past the block top, so the subtraction cuts through both the cap
/// and the outer wall.
fn spout_frustum(
    plane: &Plane,
    (u, v): (f64, f64),
    block_bounds: &Aabb,
    params: &FeatureParams,
) -> IndexedMesh {
    let span = corners(block_bounds)
        .iter()
        .map(|c| plane.signed_distance(c))
        .fold(0.0_f64, f64::max);

    let margin = params.key_height / 2.0;
    let height = span + 2.0 * margin;
    let slope = (SPOUT_FLARE - 1.0) * params.spout_radius / span;

    let anchor = plane.from_plane_coords(u, v);
    let base = anchor - plane.normal * margin;
    frustum(
        base,
        plane.normal,
        params.spout_radius - slope * margin,
        SPOUT_FLARE * params.spout_radius + slope * margin,
        height,
        params.segments,
    )
}
