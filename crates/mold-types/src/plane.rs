//! Parting plane.

use crate::Aabb;
use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Axis {
    /// X axis.
    X,
    /// Y axis.
    Y,
    /// Z axis.
    Z,
}

impl Axis {
    /// The unit vector along this axis.
    #[must_use]
    pub fn unit(self) -> Vector3<f64> {
        match self {
            Self::X => Vector3::x(),
            Self::Y => Vector3::y(),
            Self::Z => Vector3::z(),
        }
    }
}

/// An oriented plane defined by a point and a unit normal.
///
/// The parting plane separates the mold into a top half (positive side
/// of the normal) and a bottom half (negative side).
///
/// # Example
///
/// ```
/// use mold_types::{Plane, Point3, Vector3};
///
/// let plane = Plane::new(Point3::new(0.0, 0.0, 0.5), Vector3::z());
/// assert!(plane.signed_distance(&Point3::new(0.0, 0.0, 1.0)) > 0.0);
/// assert!(plane.signed_distance(&Point3::new(0.0, 0.0, 0.0)) < 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Plane {
    /// A point on the plane.
    pub point: Point3<f64>,
    /// Unit normal. The "top" side is the side this points toward.
    pub normal: Vector3<f64>,
}

impl Plane {
    /// Create a plane from a point and a normal.
    ///
    /// The normal is normalized; a zero normal falls back to +Z.
    #[must_use]
    pub fn new(point: Point3<f64>, normal: Vector3<f64>) -> Self {
        let len = normal.norm();
        let normal = if len > f64::EPSILON {
            normal / len
        } else {
            Vector3::z()
        };
        Self { point, normal }
    }

    /// The default parting plane for a bounding box: perpendicular to
    /// the axis of maximum extent, through the box center.
    ///
    /// Ties prefer Z (the pour axis), so a cube splits horizontally.
    #[must_use]
    pub fn from_bounds(bounds: &Aabb) -> Self {
        let axis = match bounds.longest_axis() {
            0 => Axis::X,
            1 => Axis::Y,
            _ => Axis::Z,
        };
        Self::new(bounds.center(), axis.unit())
    }

    /// Signed distance from a point to the plane.
    ///
    /// Positive on the normal side, negative on the other.
    #[inline]
    #[must_use]
    pub fn signed_distance(&self, p: &Point3<f64>) -> f64 {
        self.normal.dot(&(p - self.point))
    }

    /// Project a point onto the plane.
    #[must_use]
    pub fn project(&self, p: &Point3<f64>) -> Point3<f64> {
        p - self.normal * self.signed_distance(p)
    }

    /// An orthonormal in-plane basis `(u, v)` with `u × v = normal`.
    ///
    /// Used to map 3D points on the plane to 2D coordinates for
    /// triangulation and feature placement.
    #[must_use]
    pub fn basis(&self) -> (Vector3<f64>, Vector3<f64>) {
        // Pick the world axis least aligned with the normal as the seed.
        let seed = if self.normal.x.abs() <= self.normal.y.abs()
            && self.normal.x.abs() <= self.normal.z.abs()
        {
            Vector3::x()
        } else if self.normal.y.abs() <= self.normal.z.abs() {
            Vector3::y()
        } else {
            Vector3::z()
        };
        let u = self.normal.cross(&seed).normalize();
        let v = self.normal.cross(&u);
        (u, v)
    }

    /// Map a 3D point to 2D plane coordinates using [`Self::basis`].
    #[must_use]
    pub fn to_plane_coords(&self, p: &Point3<f64>) -> (f64, f64) {
        let (u, v) = self.basis();
        let d = p - self.point;
        (u.dot(&d), v.dot(&d))
    }

    /// Map 2D plane coordinates back to a 3D point on the plane.
    #[must_use]
    pub fn from_plane_coords(&self, a: f64, b: f64) -> Point3<f64> {
        let (u, v) = self.basis();
        self.point + u * a + v * b
    }

    /// Whether the plane passes through the interior of a bounding box
    /// (with `tolerance` slack on both sides).
    #[must_use]
    pub fn intersects_bounds(&self, bounds: &Aabb, tolerance: f64) -> bool {
        let mut has_pos = false;
        let mut has_neg = false;
        for &x in &[bounds.min.x, bounds.max.x] {
            for &y in &[bounds.min.y, bounds.max.y] {
                for &z in &[bounds.min.z, bounds.max.z] {
                    let d = self.signed_distance(&Point3::new(x, y, z));
                    if d > tolerance {
                        has_pos = true;
                    }
                    if d < -tolerance {
                        has_neg = true;
                    }
                }
            }
        }
        has_pos && has_neg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn signed_distance_sides() {
        let plane = Plane::new(Point3::new(0.0, 0.0, 1.0), Vector3::z());
        assert_relative_eq!(plane.signed_distance(&Point3::new(5.0, 5.0, 3.0)), 2.0);
        assert_relative_eq!(plane.signed_distance(&Point3::new(0.0, 0.0, 0.0)), -1.0);
    }

    #[test]
    fn normalizes_normal() {
        let plane = Plane::new(Point3::origin(), Vector3::new(0.0, 0.0, 10.0));
        assert_relative_eq!(plane.normal.norm(), 1.0);
    }

    #[test]
    fn from_bounds_prefers_z_on_cube() {
        let cube = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let plane = Plane::from_bounds(&cube);
        assert_relative_eq!(plane.normal.z, 1.0);
        assert_relative_eq!(plane.point.z, 0.5);
    }

    #[test]
    fn from_bounds_picks_longest_axis() {
        let tall = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 8.0, 2.0));
        let plane = Plane::from_bounds(&tall);
        assert_relative_eq!(plane.normal.y, 1.0);
    }

    #[test]
    fn basis_is_orthonormal() {
        let plane = Plane::new(Point3::origin(), Vector3::new(1.0, 2.0, 3.0));
        let (u, v) = plane.basis();
        assert_relative_eq!(u.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(v.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(u.dot(&v), 0.0, epsilon = 1e-12);
        assert_relative_eq!(u.dot(&plane.normal), 0.0, epsilon = 1e-12);
        let cross = u.cross(&v);
        assert_relative_eq!(cross.dot(&plane.normal), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn plane_coords_round_trip() {
        let plane = Plane::new(Point3::new(1.0, 2.0, 3.0), Vector3::new(0.0, 1.0, 1.0));
        let p = plane.project(&Point3::new(4.0, -1.0, 2.0));
        let (a, b) = plane.to_plane_coords(&p);
        let back = plane.from_plane_coords(a, b);
        assert_relative_eq!(back.x, p.x, epsilon = 1e-12);
        assert_relative_eq!(back.y, p.y, epsilon = 1e-12);
        assert_relative_eq!(back.z, p.z, epsilon = 1e-12);
    }

    #[test]
    fn intersects_bounds() {
        let cube = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let through = Plane::new(Point3::new(0.5, 0.5, 0.5), Vector3::z());
        let outside = Plane::new(Point3::new(0.0, 0.0, 5.0), Vector3::z());
        assert!(through.intersects_bounds(&cube, 1e-9));
        assert!(!outside.intersects_bounds(&cube, 1e-9));
    }
}
