//! Concrete triangle with vertex positions.

use nalgebra::{Point3, Vector3};

/// A triangle with three vertex positions.
///
/// Unlike a face (which stores indices), a `Triangle` stores the actual
/// vertex positions, making it self-contained for geometric queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First vertex position.
    pub v0: Point3<f64>,
    /// Second vertex position.
    pub v1: Point3<f64>,
    /// Third vertex position.
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a new triangle from three points.
    #[inline]
    #[must_use]
    pub const fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Compute the (unnormalized) normal vector via the cross product.
    ///
    /// The magnitude equals twice the triangle area. For CCW winding
    /// viewed from outside, this points outward.
    #[inline]
    #[must_use]
    pub fn normal_raw(&self) -> Vector3<f64> {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0))
    }

    /// Compute the unit normal, or `None` for a degenerate triangle.
    #[must_use]
    pub fn normal(&self) -> Option<Vector3<f64>> {
        let n = self.normal_raw();
        let len = n.norm();
        if len > f64::EPSILON {
            Some(n / len)
        } else {
            None
        }
    }

    /// Compute the triangle area.
    #[inline]
    #[must_use]
    pub fn area(&self) -> f64 {
        self.normal_raw().norm() * 0.5
    }

    /// Compute the centroid.
    #[inline]
    #[must_use]
    pub fn centroid(&self) -> Point3<f64> {
        Point3::from((self.v0.coords + self.v1.coords + self.v2.coords) / 3.0)
    }

    /// Check whether the triangle is degenerate (area below `epsilon`).
    #[inline]
    #[must_use]
    pub fn is_degenerate(&self, epsilon: f64) -> bool {
        self.area() < epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn right_triangle() -> Triangle {
        Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        )
    }

    #[test]
    fn triangle_area() {
        assert_relative_eq!(right_triangle().area(), 0.5);
    }

    #[test]
    fn triangle_normal_points_up() {
        let n = right_triangle().normal().unwrap();
        assert_relative_eq!(n.z, 1.0);
    }

    #[test]
    fn triangle_centroid() {
        let c = right_triangle().centroid();
        assert_relative_eq!(c.x, 1.0 / 3.0);
        assert_relative_eq!(c.y, 1.0 / 3.0);
    }

    #[test]
    fn degenerate_triangle_has_no_normal() {
        let t = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        );
        assert!(t.normal().is_none());
        assert!(t.is_degenerate(1e-12));
    }
}
