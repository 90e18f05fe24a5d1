//! Axis-aligned bounding box.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box.
///
/// An empty box has `min` at `+inf` and `max` at `-inf`, so that
/// expanding it by any point produces a box containing just that point.
///
/// # Example
///
/// ```
/// use mold_types::{Aabb, Point3};
///
/// let points = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(2.0, 1.0, 3.0),
/// ];
/// let bounds = Aabb::from_points(points.iter());
/// assert_eq!(bounds.size().z, 3.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3<f64>,
    /// Maximum corner.
    pub max: Point3<f64>,
}

impl Aabb {
    /// Create a box from explicit corners.
    #[inline]
    #[must_use]
    pub const fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Create an empty box (contains nothing).
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Compute the bounding box of a set of points.
    ///
    /// Returns an empty box for an empty iterator.
    #[must_use]
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Point3<f64>>,
    {
        let mut bounds = Self::empty();
        for p in points {
            bounds.expand_to_contain(*p);
        }
        bounds
    }

    /// Whether the box contains nothing.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Grow the box to contain the given point.
    pub fn expand_to_contain(&mut self, p: Point3<f64>) {
        self.min = Point3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z));
        self.max = Point3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z));
    }

    /// Grow the box to contain another box.
    pub fn expand_to_contain_box(&mut self, other: &Self) {
        self.expand_to_contain(other.min);
        self.expand_to_contain(other.max);
    }

    /// The box center.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        Point3::from((self.min.coords + self.max.coords) * 0.5)
    }

    /// The box extents (max - min).
    #[inline]
    #[must_use]
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// The smallest of the three extents.
    #[inline]
    #[must_use]
    pub fn min_extent(&self) -> f64 {
        let s = self.size();
        s.x.min(s.y).min(s.z)
    }

    /// Index of the axis with the largest extent (0 = X, 1 = Y, 2 = Z).
    ///
    /// Ties prefer the later axis, so a cube reports Z.
    #[must_use]
    pub fn longest_axis(&self) -> usize {
        let s = self.size();
        let mut axis = 0;
        let mut best = s.x;
        if s.y >= best {
            axis = 1;
            best = s.y;
        }
        if s.z >= best {
            axis = 2;
        }
        axis
    }

    /// A copy grown by `margin` on every side.
    #[must_use]
    pub fn inflated(&self, margin: f64) -> Self {
        let m = Vector3::new(margin, margin, margin);
        Self {
            min: self.min - m,
            max: self.max + m,
        }
    }

    /// Whether a point lies inside or on the boundary.
    #[inline]
    #[must_use]
    pub fn contains_point(&self, p: Point3<f64>) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Whether two boxes overlap (touching counts).
    #[inline]
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}
