//! Ray, edge and triangle intersection tests.
//!
//! The geometric kernel under the boolean engine: Möller-Trumbore
//! ray/triangle tests, edge clipping against triangles, and the
//! segment where two triangles cross.

use mold_types::{Point3, Triangle, Vector3};

/// Where an edge pierces a triangle.
#[derive(Debug, Clone, Copy)]
pub struct EdgeHit {
    /// Parameter along the edge (0 = start, 1 = end).
    pub t: f64,
    /// The intersection point.
    pub point: Point3<f64>,
}

/// Möller-Trumbore ray/triangle intersection.
///
/// Returns the ray parameter `t` at the hit (`origin + t * direction`),
/// or `None` when the ray misses, is parallel within `epsilon`, or the
/// hit lies behind the origin.
#[must_use]
pub fn ray_hits_triangle(
    origin: &Point3<f64>,
    direction: &Vector3<f64>,
    tri: &Triangle,
    epsilon: f64,
) -> Option<f64> {
    let edge1 = tri.v1 - tri.v0;
    let edge2 = tri.v2 - tri.v0;
    let h = direction.cross(&edge2);
    let det = edge1.dot(&h);

    if det.abs() < epsilon {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = origin - tri.v0;
    let u = inv_det * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = inv_det * direction.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = inv_det * edge2.dot(&q);
    (t > epsilon).then_some(t)
}

/// Clip an edge segment against a triangle.
///
/// Same kernel as [`ray_hits_triangle`] but the parameter is bounded
/// to the segment, with `epsilon` slack at both ends.
#[must_use]
pub fn edge_crosses_triangle(
    e0: &Point3<f64>,
    e1: &Point3<f64>,
    tri: &Triangle,
    epsilon: f64,
) -> Option<EdgeHit> {
    let direction = e1 - e0;
    if direction.norm_squared() < epsilon * epsilon {
        return None;
    }

    let edge1 = tri.v1 - tri.v0;
    let edge2 = tri.v2 - tri.v0;
    let h = direction.cross(&edge2);
    let det = edge1.dot(&h);

    if det.abs() < epsilon {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = e0 - tri.v0;
    let u = inv_det * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = inv_det * direction.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = inv_det * edge2.dot(&q);
    if t < -epsilon || t > 1.0 + epsilon {
        return None;
    }

    let t = t.clamp(0.0, 1.0);
    Some(EdgeHit {
        t,
        point: Point3::from(e0.coords + direction * t),
    })
}

/// Whether two triangles cross (any edge of one pierces the other).
#[must_use]
pub fn triangles_cross(a: &Triangle, b: &Triangle, epsilon: f64) -> bool {
    for (e0, e1) in [(&a.v0, &a.v1), (&a.v1, &a.v2), (&a.v2, &a.v0)] {
        if edge_crosses_triangle(e0, e1, b, epsilon).is_some() {
            return true;
        }
    }
    for (e0, e1) in [(&b.v0, &b.v1), (&b.v1, &b.v2), (&b.v2, &b.v0)] {
        if edge_crosses_triangle(e0, e1, a, epsilon).is_some() {
            return true;
        }
    }
    false
}

/// The segment along which two triangles intersect.
///
/// Collects edge-piercing points from both triangles, drops duplicates,
/// and returns the two furthest apart. `None` when the triangles touch
/// at fewer than two distinct points.
#[must_use]
pub fn intersection_segment(
    a: &Triangle,
    b: &Triangle,
    epsilon: f64,
) -> Option<(Point3<f64>, Point3<f64>)> {
    let mut points: Vec<Point3<f64>> = Vec::with_capacity(6);
    let eps_sq = epsilon * epsilon;

    let mut push_unique = |p: Point3<f64>, points: &mut Vec<Point3<f64>>| {
        if !points.iter().any(|q| (p - q).norm_squared() < eps_sq) {
            points.push(p);
        }
    };

    for (e0, e1) in [(&a.v0, &a.v1), (&a.v1, &a.v2), (&a.v2, &a.v0)] {
        if let Some(hit) = edge_crosses_triangle(e0, e1, b, epsilon) {
            push_unique(hit.point, &mut points);
        }
    }
    for (e0, e1) in [(&b.v0, &b.v1), (&b.v1, &b.v2), (&b.v2, &b.v0)] {
        if let Some(hit) = edge_crosses_triangle(e0, e1, a, epsilon) {
            push_unique(hit.point, &mut points);
        }
    }

    if points.len() < 2 {
        return None;
    }

    let mut best = (0, 1);
    let mut best_dist = 0.0;
    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            let d = (points[j] - points[i]).norm_squared();
            if d > best_dist {
                best_dist = d;
                best = (i, j);
            }
        }
    }

    Some((points[best.0], points[best.1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-10;

    fn floor_triangle() -> Triangle {
        Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
        )
    }

    #[test]
    fn ray_hit_and_miss() {
        let tri = floor_triangle();
        let up = Vector3::z();

        let hit = ray_hits_triangle(&Point3::new(1.0, 0.5, -1.0), &up, &tri, EPS);
        assert!(hit.is_some());
        assert!((hit.unwrap() - 1.0).abs() < 1e-9);

        let miss = ray_hits_triangle(&Point3::new(5.0, 5.0, -1.0), &up, &tri, EPS);
        assert!(miss.is_none());

        // Behind the origin
        let behind = ray_hits_triangle(&Point3::new(1.0, 0.5, 1.0), &up, &tri, EPS);
        assert!(behind.is_none());
    }

    #[test]
    fn ray_parallel_is_none() {
        let tri = floor_triangle();
        let along = Vector3::x();
        assert!(ray_hits_triangle(&Point3::new(0.0, 0.5, 0.0), &along, &tri, EPS).is_none());
    }

    #[test]
    fn edge_through_triangle() {
        let tri = floor_triangle();
        let hit = edge_crosses_triangle(
            &Point3::new(1.0, 0.5, -1.0),
            &Point3::new(1.0, 0.5, 1.0),
            &tri,
            EPS,
        )
        .unwrap();
        assert!((hit.t - 0.5).abs() < 1e-9);
        assert!(hit.point.z.abs() < 1e-9);
    }

    #[test]
    fn edge_too_short_of_triangle() {
        let tri = floor_triangle();
        let result = edge_crosses_triangle(
            &Point3::new(1.0, 0.5, -2.0),
            &Point3::new(1.0, 0.5, -1.0),
            &tri,
            EPS,
        );
        assert!(result.is_none());
    }

    #[test]
    fn crossing_triangles() {
        let a = floor_triangle();
        let b = Triangle::new(
            Point3::new(1.0, 0.5, -1.0),
            Point3::new(1.0, 0.5, 1.0),
            Point3::new(1.0, 1.5, 0.0),
        );
        assert!(triangles_cross(&a, &b, EPS));

        let far = Triangle::new(
            Point3::new(0.0, 0.0, 5.0),
            Point3::new(1.0, 0.0, 5.0),
            Point3::new(0.5, 1.0, 5.0),
        );
        assert!(!triangles_cross(&a, &far, EPS));
    }

    #[test]
    fn segment_of_crossing_triangles() {
        let a = floor_triangle();
        let b = Triangle::new(
            Point3::new(1.0, 0.5, -1.0),
            Point3::new(1.0, 0.5, 1.0),
            Point3::new(1.0, 1.5, 0.0),
        );
        let (s, e) = intersection_segment(&a, &b, 1e-8).unwrap();
        // Both endpoints lie in the z = 0 plane of triangle A
        assert!(s.z.abs() < 1e-6);
        assert!(e.z.abs() < 1e-6);
        assert!((s - e).norm() > 1e-6);
    }
}
