//! Coplanar face handling.
//!
//! Triangles of the two operands that lie in the same plane never
//! produce a transversal intersection segment, so the refinement and
//! parity stages cannot see them. They are detected here and tagged by
//! relative orientation; the assembly stage applies per-operation keep
//! rules to the tagged faces.

use mold_types::{Point3, Triangle};

/// Relative orientation of two overlapping coplanar triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoplanarOrientation {
    /// Normals agree; both solids lie on the same side of the plane.
    Same,
    /// Normals oppose; the solids meet face to face.
    Opposite,
}

/// Test whether two triangles are coplanar and overlap in their plane.
///
/// `tolerance` bounds both the out-of-plane distance and the overlap
/// margin: pairs that merely touch along an edge or corner do not
/// count as overlapping.
#[must_use]
pub fn coplanar_overlap(
    a: &Triangle,
    b: &Triangle,
    tolerance: f64,
) -> Option<CoplanarOrientation> {
    let normal_a = a.normal()?;
    let normal_b = b.normal()?;

    let d = normal_a.dot(&a.v0.coords);
    for p in [&b.v0, &b.v1, &b.v2] {
        if (normal_a.dot(&p.coords) - d).abs() > tolerance {
            return None;
        }
    }

    if !triangles_overlap_in_plane(a, b, tolerance) {
        return None;
    }

    if normal_a.dot(&normal_b) > 0.0 {
        Some(CoplanarOrientation::Same)
    } else {
        Some(CoplanarOrientation::Opposite)
    }
}

/// Project a point to 2D by dropping the dominant axis of `normal`.
fn drop_dominant_axis(p: &Point3<f64>, normal: &[f64; 3]) -> [f64; 2] {
    let [nx, ny, nz] = [normal[0].abs(), normal[1].abs(), normal[2].abs()];
    if nx >= ny && nx >= nz {
        [p.y, p.z]
    } else if ny >= nz {
        [p.x, p.z]
    } else {
        [p.x, p.y]
    }
}

/// Separating-axis overlap test for two coplanar triangles.
///
/// Both triangles are projected to 2D along the dominant normal axis;
/// the six edge normals are the candidate separating axes. Intervals
/// must interpenetrate by more than `margin` to count as overlapping.
fn triangles_overlap_in_plane(a: &Triangle, b: &Triangle, margin: f64) -> bool {
    let n = a.normal_raw();
    let n = [n.x, n.y, n.z];

    let a2 = [
        drop_dominant_axis(&a.v0, &n),
        drop_dominant_axis(&a.v1, &n),
        drop_dominant_axis(&a.v2, &n),
    ];
    let b2 = [
        drop_dominant_axis(&b.v0, &n),
        drop_dominant_axis(&b.v1, &n),
        drop_dominant_axis(&b.v2, &n),
    ];

    for tri in [&a2, &b2] {
        for i in 0..3 {
            let p = tri[i];
            let q = tri[(i + 1) % 3];
            let edge = [q[0] - p[0], q[1] - p[1]];
            let len = edge[0].hypot(edge[1]);
            if len < f64::EPSILON {
                continue;
            }
            let axis = [-edge[1] / len, edge[0] / len];

            let project = |v: &[f64; 2]| axis[0] * v[0] + axis[1] * v[1];
            let (mut a_min, mut a_max) = (f64::INFINITY, f64::NEG_INFINITY);
            for v in &a2 {
                let s = project(v);
                a_min = a_min.min(s);
                a_max = a_max.max(s);
            }
            let (mut b_min, mut b_max) = (f64::INFINITY, f64::NEG_INFINITY);
            for v in &b2 {
                let s = project(v);
                b_min = b_min.min(s);
                b_max = b_max.max(s);
            }

            if a_max < b_min + margin || b_max < a_min + margin {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri(points: [[f64; 3]; 3]) -> Triangle {
        Triangle::new(
            Point3::new(points[0][0], points[0][1], points[0][2]),
            Point3::new(points[1][0], points[1][1], points[1][2]),
            Point3::new(points[2][0], points[2][1], points[2][2]),
        )
    }

    #[test]
    fn same_plane_same_winding() {
        let a = tri([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 1.0, 0.0]]);
        let b = tri([[0.25, 0.1, 0.0], [1.25, 0.1, 0.0], [0.75, 1.1, 0.0]]);
        assert_eq!(
            coplanar_overlap(&a, &b, 1e-9),
            Some(CoplanarOrientation::Same)
        );
    }

    #[test]
    fn same_plane_opposite_winding() {
        let a = tri([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 1.0, 0.0]]);
        let b = tri([[0.25, 0.1, 0.0], [0.75, 1.1, 0.0], [1.25, 0.1, 0.0]]);
        assert_eq!(
            coplanar_overlap(&a, &b, 1e-9),
            Some(CoplanarOrientation::Opposite)
        );
    }

    #[test]
    fn offset_plane_is_not_coplanar() {
        let a = tri([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 1.0, 0.0]]);
        let b = tri([[0.0, 0.0, 0.5], [1.0, 0.0, 0.5], [0.5, 1.0, 0.5]]);
        assert_eq!(coplanar_overlap(&a, &b, 1e-9), None);
    }

    #[test]
    fn disjoint_in_plane_is_not_overlapping() {
        let a = tri([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 1.0, 0.0]]);
        let b = tri([[3.0, 0.0, 0.0], [4.0, 0.0, 0.0], [3.5, 1.0, 0.0]]);
        assert_eq!(coplanar_overlap(&a, &b, 1e-9), None);
    }

    #[test]
    fn edge_touch_does_not_count() {
        // Shared edge x = 1, interiors on opposite sides
        let a = tri([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]]);
        let b = tri([[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [1.0, 1.0, 0.0]]);
        assert_eq!(coplanar_overlap(&a, &b, 1e-9), None);
    }

    #[test]
    fn identical_triangles_reversed_are_opposite() {
        let a = tri([[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [1.0, 2.0, 0.0]]);
        let b = tri([[0.0, 0.0, 0.0], [1.0, 2.0, 0.0], [2.0, 0.0, 0.0]]);
        assert_eq!(
            coplanar_overlap(&a, &b, 1e-9),
            Some(CoplanarOrientation::Opposite)
        );
    }
}
