//! Procedural solid primitives.
//!
//! All primitives are closed manifolds with outward-facing CCW winding,
//! so they can feed the boolean engine directly.

use crate::{IndexedMesh, Plane, Vertex};
use nalgebra::{Point3, Vector3};

/// Create an axis-aligned box from its minimum corner and size.
///
/// # Example
///
/// ```
/// use mold_types::{cuboid, Point3, Vector3, MeshTopology};
///
/// let block = cuboid(Point3::new(-1.0, -1.0, -1.0), Vector3::new(2.0, 2.0, 2.0));
/// assert_eq!(block.vertex_count(), 8);
/// assert_eq!(block.face_count(), 12);
/// assert!((block.volume() - 8.0).abs() < 1e-10);
/// ```
#[must_use]
pub fn cuboid(min: Point3<f64>, size: Vector3<f64>) -> IndexedMesh {
    let mut mesh = IndexedMesh::with_capacity(8, 12);

    let (x0, y0, z0) = (min.x, min.y, min.z);
    let (x1, y1, z1) = (min.x + size.x, min.y + size.y, min.z + size.z);

    mesh.vertices.push(Vertex::from_coords(x0, y0, z0)); // 0
    mesh.vertices.push(Vertex::from_coords(x1, y0, z0)); // 1
    mesh.vertices.push(Vertex::from_coords(x1, y1, z0)); // 2
    mesh.vertices.push(Vertex::from_coords(x0, y1, z0)); // 3
    mesh.vertices.push(Vertex::from_coords(x0, y0, z1)); // 4
    mesh.vertices.push(Vertex::from_coords(x1, y0, z1)); // 5
    mesh.vertices.push(Vertex::from_coords(x1, y1, z1)); // 6
    mesh.vertices.push(Vertex::from_coords(x0, y1, z1)); // 7

    // Bottom (-Z)
    mesh.faces.push([0, 2, 1]);
    mesh.faces.push([0, 3, 2]);
    // Top (+Z)
    mesh.faces.push([4, 5, 6]);
    mesh.faces.push([4, 6, 7]);
    // Front (-Y)
    mesh.faces.push([0, 1, 5]);
    mesh.faces.push([0, 5, 4]);
    // Back (+Y)
    mesh.faces.push([3, 7, 6]);
    mesh.faces.push([3, 6, 2]);
    // Left (-X)
    mesh.faces.push([0, 4, 7]);
    mesh.faces.push([0, 7, 3]);
    // Right (+X)
    mesh.faces.push([1, 2, 6]);
    mesh.faces.push([1, 6, 5]);

    mesh
}

/// Create a unit cube from (0,0,0) to (1,1,1).
///
/// # Example
///
/// ```
/// use mold_types::{unit_cube, MeshTopology};
///
/// let cube = unit_cube();
/// assert_eq!(cube.face_count(), 12);
/// ```
#[must_use]
pub fn unit_cube() -> IndexedMesh {
    cuboid(Point3::origin(), Vector3::new(1.0, 1.0, 1.0))
}

/// Create a capped frustum (truncated cone).
///
/// The base circle of radius `base_radius` is centered at `base_center`
/// and perpendicular to `axis`; the top circle of radius `top_radius`
/// lies `height` along the axis. Equal radii give a cylinder.
///
/// `segments` is clamped to at least 3.
///
/// # Example
///
/// ```
/// use mold_types::{frustum, Point3, Vector3};
/// use std::f64::consts::PI;
///
/// let cyl = frustum(Point3::origin(), Vector3::z(), 1.0, 1.0, 2.0, 64);
/// let expected = PI * 2.0; // r^2 * pi * h
/// assert!((cyl.volume() - expected).abs() / expected < 0.01);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation)]
// Truncation: segment counts are small, far below u32::MAX
pub fn frustum(
    base_center: Point3<f64>,
    axis: Vector3<f64>,
    base_radius: f64,
    top_radius: f64,
    height: f64,
    segments: usize,
) -> IndexedMesh {
    let segments = segments.max(3);
    let plane = Plane::new(base_center, axis);
    let (u, v) = plane.basis();
    let top_center = base_center + plane.normal * height;

    let mut mesh = IndexedMesh::with_capacity(2 * segments + 2, 4 * segments);

    for i in 0..segments {
        #[allow(clippy::cast_precision_loss)]
        let theta = std::f64::consts::TAU * (i as f64) / (segments as f64);
        let dir = u * theta.cos() + v * theta.sin();
        mesh.vertices
            .push(Vertex::new(base_center + dir * base_radius));
    }
    for i in 0..segments {
        #[allow(clippy::cast_precision_loss)]
        let theta = std::f64::consts::TAU * (i as f64) / (segments as f64);
        let dir = u * theta.cos() + v * theta.sin();
        mesh.vertices.push(Vertex::new(top_center + dir * top_radius));
    }
    let bottom_center_index = (2 * segments) as u32;
    let top_center_index = bottom_center_index + 1;
    mesh.vertices.push(Vertex::new(base_center));
    mesh.vertices.push(Vertex::new(top_center));

    let s = segments as u32;
    for i in 0..s {
        let next = (i + 1) % s;
        let (b0, b1) = (i, next);
        let (t0, t1) = (s + i, s + next);

        // Side wall, outward-facing
        mesh.faces.push([b0, b1, t1]);
        mesh.faces.push([b0, t1, t0]);

        // Caps: bottom faces along -axis, top along +axis
        mesh.faces.push([bottom_center_index, b1, b0]);
        mesh.faces.push([top_center_index, t0, t1]);
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MeshAdjacency, MeshTopology};
    use approx::assert_relative_eq;

    #[test]
    fn cuboid_volume_and_topology() {
        let block = cuboid(Point3::new(-1.0, 0.0, 2.0), Vector3::new(2.0, 3.0, 4.0));
        assert_relative_eq!(block.signed_volume(), 24.0, epsilon = 1e-10);
        assert!(MeshAdjacency::build(&block).is_closed_manifold());
    }

    #[test]
    fn frustum_is_closed() {
        let f = frustum(Point3::origin(), Vector3::z(), 2.0, 1.0, 3.0, 32);
        assert_eq!(f.vertex_count(), 66);
        assert_eq!(f.face_count(), 128);
        assert!(MeshAdjacency::build(&f).is_closed_manifold());
        assert!(f.signed_volume() > 0.0);
    }

    #[test]
    fn cone_frustum_volume() {
        // V = pi * h / 3 * (R^2 + R*r + r^2), with polygonal underestimate
        let f = frustum(Point3::origin(), Vector3::z(), 2.0, 1.0, 3.0, 256);
        let expected = std::f64::consts::PI * 3.0 / 3.0 * (4.0 + 2.0 + 1.0);
        let vol = f.signed_volume();
        assert!((vol - expected).abs() / expected < 0.001, "got {vol}");
    }

    #[test]
    fn tilted_frustum_is_closed() {
        let f = frustum(
            Point3::new(1.0, 2.0, 3.0),
            Vector3::new(1.0, 1.0, 1.0),
            1.0,
            0.5,
            2.0,
            16,
        );
        assert!(MeshAdjacency::build(&f).is_closed_manifold());
        assert!(f.signed_volume() > 0.0);
    }
}
