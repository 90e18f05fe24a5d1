//! Inside/outside face classification by parity ray casting.

use crate::bvh::Bvh;
use crate::coplanar::{coplanar_overlap, CoplanarOrientation};
use crate::intersect::ray_hits_triangle;
use mold_types::{Aabb, IndexedMesh, MeshTopology, Point3, Vector3};
use rayon::prelude::*;

/// Where a face of one operand lies relative to the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceSide {
    /// Centroid is inside the other mesh.
    Inside,
    /// Centroid is outside the other mesh.
    Outside,
    /// Coplanar with an overlapping face of the other mesh, normals
    /// agreeing.
    CoplanarSame,
    /// Coplanar with an overlapping face of the other mesh, normals
    /// opposing.
    CoplanarOpposite,
}

/// Extent used to turn a ray into a finite query box for the BVH.
const RAY_EXTENT: f64 = 1e10;

/// Classification ray directions.
///
/// Axis-aligned rays graze the shared edges and quad diagonals that
/// boxy geometry is full of, and a grazed edge counts its crossing
/// twice. These directions have pairwise irrational slope ratios
/// (1/√6, 1/√3, 1/√2 permuted), so they never line up with such
/// features on axis-aligned input; the majority vote absorbs whatever
/// grazes remain on oblique geometry.
const RAY_DIRECTIONS: [[f64; 3]; 3] = [
    [
        0.408_248_290_463_863_05,
        0.577_350_269_189_625_8,
        0.707_106_781_186_547_6,
    ],
    [
        0.707_106_781_186_547_6,
        0.408_248_290_463_863_05,
        0.577_350_269_189_625_8,
    ],
    [
        0.577_350_269_189_625_8,
        0.707_106_781_186_547_6,
        0.408_248_290_463_863_05,
    ],
];

fn count_ray_crossings(
    origin: &Point3<f64>,
    direction: &Vector3<f64>,
    mesh: &IndexedMesh,
    bvh: &Bvh,
    epsilon: f64,
) -> usize {
    let far = Point3::from(origin.coords + direction * RAY_EXTENT);
    let ray_box = Aabb::from_points([origin, &far]);

    let mut count = 0;
    for face_index in bvh.query(&ray_box, epsilon) {
        if let Some(tri) = mesh.triangle(face_index as usize) {
            if ray_hits_triangle(origin, direction, &tri, epsilon).is_some() {
                count += 1;
            }
        }
    }
    count
}

/// Parity test with a 3-ray majority vote.
#[must_use]
pub fn point_in_mesh(point: &Point3<f64>, mesh: &IndexedMesh, bvh: &Bvh, epsilon: f64) -> bool {
    let inside_votes = RAY_DIRECTIONS
        .iter()
        .filter(|[x, y, z]| {
            let dir = Vector3::new(*x, *y, *z);
            count_ray_crossings(point, &dir, mesh, bvh, epsilon) % 2 == 1
        })
        .count();

    inside_votes >= 2
}

/// Classify every face of `mesh` against `other`.
///
/// Faces coplanar with an overlapping face of `other` are tagged
/// [`FaceSide::CoplanarSame`] or [`FaceSide::CoplanarOpposite`]; all
/// others are classified by their centroid's ray parity. Runs on rayon
/// when `parallel` is set and the mesh is big enough to amortize the
/// fork; results are identical either way.
#[must_use]
pub fn classify_faces(
    mesh: &IndexedMesh,
    other: &IndexedMesh,
    other_bvh: &Bvh,
    epsilon: f64,
    parallel: bool,
) -> Vec<FaceSide> {
    let classify_one = |fi: usize| {
        let Some(tri) = mesh.triangle(fi) else {
            return FaceSide::Outside;
        };

        let bounds = Aabb::from_points([&tri.v0, &tri.v1, &tri.v2]);
        for ci in other_bvh.query(&bounds, epsilon) {
            if let Some(other_tri) = other.triangle(ci as usize) {
                match coplanar_overlap(&tri, &other_tri, epsilon) {
                    Some(CoplanarOrientation::Same) => return FaceSide::CoplanarSame,
                    Some(CoplanarOrientation::Opposite) => return FaceSide::CoplanarOpposite,
                    None => {}
                }
            }
        }

        if point_in_mesh(&tri.centroid(), other, other_bvh, epsilon) {
            FaceSide::Inside
        } else {
            FaceSide::Outside
        }
    };

    if parallel && mesh.faces.len() > 100 {
        (0..mesh.faces.len())
            .into_par_iter()
            .map(classify_one)
            .collect()
    } else {
        (0..mesh.faces.len()).map(classify_one).collect()
    }
}
