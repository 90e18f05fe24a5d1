//! Re-triangulation along intersection curves.
//!
//! Before classification, every face that crosses the other operand is
//! re-triangulated so the intersection polyline runs along triangle
//! edges. Each crossing face pair is evaluated once and its segment
//! recorded on both operands, so the two refined meshes carry
//! bit-identical seam vertices and the kept shells terminate on the
//! same edge loop; welding then closes the seam exactly.
//!
//! The per-face re-triangulation is a constrained Delaunay
//! triangulation in the face plane with the intersection segments as
//! constraints, the same machinery the parting-plane caps use.

use crate::bvh::Bvh;
use crate::intersect::intersection_segment;
use hashbrown::HashMap;
use mold_types::{Aabb, IndexedMesh, MeshTopology, Point3, Vertex};
use smallvec::SmallVec;
use spade::handles::FixedVertexHandle;
use spade::{ConstrainedDelaunayTriangulation, Point2 as SpadePoint2, Triangulation};

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// A 3D segment to embed into a face's triangulation.
type Segment = (Point3<f64>, Point3<f64>);

/// A mesh refined along its intersections with the other operand.
#[derive(Debug)]
pub struct RefinedMesh {
    /// The refined mesh; uncrossed faces carry over unchanged.
    pub mesh: IndexedMesh,
    /// Number of faces that were split.
    pub split_faces: usize,
    /// Number of vertices added on intersection curves.
    pub new_vertices: usize,
}

/// Refine both operands along their shared intersection curve.
#[must_use]
pub fn refine_pair(
    mesh_a: &IndexedMesh,
    mesh_b: &IndexedMesh,
    bvh_b: &Bvh,
    epsilon: f64,
) -> (RefinedMesh, RefinedMesh) {
    let (segments_a, segments_b) = collect_segments(mesh_a, mesh_b, bvh_b, epsilon);
    (
        refine(mesh_a, &segments_a, epsilon),
        refine(mesh_b, &segments_b, epsilon),
    )
}

/// Intersection segments per face index, for both operands at once.
///
/// Coplanar pairs produce no segment here; they are handled by the
/// classification stage instead.
#[allow(clippy::cast_possible_truncation)]
fn collect_segments(
    mesh_a: &IndexedMesh,
    mesh_b: &IndexedMesh,
    bvh_b: &Bvh,
    epsilon: f64,
) -> (HashMap<u32, Vec<Segment>>, HashMap<u32, Vec<Segment>>) {
    let mut segments_a: HashMap<u32, Vec<Segment>> = HashMap::new();
    let mut segments_b: HashMap<u32, Vec<Segment>> = HashMap::new();
    let eps_sq = epsilon * epsilon;

    for (fi, tri) in mesh_a.triangles().enumerate() {
        let bounds = Aabb::from_points([&tri.v0, &tri.v1, &tri.v2]);
        for ci in bvh_b.query(&bounds, epsilon) {
            let Some(other) = mesh_b.triangle(ci as usize) else {
                continue;
            };
            if let Some((start, end)) = intersection_segment(&tri, &other, epsilon) {
                if (end - start).norm_squared() > eps_sq {
                    segments_a.entry(fi as u32).or_default().push((start, end));
                    segments_b.entry(ci).or_default().push((start, end));
                }
            }
        }
    }

    (segments_a, segments_b)
}

fn refine(mesh: &IndexedMesh, segments: &HashMap<u32, Vec<Segment>>, epsilon: f64) -> RefinedMesh {
    if segments.is_empty() {
        return RefinedMesh {
            mesh: mesh.clone(),
            split_faces: 0,
            new_vertices: 0,
        };
    }

    let mut refined = IndexedMesh::new();
    refined.vertices.clone_from(&mesh.vertices);
    let original_vertex_count = refined.vertices.len();
    let mut split_faces = 0;

    for (fi, face) in mesh.faces.iter().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        let key = fi as u32;
        if let Some(segs) = segments.get(&key) {
            let pieces = retriangulate(*face, &mut refined.vertices, segs, epsilon);
            if pieces.len() > 1 {
                split_faces += 1;
            }
            refined.faces.extend(pieces);
        } else {
            refined.faces.push(*face);
        }
    }

    let new_vertices = refined.vertices.len() - original_vertex_count;
    RefinedMesh {
        mesh: refined,
        split_faces,
        new_vertices,
    }
}

/// Re-triangulate one face with the given segments as constraints.
///
/// Segment endpoints are snapped to the face corners and to each other
/// within `epsilon` before insertion; endpoints that coincide across
/// segments (a polyline vertex) therefore become a single vertex. Any
/// insertion failure falls back to the unsplit face, which the later
/// cleanup pass then has to absorb.
#[allow(clippy::cast_possible_truncation)]
fn retriangulate(
    face: [u32; 3],
    vertices: &mut Vec<Vertex>,
    segments: &[Segment],
    epsilon: f64,
) -> SmallVec<[[u32; 3]; 8]> {
    let unsplit: SmallVec<[[u32; 3]; 8]> = smallvec::smallvec![face];

    let p0 = vertices[face[0] as usize].position;
    let p1 = vertices[face[1] as usize].position;
    let p2 = vertices[face[2] as usize].position;

    let normal = (p1 - p0).cross(&(p2 - p0));
    if normal.norm_squared() < epsilon * epsilon {
        return unsplit;
    }
    let u = (p1 - p0).normalize();
    let w = normal.normalize().cross(&u);
    let project = |q: &Point3<f64>| SpadePoint2::new((q - p0).dot(&u), (q - p0).dot(&w));

    // Distinct points of the triangulation: corners first, then the
    // snapped segment endpoints, each paired with its mesh index.
    let mut pool: Vec<(Point3<f64>, u32)> =
        vec![(p0, face[0]), (p1, face[1]), (p2, face[2])];
    let eps_sq = epsilon * epsilon;

    let mut constraints: Vec<(u32, u32)> = Vec::with_capacity(segments.len());
    for (start, end) in segments {
        let mut resolve = |q: &Point3<f64>, pool: &mut Vec<(Point3<f64>, u32)>| -> u32 {
            if let Some(&(_, idx)) = pool
                .iter()
                .find(|(p, _)| (q - p).norm_squared() < eps_sq)
            {
                return idx;
            }
            let idx = vertices.len() as u32;
            vertices.push(Vertex::new(*q));
            pool.push((*q, idx));
            idx
        };
        let a = resolve(start, &mut pool);
        let b = resolve(end, &mut pool);
        if a != b {
            constraints.push((a, b));
        }
    }
    if constraints.is_empty() {
        return unsplit;
    }

    let mut cdt = Cdt::new();
    let mut handle_of: HashMap<u32, FixedVertexHandle> = HashMap::new();
    let mut index_of: HashMap<usize, u32> = HashMap::new();
    for &(position, idx) in &pool {
        let Ok(handle) = cdt.insert(project(&position)) else {
            return unsplit;
        };
        handle_of.insert(idx, handle);
        index_of.insert(handle.index(), idx);
    }

    for (a, b) in constraints {
        let (Some(&ha), Some(&hb)) = (handle_of.get(&a), handle_of.get(&b)) else {
            continue;
        };
        // Valid solids never produce crossing constraints, but nearly
        // collinear segments can; skip rather than panic inside spade.
        if ha != hb && cdt.can_add_constraint(ha, hb) {
            cdt.add_constraint(ha, hb);
        }
    }

    let mut pieces: SmallVec<[[u32; 3]; 8]> = SmallVec::new();
    for face_handle in cdt.inner_faces() {
        let mut tri = [0u32; 3];
        for (slot, vh) in tri.iter_mut().zip(face_handle.vertices().iter()) {
            let Some(&idx) = index_of.get(&vh.fix().index()) else {
                return unsplit;
            };
            // CCW in the (u, w) basis keeps the face normal
            *slot = idx;
        }
        pieces.push(tri);
    }

    if pieces.is_empty() {
        unsplit
    } else {
        pieces
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mold_types::{unit_cube, Triangle, Vector3};

    fn overlapping_cubes() -> (IndexedMesh, IndexedMesh) {
        let a = unit_cube();
        let mut b = unit_cube();
        b.translate(Vector3::new(0.5, 0.5, 0.5));
        (a, b)
    }

    #[test]
    fn refine_without_intersections_is_identity() {
        let a = unit_cube();
        let mut b = unit_cube();
        b.translate(Vector3::new(5.0, 0.0, 0.0));

        let bvh_b = Bvh::build(&b, 4);
        let (refined_a, refined_b) = refine_pair(&a, &b, &bvh_b, 1e-8);
        assert_eq!(refined_a.split_faces, 0);
        assert_eq!(refined_a.new_vertices, 0);
        assert_eq!(refined_a.mesh.faces.len(), 12);
        assert_eq!(refined_b.mesh.faces.len(), 12);
    }

    #[test]
    fn refine_splits_crossing_faces() {
        let (a, b) = overlapping_cubes();
        let bvh_b = Bvh::build(&b, 4);
        let (refined_a, refined_b) = refine_pair(&a, &b, &bvh_b, 1e-8);

        assert!(refined_a.split_faces > 0);
        assert!(refined_b.split_faces > 0);
        assert!(refined_a.mesh.faces.len() > 12);
        assert!(refined_a.new_vertices > 0);
    }

    #[test]
    fn seam_vertices_agree_between_operands() {
        let (a, b) = overlapping_cubes();
        let bvh_b = Bvh::build(&b, 4);
        let (refined_a, refined_b) = refine_pair(&a, &b, &bvh_b, 1e-8);

        // Every vertex A gained on the seam exists in B's refinement
        for vertex in &refined_a.mesh.vertices[8..] {
            let p = vertex.position;
            assert!(
                refined_b
                    .mesh
                    .vertices
                    .iter()
                    .any(|q| (q.position - p).norm_squared() < 1e-18),
                "seam vertex {p:?} missing from the other operand"
            );
        }
    }

    #[test]
    fn refinement_preserves_surface_area() {
        let (a, b) = overlapping_cubes();
        let bvh_b = Bvh::build(&b, 4);
        let (refined_a, _) = refine_pair(&a, &b, &bvh_b, 1e-8);

        let area_of = |mesh: &IndexedMesh| -> f64 {
            mesh.triangles().map(|t| t.area()).sum()
        };
        assert!((area_of(&a) - area_of(&refined_a.mesh)).abs() < 1e-9);
    }

    #[test]
    fn retriangulate_embeds_the_segment() {
        let mut vertices = vec![
            Vertex::from_coords(0.0, 0.0, 0.0),
            Vertex::from_coords(2.0, 0.0, 0.0),
            Vertex::from_coords(1.0, 2.0, 0.0),
        ];
        let segment = (Point3::new(1.0, 0.0, 0.0), Point3::new(1.5, 1.0, 0.0));

        let pieces = retriangulate([0, 1, 2], &mut vertices, &[segment], 1e-10);
        assert_eq!(vertices.len(), 5);
        assert!(pieces.len() >= 3);

        // Pieces cover the face and all wind with the original normal
        let mut area = 0.0;
        for piece in &pieces {
            let tri = Triangle::new(
                vertices[piece[0] as usize].position,
                vertices[piece[1] as usize].position,
                vertices[piece[2] as usize].position,
            );
            assert!(tri.normal_raw().z > 0.0);
            area += tri.area();
        }
        assert!((area - 2.0).abs() < 1e-9);

        // The segment itself appears as a triangle edge
        let on_segment = |v: u32| {
            let p = vertices[v as usize].position;
            (p - segment.0).norm() < 1e-9 || (p - segment.1).norm() < 1e-9
        };
        let has_seam_edge = pieces.iter().any(|f| {
            [(f[0], f[1]), (f[1], f[2]), (f[2], f[0])]
                .iter()
                .any(|&(x, y)| on_segment(x) && on_segment(y) && x != y)
        });
        assert!(has_seam_edge);
    }

    #[test]
    fn endpoints_snap_to_corners() {
        let mut vertices = vec![
            Vertex::from_coords(0.0, 0.0, 0.0),
            Vertex::from_coords(2.0, 0.0, 0.0),
            Vertex::from_coords(1.0, 2.0, 0.0),
        ];
        // One endpoint is (within epsilon) the first corner
        let segment = (Point3::new(1e-12, 0.0, 0.0), Point3::new(1.5, 1.0, 0.0));

        let pieces = retriangulate([0, 1, 2], &mut vertices, &[segment], 1e-8);
        assert_eq!(vertices.len(), 4);
        assert_eq!(pieces.len(), 2);
    }
}
