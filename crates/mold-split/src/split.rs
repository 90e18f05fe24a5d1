//! Plane clipping of a closed mesh into two watertight halves.

use crate::cap::build_caps;
use crate::error::{SplitError, SplitResult};
use hashbrown::{HashMap, HashSet};
use mold_types::{IndexedMesh, MeshTopology, Plane, Point3, Vertex};
use smallvec::SmallVec;
use tracing::debug;

/// Configuration for plane splits.
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// Vertices within this distance of the plane count as lying on it.
    pub tolerance: f64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self { tolerance: 1e-7 }
    }
}

impl SplitConfig {
    /// Set the on-plane tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance.abs();
        self
    }
}

/// A point where the cut crosses the surface, identified exactly so
/// the two halves and the caps share vertices without welding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum CutNode {
    /// An original vertex lying on the plane.
    Vertex(u32),
    /// The crossing point of an original edge, keyed by sorted indices.
    Edge(u32, u32),
}

fn edge_key(a: u32, b: u32) -> (u32, u32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Accumulates one half while clipping, sharing original and cut
/// vertices across faces.
#[derive(Default)]
pub(crate) struct HalfBuilder {
    pub(crate) mesh: IndexedMesh,
    from_original: HashMap<u32, u32>,
    from_cut: HashMap<(u32, u32), u32>,
}

impl HalfBuilder {
    #[allow(clippy::cast_possible_truncation)]
    fn original(&mut self, source: &IndexedMesh, v: u32) -> u32 {
        let vertices = &mut self.mesh.vertices;
        *self.from_original.entry(v).or_insert_with(|| {
            let idx = vertices.len() as u32;
            vertices.push(source.vertices[v as usize]);
            idx
        })
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cut(&mut self, key: (u32, u32), point: Point3<f64>) -> u32 {
        let vertices = &mut self.mesh.vertices;
        *self.from_cut.entry(key).or_insert_with(|| {
            let idx = vertices.len() as u32;
            vertices.push(Vertex::new(point));
            idx
        })
    }

    pub(crate) fn node_index(
        &mut self,
        source: &IndexedMesh,
        node: CutNode,
        cut_points: &HashMap<(u32, u32), Point3<f64>>,
    ) -> SplitResult<u32> {
        match node {
            CutNode::Vertex(v) => Ok(self.original(source, v)),
            CutNode::Edge(a, b) => {
                let point = cut_points
                    .get(&(a, b))
                    .copied()
                    .ok_or_else(|| SplitError::unsplittable("cut point lost during capping"))?;
                Ok(self.cut((a, b), point))
            }
        }
    }

    fn push_face(&mut self, source: &IndexedMesh, face: [u32; 3]) {
        let mapped = [
            self.original(source, face[0]),
            self.original(source, face[1]),
            self.original(source, face[2]),
        ];
        self.mesh.faces.push(mapped);
    }

    fn push_fan(&mut self, poly: &[u32]) {
        for i in 1..poly.len() - 1 {
            self.mesh.faces.push([poly[0], poly[i], poly[i + 1]]);
        }
    }
}

/// Split a closed mesh by a plane into `(positive, negative)` halves.
///
/// Triangles straddling the plane are clipped with new vertices at
/// the edge crossings; triangles lying in the plane go to the
/// positive half. Both halves are capped along the cut with
/// constrained-Delaunay triangulations, so annular cross-sections
/// (a block with an interior cavity) close correctly. The halves are
/// watertight and their volumes sum to the input volume.
///
/// # Errors
///
/// - [`SplitError::EmptyMesh`] when the mesh has no faces.
/// - [`SplitError::UnsplittableGeometry`] when the plane does not
///   pass through the interior, or the cut cannot be chained into
///   closed loops.
///
/// # Example
///
/// ```
/// use mold_split::{split_by_plane, SplitConfig};
/// use mold_types::{unit_cube, Plane, Point3, Vector3};
///
/// let plane = Plane::new(Point3::new(0.5, 0.5, 0.5), Vector3::z());
/// let (top, bottom) = split_by_plane(&unit_cube(), &plane, &SplitConfig::default())?;
/// assert!((top.volume() + bottom.volume() - 1.0).abs() < 1e-9);
/// # Ok::<(), mold_split::SplitError>(())
/// ```
#[allow(clippy::too_many_lines)]
pub fn split_by_plane(
    mesh: &IndexedMesh,
    plane: &Plane,
    config: &SplitConfig,
) -> SplitResult<(IndexedMesh, IndexedMesh)> {
    if mesh.is_empty() {
        return Err(SplitError::EmptyMesh);
    }

    let tol = config.tolerance;
    let side: Vec<i8> = mesh
        .vertices
        .iter()
        .map(|v| {
            let d = plane.signed_distance(&v.position);
            if d > tol {
                1
            } else if d < -tol {
                -1
            } else {
                0
            }
        })
        .collect();

    if !side.iter().any(|&s| s > 0) || !side.iter().any(|&s| s < 0) {
        return Err(SplitError::unsplittable(
            "plane does not cross the mesh interior",
        ));
    }

    let mut cut_points: HashMap<(u32, u32), Point3<f64>> = HashMap::new();
    let mut segments: HashSet<(CutNode, CutNode)> = HashSet::new();
    let mut pos = HalfBuilder::default();
    let mut neg = HalfBuilder::default();

    for &face in &mesh.faces {
        let s = [
            side[face[0] as usize],
            side[face[1] as usize],
            side[face[2] as usize],
        ];

        if s.iter().all(|&x| x >= 0) {
            pos.push_face(mesh, face);
            // An on-plane edge under a positive face pairs with the
            // matching negative face's segment below
            continue;
        }
        if s.iter().all(|&x| x <= 0) {
            neg.push_face(mesh, face);
            if s.iter().filter(|&&x| x == 0).count() == 2 {
                let on: SmallVec<[CutNode; 2]> = (0..3)
                    .filter(|&i| s[i] == 0)
                    .map(|i| CutNode::Vertex(face[i]))
                    .collect();
                segments.insert(sorted_pair(on[0], on[1]));
            }
            continue;
        }

        // Straddling triangle: clip into one polygon per side
        let mut pos_poly: SmallVec<[u32; 4]> = SmallVec::new();
        let mut neg_poly: SmallVec<[u32; 4]> = SmallVec::new();
        let mut on_nodes: SmallVec<[CutNode; 2]> = SmallVec::new();

        for i in 0..3 {
            let a = face[i];
            let b = face[(i + 1) % 3];
            let sa = s[i];
            let sb = s[(i + 1) % 3];

            if sa >= 0 {
                pos_poly.push(pos.original(mesh, a));
            }
            if sa <= 0 {
                neg_poly.push(neg.original(mesh, a));
            }
            if sa == 0 {
                on_nodes.push(CutNode::Vertex(a));
            }

            if sa * sb < 0 {
                let key = edge_key(a, b);
                let point = *cut_points.entry(key).or_insert_with(|| {
                    let pa = mesh.vertices[a as usize].position;
                    let pb = mesh.vertices[b as usize].position;
                    let da = plane.signed_distance(&pa);
                    let db = plane.signed_distance(&pb);
                    let t = da / (da - db);
                    Point3::from(pa.coords + (pb - pa) * t)
                });
                pos_poly.push(pos.cut(key, point));
                neg_poly.push(neg.cut(key, point));
                on_nodes.push(CutNode::Edge(key.0, key.1));
            }
        }

        if pos_poly.len() >= 3 {
            pos.push_fan(&pos_poly);
        }
        if neg_poly.len() >= 3 {
            neg.push_fan(&neg_poly);
        }

        if on_nodes.len() != 2 || on_nodes[0] == on_nodes[1] {
            return Err(SplitError::unsplittable(
                "straddling triangle does not cross the plane in a segment",
            ));
        }
        segments.insert(sorted_pair(on_nodes[0], on_nodes[1]));
    }

    let loops = chain_loops(&segments)?;
    debug!(
        loops = loops.len(),
        segments = segments.len(),
        "cut boundary chained"
    );

    build_caps(mesh, plane, &loops, &cut_points, &mut pos, &mut neg)?;

    debug!(
        positive_faces = pos.mesh.face_count(),
        negative_faces = neg.mesh.face_count(),
        "split complete"
    );
    Ok((pos.mesh, neg.mesh))
}

fn sorted_pair(a: CutNode, b: CutNode) -> (CutNode, CutNode) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Chain the cut segments into closed loops. Every node must have
/// exactly two incident segments.
fn chain_loops(segments: &HashSet<(CutNode, CutNode)>) -> SplitResult<Vec<Vec<CutNode>>> {
    let mut adjacency: HashMap<CutNode, SmallVec<[CutNode; 2]>> = HashMap::new();
    for &(a, b) in segments {
        adjacency.entry(a).or_default().push(b);
        adjacency.entry(b).or_default().push(a);
    }

    for (node, neighbors) in &adjacency {
        if neighbors.len() != 2 {
            return Err(SplitError::unsplittable(format!(
                "cut node {node:?} has {} incident segments, expected 2",
                neighbors.len()
            )));
        }
    }

    let mut visited: HashSet<CutNode> = HashSet::new();
    let mut loops = Vec::new();

    for &start in adjacency.keys() {
        if visited.contains(&start) {
            continue;
        }

        let mut ring = vec![start];
        visited.insert(start);
        let mut prev = start;
        let mut current = adjacency[&start][0];

        while current != start {
            if !visited.insert(current) {
                return Err(SplitError::unsplittable("cut loops intersect"));
            }
            ring.push(current);
            let neighbors = &adjacency[&current];
            let next = if neighbors[0] == prev {
                neighbors[1]
            } else {
                neighbors[0]
            };
            prev = current;
            current = next;
        }

        if ring.len() < 3 {
            return Err(SplitError::unsplittable("degenerate cut loop"));
        }
        loops.push(ring);
    }

    Ok(loops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mold_types::{cuboid, unit_cube, MeshAdjacency, MeshBounds, Vector3};

    fn plane_z(z: f64) -> Plane {
        Plane::new(Point3::new(0.0, 0.0, z), Vector3::z())
    }

    #[test]
    fn cube_halves_are_closed_and_conserve_volume() {
        let cube = unit_cube();
        let (top, bottom) = split_by_plane(&cube, &plane_z(0.5), &SplitConfig::default()).unwrap();

        assert_relative_eq!(top.volume(), 0.5, epsilon = 1e-9);
        assert_relative_eq!(bottom.volume(), 0.5, epsilon = 1e-9);
        assert!(MeshAdjacency::build(&top).is_closed_manifold());
        assert!(MeshAdjacency::build(&bottom).is_closed_manifold());
    }

    #[test]
    fn positive_half_is_above_the_plane() {
        let cube = unit_cube();
        let (top, bottom) = split_by_plane(&cube, &plane_z(0.25), &SplitConfig::default()).unwrap();

        assert!(top.bounds().min.z >= 0.25 - 1e-9);
        assert!(bottom.bounds().max.z <= 0.25 + 1e-9);
        assert_relative_eq!(top.volume(), 0.75, epsilon = 1e-9);
    }

    #[test]
    fn off_axis_plane_conserves_volume() {
        let cube = unit_cube();
        let plane = Plane::new(
            Point3::new(0.5, 0.5, 0.5),
            Vector3::new(1.0, 0.4, 0.2),
        );
        let (a, b) = split_by_plane(&cube, &plane, &SplitConfig::default()).unwrap();

        assert_relative_eq!(a.volume() + b.volume(), 1.0, epsilon = 1e-9);
        assert!(MeshAdjacency::build(&a).is_closed_manifold());
        assert!(MeshAdjacency::build(&b).is_closed_manifold());
    }

    #[test]
    fn annular_cross_section_caps_with_a_hole() {
        // Block with an interior cavity: the cut section is an annulus
        let mut block = cuboid(Point3::origin(), Vector3::new(4.0, 4.0, 4.0));
        let mut cavity = cuboid(Point3::new(1.0, 1.0, 1.0), Vector3::new(2.0, 2.0, 2.0));
        cavity.flip_orientation();
        block.merge(&cavity);

        let (top, bottom) = split_by_plane(&block, &plane_z(2.0), &SplitConfig::default()).unwrap();

        // 32 of block minus 4 of cavity per half
        assert_relative_eq!(top.volume(), 28.0, epsilon = 1e-9);
        assert_relative_eq!(bottom.volume(), 28.0, epsilon = 1e-9);
        assert!(MeshAdjacency::build(&top).is_closed_manifold());
        assert!(MeshAdjacency::build(&bottom).is_closed_manifold());
    }

    #[test]
    fn plane_outside_bounds_is_unsplittable() {
        let cube = unit_cube();
        let result = split_by_plane(&cube, &plane_z(5.0), &SplitConfig::default());
        assert!(matches!(
            result,
            Err(SplitError::UnsplittableGeometry { .. })
        ));
    }

    #[test]
    fn tangent_plane_is_unsplittable() {
        // Touches the bottom face without entering the interior
        let cube = unit_cube();
        let result = split_by_plane(&cube, &plane_z(0.0), &SplitConfig::default());
        assert!(matches!(
            result,
            Err(SplitError::UnsplittableGeometry { .. })
        ));
    }

    #[test]
    fn empty_mesh_is_an_error() {
        let result = split_by_plane(&IndexedMesh::new(), &plane_z(0.0), &SplitConfig::default());
        assert!(matches!(result, Err(SplitError::EmptyMesh)));
    }
}
