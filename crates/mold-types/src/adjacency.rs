//! Edge-to-face adjacency index.

use crate::{IndexedMesh, MeshTopology};
use hashbrown::HashMap;
use smallvec::SmallVec;

/// Canonical (sorted) edge key.
type EdgeKey = (u32, u32);

#[inline]
fn edge_key(a: u32, b: u32) -> EdgeKey {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Edge-to-incident-face index for a mesh.
///
/// Built once per mesh and passed to the queries that need
/// connectivity, so callers control when the (linear) build cost is
/// paid.
///
/// A closed 2-manifold has exactly two incident faces on every edge.
/// Edges with one face are boundary edges (the mesh has a hole);
/// edges with three or more are non-manifold.
///
/// # Example
///
/// ```
/// use mold_types::{unit_cube, MeshAdjacency};
///
/// let cube = unit_cube();
/// let adjacency = MeshAdjacency::build(&cube);
/// assert!(adjacency.is_watertight());
/// assert!(adjacency.is_manifold());
/// ```
#[derive(Debug, Clone)]
pub struct MeshAdjacency {
    edge_faces: HashMap<EdgeKey, SmallVec<[u32; 2]>>,
}

impl MeshAdjacency {
    /// Build the index from a mesh.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    // Truncation: face indices share the u32 space with vertex indices
    pub fn build(mesh: &IndexedMesh) -> Self {
        let mut edge_faces: HashMap<EdgeKey, SmallVec<[u32; 2]>> =
            HashMap::with_capacity(mesh.face_count() * 3 / 2);

        for (face_index, &[i0, i1, i2]) in mesh.faces.iter().enumerate() {
            let face_index = face_index as u32;
            for (a, b) in [(i0, i1), (i1, i2), (i2, i0)] {
                edge_faces
                    .entry(edge_key(a, b))
                    .or_default()
                    .push(face_index);
            }
        }

        Self { edge_faces }
    }

    /// Number of distinct edges.
    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_faces.len()
    }

    /// Faces incident to an edge, in insertion order.
    #[must_use]
    pub fn faces_of_edge(&self, a: u32, b: u32) -> &[u32] {
        self.edge_faces
            .get(&edge_key(a, b))
            .map_or(&[], SmallVec::as_slice)
    }

    /// Number of edges with exactly one incident face.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_faces.values().filter(|f| f.len() == 1).count()
    }

    /// Number of edges with three or more incident faces.
    #[must_use]
    pub fn non_manifold_edge_count(&self) -> usize {
        self.edge_faces.values().filter(|f| f.len() > 2).count()
    }

    /// Iterate over boundary edges (vertex index pairs).
    pub fn boundary_edges(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.edge_faces
            .iter()
            .filter(|(_, f)| f.len() == 1)
            .map(|(&e, _)| e)
    }

    /// Whether every edge has at least two incident faces (no holes).
    #[inline]
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.boundary_edge_count() == 0
    }

    /// Whether every edge has at most two incident faces.
    #[inline]
    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.non_manifold_edge_count() == 0
    }

    /// Whether the mesh is a closed 2-manifold (exactly two faces per edge).
    #[inline]
    #[must_use]
    pub fn is_closed_manifold(&self) -> bool {
        self.edge_faces.values().all(|f| f.len() == 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{unit_cube, Vertex};

    #[test]
    fn cube_is_closed_manifold() {
        let adjacency = MeshAdjacency::build(&unit_cube());
        assert_eq!(adjacency.edge_count(), 18);
        assert!(adjacency.is_watertight());
        assert!(adjacency.is_manifold());
        assert!(adjacency.is_closed_manifold());
    }

    #[test]
    fn open_triangle_has_boundary() {
        let mesh = IndexedMesh::from_parts(
            vec![
                Vertex::from_coords(0.0, 0.0, 0.0),
                Vertex::from_coords(1.0, 0.0, 0.0),
                Vertex::from_coords(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        );
        let adjacency = MeshAdjacency::build(&mesh);
        assert_eq!(adjacency.boundary_edge_count(), 3);
        assert!(!adjacency.is_watertight());
        assert!(adjacency.is_manifold());
    }

    #[test]
    fn fin_is_non_manifold() {
        // Two triangles sharing an edge plus a third "fin" on the same edge.
        let mesh = IndexedMesh::from_parts(
            vec![
                Vertex::from_coords(0.0, 0.0, 0.0),
                Vertex::from_coords(1.0, 0.0, 0.0),
                Vertex::from_coords(0.0, 1.0, 0.0),
                Vertex::from_coords(0.0, -1.0, 0.0),
                Vertex::from_coords(0.5, 0.5, 1.0),
            ],
            vec![[0, 1, 2], [0, 3, 1], [0, 1, 4]],
        );
        let adjacency = MeshAdjacency::build(&mesh);
        assert_eq!(adjacency.non_manifold_edge_count(), 1);
        assert!(!adjacency.is_manifold());
        assert_eq!(adjacency.faces_of_edge(0, 1).len(), 3);
    }
}
