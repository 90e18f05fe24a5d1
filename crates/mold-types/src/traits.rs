//! Mesh access traits.

use crate::{Aabb, Triangle, Vertex};

/// Read access to mesh topology.
///
/// Implemented by [`IndexedMesh`](crate::IndexedMesh); algorithms that
/// only need to walk vertices and faces can take `&impl MeshTopology`.
pub trait MeshTopology {
    /// Number of vertices.
    fn vertex_count(&self) -> usize;

    /// Number of faces.
    fn face_count(&self) -> usize;

    /// Whether the mesh has no faces.
    fn is_empty(&self) -> bool {
        self.face_count() == 0
    }

    /// Get a vertex by index.
    fn vertex(&self, index: usize) -> Option<&Vertex>;

    /// Get a face (vertex indices) by index.
    fn face(&self, index: usize) -> Option<[u32; 3]>;

    /// Get a face as a concrete triangle.
    fn triangle(&self, face_index: usize) -> Option<Triangle>;

    /// Iterate over vertices.
    fn vertices(&self) -> impl Iterator<Item = &Vertex>;

    /// Iterate over faces.
    fn faces(&self) -> impl Iterator<Item = [u32; 3]>;

    /// Iterate over faces as concrete triangles.
    fn triangles(&self) -> impl Iterator<Item = Triangle>;
}

/// Bounding-box access.
pub trait MeshBounds {
    /// Compute the axis-aligned bounding box.
    fn bounds(&self) -> Aabb;
}
