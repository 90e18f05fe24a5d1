//! Indexed triangle mesh.

use crate::{Aabb, MeshBounds, MeshTopology, Triangle, Vertex};
use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An indexed triangle mesh.
///
/// Vertices and faces are stored separately, with faces referencing
/// vertices by index.
///
/// # Winding Order
///
/// Faces use **counter-clockwise (CCW) winding** when viewed from
/// outside, so normals point outward by the right-hand rule.
///
/// # Example
///
/// ```
/// use mold_types::{IndexedMesh, Vertex, MeshTopology};
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
///
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.face_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexedMesh {
    /// Vertex data.
    pub vertices: Vec<Vertex>,

    /// Triangle faces as indices into the vertex array.
    /// Each face is `[v0, v1, v2]` with counter-clockwise winding.
    pub faces: Vec<[u32; 3]>,
}

impl IndexedMesh {
    /// Create a new empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Create a mesh from vertices and faces.
    ///
    /// # Example
    ///
    /// ```
    /// use mold_types::{IndexedMesh, Vertex, MeshTopology};
    ///
    /// let vertices = vec![
    ///     Vertex::from_coords(0.0, 0.0, 0.0),
    ///     Vertex::from_coords(1.0, 0.0, 0.0),
    ///     Vertex::from_coords(0.0, 1.0, 0.0),
    /// ];
    /// let mesh = IndexedMesh::from_parts(vertices, vec![[0, 1, 2]]);
    /// assert_eq!(mesh.face_count(), 1);
    /// ```
    #[inline]
    #[must_use]
    pub const fn from_parts(vertices: Vec<Vertex>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Translate the mesh by the given vector.
    pub fn translate(&mut self, offset: Vector3<f64>) {
        for vertex in &mut self.vertices {
            vertex.position += offset;
        }
    }

    /// Compute the signed volume of the mesh.
    ///
    /// Uses the divergence theorem: the signed volume is the sum of
    /// signed tetrahedra volumes formed by each face and the origin.
    /// Positive for a closed mesh with outward-facing normals,
    /// negative for an inside-out mesh. Not meaningful for open meshes.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        let mut volume = 0.0;

        for &[i0, i1, i2] in &self.faces {
            let v0 = &self.vertices[i0 as usize].position;
            let v1 = &self.vertices[i1 as usize].position;
            let v2 = &self.vertices[i2 as usize].position;

            // Signed volume of tetrahedron with origin = (v0 · (v1 × v2)) / 6
            let cross = Vector3::new(
                v1.y.mul_add(v2.z, -(v1.z * v2.y)),
                v1.z.mul_add(v2.x, -(v1.x * v2.z)),
                v1.x.mul_add(v2.y, -(v1.y * v2.x)),
            );
            volume += v0.z.mul_add(cross.z, v0.x.mul_add(cross.x, v0.y * cross.y));
        }

        volume / 6.0
    }

    /// Compute the absolute volume of the mesh.
    #[inline]
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }

    /// Check if the mesh appears to be inside-out (negative signed volume).
    #[inline]
    #[must_use]
    pub fn is_inside_out(&self) -> bool {
        self.signed_volume() < 0.0
    }

    /// Compute the total surface area of the mesh.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.triangles().map(|tri| tri.area()).sum()
    }

    /// Flip face orientation by reversing winding order.
    ///
    /// Turns a solid into its complement boundary; used when a boolean
    /// operation keeps faces from the inside of an operand.
    pub fn flip_orientation(&mut self) {
        for face in &mut self.faces {
            face.swap(1, 2);
        }
    }

    /// Reserve capacity for additional vertices and faces.
    pub fn reserve(&mut self, additional_vertices: usize, additional_faces: usize) {
        self.vertices.reserve(additional_vertices);
        self.faces.reserve(additional_faces);
    }

    /// Merge another mesh into this one.
    ///
    /// The other mesh's vertices and faces are appended, with face
    /// indices adjusted appropriately. No welding is performed.
    #[allow(clippy::cast_possible_truncation)]
    // Truncation: mesh indices are u32, so vertex counts > 4B are unsupported by design
    pub fn merge(&mut self, other: &Self) {
        let vertex_offset = self.vertices.len() as u32;

        self.vertices.extend(other.vertices.iter().copied());

        for face in &other.faces {
            self.faces.push([
                face[0] + vertex_offset,
                face[1] + vertex_offset,
                face[2] + vertex_offset,
            ]);
        }
    }
}

impl MeshTopology for IndexedMesh {
    #[inline]
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn vertex(&self, index: usize) -> Option<&Vertex> {
        self.vertices.get(index)
    }

    fn face(&self, index: usize) -> Option<[u32; 3]> {
        self.faces.get(index).copied()
    }

    fn triangle(&self, face_index: usize) -> Option<Triangle> {
        self.faces.get(face_index).map(|&[i0, i1, i2]| Triangle {
            v0: self.vertices[i0 as usize].position,
            v1: self.vertices[i1 as usize].position,
            v2: self.vertices[i2 as usize].position,
        })
    }

    fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter()
    }

    fn faces(&self) -> impl Iterator<Item = [u32; 3]> {
        self.faces.iter().copied()
    }

    fn triangles(&self) -> impl Iterator<Item = Triangle> {
        self.faces.iter().map(|&[i0, i1, i2]| Triangle {
            v0: self.vertices[i0 as usize].position,
            v1: self.vertices[i1 as usize].position,
            v2: self.vertices[i2 as usize].position,
        })
    }
}

impl MeshBounds for IndexedMesh {
    fn bounds(&self) -> Aabb {
        if self.vertices.is_empty() {
            return Aabb::empty();
        }

        let positions = self.vertices.iter().map(|v| &v.position);
        Aabb::from_points(positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit_cube;

    #[test]
    fn mesh_is_empty() {
        let mesh = IndexedMesh::new();
        assert!(mesh.is_empty());

        let mut mesh2 = IndexedMesh::new();
        mesh2.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        assert!(mesh2.is_empty()); // no faces

        mesh2.faces.push([0, 0, 0]);
        assert!(!mesh2.is_empty());
    }

    #[test]
    fn mesh_bounds() {
        let mut mesh = IndexedMesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(10.0, 5.0, 3.0));
        mesh.vertices.push(Vertex::from_coords(-2.0, 8.0, 1.0));

        let bounds = mesh.bounds();
        assert!((bounds.min.x - (-2.0)).abs() < f64::EPSILON);
        assert!((bounds.max.x - 10.0).abs() < f64::EPSILON);
        assert!((bounds.max.y - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unit_cube_volume() {
        let cube = unit_cube();
        let vol = cube.signed_volume();
        assert!(
            (vol - 1.0).abs() < 1e-10,
            "unit cube volume should be 1.0, got {vol}"
        );
    }

    #[test]
    fn unit_cube_surface_area() {
        let cube = unit_cube();
        let area = cube.surface_area();
        assert!(
            (area - 6.0).abs() < 1e-10,
            "unit cube surface area should be 6.0, got {area}"
        );
    }

    #[test]
    fn flipped_cube_inside_out() {
        let mut cube = unit_cube();
        assert!(!cube.is_inside_out());
        cube.flip_orientation();
        assert!(cube.is_inside_out());
    }

    #[test]
    fn mesh_merge_offsets_indices() {
        let mut mesh1 = IndexedMesh::new();
        mesh1.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh1.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        mesh1.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
        mesh1.faces.push([0, 1, 2]);

        let mut mesh2 = IndexedMesh::new();
        mesh2.vertices.push(Vertex::from_coords(2.0, 0.0, 0.0));
        mesh2.vertices.push(Vertex::from_coords(3.0, 0.0, 0.0));
        mesh2.vertices.push(Vertex::from_coords(2.0, 1.0, 0.0));
        mesh2.faces.push([0, 1, 2]);

        mesh1.merge(&mesh2);
        assert_eq!(mesh1.vertex_count(), 6);
        assert_eq!(mesh1.face_count(), 2);
        assert_eq!(mesh1.faces[1], [3, 4, 5]);
    }

    #[test]
    fn mesh_translate() {
        let mut mesh = IndexedMesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.translate(Vector3::new(1.0, 2.0, 3.0));

        let pos = mesh.vertices[0].position;
        assert!((pos.x - 1.0).abs() < f64::EPSILON);
        assert!((pos.z - 3.0).abs() < f64::EPSILON);
    }
}
