//! Outward offset via displaced vertex normals.
//!
//! Each vertex moves along its angle-weighted pseudo-normal, scaled so
//! that every adjacent face plane advances by exactly the requested
//! distance. The scale for a vertex is `1 / cos(theta)` where `theta`
//! is the largest angle between the pseudo-normal and any adjacent
//! face normal; flat regions get scale 1, a cube corner gets sqrt(3).

use crate::error::{OffsetError, OffsetResult};
use hashbrown::HashMap;
use mold_boolean::bvh::Bvh;
use mold_boolean::intersect::triangles_cross;
use mold_types::{IndexedMesh, MeshTopology, Point3, Vector3};
use rayon::prelude::*;
use smallvec::SmallVec;
use tracing::debug;

/// Configuration for offset operations.
#[derive(Debug, Clone)]
pub struct OffsetConfig {
    /// Upper bound on the per-vertex displacement scale. Vertices
    /// needing a larger scale (needle geometry) fail the offset.
    pub max_scale: f64,

    /// Scan the offset surface for self-intersections between
    /// non-adjacent faces.
    pub check_self_intersections: bool,

    /// Whether the self-intersection scan runs on rayon.
    pub parallel: bool,

    /// Maximum triangles per BVH leaf in the scan.
    pub bvh_leaf_size: usize,

    /// Tolerance for intersection tests and degenerate-face normals.
    pub epsilon: f64,
}

impl Default for OffsetConfig {
    fn default() -> Self {
        Self {
            max_scale: 10.0,
            check_self_intersections: true,
            parallel: true,
            bvh_leaf_size: 8,
            epsilon: 1e-9,
        }
    }
}

impl OffsetConfig {
    /// Tight scale cap for geometry that must stay well-conditioned.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            max_scale: 4.0,
            ..Self::default()
        }
    }

    /// Set the maximum displacement scale.
    #[must_use]
    pub fn with_max_scale(mut self, max_scale: f64) -> Self {
        self.max_scale = max_scale;
        self
    }

    /// Enable or disable the self-intersection scan.
    #[must_use]
    pub fn with_self_intersection_check(mut self, check: bool) -> Self {
        self.check_self_intersections = check;
        self
    }

    /// Enable or disable parallel scanning.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Offset a closed mesh outward by `distance`.
///
/// The result has the same topology as the input; only vertex
/// positions change. Every face plane of the input advances by
/// `distance` along its normal.
///
/// # Errors
///
/// - [`OffsetError::EmptyMesh`] when the mesh has no faces.
/// - [`OffsetError::InvalidDistance`] when `distance` is not finite
///   or not positive.
/// - [`OffsetError::DegenerateOffset`] when a vertex needs a scale
///   beyond the cap, a face normal flips, or the offset surface
///   intersects itself.
///
/// # Example
///
/// ```
/// use mold_offset::{offset_solid, OffsetConfig};
/// use mold_types::unit_cube;
///
/// let shell = offset_solid(&unit_cube(), 0.5, &OffsetConfig::default())?;
/// assert!((shell.volume() - 8.0).abs() < 1e-9);
/// # Ok::<(), mold_offset::OffsetError>(())
/// ```
#[allow(clippy::cast_possible_truncation)]
pub fn offset_solid(
    mesh: &IndexedMesh,
    distance: f64,
    config: &OffsetConfig,
) -> OffsetResult<IndexedMesh> {
    if mesh.is_empty() {
        return Err(OffsetError::EmptyMesh);
    }
    if !distance.is_finite() || distance <= 0.0 {
        return Err(OffsetError::InvalidDistance(format!("{distance}")));
    }

    let face_normals = face_normals(mesh, config.epsilon)?;
    let vertex_faces = vertex_faces(mesh);

    let mut result = mesh.clone();
    for (vi, vertex) in mesh.vertices.iter().enumerate() {
        let faces = vertex_faces
            .get(&(vi as u32))
            .map_or(&[][..], SmallVec::as_slice);
        if faces.is_empty() {
            continue;
        }

        let normal = pseudo_normal(mesh, vi, faces, &face_normals)
            .ok_or_else(|| OffsetError::degenerate(vi, vertex.position, "zero pseudo-normal"))?;

        // Worst-case alignment with the adjacent face planes decides
        // how far the vertex must travel so every plane advances by
        // exactly `distance`.
        let mut cos_min = f64::INFINITY;
        for &fi in faces {
            cos_min = cos_min.min(normal.dot(&face_normals[fi as usize]));
        }
        if cos_min <= 1.0 / config.max_scale {
            return Err(OffsetError::degenerate(
                vi,
                vertex.position,
                format!("displacement scale exceeds cap {}", config.max_scale),
            ));
        }

        let scale = 1.0 / cos_min;
        result.vertices[vi].position += normal * (distance * scale);
    }

    for (fi, tri) in result.triangles().enumerate() {
        let offset_normal = tri.normal_raw();
        if offset_normal.dot(&face_normals[fi]) <= 0.0 {
            return Err(OffsetError::degenerate(
                fi,
                tri.centroid(),
                "face normal flipped",
            ));
        }
    }

    if config.check_self_intersections {
        scan_self_intersections(&result, config)?;
    }

    debug!(
        distance,
        vertices = result.vertex_count(),
        "offset solid complete"
    );
    Ok(result)
}

/// Offset with default configuration.
///
/// # Errors
///
/// Same as [`offset_solid`].
pub fn offset_solid_default(mesh: &IndexedMesh, distance: f64) -> OffsetResult<IndexedMesh> {
    offset_solid(mesh, distance, &OffsetConfig::default())
}

fn face_normals(mesh: &IndexedMesh, epsilon: f64) -> OffsetResult<Vec<Vector3<f64>>> {
    mesh.triangles()
        .enumerate()
        .map(|(fi, tri)| {
            let raw = tri.normal_raw();
            let len = raw.norm();
            if len <= epsilon {
                Err(OffsetError::degenerate(fi, tri.centroid(), "degenerate source face"))
            } else {
                Ok(raw / len)
            }
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation)]
fn vertex_faces(mesh: &IndexedMesh) -> HashMap<u32, SmallVec<[u32; 8]>> {
    let mut map: HashMap<u32, SmallVec<[u32; 8]>> = HashMap::with_capacity(mesh.vertices.len());
    for (fi, face) in mesh.faces.iter().enumerate() {
        for &v in face {
            map.entry(v).or_default().push(fi as u32);
        }
    }
    map
}

/// Angle-weighted average of adjacent face normals.
fn pseudo_normal(
    mesh: &IndexedMesh,
    vi: usize,
    faces: &[u32],
    face_normals: &[Vector3<f64>],
) -> Option<Vector3<f64>> {
    let mut sum = Vector3::zeros();
    for &fi in faces {
        let face = mesh.faces[fi as usize];
        let corner = face.iter().position(|&v| v as usize == vi)?;

        let p = mesh.vertices[face[corner] as usize].position;
        let a = mesh.vertices[face[(corner + 1) % 3] as usize].position;
        let b = mesh.vertices[face[(corner + 2) % 3] as usize].position;

        let ea = (a - p).normalize();
        let eb = (b - p).normalize();
        let angle = ea.dot(&eb).clamp(-1.0, 1.0).acos();

        sum += face_normals[fi as usize] * angle;
    }

    let len = sum.norm();
    (len > f64::EPSILON).then(|| sum / len)
}

/// BVH-accelerated scan for crossings between faces that share no
/// vertex. Faces around a common vertex touch by construction and are
/// skipped.
fn scan_self_intersections(mesh: &IndexedMesh, config: &OffsetConfig) -> OffsetResult<()> {
    let bvh = if config.parallel {
        Bvh::build_parallel(mesh, config.bvh_leaf_size)
    } else {
        Bvh::build(mesh, config.bvh_leaf_size)
    };

    let check_face = |fi: usize| -> Option<usize> {
        let face = mesh.faces[fi];
        let tri = mesh.triangle(fi)?;
        let bounds = mold_types::Aabb::from_points([&tri.v0, &tri.v1, &tri.v2]);

        for other in bvh.query(&bounds, config.epsilon) {
            let oi = other as usize;
            if oi <= fi {
                continue;
            }
            let other_face = mesh.faces[oi];
            if face.iter().any(|v| other_face.contains(v)) {
                continue;
            }
            if let Some(other_tri) = mesh.triangle(oi) {
                if triangles_cross(&tri, &other_tri, config.epsilon) {
                    return Some(fi);
                }
            }
        }
        None
    };

    let hit = if config.parallel && mesh.faces.len() > 100 {
        (0..mesh.faces.len()).into_par_iter().find_map_first(check_face)
    } else {
        (0..mesh.faces.len()).find_map(check_face)
    };

    match hit {
        Some(fi) => {
            let at = mesh
                .triangle(fi)
                .map_or_else(Point3::origin, |t| t.centroid());
            Err(OffsetError::degenerate(
                fi,
                at,
                "offset surface intersects itself",
            ))
        }
        None => Ok(()),
    }
}
