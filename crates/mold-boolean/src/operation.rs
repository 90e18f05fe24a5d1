//! Core boolean operations: union, difference, and intersection.
//!
//! The main entry point is [`boolean_operation`]; [`union`],
//! [`difference`] and [`intersection`] wrap it with default config.

use crate::bvh::Bvh;
use crate::classify::{classify_faces, FaceSide};
use crate::config::{BooleanConfig, BooleanOp};
use crate::error::{BooleanError, BooleanResult};
use crate::stitch;
use hashbrown::HashMap;
use mold_types::{IndexedMesh, MeshBounds, MeshTopology};
use tracing::debug;

/// Statistics from a boolean operation.
#[derive(Debug, Clone, Default)]
pub struct BooleanStats {
    /// Faces contributed by mesh A.
    pub faces_from_a: usize,
    /// Faces contributed by mesh B.
    pub faces_from_b: usize,
    /// Faces split during refinement along the intersection curve.
    pub faces_split: usize,
    /// Vertices created during refinement.
    pub new_vertices: usize,
    /// Whether the surfaces actually crossed.
    pub meshes_intersected: bool,
}

/// Result of a boolean operation.
#[derive(Debug)]
pub struct BooleanOperationResult {
    /// The resulting mesh.
    pub mesh: IndexedMesh,
    /// Statistics about the operation.
    pub stats: BooleanStats,
}

/// Perform a boolean operation on two closed meshes.
///
/// `mesh_a` is the base for [`BooleanOp::Difference`]; `mesh_b` is the
/// tool that gets subtracted.
///
/// # Errors
///
/// Returns [`BooleanError::EmptyMesh`] when either operand has no
/// faces, and [`BooleanError::NonManifoldResult`] when full cleanup
/// cannot close the result into a watertight manifold.
///
/// # Example
///
/// ```
/// use mold_boolean::{boolean_operation, BooleanConfig, BooleanOp};
/// use mold_types::{cuboid, Point3, Vector3};
///
/// let block = cuboid(Point3::origin(), Vector3::new(4.0, 4.0, 4.0));
/// let bite = cuboid(Point3::new(3.0, 3.0, 3.0), Vector3::new(2.0, 2.0, 2.0));
///
/// let result =
///     boolean_operation(&block, &bite, BooleanOp::Difference, &BooleanConfig::default())?;
/// assert!(result.mesh.volume() < block.volume());
/// # Ok::<(), mold_boolean::BooleanError>(())
/// ```
pub fn boolean_operation(
    mesh_a: &IndexedMesh,
    mesh_b: &IndexedMesh,
    operation: BooleanOp,
    config: &BooleanConfig,
) -> BooleanResult<BooleanOperationResult> {
    if mesh_a.is_empty() {
        return Err(BooleanError::EmptyMesh {
            details: "operand A has no faces".to_string(),
        });
    }
    if mesh_b.is_empty() {
        return Err(BooleanError::EmptyMesh {
            details: "operand B has no faces".to_string(),
        });
    }

    if !mesh_a
        .bounds()
        .inflated(config.edge_tolerance)
        .intersects(&mesh_b.bounds())
    {
        debug!(op = %operation, "bounds disjoint, assembling without refinement");
        return Ok(handle_non_overlapping(mesh_a, mesh_b, operation));
    }

    let bvh_b = if config.parallel {
        Bvh::build_parallel(mesh_b, config.bvh_leaf_size)
    } else {
        Bvh::build(mesh_b, config.bvh_leaf_size)
    };

    let (refined_a, refined_b) =
        crate::edge_insert::refine_pair(mesh_a, mesh_b, &bvh_b, config.edge_tolerance);

    // The refined meshes carry new vertices on the intersection curve;
    // classification needs trees over the refined geometry. Operands
    // that merely contain each other, or touch along coplanar faces,
    // take the same path: their faces classify wholesale.
    let bvh_a_refined = Bvh::build(&refined_a.mesh, config.bvh_leaf_size);
    let bvh_b_refined = Bvh::build(&refined_b.mesh, config.bvh_leaf_size);

    let sides_a = classify_faces(
        &refined_a.mesh,
        &refined_b.mesh,
        &bvh_b_refined,
        config.classification_tolerance,
        config.parallel,
    );
    let sides_b = classify_faces(
        &refined_b.mesh,
        &refined_a.mesh,
        &bvh_a_refined,
        config.classification_tolerance,
        config.parallel,
    );

    let mut result = IndexedMesh::new();
    let mut stats = BooleanStats {
        faces_split: refined_a.split_faces + refined_b.split_faces,
        new_vertices: refined_a.new_vertices + refined_b.new_vertices,
        meshes_intersected: refined_a.split_faces > 0 || refined_b.split_faces > 0,
        ..Default::default()
    };

    // Coplanar contact keeps a single copy of the shared surface where
    // the result has one (same orientation) and drops both copies where
    // the solids merge through it (opposite orientation). Operand B's
    // coplanar faces are always dropped in favor of A's.
    let (keep_a, keep_b, invert_b): (&[FaceSide], &[FaceSide], bool) = match operation {
        BooleanOp::Union => (
            &[FaceSide::Outside, FaceSide::CoplanarSame],
            &[FaceSide::Outside],
            false,
        ),
        // Inside-B faces flip to become the cavity wall
        BooleanOp::Difference => (
            &[FaceSide::Outside, FaceSide::CoplanarOpposite],
            &[FaceSide::Inside],
            true,
        ),
        BooleanOp::Intersection => (
            &[FaceSide::Inside, FaceSide::CoplanarSame],
            &[FaceSide::Inside],
            false,
        ),
    };
    add_faces(&mut result, &refined_a.mesh, &sides_a, keep_a, false);
    stats.faces_from_a = result.faces.len();
    add_faces(&mut result, &refined_b.mesh, &sides_b, keep_b, invert_b);
    stats.faces_from_b = result.faces.len() - stats.faces_from_a;

    stitch::cleanup(&mut result, config)?;

    debug!(
        op = %operation,
        faces = result.faces.len(),
        split = stats.faces_split,
        "boolean operation complete"
    );

    Ok(BooleanOperationResult { mesh: result, stats })
}

/// Copy faces whose side is in the keep set, remapping vertices.
#[allow(clippy::cast_possible_truncation)]
fn add_faces(
    result: &mut IndexedMesh,
    source: &IndexedMesh,
    sides: &[FaceSide],
    keep: &[FaceSide],
    invert: bool,
) {
    let mut vertex_map: HashMap<u32, u32> = HashMap::new();

    for (fi, face) in source.faces.iter().enumerate() {
        if !sides.get(fi).is_some_and(|side| keep.contains(side)) {
            continue;
        }

        let face = if invert {
            [face[0], face[2], face[1]]
        } else {
            *face
        };

        let mut mapped = [0u32; 3];
        for (slot, &v) in mapped.iter_mut().zip(&face) {
            *slot = *vertex_map.entry(v).or_insert_with(|| {
                let idx = result.vertices.len() as u32;
                result.vertices.push(source.vertices[v as usize]);
                idx
            });
        }
        result.faces.push(mapped);
    }
}

/// Operands whose bounds do not even touch.
fn handle_non_overlapping(
    mesh_a: &IndexedMesh,
    mesh_b: &IndexedMesh,
    operation: BooleanOp,
) -> BooleanOperationResult {
    let (mesh, faces_from_a, faces_from_b) = match operation {
        BooleanOp::Union => {
            let mut result = mesh_a.clone();
            result.merge(mesh_b);
            (result, mesh_a.faces.len(), mesh_b.faces.len())
        }
        BooleanOp::Difference => (mesh_a.clone(), mesh_a.faces.len(), 0),
        BooleanOp::Intersection => (IndexedMesh::new(), 0, 0),
    };

    BooleanOperationResult {
        mesh,
        stats: BooleanStats {
            faces_from_a,
            faces_from_b,
            meshes_intersected: false,
            ..Default::default()
        },
    }
}

/// Union with default configuration.
///
/// # Errors
///
/// Returns [`BooleanError`] if either mesh is empty or the result
/// cannot be made manifold.
pub fn union(mesh_a: &IndexedMesh, mesh_b: &IndexedMesh) -> BooleanResult<IndexedMesh> {
    Ok(boolean_operation(mesh_a, mesh_b, BooleanOp::Union, &BooleanConfig::default())?.mesh)
}

/// Union with custom configuration.
///
/// # Errors
///
/// Returns [`BooleanError`] if either mesh is empty or the result
/// cannot be made manifold.
pub fn union_with_config(
    mesh_a: &IndexedMesh,
    mesh_b: &IndexedMesh,
    config: &BooleanConfig,
) -> BooleanResult<BooleanOperationResult> {
    boolean_operation(mesh_a, mesh_b, BooleanOp::Union, config)
}

/// Difference (A minus B) with default configuration.
///
/// # Errors
///
/// Returns [`BooleanError`] if either mesh is empty or the result
/// cannot be made manifold.
pub fn difference(mesh_a: &IndexedMesh, mesh_b: &IndexedMesh) -> BooleanResult<IndexedMesh> {
    Ok(boolean_operation(mesh_a, mesh_b, BooleanOp::Difference, &BooleanConfig::default())?.mesh)
}

/// Difference with custom configuration.
///
/// # Errors
///
/// Returns [`BooleanError`] if either mesh is empty or the result
/// cannot be made manifold.
pub fn difference_with_config(
    mesh_a: &IndexedMesh,
    mesh_b: &IndexedMesh,
    config: &BooleanConfig,
) -> BooleanResult<BooleanOperationResult> {
    boolean_operation(mesh_a, mesh_b, BooleanOp::Difference, config)
}

/// Intersection with default configuration.
///
/// # Errors
///
/// Returns [`BooleanError`] if either mesh is empty or the result
/// cannot be made manifold.
pub fn intersection(mesh_a: &IndexedMesh, mesh_b: &IndexedMesh) -> BooleanResult<IndexedMesh> {
    Ok(boolean_operation(mesh_a, mesh_b, BooleanOp::Intersection, &BooleanConfig::default())?.mesh)
}

/// Intersection with custom configuration.
///
/// # Errors
///
/// Returns [`BooleanError`] if either mesh is empty or the result
/// cannot be made manifold.
pub fn intersection_with_config(
    mesh_a: &IndexedMesh,
    mesh_b: &IndexedMesh,
    config: &BooleanConfig,
) -> BooleanResult<BooleanOperationResult> {
    boolean_operation(mesh_a, mesh_b, BooleanOp::Intersection, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mold_types::{cuboid, unit_cube, MeshAdjacency, Point3, Vector3};

    fn assert_closed(mesh: &IndexedMesh) {
        assert!(
            MeshAdjacency::build(mesh).is_closed_manifold(),
            "result is not a closed manifold"
        );
    }

    #[test]
    fn union_of_disjoint_cubes_keeps_both() {
        let a = unit_cube();
        let mut b = unit_cube();
        b.translate(Vector3::new(5.0, 0.0, 0.0));

        let result = union(&a, &b).unwrap();
        assert_eq!(result.faces.len(), 24);
    }

    #[test]
    fn difference_with_disjoint_tool_is_identity() {
        let a = unit_cube();
        let mut b = unit_cube();
        b.translate(Vector3::new(5.0, 0.0, 0.0));

        let result = difference(&a, &b).unwrap();
        assert_eq!(result.faces.len(), 12);
        assert!((result.volume() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn intersection_of_disjoint_cubes_is_empty() {
        let a = unit_cube();
        let mut b = unit_cube();
        b.translate(Vector3::new(5.0, 0.0, 0.0));

        let result = intersection(&a, &b).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn empty_operand_is_an_error() {
        let cube = unit_cube();
        let empty = IndexedMesh::new();
        assert!(union(&cube, &empty).is_err());
        assert!(union(&empty, &cube).is_err());
    }

    #[test]
    fn nested_difference_builds_a_cavity() {
        let block = cuboid(Point3::origin(), Vector3::new(4.0, 4.0, 4.0));
        let hole = cuboid(Point3::new(1.0, 1.0, 1.0), Vector3::new(2.0, 2.0, 2.0));

        let result = difference(&block, &hole).unwrap();
        // Outer skin plus inverted inner shell
        assert_eq!(result.faces.len(), 24);
        assert!((result.volume() - (64.0 - 8.0)).abs() < 1e-9);
    }

    #[test]
    fn nested_intersection_is_the_inner_mesh() {
        let block = cuboid(Point3::origin(), Vector3::new(4.0, 4.0, 4.0));
        let inner = cuboid(Point3::new(1.0, 1.0, 1.0), Vector3::new(2.0, 2.0, 2.0));

        let result = intersection(&block, &inner).unwrap();
        assert!((result.volume() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn overlapping_difference_removes_volume() {
        let a = cuboid(Point3::origin(), Vector3::new(2.0, 2.0, 2.0));
        let b = cuboid(Point3::new(1.0, -0.5, -0.5), Vector3::new(2.0, 3.0, 3.0));

        // The tool covers the whole x >= 1 half of the block
        let result = difference(&a, &b).unwrap();
        assert!((result.volume() - 4.0).abs() < 1e-6);
        assert_closed(&result);
    }

    #[test]
    fn peg_through_plate_union_is_closed() {
        let plate = cuboid(Point3::origin(), Vector3::new(10.0, 10.0, 1.0));
        let peg = cuboid(Point3::new(4.0, 4.0, -2.0), Vector3::new(2.0, 2.0, 6.0));

        let result = union(&plate, &peg).unwrap();
        assert_closed(&result);
        // 100 + 24 minus the 4 embedded in the plate
        assert!((result.volume() - 120.0).abs() < 1e-6);
    }

    #[test]
    fn peg_through_plate_difference_punches_a_hole() {
        let plate = cuboid(Point3::origin(), Vector3::new(10.0, 10.0, 1.0));
        let peg = cuboid(Point3::new(4.0, 4.0, -2.0), Vector3::new(2.0, 2.0, 6.0));

        let result = difference(&plate, &peg).unwrap();
        assert_closed(&result);
        assert!((result.volume() - 96.0).abs() < 1e-6);
    }

    #[test]
    fn refilling_a_cavity_restores_the_block() {
        let block = cuboid(Point3::origin(), Vector3::new(4.0, 4.0, 4.0));
        let hole = cuboid(Point3::new(1.0, 1.0, 1.0), Vector3::new(2.0, 2.0, 2.0));

        // The refill's faces coincide with the cavity walls exactly;
        // both coplanar copies drop and only the outer skin remains.
        let carved = difference(&block, &hole).unwrap();
        let refilled = union(&carved, &hole).unwrap();
        assert_eq!(refilled.faces.len(), 12);
        assert!((refilled.volume() - block.volume()).abs() < 1e-9);
        assert_closed(&refilled);
    }

    #[test]
    fn difference_and_intersection_partition_the_base() {
        let a = cuboid(Point3::origin(), Vector3::new(2.0, 2.0, 2.0));
        let b = cuboid(Point3::new(1.0, -0.5, -0.5), Vector3::new(2.0, 3.0, 3.0));

        let diff = difference(&a, &b).unwrap();
        let inter = intersection(&a, &b).unwrap();
        assert!((diff.volume() + inter.volume() - a.volume()).abs() < 1e-6);
    }

    #[test]
    fn overlapping_union_volume_exceeds_each_operand() {
        let a = cuboid(Point3::origin(), Vector3::new(2.0, 2.0, 2.0));
        let b = cuboid(Point3::new(1.0, 0.25, 0.25), Vector3::new(2.0, 1.5, 1.5));

        let result = union_with_config(&a, &b, &BooleanConfig::default()).unwrap();
        assert!(result.stats.meshes_intersected);
        assert!(result.mesh.volume() > 8.0 - 1e-6);
        assert!(result.mesh.volume() < 8.0 + 4.5);
        assert_closed(&result.mesh);
    }

    #[test]
    fn stats_for_disjoint_union() {
        let a = unit_cube();
        let mut b = unit_cube();
        b.translate(Vector3::new(5.0, 0.0, 0.0));

        let result = union_with_config(&a, &b, &BooleanConfig::default()).unwrap();
        assert_eq!(result.stats.faces_from_a, 12);
        assert_eq!(result.stats.faces_from_b, 12);
        assert!(!result.stats.meshes_intersected);
    }
}
