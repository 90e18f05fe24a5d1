//! The mold generation pipeline.
//!
//! Eight stages, each building on the last:
//!
//! 1. validate the input is a closed manifold solid,
//! 2. pick the parting plane from the part's bounds,
//! 3. offset the part outward into the mold block,
//! 4. subtract the part from the block, leaving the cavity,
//! 5. split the block along the parting plane,
//! 6. plan keys, recesses and the pour spout,
//! 7. union keys into the bottom half, subtract recesses and the
//!    spout from the top half,
//! 8. return both halves.
//!
//! Any stage failure aborts the whole run; no partial result is
//! produced.

use mold_boolean::{difference_with_config, union_with_config, BooleanConfig};
use mold_features::plan_features;
use mold_offset::{offset_solid, OffsetConfig};
use mold_split::{split_by_plane, SplitConfig};
use mold_types::{IndexedMesh, MeshAdjacency, MeshBounds, MeshTopology, Plane};
use tracing::{debug, info};

use crate::config::MoldParams;
use crate::error::{MoldError, MoldResult};

/// The two halves of a finished mold.
#[derive(Debug)]
pub struct MoldHalves {
    /// Top half: recesses and the pour spout are cut into it.
    pub top: IndexedMesh,
    /// Bottom half: alignment keys protrude from its parting face.
    pub bottom: IndexedMesh,
    /// The parting plane the halves were split along.
    pub parting_plane: Plane,
}

/// Generate a two-part casting mold for a solid part.
///
/// # Errors
///
/// - [`MoldError::InvalidInput`] when the input is not a closed
///   manifold solid.
/// - [`MoldError::InvalidParams`] for out-of-range parameters.
/// - Stage errors ([`MoldError::Offset`], [`MoldError::Boolean`],
///   [`MoldError::Split`], [`MoldError::Feature`]) when a stage fails
///   on this geometry.
///
/// # Example
///
/// ```
/// use mold_pipeline::{generate_mold, MoldParams};
/// use mold_types::unit_cube;
///
/// let halves = generate_mold(&unit_cube(), &MoldParams::default())?;
/// assert!(halves.top.volume() > 0.0);
/// assert!(halves.bottom.volume() > 0.0);
/// # Ok::<(), mold_pipeline::MoldError>(())
/// ```
pub fn generate_mold(input: &IndexedMesh, params: &MoldParams) -> MoldResult<MoldHalves> {
    params.validate()?;

    let adjacency = MeshAdjacency::build(input);
    if !adjacency.is_closed_manifold() {
        return Err(MoldError::InvalidInput {
            boundary_edges: adjacency.boundary_edge_count(),
            non_manifold_edges: adjacency.non_manifold_edge_count(),
        });
    }

    let bounds = input.bounds();
    let plane = match params.parting_axis {
        Some(axis) => Plane::new(bounds.center(), axis.unit()),
        None => Plane::from_bounds(&bounds),
    };
    info!(
        normal = ?(plane.normal.x, plane.normal.y, plane.normal.z),
        "parting plane chosen"
    );

    let offset_config = OffsetConfig::default().with_parallel(params.parallel);
    let block = offset_solid(input, params.wall_thickness_mm, &offset_config)?;
    info!(
        wall_mm = params.wall_thickness_mm,
        faces = block.face_count(),
        "mold block built"
    );

    let boolean_config = BooleanConfig::default().with_parallel(params.parallel);
    let cavity_block = difference_with_config(&block, input, &boolean_config)?.mesh;
    info!(faces = cavity_block.face_count(), "cavity carved");

    let (top, bottom) = split_by_plane(&cavity_block, &plane, &SplitConfig::default())?;
    info!(
        top_faces = top.face_count(),
        bottom_faces = bottom.face_count(),
        "block split along parting plane"
    );

    let plan = plan_features(&bounds, &block.bounds(), &plane, &params.feature_params())?;
    debug!(keys = plan.keys.len(), "features planned");

    let mut bottom = bottom;
    for key in &plan.keys {
        bottom = union_with_config(&bottom, key, &boolean_config)?.mesh;
    }

    let mut top = top;
    for recess in &plan.recesses {
        top = difference_with_config(&top, recess, &boolean_config)?.mesh;
    }
    top = difference_with_config(&top, &plan.spout, &boolean_config)?.mesh;

    info!(
        top_faces = top.face_count(),
        bottom_faces = bottom.face_count(),
        keys = plan.keys.len(),
        "mold halves complete"
    );

    Ok(MoldHalves {
        top,
        bottom,
        parting_plane: plane,
    })
}
