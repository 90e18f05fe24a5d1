//! Boolean operations on closed triangle meshes.
//!
//! Union, difference and intersection built from a BVH candidate
//! search, refinement of faces along the intersection curve, parity
//! ray-cast classification, and a stitching pass that welds the seam
//! and verifies the result is watertight.
//!
//! # Example
//!
//! ```
//! use mold_boolean::difference;
//! use mold_types::{cuboid, Point3, Vector3};
//!
//! let block = cuboid(Point3::origin(), Vector3::new(4.0, 4.0, 4.0));
//! let hole = cuboid(Point3::new(1.0, 1.0, 1.0), Vector3::new(2.0, 2.0, 2.0));
//!
//! let hollowed = difference(&block, &hole)?;
//! assert!(hollowed.volume() < block.volume());
//! # Ok::<(), mold_boolean::BooleanError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::similar_names)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod bvh;
pub mod classify;
pub mod config;
pub mod coplanar;
pub mod edge_insert;
pub mod error;
pub mod intersect;
pub mod operation;
pub mod stitch;

pub use bvh::Bvh;
pub use classify::{classify_faces, point_in_mesh, FaceSide};
pub use coplanar::{coplanar_overlap, CoplanarOrientation};
pub use config::{BooleanConfig, BooleanOp, CleanupLevel};
pub use error::{BooleanError, BooleanResult};
pub use operation::{
    boolean_operation, difference, difference_with_config, intersection,
    intersection_with_config, union, union_with_config, BooleanOperationResult, BooleanStats,
};
