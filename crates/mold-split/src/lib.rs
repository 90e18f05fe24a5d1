//! Split a closed mesh by a plane into two capped, watertight halves.
//!
//! Triangles are classified by signed distance, straddling triangles
//! are clipped at the plane, and the cut boundary is chained into
//! loops and capped with constrained-Delaunay triangulations. Caps
//! support holes, so a block with an interior cavity splits into two
//! closed halves whose volumes sum to the input.
//!
//! # Example
//!
//! ```
//! use mold_split::{split_by_plane, SplitConfig};
//! use mold_types::{unit_cube, Plane, Point3, Vector3};
//!
//! let plane = Plane::new(Point3::new(0.5, 0.5, 0.5), Vector3::z());
//! let (top, bottom) = split_by_plane(&unit_cube(), &plane, &SplitConfig::default())?;
//! assert!(top.volume() > 0.0 && bottom.volume() > 0.0);
//! # Ok::<(), mold_split::SplitError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod cap;
mod error;
mod split;

pub use error::{SplitError, SplitResult};
pub use split::{split_by_plane, SplitConfig};
