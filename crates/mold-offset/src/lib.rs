//! Outward offset of closed triangle meshes.
//!
//! Builds the offset solid by displacing each vertex along its
//! angle-weighted pseudo-normal, scaled so every adjacent face plane
//! advances by exactly the requested distance. The topology of the
//! input carries over unchanged; degenerate results (needle vertices,
//! flipped faces, self-intersecting shells) are detected and reported
//! rather than returned.
//!
//! # Example
//!
//! ```
//! use mold_offset::offset_solid_default;
//! use mold_types::unit_cube;
//!
//! let shell = offset_solid_default(&unit_cube(), 1.0)?;
//! assert!(shell.volume() > 1.0);
//! # Ok::<(), mold_offset::OffsetError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod offset;

pub use error::{OffsetError, OffsetResult};
pub use offset::{offset_solid, offset_solid_default, OffsetConfig};
