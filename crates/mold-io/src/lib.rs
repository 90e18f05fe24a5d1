//! STL file I/O for mold meshes.
//!
//! Loads ASCII or binary STL into an [`mold_types::IndexedMesh`],
//! merging bit-identical vertices so the triangle soup becomes a
//! connected mesh, and writes either format back out.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod stl;

pub use error::{StlError, StlResult};
pub use stl::{load_stl, save_stl};
