//! Two-part casting mold generation.
//!
//! Given a closed solid, [`generate_mold`] produces a top and bottom
//! mold half: an offset block with the part's cavity subtracted, split
//! along a parting plane, with tapered alignment keys on the bottom
//! half, matching recesses in the top half and a pour spout through
//! the top.
//!
//! # Example
//!
//! ```
//! use mold_pipeline::{generate_mold, MoldParams};
//! use mold_types::{cuboid, Point3, Vector3};
//!
//! let part = cuboid(Point3::origin(), Vector3::new(2.0, 2.0, 2.0));
//! let halves = generate_mold(&part, &MoldParams::default())?;
//! # Ok::<(), mold_pipeline::MoldError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod config;
mod error;
mod pipeline;

pub use config::MoldParams;
pub use error::{MoldError, MoldResult};
pub use pipeline::{generate_mold, MoldHalves};
