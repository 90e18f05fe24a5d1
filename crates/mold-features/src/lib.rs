//! Alignment keys, recesses and the pour spout for two-part molds.
//!
//! Planning is pure geometry: given the cast part's bounds, the mold
//! block's bounds and the parting plane, [`plan_features`] produces
//! the key/recess frustum pairs and the spout solid, after checking
//! that every feature has room. The boolean stages downstream union
//! the keys into the bottom half and subtract recesses and spout from
//! the top.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod placement;

pub use error::{FeatureError, FeatureResult};
pub use placement::{plan_features, FeatureParams, FeaturePlan};
