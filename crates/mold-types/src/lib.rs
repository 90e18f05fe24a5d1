//! Core geometric types for MoldForge.
//!
//! This crate provides the foundation every other mold crate builds on:
//!
//! - [`Vertex`] - A point in 3D space
//! - [`IndexedMesh`] - A triangle mesh with indexed vertices
//! - [`Triangle`] - A concrete triangle with vertex positions
//! - [`Aabb`] - Axis-aligned bounding box
//! - [`Plane`] - The parting plane (point + unit normal)
//! - [`MeshAdjacency`] - Edge-to-face connectivity index
//!
//! # Units
//!
//! All coordinates are `f64` millimeters.
//!
//! # Coordinate System
//!
//! Right-handed, Z up (Z is the default pour axis). Face winding is
//! **counter-clockwise when viewed from outside**, so normals point
//! outward by the right-hand rule.
//!
//! # Example
//!
//! ```
//! use mold_types::{IndexedMesh, Vertex, Point3, MeshTopology};
//!
//! let mut mesh = IndexedMesh::new();
//! mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(0.5, 1.0, 0.0));
//! mesh.faces.push([0, 1, 2]);
//!
//! assert_eq!(mesh.face_count(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod adjacency;
mod bounds;
mod mesh;
mod plane;
mod primitives;
mod traits;
mod triangle;
mod vertex;

pub use adjacency::MeshAdjacency;
pub use bounds::Aabb;
pub use mesh::IndexedMesh;
pub use plane::{Axis, Plane};
pub use primitives::{cuboid, frustum, unit_cube};
pub use traits::{MeshBounds, MeshTopology};
pub use triangle::Triangle;
pub use vertex::Vertex;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
