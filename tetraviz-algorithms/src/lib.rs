//! # Tetraviz Algorithms
//!
//! Geometric processing of tetrahedral meshes carrying per-vertex fields.
//!
//! This crate provides a loose octree over tetrahedra, planar slicing,
//! iso-surface extraction with incremental re-querying, and the slice and
//! threshold front ends built on top of them. Every algorithm returns a
//! fresh [`tetraviz_core::SurfaceGeometry`].

pub mod geometry;
pub mod octree;
pub mod tetra_mesh;
pub mod iso_surface;
pub mod slice;
pub mod threshold;
mod soup;

// Re-export commonly used items
pub use geometry::*;
pub use octree::*;
pub use tetra_mesh::*;
pub use iso_surface::*;
pub use slice::*;
pub use threshold::*;
