//! # Tetraviz Pipeline
//!
//! Composition of effects over a tetrahedral mesh as a tree of blocks.
//!
//! The root of a [`BlockTree`] is the data block holding the input mesh.
//! Every other block reads the output of its parent: a slice or an
//! iso-surface produces new geometry, a threshold or a clip plane keeps the
//! parent geometry and adds per-vertex visibility, a warp displaces the
//! vertices along a vector input.
//!
//! ```no_run
//! use tetraviz_core::{DataSet, Field, Point3f, Vector3f, VolumeMesh};
//! use tetraviz_pipeline::{BlockKind, BlockTree, EffectParameter};
//!
//! # fn main() -> tetraviz_core::Result<()> {
//! let vertices = vec![
//!     Point3f::new(0.0, 0.0, 0.0),
//!     Point3f::new(1.0, 0.0, 0.0),
//!     Point3f::new(0.0, 1.0, 0.0),
//!     Point3f::new(0.0, 0.0, 1.0),
//! ];
//! let data = DataSet::new(vec![Field::scalar("t", vec![0.0, 1.0, 2.0, 3.0])]);
//! let mesh = VolumeMesh::from_tetrahedra(vertices, vec![[0, 1, 2, 3]], data)?;
//!
//! let mut tree = BlockTree::new(mesh);
//! let slice = tree.add_block(tree.root(), BlockKind::Slice)?;
//! tree.apply(slice, EffectParameter::SliceNormal(Vector3f::new(0.0, 0.0, 1.0)))?;
//! tree.apply(slice, EffectParameter::SlicePosition(0.5))?;
//! println!("{} triangles", tree.output(slice)?.surfaces[0].triangle_count());
//! # Ok(())
//! # }
//! ```

pub mod block;
pub mod input;
pub mod tree;
mod effect;

pub use block::*;
pub use input::*;
pub use tree::*;
