//! Core data structures for tetraviz
//!
//! This crate provides the fundamental types shared by the slicing and
//! iso-surface algorithms: points, axis-aligned bounding boxes, planes,
//! named per-vertex fields, the input tetrahedral mesh and the triangle
//! soup produced by the algorithms.

pub mod point;
pub mod aabb;
pub mod plane;
pub mod field;
pub mod volume;
pub mod surface;
pub mod traits;
pub mod transform;
pub mod error;

pub use point::*;
pub use aabb::*;
pub use plane::*;
pub use field::*;
pub use volume::*;
pub use surface::*;
pub use traits::*;
pub use transform::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3, Matrix3, Matrix4};
