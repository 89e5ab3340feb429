//! Triangle soup produced by slicing and iso-surface extraction

use crate::field::DataSet;
use crate::point::*;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Non-indexed triangle geometry with per-vertex attributes.
///
/// Every three consecutive positions form one triangle. Each component of
/// `data` holds one value per position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceGeometry {
    pub positions: Vec<Point3f>,
    pub data: DataSet,
}

impl SurfaceGeometry {
    pub fn new(positions: Vec<Point3f>, data: DataSet) -> Self {
        Self { positions, data }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of triangles
    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Check if the geometry has no triangles
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Sequential index buffer `0..n`
    pub fn indices(&self) -> Range<u32> {
        0..self.positions.len() as u32
    }

    /// Positions as a flat `[x0, y0, z0, x1, ...]` buffer
    pub fn flat_positions(&self) -> &[f32] {
        flatten_points(&self.positions)
    }

    /// Vertices of each triangle
    pub fn triangles(&self) -> impl Iterator<Item = [Point3f; 3]> + '_ {
        self.positions.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Non-normalized normal of each triangle
    pub fn face_normals(&self) -> Vec<Vector3f> {
        self.triangles()
            .map(|[v0, v1, v2]| (v1 - v0).cross(&(v2 - v0)))
            .collect()
    }
}
