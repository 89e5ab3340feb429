//! Point types and flat buffer conversions

use nalgebra::{Point3, Vector3};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// View a slice of points as a flat `[x0, y0, z0, x1, ...]` buffer
pub fn flatten_points(points: &[Point3f]) -> &[f32] {
    bytemuck::cast_slice(points)
}

/// Build points from a flat coordinate buffer.
///
/// Trailing values that do not form a full triple are ignored.
pub fn points_from_flat(coords: &[f32]) -> Vec<Point3f> {
    coords
        .chunks_exact(3)
        .map(|c| Point3f::new(c[0], c[1], c[2]))
        .collect()
}
