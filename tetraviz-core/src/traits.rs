//! Core traits for tetraviz

use crate::{aabb::Aabb, point::*, surface::SurfaceGeometry, volume::VolumeMesh};

/// Trait for geometry with a spatial extent
pub trait Bounded {
    /// Positions spanning the geometry
    fn positions(&self) -> &[Point3f];

    /// Get the bounding box of the object, `None` when it has no points
    fn bounding_box(&self) -> Option<Aabb> {
        Aabb::from_points(self.positions())
    }

    /// Get the center point of the object
    fn center(&self) -> Point3f {
        self.bounding_box()
            .map_or(Point3f::origin(), |aabb| aabb.compute_center())
    }
}

impl Bounded for VolumeMesh {
    fn positions(&self) -> &[Point3f] {
        &self.vertices
    }
}

impl Bounded for SurfaceGeometry {
    fn positions(&self) -> &[Point3f] {
        &self.positions
    }
}
