//! Axis-aligned bounding box

use crate::point::*;
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box defined by its min and max corners.
///
/// Boxes are mutated in place by the octree and mesh builders; use
/// [`Clone::clone`] when an independent copy is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Point3f,
    pub max: Point3f,
}

impl Aabb {
    /// Create a box from its two corners
    pub fn new(min: Point3f, max: Point3f) -> Self {
        Self { min, max }
    }

    /// An inverted box that any point or box expansion will overwrite
    pub fn empty() -> Self {
        Self {
            min: Point3f::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3f::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    /// Smallest box containing every point, `None` for an empty slice
    pub fn from_points(points: &[Point3f]) -> Option<Self> {
        let first = points.first()?;
        let mut aabb = Self::new(*first, *first);
        for p in &points[1..] {
            aabb.expand_with_point(p.x, p.y, p.z);
        }
        Some(aabb)
    }

    /// Set both corners from scalar coordinates
    pub fn set(&mut self, xmin: f32, ymin: f32, zmin: f32, xmax: f32, ymax: f32, zmax: f32) -> &mut Self {
        self.min = Point3f::new(xmin, ymin, zmin);
        self.max = Point3f::new(xmax, ymax, zmax);
        self
    }

    /// Set both corners by copying two points
    pub fn set_copy(&mut self, min: &Point3f, max: &Point3f) -> &mut Self {
        self.min = *min;
        self.max = *max;
        self
    }

    /// Copy the corners of another box into this one
    pub fn copy_from(&mut self, other: &Aabb) -> &mut Self {
        self.min = other.min;
        self.max = other.max;
        self
    }

    /// Center of the box
    pub fn compute_center(&self) -> Point3f {
        Point3f::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    /// Grow the box so that it contains the point. Never shrinks.
    pub fn expand_with_point(&mut self, x: f32, y: f32, z: f32) {
        let point = Point3f::new(x, y, z);
        self.min = self.min.inf(&point);
        self.max = self.max.sup(&point);
    }

    /// Grow the box so that it contains another box. Never shrinks.
    pub fn expand_with_aabb(&mut self, other: &Aabb) {
        self.min = self.min.inf(&other.min);
        self.max = self.max.sup(&other.max);
    }

    /// True if the two boxes are completely separated on at least one axis
    pub fn is_outside(&self, other: &Aabb) -> bool {
        (0..3).any(|i| other.min[i] > self.max[i] || other.max[i] < self.min[i])
    }

    /// True if this box lies entirely within `other`
    pub fn is_inside(&self, other: &Aabb) -> bool {
        (0..3).all(|i| self.min[i] >= other.min[i] && self.max[i] <= other.max[i])
    }

    /// Half-open containment test: `min < p <= max` on every axis.
    ///
    /// The asymmetry makes sibling octree cells partition space, a point on a
    /// shared face belongs to the lower cell only.
    pub fn point_inside(&self, point: &Point3f) -> bool {
        (0..3).all(|i| point[i] > self.min[i] && point[i] <= self.max[i])
    }

    /// Slab test against a ray given by its near point and inverted direction
    pub fn intersect_ray(&self, near: &Point3f, ray_inv: &Vector3f) -> bool {
        let t1 = (self.min.x - near.x) * ray_inv.x;
        let t2 = (self.max.x - near.x) * ray_inv.x;
        let t3 = (self.min.y - near.y) * ray_inv.y;
        let t4 = (self.max.y - near.y) * ray_inv.y;
        let t5 = (self.min.z - near.z) * ray_inv.z;
        let t6 = (self.max.z - near.z) * ray_inv.z;

        let tmin = t1.min(t2).max(t3.min(t4)).max(t5.min(t6));
        let tmax = t1.max(t2).min(t3.max(t4)).min(t5.max(t6));
        tmax >= 0.0 && tmin < tmax
    }

    /// True if the sphere overlaps the box
    pub fn intersect_sphere(&self, center: &Point3f, radius_squared: f32) -> bool {
        let mut nearest = *center;
        for i in 0..3 {
            if self.min[i] > center[i] {
                nearest[i] = self.min[i];
            } else if self.max[i] < center[i] {
                nearest[i] = self.max[i];
            }
        }
        nalgebra::distance_squared(center, &nearest) < radius_squared
    }

    /// Conservative plane test.
    ///
    /// Compares the distance from the box center to the plane with the half
    /// diagonal, so a hit only means the box *may* be crossed. `normal` must
    /// be unit length.
    pub fn intersect_plane(&self, origin: &Point3f, normal: &Vector3f) -> bool {
        let center = self.compute_center();
        let half_diagonal_sq = nalgebra::distance_squared(&self.min, &self.max) * 0.25;
        let dist_to_plane = (center - origin).dot(normal);
        dist_to_plane * dist_to_plane < half_diagonal_sq
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::new(Point3f::origin(), Point3f::origin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_box() -> Aabb {
        Aabb::new(Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_point_inside_is_half_open() {
        let aabb = unit_box();

        assert!(!aabb.point_inside(&Point3f::new(0.0, 0.0, 0.0)));
        assert!(aabb.point_inside(&Point3f::new(1.0, 1.0, 1.0)));
        assert!(aabb.point_inside(&Point3f::new(0.5, 0.5, 0.5)));
        assert!(!aabb.point_inside(&Point3f::new(0.5, 0.0, 0.5)));
        assert!(!aabb.point_inside(&Point3f::new(0.5, 1.5, 0.5)));
    }

    #[test]
    fn test_expand_never_shrinks() {
        let mut aabb = unit_box();
        aabb.expand_with_point(0.5, 0.5, 0.5);
        assert_eq!(aabb, unit_box());

        aabb.expand_with_point(-1.0, 2.0, 0.5);
        assert_eq!(aabb.min, Point3f::new(-1.0, 0.0, 0.0));
        assert_eq!(aabb.max, Point3f::new(1.0, 2.0, 1.0));

        let mut other = Aabb::empty();
        other.expand_with_aabb(&aabb);
        assert_eq!(other, aabb);
    }

    #[test]
    fn test_from_points() {
        assert!(Aabb::from_points(&[]).is_none());

        let aabb = Aabb::from_points(&[
            Point3f::new(1.0, -2.0, 3.0),
            Point3f::new(-1.0, 2.0, 0.0),
        ])
        .unwrap();
        assert_eq!(aabb.min, Point3f::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max, Point3f::new(1.0, 2.0, 3.0));
        assert_relative_eq!(aabb.compute_center(), Point3f::new(0.0, 0.0, 1.5));
    }

    #[test]
    fn test_inside_outside() {
        let outer = unit_box();
        let inner = Aabb::new(Point3f::new(0.2, 0.2, 0.2), Point3f::new(0.8, 0.8, 0.8));
        let far = Aabb::new(Point3f::new(2.0, 0.0, 0.0), Point3f::new(3.0, 1.0, 1.0));
        let touching = Aabb::new(Point3f::new(1.0, 0.0, 0.0), Point3f::new(2.0, 1.0, 1.0));

        assert!(inner.is_inside(&outer));
        assert!(!outer.is_inside(&inner));
        assert!(far.is_outside(&outer));
        assert!(!touching.is_outside(&outer));
        assert!(!inner.is_outside(&outer));
    }

    #[test]
    fn test_set_and_copy() {
        let mut aabb = Aabb::default();
        aabb.set(-1.0, -2.0, -3.0, 1.0, 2.0, 3.0);
        assert_eq!(aabb.max, Point3f::new(1.0, 2.0, 3.0));

        let mut copy = Aabb::default();
        copy.copy_from(&aabb);
        assert_eq!(copy, aabb);

        copy.set_copy(&Point3f::origin(), &Point3f::new(1.0, 1.0, 1.0));
        assert_eq!(copy, unit_box());
        // the source is untouched
        assert_eq!(aabb.min, Point3f::new(-1.0, -2.0, -3.0));
    }

    #[test]
    fn test_intersect_ray() {
        let aabb = unit_box();
        let near = Point3f::new(-1.0, 0.5, 0.5);
        let hit_dir = Vector3f::new(1.0, 0.0, 0.0);
        let inv = hit_dir.map(|c| 1.0 / c);
        assert!(aabb.intersect_ray(&near, &inv));

        let miss_dir = Vector3f::new(-1.0, 0.0, 0.0);
        let inv = miss_dir.map(|c| 1.0 / c);
        assert!(!aabb.intersect_ray(&near, &inv));
    }

    #[test]
    fn test_intersect_sphere() {
        let aabb = unit_box();
        assert!(aabb.intersect_sphere(&Point3f::new(0.5, 0.5, 0.5), 0.01));
        assert!(aabb.intersect_sphere(&Point3f::new(1.5, 0.5, 0.5), 0.3));
        assert!(!aabb.intersect_sphere(&Point3f::new(1.5, 0.5, 0.5), 0.2));
    }

    #[test]
    fn test_intersect_plane_is_conservative() {
        let aabb = unit_box();
        let normal = Vector3f::new(1.0, 0.0, 0.0);

        assert!(aabb.intersect_plane(&Point3f::new(0.5, 0.0, 0.0), &normal));
        // outside the box but within the half diagonal of the center
        assert!(aabb.intersect_plane(&Point3f::new(1.3, 0.0, 0.0), &normal));
        assert!(!aabb.intersect_plane(&Point3f::new(1.9, 0.0, 0.0), &normal));
    }
}
