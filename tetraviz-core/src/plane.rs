//! Cutting planes

use crate::point::*;
use serde::{Deserialize, Serialize};

/// A plane given by a point on it and a normal vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub origin: Point3f,
    pub normal: Vector3f,
}

impl Plane {
    /// Create a plane from a point and a normal
    pub fn new(origin: Point3f, normal: Vector3f) -> Self {
        Self { origin, normal }
    }

    /// Build the plane `a*X + b*Y + c*Z + d = 0`.
    ///
    /// The origin is taken on the first axis with a non-zero coefficient.
    /// The normal is `(a, b, c)` as given, not normalized.
    pub fn from_equation(a: f32, b: f32, c: f32, d: f32) -> Self {
        let origin = if a != 0.0 {
            Point3f::new(-d / a, 0.0, 0.0)
        } else if b != 0.0 {
            Point3f::new(0.0, -d / b, 0.0)
        } else if c != 0.0 {
            Point3f::new(0.0, 0.0, -d / c)
        } else {
            Point3f::origin()
        };

        Self {
            origin,
            normal: Vector3f::new(a, b, c),
        }
    }

    /// Signed distance from a point, in units of the normal's length
    pub fn signed_distance(&self, point: &Point3f) -> f32 {
        (point - self.origin).dot(&self.normal)
    }
}

impl Default for Plane {
    fn default() -> Self {
        Self::new(Point3f::origin(), Vector3f::new(1.0, 0.0, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_equation_origin_selection() {
        let plane = Plane::from_equation(2.0, 1.0, 0.0, -1.0);
        assert_relative_eq!(plane.origin, Point3f::new(0.5, 0.0, 0.0));

        let plane = Plane::from_equation(0.0, 4.0, 1.0, 2.0);
        assert_relative_eq!(plane.origin, Point3f::new(0.0, -0.5, 0.0));

        let plane = Plane::from_equation(0.0, 0.0, -2.0, 3.0);
        assert_relative_eq!(plane.origin, Point3f::new(0.0, 0.0, 1.5));

        let plane = Plane::from_equation(0.0, 0.0, 0.0, 3.0);
        assert_eq!(plane.origin, Point3f::origin());
    }

    #[test]
    fn test_signed_distance() {
        let plane = Plane::from_equation(1.0, 0.0, 0.0, -0.5);
        assert_relative_eq!(plane.signed_distance(&Point3f::new(1.0, 3.0, 3.0)), 0.5);
        assert_relative_eq!(plane.signed_distance(&Point3f::new(0.0, 3.0, 3.0)), -0.5);
    }
}
