//! Geometry and interpolation helpers shared by slicing and iso-surface extraction

use tetraviz_core::{Aabb, Point3f, Vector3f};

/// Vertex pairs of the six edges of a tetrahedron, in traversal order
pub const TETRA_EDGES: [(usize, usize); 6] = [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)];

/// Bounding box of a triangle
pub fn compute_triangle_aabb(v1: &Point3f, v2: &Point3f, v3: &Point3f) -> Aabb {
    Aabb::new(v1.inf(v2).inf(v3), v1.sup(v2).sup(v3))
}

/// Bounding box of a tetrahedron
pub fn compute_tetra_aabb(vertices: &[Point3f; 4]) -> Aabb {
    let [v1, v2, v3, v4] = vertices;
    Aabb::new(
        v1.inf(v2).inf(v3).inf(v4),
        v1.sup(v2).sup(v3).sup(v4),
    )
}

/// Non-normalized normal of the triangle `(v1, v2, v3)`
pub fn normal_non_unit(v1: &Point3f, v2: &Point3f, v3: &Point3f) -> Vector3f {
    (v2 - v1).cross(&(v3 - v1))
}

/// Unit normal of the triangle `(v1, v2, v3)`, zero for a degenerate triangle
pub fn normal(v1: &Point3f, v2: &Point3f, v3: &Point3f) -> Vector3f {
    let n = normal_non_unit(v1, v2, v3);
    n.try_normalize(0.0).unwrap_or_else(Vector3f::zeros)
}

/// Signed distance of `v` to the plane, in units of the normal's length
pub fn point_plane_distance(v: &Point3f, origin: &Point3f, normal: &Vector3f) -> f32 {
    (v - origin).dot(normal)
}

/// Intersection of the line through `v1` and `v2` with a plane.
///
/// Returns the point and the signed distance travelled from `v1` along the
/// unit direction `v2 - v1`. `normal` must be unit length. An edge parallel
/// to the plane yields `(v1, 0)`.
pub fn intersection_segment_plane(
    v1: &Point3f,
    v2: &Point3f,
    origin: &Point3f,
    normal: &Vector3f,
) -> (Point3f, f32) {
    let dist_to_plane = point_plane_distance(v1, origin, normal);
    let direction = (v2 - v1).try_normalize(0.0).unwrap_or_else(Vector3f::zeros);
    let dot_normals = normal.dot(&direction);
    if dot_normals == 0.0 {
        return (*v1, 0.0);
    }

    let t = -dist_to_plane / dot_normals;
    (v1 + direction * t, t)
}

/// Linear interpolation by fraction: `a + t * (b - a)`
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

/// Interpolate `x` at the point where a field goes through `value` on an
/// edge with endpoint field values `v1`, `v2`.
///
/// Returns `x1` when `v1 == v2`.
pub fn interpolate_by_value(value: f32, v1: f32, v2: f32, x1: f32, x2: f32) -> f32 {
    if v1 == v2 {
        return x1;
    }
    x1 + (value - v1) * (x2 - x1) / (v2 - v1)
}

/// Same as [`interpolate_by_value`] for a point
pub fn interpolate_point_by_value(
    value: f32,
    v1: f32,
    v2: f32,
    p1: &Point3f,
    p2: &Point3f,
) -> Point3f {
    Point3f::new(
        interpolate_by_value(value, v1, v2, p1.x, p2.x),
        interpolate_by_value(value, v1, v2, p1.y, p2.y),
        interpolate_by_value(value, v1, v2, p1.z, p2.z),
    )
}
