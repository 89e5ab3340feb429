//! Tetrahedral mesh with an octree over its cells, and planar slicing

use crate::geometry::{compute_tetra_aabb, intersection_segment_plane, lerp, normal_non_unit, TETRA_EDGES};
use crate::octree::{Octree, OctreeConfig};
use crate::soup::{EdgeCuts, SoupBuilder};
use std::sync::Arc;
use tetraviz_core::{Aabb, Error, Plane, Point3f, Result, SurfaceGeometry, Transform3D, Vector3f, VolumeMesh};
use tracing::{debug, instrument};

/// A tetrahedral mesh ready to be sliced.
///
/// Holds the mesh bounds, one [`Aabb`] per tetrahedron and an [`Octree`]
/// over them. The mesh may be placed in world space with [`TetraMesh::move_to`]
/// and [`TetraMesh::set_scale`]; cutting planes are given in world space and
/// brought back to mesh space before slicing.
#[derive(Debug, Clone)]
pub struct TetraMesh {
    mesh: Arc<VolumeMesh>,
    bounds: Aabb,
    center: Point3f,
    tetra_aabbs: Vec<Aabb>,
    octree: Octree,
    scale: f32,
    offset: Vector3f,
}

impl TetraMesh {
    /// Build the tetra mesh with the default octree configuration
    pub fn new(mesh: Arc<VolumeMesh>) -> Result<Self> {
        Self::with_config(mesh, &OctreeConfig::default())
    }

    #[instrument(skip_all, fields(vertices = mesh.vertex_count(), tetrahedra = mesh.tetra_count()))]
    pub fn with_config(mesh: Arc<VolumeMesh>, config: &OctreeConfig) -> Result<Self> {
        let tetrahedra = mesh.tetrahedra()?;

        let bounds = Aabb::from_points(&mesh.vertices)
            .ok_or_else(|| Error::InvalidData("mesh has no vertices".to_string()))?;
        let center = bounds.compute_center();

        let tetra_aabbs: Vec<Aabb> = tetrahedra
            .iter()
            .map(|tetra| compute_tetra_aabb(&mesh.tetra_vertices(tetra)))
            .collect();
        let indices: Vec<usize> = (0..tetra_aabbs.len()).collect();
        let octree = Octree::build_with_config(&indices, &tetra_aabbs, &root_split_bound(&bounds), config);

        debug!(
            "Tetra mesh ready: {} tetrahedra, bounds {:?} .. {:?}",
            tetra_aabbs.len(),
            bounds.min,
            bounds.max
        );

        Ok(Self {
            mesh,
            bounds,
            center,
            tetra_aabbs,
            octree,
            scale: 1.0,
            offset: Vector3f::zeros(),
        })
    }

    /// Slice the mesh with the world-space plane `a*X + b*Y + c*Z + d = 0`.
    ///
    /// Every component of the mesh data is interpolated on the cut edges.
    #[instrument(skip(self))]
    pub fn make_slice(&self, a: f32, b: f32, c: f32, d: f32) -> Result<SurfaceGeometry> {
        if a == 0.0 && b == 0.0 && c == 0.0 {
            return Err(Error::InvalidPlane { a, b, c });
        }

        let plane = Plane::from_equation(a, b, c, d);
        let inverse = self
            .transform()
            .inverse()
            .ok_or_else(|| Error::InvalidData("mesh transform is not invertible".to_string()))?;
        let origin = inverse.transform_point(&plane.origin);
        let normal = inverse.transform_normal(&plane.normal.normalize()).normalize();

        let candidates = self.octree.intersect_plane(&origin, &normal);

        let tetrahedra = self.mesh.tetrahedra()?;
        let arrays: Vec<&[f32]> = self.mesh.data.component_arrays().collect();
        let mut soup = SoupBuilder::new(arrays.len());
        let mut cuts = EdgeCuts::new(arrays.len());
        let mut sliced = 0;

        for &index in &candidates {
            let ids = tetrahedra[index];
            let v = self.mesh.tetra_vertices(&ids);
            let side = v.map(|p| if normal.dot(&(origin - p)) > 0.0 { -1 } else { 1 });

            let side_sum: i32 = side.iter().sum();
            if side_sum.abs() == 4 {
                continue;
            }
            sliced += 1;

            cuts.clear();
            for &(k, l) in &TETRA_EDGES {
                if side[k] * side[l] > 0 {
                    continue;
                }
                let (point, t) = intersection_segment_plane(&v[k], &v[l], &origin, &normal);
                let length = nalgebra::distance(&v[k], &v[l]);
                let fraction = if length > 0.0 { (t / length).clamp(0.0, 1.0) } else { 0.0 };
                let (ik, il) = (ids[k] as usize, ids[l] as usize);
                cuts.push(
                    point,
                    arrays.iter().map(|array| lerp(array[ik], array[il], fraction)),
                );
            }

            if cuts.len() < 3 {
                continue;
            }
            let facing = normal_non_unit(cuts.point(0), cuts.point(1), cuts.point(2)).dot(&normal);
            if facing < 0.0 {
                soup.push_triangle(&cuts, [0, 1, 2]);
                if cuts.len() == 4 {
                    soup.push_triangle(&cuts, [1, 3, 2]);
                }
            } else {
                soup.push_triangle(&cuts, [0, 2, 1]);
                if cuts.len() == 4 {
                    soup.push_triangle(&cuts, [1, 2, 3]);
                }
            }
        }

        debug!(
            "Slice: {} candidates, {} sliced tetrahedra, {} triangles",
            candidates.len(),
            sliced,
            soup.triangle_count()
        );
        soup.finish(&self.mesh.data)
    }

    /// Translate the mesh so that its center lands on `destination`
    pub fn move_to(&mut self, destination: &Point3f) {
        self.offset = destination.coords - self.center.coords * self.scale;
    }

    /// Scale the mesh uniformly about the origin of mesh space
    pub fn set_scale(&mut self, factor: f32) -> Result<()> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "scale factor must be positive and finite, got {}",
                factor
            )));
        }
        self.scale = factor;
        Ok(())
    }

    /// Mesh-space to world-space transform
    pub fn transform(&self) -> Transform3D {
        Transform3D::from_scale_translation(self.scale, self.offset)
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Bounds of the vertices, in mesh space
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Center of the bounds, in mesh space
    pub fn center(&self) -> Point3f {
        self.center
    }

    pub fn octree(&self) -> &Octree {
        &self.octree
    }

    pub fn tetra_aabbs(&self) -> &[Aabb] {
        &self.tetra_aabbs
    }

    pub fn mesh(&self) -> &Arc<VolumeMesh> {
        &self.mesh
    }
}

/// Mesh bounds with the lower corner pushed out slightly, so that a flat
/// tetrahedron lying on the lower faces still falls in the half-open root
fn root_split_bound(bounds: &Aabb) -> Aabb {
    let mut split = bounds.clone();
    for axis in 0..3 {
        let magnitude = bounds.min[axis].abs().max(bounds.max[axis].abs());
        let pad = if magnitude > 0.0 { magnitude * 1e-6 } else { f32::EPSILON };
        split.min[axis] -= pad;
    }
    split
}
