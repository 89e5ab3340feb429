//! Planar slices of a mesh driven by a normal and a position along it

use crate::octree::OctreeConfig;
use crate::tetra_mesh::TetraMesh;
use std::sync::Arc;
use tetraviz_core::{Aabb, Error, Result, SurfaceGeometry, Vector3f, VolumeMesh};
use tracing::{debug, instrument};

/// Slicing front end.
///
/// The plane is given as `a*X + b*Y + c*Z + d = 0` with `(a, b, c)` normalized
/// on the way in, so `d` reads as a position along the normal. The range of
/// positions that cross the mesh is reported by [`SliceUtils::pos_min`] and
/// [`SliceUtils::pos_max`].
#[derive(Debug, Clone)]
pub struct SliceUtils {
    tetra_mesh: Option<Arc<TetraMesh>>,
    bounds: Aabb,
    normal: Vector3f,
    position: f32,
    pos_min: f32,
    pos_max: f32,
}

impl SliceUtils {
    /// Create the slicing front end of a mesh.
    ///
    /// Fails with `TransformedMesh` if the mesh is already deformed. A mesh
    /// without tetrahedra gets its bounds computed but cannot be sliced.
    pub fn new(mesh: Arc<VolumeMesh>, deformed: bool) -> Result<Self> {
        Self::with_config(mesh, deformed, &OctreeConfig::default())
    }

    pub fn with_config(mesh: Arc<VolumeMesh>, deformed: bool, config: &OctreeConfig) -> Result<Self> {
        if deformed {
            return Err(Error::TransformedMesh);
        }

        let (tetra_mesh, bounds) = if mesh.has_tetrahedra() {
            let tetra_mesh = TetraMesh::with_config(mesh, config)?;
            let bounds = tetra_mesh.bounds().clone();
            (Some(Arc::new(tetra_mesh)), bounds)
        } else {
            debug!("Mesh has no tetrahedra, slicing disabled");
            (None, Aabb::from_points(&mesh.vertices).unwrap_or_default())
        };

        Ok(Self {
            tetra_mesh,
            bounds,
            normal: Vector3f::new(1.0, 0.0, 0.0),
            position: 0.0,
            pos_min: -1.0,
            pos_max: 1.0,
        })
    }

    /// Set the plane and recompute the position range along its normal
    pub fn update_plane(&mut self, a: f32, b: f32, c: f32, d: f32) -> Result<()> {
        let normal = Vector3f::new(a, b, c);
        let norm = normal.norm();
        if norm == 0.0 {
            return Err(Error::InvalidPlane { a, b, c });
        }

        self.normal = normal / norm;
        self.position = d;

        let pos_min = self.normal.dot(&self.bounds.min.coords);
        let pos_max = self.normal.dot(&self.bounds.max.coords);
        (self.pos_min, self.pos_max) = if pos_min > pos_max {
            (pos_max, pos_min)
        } else {
            (pos_min, pos_max)
        };
        Ok(())
    }

    /// Slice the mesh with the plane `n · x = d`, `n` being `(a, b, c)`
    /// normalized
    #[instrument(skip(self))]
    pub fn create_slice(&mut self, a: f32, b: f32, c: f32, d: f32) -> Result<SurfaceGeometry> {
        self.update_plane(a, b, c, d)?;

        let tetra_mesh = self.tetra_mesh.as_ref().ok_or(Error::MissingTetrahedra)?;
        let n = self.normal;
        tetra_mesh.make_slice(n.x, n.y, n.z, -self.position)
    }

    /// Unit normal of the current plane
    pub fn normal(&self) -> Vector3f {
        self.normal
    }

    /// Position of the current plane along its normal
    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn pos_min(&self) -> f32 {
        self.pos_min
    }

    pub fn pos_max(&self) -> f32 {
        self.pos_max
    }

    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Whether the mesh has tetrahedra to slice
    pub fn is_enabled(&self) -> bool {
        self.tetra_mesh.is_some()
    }

    pub fn tetra_mesh(&self) -> Option<&TetraMesh> {
        self.tetra_mesh.as_deref()
    }
}
