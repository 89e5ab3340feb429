//! Tetrahedral input mesh

use crate::error::{Error, Result};
use crate::field::DataSet;
use crate::point::*;
use serde::{Deserialize, Serialize};

/// A volume mesh as ingested from a dataset.
///
/// `faces` are the boundary triangles and are carried through untouched.
/// Slicing and iso-surface extraction need `tetrahedra`.
///
/// [`VolumeMesh::new`] is the checked constructor, and deserialization goes
/// through it. The fields are public for reading; a mesh assembled by hand
/// with out-of-range indices makes the algorithms panic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "VolumeMeshParts")]
pub struct VolumeMesh {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<[u32; 3]>,
    pub tetrahedra: Option<Vec<[u32; 4]>>,
    pub data: DataSet,
}

/// Unchecked serialized form of a [`VolumeMesh`]
#[derive(Deserialize)]
struct VolumeMeshParts {
    vertices: Vec<Point3f>,
    #[serde(default)]
    faces: Vec<[u32; 3]>,
    #[serde(default)]
    tetrahedra: Option<Vec<[u32; 4]>>,
    #[serde(default)]
    data: DataSet,
}

impl TryFrom<VolumeMeshParts> for VolumeMesh {
    type Error = Error;

    fn try_from(parts: VolumeMeshParts) -> Result<Self> {
        Self::new(parts.vertices, parts.faces, parts.tetrahedra, parts.data)
    }
}

impl VolumeMesh {
    /// Create a mesh, checking every index and array length against the
    /// vertex count. Degenerate tetrahedra are accepted.
    pub fn new(
        vertices: Vec<Point3f>,
        faces: Vec<[u32; 3]>,
        tetrahedra: Option<Vec<[u32; 4]>>,
        data: DataSet,
    ) -> Result<Self> {
        let vertex_count = vertices.len();

        if let Some(face) = faces
            .iter()
            .find(|f| f.iter().any(|&i| i as usize >= vertex_count))
        {
            return Err(Error::InvalidData(format!(
                "face {:?} references a vertex out of range (vertex count {})",
                face, vertex_count
            )));
        }

        if let Some(tetra) = tetrahedra
            .iter()
            .flatten()
            .find(|t| t.iter().any(|&i| i as usize >= vertex_count))
        {
            return Err(Error::InvalidData(format!(
                "tetrahedron {:?} references a vertex out of range (vertex count {})",
                tetra, vertex_count
            )));
        }

        for field in &data.fields {
            for component in &field.components {
                if component.len() != vertex_count {
                    return Err(Error::InvalidData(format!(
                        "component {}/{} has {} values for {} vertices",
                        field.name,
                        component.name,
                        component.len(),
                        vertex_count
                    )));
                }
            }
        }

        Ok(Self {
            vertices,
            faces,
            tetrahedra,
            data,
        })
    }

    /// Create a mesh with tetrahedra and no boundary faces
    pub fn from_tetrahedra(
        vertices: Vec<Point3f>,
        tetrahedra: Vec<[u32; 4]>,
        data: DataSet,
    ) -> Result<Self> {
        Self::new(vertices, Vec::new(), Some(tetrahedra), data)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn tetra_count(&self) -> usize {
        self.tetrahedra.as_ref().map_or(0, |t| t.len())
    }

    pub fn has_tetrahedra(&self) -> bool {
        self.tetrahedra.as_ref().is_some_and(|t| !t.is_empty())
    }

    /// Tetrahedra of the mesh, or `MissingTetrahedra`
    pub fn tetrahedra(&self) -> Result<&[[u32; 4]]> {
        match &self.tetrahedra {
            Some(t) if !t.is_empty() => Ok(t),
            _ => Err(Error::MissingTetrahedra),
        }
    }

    /// Vertex positions of one tetrahedron
    pub fn tetra_vertices(&self, tetra: &[u32; 4]) -> [Point3f; 4] {
        tetra.map(|i| self.vertices[i as usize])
    }
}
