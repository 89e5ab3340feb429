//! Block identifiers, kinds, parameters and outputs

use crate::input::InputComponent;
use std::fmt;
use std::sync::Arc;
use tetraviz_core::{Error, Result, SurfaceGeometry, Vector3f, VolumeMesh};

/// Handle of a block in a [`crate::BlockTree`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub usize);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kinds of blocks a tree can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// Root block holding the input mesh
    Data,
    /// Planar cut through the tetrahedra
    Slice,
    /// Level set of one input component
    IsoSurface,
    /// Keeps the vertices whose input lies between two bounds
    Threshold,
    /// Hides one side of a plane and fills the cut
    ClipPlane,
    /// Displaces the vertices along a vector input
    Warp,
}

impl BlockKind {
    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::Data => "Data",
            BlockKind::Slice => "Slice",
            BlockKind::IsoSurface => "IsoSurface",
            BlockKind::Threshold => "Threshold",
            BlockKind::ClipPlane => "ClipPlane",
            BlockKind::Warp => "Warp",
        }
    }

    /// Number of components the block reads, if it has an input
    pub fn input_arity(&self) -> Option<usize> {
        match self {
            BlockKind::IsoSurface | BlockKind::Threshold => Some(1),
            BlockKind::Warp => Some(3),
            BlockKind::Data | BlockKind::Slice | BlockKind::ClipPlane => None,
        }
    }

    /// Check that a block of this kind can read the output of `parent`.
    ///
    /// `deformed` tells whether a warp sits somewhere above the parent.
    pub fn validate(&self, parent: &VolumeMesh, deformed: bool) -> Result<()> {
        let reason = match self {
            BlockKind::Data => Some("a data block can only be the root of a tree"),
            BlockKind::Slice if !parent.has_tetrahedra() => Some("the parent has no tetrahedra"),
            BlockKind::Slice if deformed => Some("the parent is deformed"),
            BlockKind::IsoSurface if !parent.has_tetrahedra() => Some("the parent has no tetrahedra"),
            BlockKind::ClipPlane if deformed => Some("the parent is deformed"),
            _ => None,
        };

        match reason {
            Some(reason) => Err(Error::IncompatibleParent {
                kind: self.name(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parameter change sent to a block with [`crate::BlockTree::apply`]
#[derive(Debug, Clone, PartialEq)]
pub enum EffectParameter {
    /// Slice normal, a zero vector resets it to `(1, 0, 0)`
    SliceNormal(Vector3f),
    SlicePosition(f32),
    IsoValue(f32),
    LowerBound(f32),
    UpperBound(f32),
    /// Clip plane normal, a zero vector resets it to `(1, 0, 0)`
    PlaneNormal(Vector3f),
    PlanePosition(f32),
    WarpFactor(f32),
    Input {
        data: String,
        components: Vec<InputComponent>,
    },
    /// Visibility of the block, accepted by every kind
    Visible(bool),
}

impl EffectParameter {
    pub fn name(&self) -> &'static str {
        match self {
            EffectParameter::SliceNormal(_) => "SliceNormal",
            EffectParameter::SlicePosition(_) => "SlicePosition",
            EffectParameter::IsoValue(_) => "IsoValue",
            EffectParameter::LowerBound(_) => "LowerBound",
            EffectParameter::UpperBound(_) => "UpperBound",
            EffectParameter::PlaneNormal(_) => "PlaneNormal",
            EffectParameter::PlanePosition(_) => "PlanePosition",
            EffectParameter::WarpFactor(_) => "WarpFactor",
            EffectParameter::Input { .. } => "Input",
            EffectParameter::Visible(_) => "Visible",
        }
    }

    pub(crate) fn unsupported(&self, kind: BlockKind) -> Error {
        Error::Unsupported(format!("{} is not a parameter of {} blocks", self.name(), kind))
    }
}

/// What a block hands to its children and to a renderer
#[derive(Debug, Clone)]
pub struct BlockOutput {
    /// Geometry read by the children
    pub mesh: Arc<VolumeMesh>,
    /// Whether the vertices were displaced by a warp
    pub deformed: bool,
    /// Per-vertex visibility of `mesh`, `None` when everything is visible
    pub alpha: Option<Vec<f32>>,
    /// Surfaces computed by the block: the slice or iso-surface itself, the
    /// clip plane fill, the two threshold surfaces
    pub surfaces: Vec<SurfaceGeometry>,
}

impl BlockOutput {
    /// Output of the root block
    pub fn data(mesh: Arc<VolumeMesh>) -> Self {
        Self {
            mesh,
            deformed: false,
            alpha: None,
            surfaces: Vec::new(),
        }
    }

    /// Number of visible vertices of `mesh`
    pub fn visible_vertex_count(&self) -> usize {
        match &self.alpha {
            Some(alpha) => alpha.iter().filter(|&&a| a > 0.0).count(),
            None => self.mesh.vertex_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tetraviz_core::{DataSet, Point3f};

    fn triangle_mesh() -> VolumeMesh {
        let vertices = vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
        ];
        VolumeMesh::new(vertices, vec![[0, 1, 2]], None, DataSet::default()).unwrap()
    }

    #[test]
    fn test_validate_without_tetrahedra() {
        let mesh = triangle_mesh();
        assert!(matches!(
            BlockKind::Slice.validate(&mesh, false),
            Err(Error::IncompatibleParent { kind: "Slice", .. })
        ));
        assert!(BlockKind::IsoSurface.validate(&mesh, false).is_err());
        assert!(BlockKind::Threshold.validate(&mesh, false).is_ok());
        assert!(BlockKind::ClipPlane.validate(&mesh, false).is_ok());
        assert!(BlockKind::Warp.validate(&mesh, true).is_ok());
    }

    #[test]
    fn test_validate_deformed_parent() {
        let mesh = triangle_mesh();
        assert_eq!(
            BlockKind::ClipPlane.validate(&mesh, true),
            Err(Error::IncompatibleParent {
                kind: "ClipPlane",
                reason: "the parent is deformed",
            })
        );
        assert!(BlockKind::Data.validate(&mesh, false).is_err());
    }

    #[test]
    fn test_input_arity() {
        assert_eq!(BlockKind::IsoSurface.input_arity(), Some(1));
        assert_eq!(BlockKind::Warp.input_arity(), Some(3));
        assert_eq!(BlockKind::Slice.input_arity(), None);
    }

    #[test]
    fn test_visible_vertex_count() {
        let mut output = BlockOutput::data(Arc::new(triangle_mesh()));
        assert_eq!(output.visible_vertex_count(), 3);
        output.alpha = Some(vec![1.0, 0.0, 1.0]);
        assert_eq!(output.visible_vertex_count(), 2);
    }
}
