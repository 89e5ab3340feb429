//! Per-kind block state and geometry production

use crate::block::{BlockKind, BlockOutput, EffectParameter};
use crate::input::Input;
use std::sync::Arc;
use tetraviz_algorithms::{IsoSurfaceUtils, OctreeConfig, SliceUtils, ThresholdUtils};
use tetraviz_core::{Error, Result, SurfaceGeometry, Vector3f, VolumeMesh};

/// A triangle soup as a mesh children can read
fn surface_mesh(surface: &SurfaceGeometry) -> Result<VolumeMesh> {
    let faces = (0..surface.triangle_count() as u32)
        .map(|t| [3 * t, 3 * t + 1, 3 * t + 2])
        .collect();
    VolumeMesh::new(surface.positions.clone(), faces, None, surface.data.clone())
}

fn plane_normal(normal: Vector3f) -> Vector3f {
    if normal == Vector3f::zeros() {
        Vector3f::new(1.0, 0.0, 0.0)
    } else {
        normal
    }
}

/// Product of two visibility masks
fn combine_alpha(parent: Option<&[f32]>, alpha: Vec<f32>) -> Vec<f32> {
    match parent {
        Some(parent) => parent.iter().zip(alpha).map(|(a, b)| a * b).collect(),
        None => alpha,
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SliceEffect {
    normal: Vector3f,
    position: f32,
    slicer: Option<SliceUtils>,
}

#[derive(Debug, Clone)]
pub(crate) struct IsoSurfaceEffect {
    value: f32,
    input: Option<Input>,
    iso: Option<IsoSurfaceUtils>,
}

#[derive(Debug, Clone)]
pub(crate) struct ThresholdEffect {
    bounds: Option<(f32, f32)>,
    input: Option<Input>,
    threshold: Option<ThresholdUtils>,
}

#[derive(Debug, Clone)]
pub(crate) struct ClipPlaneEffect {
    normal: Vector3f,
    position: f32,
    slicer: Option<SliceUtils>,
}

#[derive(Debug, Clone)]
pub(crate) struct WarpEffect {
    factor: f32,
    input: Option<Input>,
    displacement: Vec<Vector3f>,
}

/// State of a block, one variant per [`BlockKind`]
#[derive(Debug, Clone)]
pub(crate) enum Effect {
    Data,
    Slice(SliceEffect),
    IsoSurface(IsoSurfaceEffect),
    Threshold(ThresholdEffect),
    ClipPlane(ClipPlaneEffect),
    Warp(WarpEffect),
}

impl Effect {
    /// A block with default parameters, not bound to a parent yet
    pub(crate) fn new(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Data => Effect::Data,
            BlockKind::Slice => Effect::Slice(SliceEffect {
                normal: Vector3f::new(1.0, 0.0, 0.0),
                position: 0.0,
                slicer: None,
            }),
            BlockKind::IsoSurface => Effect::IsoSurface(IsoSurfaceEffect {
                value: 0.0,
                input: None,
                iso: None,
            }),
            BlockKind::Threshold => Effect::Threshold(ThresholdEffect {
                bounds: None,
                input: None,
                threshold: None,
            }),
            BlockKind::ClipPlane => Effect::ClipPlane(ClipPlaneEffect {
                normal: Vector3f::new(1.0, 0.0, 0.0),
                position: 0.0,
                slicer: None,
            }),
            BlockKind::Warp => Effect::Warp(WarpEffect {
                factor: 1.0,
                input: None,
                displacement: Vec::new(),
            }),
        }
    }

    pub(crate) fn kind(&self) -> BlockKind {
        match self {
            Effect::Data => BlockKind::Data,
            Effect::Slice(_) => BlockKind::Slice,
            Effect::IsoSurface(_) => BlockKind::IsoSurface,
            Effect::Threshold(_) => BlockKind::Threshold,
            Effect::ClipPlane(_) => BlockKind::ClipPlane,
            Effect::Warp(_) => BlockKind::Warp,
        }
    }

    /// (Re)build the helpers of the block on a new parent output
    pub(crate) fn bind(&mut self, parent: &BlockOutput, config: &OctreeConfig) -> Result<()> {
        let kind = self.kind();
        match self {
            Effect::Data => {}
            Effect::Slice(slice) => {
                slice.slicer = Some(SliceUtils::with_config(Arc::clone(&parent.mesh), parent.deformed, config)?);
            }
            Effect::ClipPlane(clip) => {
                clip.slicer = Some(SliceUtils::with_config(Arc::clone(&parent.mesh), parent.deformed, config)?);
            }
            Effect::IsoSurface(iso_surface) => {
                let input = bound_input(iso_surface.input.as_ref(), parent, kind)?;
                let mut iso = IsoSurfaceUtils::new(Arc::clone(&parent.mesh))?;
                load_iso_input(&mut iso, &input, &parent.mesh)?;
                iso_surface.iso = Some(iso);
                iso_surface.input = Some(input);
            }
            Effect::Threshold(threshold) => {
                let input = bound_input(threshold.input.as_ref(), parent, kind)?;
                let mut utils = ThresholdUtils::new(Arc::clone(&parent.mesh), &input.data, input.scalar()?)?;
                if let Some((lower, upper)) = threshold.bounds {
                    utils.set_bounds(lower, upper)?;
                }
                threshold.threshold = Some(utils);
                threshold.input = Some(input);
            }
            Effect::Warp(warp) => {
                let input = bound_input(warp.input.as_ref(), parent, kind)?;
                warp.displacement = displacement(&input, &parent.mesh)?;
                warp.input = Some(input);
            }
        }
        Ok(())
    }

    /// Validate and store a parameter. Threshold bounds and inputs are
    /// pushed to the helpers right away so that an invalid value leaves the
    /// block untouched.
    pub(crate) fn set(&mut self, parameter: EffectParameter, parent: &BlockOutput) -> Result<()> {
        let kind = self.kind();
        match (self, parameter) {
            (Effect::Slice(slice), EffectParameter::SliceNormal(normal)) => {
                slice.normal = plane_normal(normal);
            }
            (Effect::Slice(slice), EffectParameter::SlicePosition(position)) => {
                slice.position = position;
            }
            (Effect::ClipPlane(clip), EffectParameter::PlaneNormal(normal)) => {
                clip.normal = plane_normal(normal);
            }
            (Effect::ClipPlane(clip), EffectParameter::PlanePosition(position)) => {
                clip.position = position;
            }
            (Effect::IsoSurface(iso_surface), EffectParameter::IsoValue(value)) => {
                iso_surface.value = value;
            }
            (Effect::IsoSurface(iso_surface), EffectParameter::Input { data, components }) => {
                let input = Input::new(data, components);
                input.check(kind)?;
                let iso = iso_surface.iso.as_mut().ok_or(Error::IsoSurfaceNotInitialized)?;
                load_iso_input(iso, &input, &parent.mesh)?;
                iso_surface.input = Some(input);
            }
            (Effect::Threshold(threshold), EffectParameter::LowerBound(lower)) => {
                let utils = threshold_utils(&mut threshold.threshold)?;
                utils.set_lower_bound(lower)?;
                threshold.bounds = Some((utils.lower_bound(), utils.upper_bound()));
            }
            (Effect::Threshold(threshold), EffectParameter::UpperBound(upper)) => {
                let utils = threshold_utils(&mut threshold.threshold)?;
                utils.set_upper_bound(upper)?;
                threshold.bounds = Some((utils.lower_bound(), utils.upper_bound()));
            }
            (Effect::Threshold(threshold), EffectParameter::Input { data, components }) => {
                let input = Input::new(data, components);
                input.check(kind)?;
                threshold_utils(&mut threshold.threshold)?.set_input(&input.data, input.scalar()?)?;
                threshold.input = Some(input);
            }
            (Effect::Warp(warp), EffectParameter::WarpFactor(factor)) => {
                warp.factor = factor;
            }
            (Effect::Warp(warp), EffectParameter::Input { data, components }) => {
                let input = Input::new(data, components);
                input.check(kind)?;
                warp.displacement = displacement(&input, &parent.mesh)?;
                warp.input = Some(input);
            }
            (_, parameter) => return Err(parameter.unsupported(kind)),
        }
        Ok(())
    }

    /// Compute the output of the block from the output of its parent
    pub(crate) fn output(&mut self, parent: &BlockOutput) -> Result<BlockOutput> {
        match self {
            Effect::Data => Ok(parent.clone()),
            Effect::Slice(slice) => {
                let slicer = slice.slicer.as_mut().ok_or(Error::MissingTetrahedra)?;
                let n = slice.normal;
                let surface = slicer.create_slice(n.x, n.y, n.z, slice.position)?;
                slice.normal = slicer.normal();
                Ok(BlockOutput {
                    mesh: Arc::new(surface_mesh(&surface)?),
                    deformed: false,
                    alpha: None,
                    surfaces: vec![surface],
                })
            }
            Effect::IsoSurface(iso_surface) => {
                let iso = iso_surface.iso.as_mut().ok_or(Error::IsoSurfaceNotInitialized)?;
                let surface = iso.create_iso_surface(iso_surface.value)?;
                Ok(BlockOutput {
                    mesh: Arc::new(surface_mesh(&surface)?),
                    deformed: parent.deformed,
                    alpha: None,
                    surfaces: vec![surface],
                })
            }
            Effect::Threshold(threshold) => {
                let utils = threshold_utils(&mut threshold.threshold)?;
                let surfaces = utils
                    .lower_surface()
                    .into_iter()
                    .chain(utils.upper_surface())
                    .cloned()
                    .collect();
                Ok(BlockOutput {
                    mesh: Arc::clone(&parent.mesh),
                    deformed: parent.deformed,
                    alpha: Some(combine_alpha(parent.alpha.as_deref(), utils.alpha())),
                    surfaces,
                })
            }
            Effect::ClipPlane(clip) => {
                let slicer = clip.slicer.as_mut().ok_or(Error::MissingTetrahedra)?;
                let n = clip.normal;
                slicer.update_plane(n.x, n.y, n.z, clip.position)?;
                clip.normal = slicer.normal();

                let surfaces = if slicer.is_enabled() {
                    vec![slicer.create_slice(n.x, n.y, n.z, clip.position)?]
                } else {
                    Vec::new()
                };
                let alpha = parent
                    .mesh
                    .vertices
                    .iter()
                    .map(|p| if clip.normal.dot(&p.coords) <= clip.position { 1.0 } else { 0.0 })
                    .collect();

                Ok(BlockOutput {
                    mesh: Arc::clone(&parent.mesh),
                    deformed: parent.deformed,
                    alpha: Some(combine_alpha(parent.alpha.as_deref(), alpha)),
                    surfaces,
                })
            }
            Effect::Warp(warp) => {
                let source = &parent.mesh;
                let vertices = source
                    .vertices
                    .iter()
                    .zip(&warp.displacement)
                    .map(|(p, d)| p + d * warp.factor)
                    .collect();
                let mesh = VolumeMesh::new(
                    vertices,
                    source.faces.clone(),
                    source.tetrahedra.clone(),
                    source.data.clone(),
                )?;
                Ok(BlockOutput {
                    mesh: Arc::new(mesh),
                    deformed: true,
                    alpha: parent.alpha.clone(),
                    surfaces: Vec::new(),
                })
            }
        }
    }

    pub(crate) fn plane(&self) -> Option<(Vector3f, f32)> {
        match self {
            Effect::Slice(slice) => Some((slice.normal, slice.position)),
            Effect::ClipPlane(clip) => Some((clip.normal, clip.position)),
            _ => None,
        }
    }

    pub(crate) fn position_range(&self) -> Option<(f32, f32)> {
        let slicer = match self {
            Effect::Slice(slice) => slice.slicer.as_ref(),
            Effect::ClipPlane(clip) => clip.slicer.as_ref(),
            _ => None,
        }?;
        Some((slicer.pos_min(), slicer.pos_max()))
    }

    pub(crate) fn iso_value(&self) -> Option<f32> {
        match self {
            Effect::IsoSurface(iso_surface) => Some(iso_surface.value),
            _ => None,
        }
    }

    pub(crate) fn threshold_bounds(&self) -> Option<(f32, f32)> {
        match self {
            Effect::Threshold(threshold) => threshold
                .threshold
                .as_ref()
                .map(|utils| (utils.lower_bound(), utils.upper_bound())),
            _ => None,
        }
    }

    pub(crate) fn warp_factor(&self) -> Option<f32> {
        match self {
            Effect::Warp(warp) => Some(warp.factor),
            _ => None,
        }
    }

    pub(crate) fn input(&self) -> Option<&Input> {
        match self {
            Effect::IsoSurface(iso_surface) => iso_surface.input.as_ref(),
            Effect::Threshold(threshold) => threshold.input.as_ref(),
            Effect::Warp(warp) => warp.input.as_ref(),
            _ => None,
        }
    }
}

/// The stored input if it still applies to the parent data, else the
/// default one
fn bound_input(stored: Option<&Input>, parent: &BlockOutput, kind: BlockKind) -> Result<Input> {
    let data = &parent.mesh.data;
    let input = match stored {
        Some(input) if data.field(&input.data).is_ok() => input.clone(),
        _ => {
            let arity = kind
                .input_arity()
                .ok_or_else(|| Error::Unsupported(format!("{} blocks take no input", kind)))?;
            Input::default_for(data, arity)?
        }
    };
    input.check(kind)?;
    Ok(input)
}

fn load_iso_input(iso: &mut IsoSurfaceUtils, input: &Input, mesh: &VolumeMesh) -> Result<()> {
    let component = mesh.data.component(&input.data, input.scalar()?)?;
    iso.update_input(component.array.clone(), component.min(), component.max())
}

fn threshold_utils(threshold: &mut Option<ThresholdUtils>) -> Result<&mut ThresholdUtils> {
    threshold
        .as_mut()
        .ok_or_else(|| Error::InvalidInput("threshold input is not set".to_string()))
}

fn displacement(input: &Input, mesh: &VolumeMesh) -> Result<Vec<Vector3f>> {
    let arrays = input.arrays(&mesh.data, mesh.vertex_count())?;
    match arrays.as_slice() {
        [x, y, z] => Ok(x
            .iter()
            .zip(y)
            .zip(z)
            .map(|((&x, &y), &z)| Vector3f::new(x, y, z))
            .collect()),
        _ => Err(Error::InvalidInput(format!(
            "warp needs a 3 dimension(s) input but got {}",
            arrays.len()
        ))),
    }
}
