//! Threshold surfaces: the two iso-surfaces bounding a value interval

use crate::iso_surface::{IsoCursor, IsoSurfaceUtils};
use std::sync::Arc;
use tetraviz_core::{Error, Result, SurfaceGeometry, ValueRange, VolumeMesh};
use tracing::debug;

/// Keeps the part of a mesh where an input component lies in
/// `[lower_bound, upper_bound]`.
///
/// With tetrahedra, the iso-surfaces at both bounds are computed so that the
/// cut is closed. Each bound has its own cursor, so moving one bound never
/// invalidates the incremental state of the other.
#[derive(Debug, Clone)]
pub struct ThresholdUtils {
    mesh: Arc<VolumeMesh>,
    iso: Option<IsoSurfaceUtils>,
    input: Vec<f32>,
    input_range: ValueRange,
    lower_bound: f32,
    upper_bound: f32,
    lower_cursor: IsoCursor,
    upper_cursor: IsoCursor,
    lower_surface: Option<SurfaceGeometry>,
    upper_surface: Option<SurfaceGeometry>,
}

impl ThresholdUtils {
    /// Threshold on a component of the mesh data. Bounds start at the range
    /// of the component.
    pub fn new(mesh: Arc<VolumeMesh>, field: &str, component: &str) -> Result<Self> {
        let c = mesh.data.component(field, component)?;
        let (input, input_range) = (c.array.clone(), c.range());

        let iso = if mesh.has_tetrahedra() {
            Some(IsoSurfaceUtils::new(Arc::clone(&mesh))?)
        } else {
            debug!("Mesh has no tetrahedra, threshold surfaces are not computed");
            None
        };

        let mut threshold = Self {
            mesh,
            iso,
            input,
            input_range,
            lower_bound: input_range.min,
            upper_bound: input_range.max,
            lower_cursor: IsoCursor::new(),
            upper_cursor: IsoCursor::new(),
            lower_surface: None,
            upper_surface: None,
        };
        threshold.reset_input()?;
        Ok(threshold)
    }

    /// Switch to another input component, keeping the bounds
    pub fn set_input(&mut self, field: &str, component: &str) -> Result<()> {
        let c = self.mesh.data.component(field, component)?;
        self.input = c.array.clone();
        self.input_range = c.range();
        self.reset_input()
    }

    fn reset_input(&mut self) -> Result<()> {
        if let Some(iso) = &mut self.iso {
            iso.update_input(self.input.clone(), self.input_range.min, self.input_range.max)?;
        }
        self.update_lower_surface()?;
        self.update_upper_surface()
    }

    pub fn set_lower_bound(&mut self, lower_bound: f32) -> Result<()> {
        if lower_bound > self.upper_bound {
            return Err(Error::InvalidBound {
                lower: lower_bound,
                upper: self.upper_bound,
            });
        }
        self.lower_bound = lower_bound;
        self.update_lower_surface()
    }

    pub fn set_upper_bound(&mut self, upper_bound: f32) -> Result<()> {
        if upper_bound < self.lower_bound {
            return Err(Error::InvalidBound {
                lower: self.lower_bound,
                upper: upper_bound,
            });
        }
        self.upper_bound = upper_bound;
        self.update_upper_surface()
    }

    /// Move both bounds at once
    pub fn set_bounds(&mut self, lower_bound: f32, upper_bound: f32) -> Result<()> {
        if lower_bound > upper_bound {
            return Err(Error::InvalidBound {
                lower: lower_bound,
                upper: upper_bound,
            });
        }
        self.lower_bound = lower_bound;
        self.upper_bound = upper_bound;
        self.update_lower_surface()?;
        self.update_upper_surface()
    }

    fn update_lower_surface(&mut self) -> Result<()> {
        if let Some(iso) = &self.iso {
            self.lower_surface = Some(iso.create_iso_surface_with(self.lower_bound, &mut self.lower_cursor)?);
        }
        Ok(())
    }

    fn update_upper_surface(&mut self) -> Result<()> {
        if let Some(iso) = &self.iso {
            self.upper_surface = Some(iso.create_iso_surface_with(self.upper_bound, &mut self.upper_cursor)?);
        }
        Ok(())
    }

    /// Whether a value is kept by the threshold
    pub fn passes(&self, value: f32) -> bool {
        ValueRange::new(self.lower_bound, self.upper_bound).contains(value)
    }

    /// Per-vertex visibility of the mesh, `1.0` where the input passes
    pub fn alpha(&self) -> Vec<f32> {
        self.input
            .iter()
            .map(|&v| if self.passes(v) { 1.0 } else { 0.0 })
            .collect()
    }

    pub fn lower_bound(&self) -> f32 {
        self.lower_bound
    }

    pub fn upper_bound(&self) -> f32 {
        self.upper_bound
    }

    pub fn input_range(&self) -> ValueRange {
        self.input_range
    }

    /// Whether the bounding surfaces are computed
    pub fn is_cpu_computed(&self) -> bool {
        self.iso.is_some()
    }

    pub fn lower_surface(&self) -> Option<&SurfaceGeometry> {
        self.lower_surface.as_ref()
    }

    pub fn upper_surface(&self) -> Option<&SurfaceGeometry> {
        self.upper_surface.as_ref()
    }
}
