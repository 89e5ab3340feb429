//! Iso-surface extraction on tetrahedral meshes (marching tetrahedra)
//!
//! A tetrahedron can only be crossed by the level set `f = value` if the
//! minimum of `f` on its vertices is below `value` and the maximum above.
//! Two sorted indexes of these extrema answer both questions with binary
//! searches:
//!
//! - `Emin = { t : min(t) < value }`
//! - `Emax = { t : max(t) > value }`
//!
//! and the candidates are `Emin ∩ Emax`. When the value is moved, only one
//! of the two sets is recomputed; the other one grows by the extrema that
//! lie between the previous value and the new one. That incremental state
//! lives in an [`IsoCursor`].

use crate::geometry::{interpolate_by_value, interpolate_point_by_value, normal_non_unit, TETRA_EDGES};
use crate::soup::{EdgeCuts, SoupBuilder};
use itertools::{Itertools, MinMaxResult};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tetraviz_core::{Error, Result, SurfaceGeometry, VolumeMesh};
use tracing::{debug, instrument, warn};

/// Input generations, unique across all instances. Zero means no input.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Sorted `(extremum, tetrahedron)` pairs
type ExtremumIndex = Vec<(f32, usize)>;

/// The scalar array the iso-surface is computed on, with its extremum
/// indexes
#[derive(Debug, Clone)]
struct IsoInput {
    array: Vec<f32>,
    min_index: ExtremumIndex,
    max_index: ExtremumIndex,
}

impl IsoInput {
    fn new(array: Vec<f32>, tetrahedra: &[[u32; 4]]) -> Self {
        let mut min_index = Vec::with_capacity(tetrahedra.len());
        let mut max_index = Vec::with_capacity(tetrahedra.len());
        let mut skipped = 0;

        for (tetra, ids) in tetrahedra.iter().enumerate() {
            let values = ids.map(|i| array[i as usize]);
            if values.iter().any(|v| v.is_nan()) {
                skipped += 1;
                continue;
            }
            match values.iter().copied().minmax() {
                MinMaxResult::MinMax(min, max) => {
                    min_index.push((min, tetra));
                    max_index.push((max, tetra));
                }
                MinMaxResult::OneElement(v) => {
                    min_index.push((v, tetra));
                    max_index.push((v, tetra));
                }
                MinMaxResult::NoElements => {}
            }
        }

        if skipped > 0 {
            warn!("{} tetrahedra with NaN values are left out of the iso-surface", skipped);
        }

        min_index.sort_by(|a, b| a.0.total_cmp(&b.0));
        max_index.sort_by(|a, b| a.0.total_cmp(&b.0));
        debug!("Indexed {} tetrahedra by value extrema", min_index.len());

        Self {
            array,
            min_index,
            max_index,
        }
    }

    /// Tetrahedra whose minimum is in `[from, to)`
    fn min_between(&self, from: f32, to: f32) -> impl Iterator<Item = usize> + '_ {
        let start = self.min_index.partition_point(|(m, _)| *m < from);
        let end = self.min_index.partition_point(|(m, _)| *m < to);
        self.min_index[start..end.max(start)].iter().map(|&(_, t)| t)
    }

    /// Tetrahedra whose minimum is below `value`
    fn min_below(&self, value: f32) -> Vec<usize> {
        let end = self.min_index.partition_point(|(m, _)| *m < value);
        self.min_index[..end].iter().map(|&(_, t)| t).collect()
    }

    /// Tetrahedra whose maximum is in `(from, to]`
    fn max_between(&self, from: f32, to: f32) -> impl Iterator<Item = usize> + '_ {
        let start = self.max_index.partition_point(|(m, _)| *m <= from);
        let end = self.max_index.partition_point(|(m, _)| *m <= to);
        self.max_index[start..end.max(start)].iter().map(|&(_, t)| t)
    }

    /// Tetrahedra whose maximum is above `value`
    fn max_above(&self, value: f32) -> Vec<usize> {
        let start = self.max_index.partition_point(|(m, _)| *m <= value);
        self.max_index[start..].iter().map(|&(_, t)| t).collect()
    }
}

/// State carried from one iso-surface query to the next.
///
/// A cursor is tied to the input it was last used with. Used with another
/// input, including one set later by [`IsoSurfaceUtils::update_input`] or
/// one held by another instance, it silently starts over.
#[derive(Debug, Clone, Default)]
pub struct IsoCursor {
    previous_value: Option<f32>,
    e_min: Vec<usize>,
    e_max: Vec<usize>,
    generation: u64,
}

impl IsoCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of the last query made with this cursor
    pub fn previous_value(&self) -> Option<f32> {
        self.previous_value
    }

    fn reset(&mut self, generation: u64) {
        self.previous_value = None;
        self.e_min.clear();
        self.e_max.clear();
        self.generation = generation;
    }

    /// Update `Emin` and `Emax` for `value` and return their intersection
    fn advance(&mut self, input: &IsoInput, value: f32) -> Vec<usize> {
        match self.previous_value {
            Some(previous) if value > previous => {
                self.e_min.extend(input.min_between(previous, value));
                self.e_max = input.max_above(value);
            }
            Some(previous) => {
                self.e_min = input.min_below(value);
                self.e_max.extend(input.max_between(value, previous));
            }
            None => {
                self.e_min = input.min_below(value);
                self.e_max = input.max_above(value);
            }
        }
        self.previous_value = Some(value);

        let e_max: HashSet<usize> = self.e_max.iter().copied().collect();
        self.e_min
            .iter()
            .copied()
            .filter(|t| e_max.contains(t))
            .collect()
    }
}

/// Iso-surface extraction over one scalar input of a tetrahedral mesh
#[derive(Debug, Clone)]
pub struct IsoSurfaceUtils {
    mesh: Arc<VolumeMesh>,
    input: Option<IsoInput>,
    value: Option<f32>,
    default_value: Option<f32>,
    generation: u64,
    cursor: IsoCursor,
}

impl IsoSurfaceUtils {
    pub fn new(mesh: Arc<VolumeMesh>) -> Result<Self> {
        mesh.tetrahedra()?;
        Ok(Self {
            mesh,
            input: None,
            value: None,
            default_value: None,
            generation: 0,
            cursor: IsoCursor::new(),
        })
    }

    /// Set the scalar array the surfaces are computed on.
    ///
    /// Rebuilds the extremum indexes and forgets previous queries. The value
    /// is reset to the middle of `[min_value, max_value]`.
    #[instrument(skip(self, array), fields(len = array.len()))]
    pub fn update_input(&mut self, array: Vec<f32>, min_value: f32, max_value: f32) -> Result<()> {
        if array.len() != self.mesh.vertex_count() {
            return Err(Error::InvalidData(format!(
                "iso-surface input has {} values for {} vertices",
                array.len(),
                self.mesh.vertex_count()
            )));
        }

        self.input = Some(IsoInput::new(array, self.mesh.tetrahedra()?));
        self.generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        self.cursor.reset(self.generation);

        let default_value = (min_value + max_value) / 2.0;
        self.default_value = Some(default_value);
        self.value = Some(default_value);
        Ok(())
    }

    /// Use a component of the mesh data as input, with its value range
    pub fn update_input_component(&mut self, field: &str, component: &str) -> Result<()> {
        let component = self.mesh.data.component(field, component)?;
        let (array, min, max) = (component.array.clone(), component.min(), component.max());
        self.update_input(array, min, max)
    }

    /// Compute the iso-surface for `value`, reusing the previous query
    pub fn create_iso_surface(&mut self, value: f32) -> Result<SurfaceGeometry> {
        let mut cursor = std::mem::take(&mut self.cursor);
        let result = self.create_iso_surface_with(value, &mut cursor);
        self.cursor = cursor;
        if result.is_ok() {
            self.value = Some(value);
        }
        result
    }

    /// Compute the iso-surface for `value` with a caller-owned cursor
    #[instrument(skip(self, cursor))]
    pub fn create_iso_surface_with(&self, value: f32, cursor: &mut IsoCursor) -> Result<SurfaceGeometry> {
        let input = self.input.as_ref().ok_or(Error::IsoSurfaceNotInitialized)?;

        if cursor.generation != self.generation {
            cursor.reset(self.generation);
        }
        let incremental = cursor.previous_value.is_some();
        let candidates = cursor.advance(input, value);

        let geometry = self.extract(input, value, &candidates)?;
        debug!(
            "Iso-surface at {}: {} path, {} candidates, {} triangles",
            value,
            if incremental { "incremental" } else { "fresh" },
            candidates.len(),
            geometry.triangle_count()
        );
        Ok(geometry)
    }

    /// Compute the iso-surface for `value` without any previous state
    pub fn create_iso_surface_fresh(&self, value: f32) -> Result<SurfaceGeometry> {
        self.create_iso_surface_with(value, &mut IsoCursor::new())
    }

    fn extract(&self, input: &IsoInput, value: f32, candidates: &[usize]) -> Result<SurfaceGeometry> {
        let tetrahedra = self.mesh.tetrahedra()?;
        let arrays: Vec<&[f32]> = self.mesh.data.component_arrays().collect();
        let mut soup = SoupBuilder::new(arrays.len());
        let mut cuts = EdgeCuts::new(arrays.len());

        for &index in candidates {
            let ids = tetrahedra[index];
            let d = ids.map(|i| input.array[i as usize]);
            let above = d.map(|x| x >= value);
            let below = d.map(|x| x <= value);

            cuts.clear();
            for &(k, l) in &TETRA_EDGES {
                if !((above[k] && below[l]) || (below[k] && above[l])) {
                    continue;
                }
                let (i1, i2) = (ids[k] as usize, ids[l] as usize);
                let (d1, d2) = (d[k], d[l]);
                let point = interpolate_point_by_value(
                    value,
                    d1,
                    d2,
                    &self.mesh.vertices[i1],
                    &self.mesh.vertices[i2],
                );
                cuts.push(
                    point,
                    arrays
                        .iter()
                        .map(|array| interpolate_by_value(value, d1, d2, array[i1], array[i2])),
                );
            }

            if cuts.len() < 3 {
                continue;
            }

            // Both vectors are the same cross product, so the second order
            // is always the one taken.
            let (p1, p2, p3) = (cuts.point(0), cuts.point(1), cuts.point(2));
            let reference = (p2 - p1).cross(&(p3 - p2));
            if normal_non_unit(p1, p2, p3).dot(&reference) < 0.0 {
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

        soup.finish(&self.mesh.data)
    }

    /// Value of the last surface, or the default value
    pub fn value(&self) -> Option<f32> {
        self.value
    }

    /// Middle of the input range given to `update_input`
    pub fn default_value(&self) -> Option<f32> {
        self.default_value
    }

    pub fn has_input(&self) -> bool {
        self.input.is_some()
    }

    pub fn mesh(&self) -> &Arc<VolumeMesh> {
        &self.mesh
    }
}
