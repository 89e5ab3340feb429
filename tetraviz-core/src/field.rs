//! Per-vertex data: named fields made of named scalar components
//!
//! A mesh carries an ordered [`DataSet`]. Each [`Field`] (e.g. "velocity")
//! owns one or more [`Component`]s (e.g. "vX", "vY", "vZ"), each a flat array
//! with one value per vertex. Fields with several components also expose a
//! derived `Magnitude` pseudo-component: its range is known, but it is never
//! interpolated by the slicing and iso-surface algorithms.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Name of the derived root-sum-of-squares pseudo-component
pub const MAGNITUDE: &str = "Magnitude";

/// Closed value interval of a component
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Range of the values, `None` if there are none.
    ///
    /// NaN values are ignored.
    pub fn of(values: &[f32]) -> Option<Self> {
        values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some(Self::new(v, v)),
                Some(r) => Some(Self::new(r.min.min(v), r.max.max(v))),
            })
    }

    pub fn midpoint(&self) -> f32 {
        (self.min + self.max) / 2.0
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// One scalar array with its name and value range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    pub array: Vec<f32>,
    range: ValueRange,
}

impl Component {
    /// Create a component, scanning the array for its range
    pub fn new(name: impl Into<String>, array: Vec<f32>) -> Self {
        let range = ValueRange::of(&array).unwrap_or(ValueRange::new(0.0, 0.0));
        Self {
            name: name.into(),
            array,
            range,
        }
    }

    /// Create a component with a precomputed range
    pub fn with_range(name: impl Into<String>, array: Vec<f32>, range: ValueRange) -> Self {
        Self {
            name: name.into(),
            array,
            range,
        }
    }

    pub fn range(&self) -> ValueRange {
        self.range
    }

    pub fn min(&self) -> f32 {
        self.range.min
    }

    pub fn max(&self) -> f32 {
        self.range.max
    }

    pub fn len(&self) -> usize {
        self.array.len()
    }

    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }
}

/// A named group of components, e.g. a vector field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub components: Vec<Component>,
    magnitude: Option<ValueRange>,
}

impl Field {
    /// Create a field. The magnitude range is computed when there is more
    /// than one component.
    pub fn new(name: impl Into<String>, components: Vec<Component>) -> Self {
        let mut field = Self {
            name: name.into(),
            components,
            magnitude: None,
        };
        if field.components.len() > 1 {
            field.magnitude = ValueRange::of(&field.magnitude_array());
        }
        field
    }

    /// Single-component field
    pub fn scalar(name: impl Into<String>, array: Vec<f32>) -> Self {
        let name = name.into();
        Self::new(name.clone(), vec![Component::new(name, array)])
    }

    pub fn component(&self, name: &str) -> Result<&Component> {
        if name == MAGNITUDE {
            return Err(Error::MagnitudeUnsupported);
        }
        self.components
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| Error::UnknownComponent {
                field: self.name.clone(),
                component: name.to_string(),
            })
    }

    /// Range of the derived magnitude, if the field has one
    pub fn magnitude_range(&self) -> Option<ValueRange> {
        self.magnitude
    }

    /// Root-sum-of-squares of all components, per vertex
    pub fn magnitude_array(&self) -> Vec<f32> {
        let len = self.components.iter().map(|c| c.len()).min().unwrap_or(0);
        (0..len)
            .map(|i| {
                self.components
                    .iter()
                    .map(|c| c.array[i] * c.array[i])
                    .sum::<f32>()
                    .sqrt()
            })
            .collect()
    }

    /// Component names, with `Magnitude` appended when the field has one
    pub fn component_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.components.iter().map(|c| c.name.as_str()).collect();
        if self.magnitude.is_some() {
            names.push(MAGNITUDE);
        }
        names
    }
}

/// Ordered collection of fields attached to the vertices of a mesh
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSet {
    pub fields: Vec<Field>,
}

impl DataSet {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> Result<&Field> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| Error::UnknownField(name.to_string()))
    }

    pub fn component(&self, field: &str, component: &str) -> Result<&Component> {
        self.field(field)?.component(component)
    }

    /// Range of a component, `Magnitude` included
    pub fn component_range(&self, field: &str, component: &str) -> Result<ValueRange> {
        let f = self.field(field)?;
        if component == MAGNITUDE {
            return f.magnitude_range().ok_or_else(|| Error::UnknownComponent {
                field: field.to_string(),
                component: component.to_string(),
            });
        }
        Ok(f.component(component)?.range())
    }

    /// Every interpolable array: field order, then component order
    pub fn component_arrays(&self) -> impl Iterator<Item = &[f32]> {
        self.fields
            .iter()
            .flat_map(|f| f.components.iter().map(|c| c.array.as_slice()))
    }

    /// Number of interpolable arrays
    pub fn component_count(&self) -> usize {
        self.fields.iter().map(|f| f.components.len()).sum()
    }

    /// Build the data description of derived geometry.
    ///
    /// `arrays` must be in [`DataSet::component_arrays`] order. Names, value
    /// ranges and magnitude ranges are copied forward from `self` so that
    /// color mapping keeps the bounds of the source mesh.
    pub fn derive(&self, arrays: Vec<Vec<f32>>) -> Result<DataSet> {
        if arrays.len() != self.component_count() {
            return Err(Error::InvalidData(format!(
                "expected {} interpolated arrays, got {}",
                self.component_count(),
                arrays.len()
            )));
        }

        let mut arrays = arrays.into_iter();
        let fields = self
            .fields
            .iter()
            .map(|field| Field {
                name: field.name.clone(),
                components: field
                    .components
                    .iter()
                    .zip(arrays.by_ref())
                    .map(|(c, array)| Component::with_range(c.name.clone(), array, c.range))
                    .collect(),
                magnitude: field.magnitude,
            })
            .collect();

        Ok(DataSet { fields })
    }
}
