//! Input selection for blocks reading data components

use crate::block::BlockKind;
use tetraviz_core::{DataSet, Error, Result, MAGNITUDE};

/// One entry of a block input: a named component or a constant
#[derive(Debug, Clone, PartialEq)]
pub enum InputComponent {
    Named(String),
    Constant(f32),
}

impl From<&str> for InputComponent {
    fn from(name: &str) -> Self {
        InputComponent::Named(name.to_string())
    }
}

impl From<f32> for InputComponent {
    fn from(value: f32) -> Self {
        InputComponent::Constant(value)
    }
}

/// Field and components a block reads
#[derive(Debug, Clone, PartialEq)]
pub struct Input {
    pub data: String,
    pub components: Vec<InputComponent>,
}

impl Input {
    pub fn new(data: impl Into<String>, components: Vec<InputComponent>) -> Self {
        Self {
            data: data.into(),
            components,
        }
    }

    /// First components of the first field, padded with zeros up to `arity`
    pub fn default_for(data: &DataSet, arity: usize) -> Result<Self> {
        let field = data
            .fields
            .first()
            .ok_or_else(|| Error::InvalidInput("the parent has no data to use as input".to_string()))?;

        let mut components: Vec<InputComponent> = field
            .components
            .iter()
            .take(arity)
            .map(|c| InputComponent::Named(c.name.clone()))
            .collect();
        components.resize(arity, InputComponent::Constant(0.0));

        Ok(Self::new(field.name.clone(), components))
    }

    /// Check the input against what a block of `kind` accepts
    pub fn check(&self, kind: BlockKind) -> Result<()> {
        let arity = kind
            .input_arity()
            .ok_or_else(|| Error::Unsupported(format!("{} blocks take no input", kind)))?;

        if self.components.is_empty() {
            return Err(Error::InvalidInput(
                "input must contain at least one component or number".to_string(),
            ));
        }
        if self.components.len() != arity {
            return Err(Error::InvalidInput(format!(
                "{} block needs a {} dimension(s) input but got {}",
                kind,
                arity,
                self.components.len()
            )));
        }
        if self
            .components
            .iter()
            .any(|c| matches!(c, InputComponent::Named(name) if name == MAGNITUDE))
        {
            return Err(Error::MagnitudeUnsupported);
        }
        Ok(())
    }

    /// The single named component of a scalar input
    pub fn scalar(&self) -> Result<&str> {
        match self.components.as_slice() {
            [InputComponent::Named(name)] => Ok(name),
            _ => Err(Error::InvalidInput(format!(
                "expected one named component of \"{}\"",
                self.data
            ))),
        }
    }

    /// One array of `len` values per component, constants expanded
    pub fn arrays(&self, data: &DataSet, len: usize) -> Result<Vec<Vec<f32>>> {
        let field = data.field(&self.data)?;
        self.components
            .iter()
            .map(|component| match component {
                InputComponent::Named(name) => Ok(field.component(name)?.array.clone()),
                InputComponent::Constant(value) => Ok(vec![*value; len]),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tetraviz_core::{Component, Field};

    fn data() -> DataSet {
        DataSet::new(vec![
            Field::new(
                "velocity",
                vec![
                    Component::new("vX", vec![1.0, 2.0]),
                    Component::new("vY", vec![3.0, 4.0]),
                ],
            ),
            Field::scalar("t", vec![0.0, 1.0]),
        ])
    }

    #[test]
    fn test_default_input() {
        let scalar = Input::default_for(&data(), 1).unwrap();
        assert_eq!(scalar, Input::new("velocity", vec!["vX".into()]));

        let vector = Input::default_for(&data(), 3).unwrap();
        assert_eq!(
            vector.components,
            vec!["vX".into(), "vY".into(), InputComponent::Constant(0.0)]
        );

        assert!(matches!(
            Input::default_for(&DataSet::default(), 1),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_check() {
        let input = Input::new("velocity", vec!["vX".into(), "vY".into()]);
        assert!(matches!(input.check(BlockKind::IsoSurface), Err(Error::InvalidInput(_))));
        assert!(matches!(input.check(BlockKind::Slice), Err(Error::Unsupported(_))));

        let magnitude = Input::new("velocity", vec![MAGNITUDE.into()]);
        assert_eq!(magnitude.check(BlockKind::Threshold), Err(Error::MagnitudeUnsupported));

        let empty = Input::new("velocity", vec![]);
        assert!(empty.check(BlockKind::Threshold).is_err());

        Input::new("t", vec!["t".into()]).check(BlockKind::Threshold).unwrap();
    }

    #[test]
    fn test_arrays() {
        let input = Input::new("velocity", vec!["vY".into(), 0.5f32.into(), "vX".into()]);
        let arrays = input.arrays(&data(), 2).unwrap();
        assert_eq!(arrays, vec![vec![3.0, 4.0], vec![0.5, 0.5], vec![1.0, 2.0]]);

        let unknown = Input::new("pressure", vec!["p".into()]);
        assert_eq!(unknown.arrays(&data(), 2), Err(Error::UnknownField("pressure".to_string())));
        assert!(Input::new("t", vec![1.0f32.into()]).scalar().is_err());
    }
}
