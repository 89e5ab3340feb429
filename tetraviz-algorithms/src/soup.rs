//! Accumulation of triangle soups with per-vertex attributes

use tetraviz_core::{DataSet, Point3f, Result, SurfaceGeometry};

/// Points where a surface crosses the edges of one tetrahedron, each with
/// one value per attribute array
#[derive(Debug)]
pub(crate) struct EdgeCuts {
    points: Vec<Point3f>,
    attributes: Vec<f32>,
    stride: usize,
}

impl EdgeCuts {
    pub(crate) fn new(stride: usize) -> Self {
        Self {
            points: Vec::with_capacity(6),
            attributes: Vec::with_capacity(6 * stride),
            stride,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.points.clear();
        self.attributes.clear();
    }

    pub(crate) fn push(&mut self, point: Point3f, attributes: impl IntoIterator<Item = f32>) {
        self.points.push(point);
        self.attributes.extend(attributes);
    }

    pub(crate) fn len(&self) -> usize {
        self.points.len()
    }

    pub(crate) fn point(&self, i: usize) -> &Point3f {
        &self.points[i]
    }

    fn attributes(&self, i: usize) -> &[f32] {
        &self.attributes[i * self.stride..(i + 1) * self.stride]
    }
}

/// Growing output geometry: positions plus one array per attribute
#[derive(Debug)]
pub(crate) struct SoupBuilder {
    positions: Vec<Point3f>,
    arrays: Vec<Vec<f32>>,
}

impl SoupBuilder {
    pub(crate) fn new(array_count: usize) -> Self {
        Self {
            positions: Vec::new(),
            arrays: vec![Vec::new(); array_count],
        }
    }

    /// Append the triangle made of cut points `a`, `b` and `c`
    pub(crate) fn push_triangle(&mut self, cuts: &EdgeCuts, [a, b, c]: [usize; 3]) {
        for i in [a, b, c] {
            self.positions.push(*cuts.point(i));
            for (array, &value) in self.arrays.iter_mut().zip(cuts.attributes(i)) {
                array.push(value);
            }
        }
    }

    pub(crate) fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Finish the geometry, naming the arrays after `source`
    pub(crate) fn finish(self, source: &DataSet) -> Result<SurfaceGeometry> {
        let data = source.derive(self.arrays)?;
        Ok(SurfaceGeometry::new(self.positions, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tetraviz_core::Field;

    #[test]
    fn test_triangles_carry_attributes() {
        let source = DataSet::new(vec![Field::scalar("t", vec![0.0, 1.0])]);
        let mut cuts = EdgeCuts::new(1);
        cuts.push(Point3f::new(0.0, 0.0, 0.0), [0.1]);
        cuts.push(Point3f::new(1.0, 0.0, 0.0), [0.2]);
        cuts.push(Point3f::new(0.0, 1.0, 0.0), [0.3]);

        let mut soup = SoupBuilder::new(1);
        soup.push_triangle(&cuts, [0, 2, 1]);
        assert_eq!(soup.triangle_count(), 1);

        let geometry = soup.finish(&source).unwrap();
        assert_eq!(geometry.positions[1], Point3f::new(0.0, 1.0, 0.0));
        assert_eq!(geometry.data.component("t", "t").unwrap().array, vec![0.1, 0.3, 0.2]);

        cuts.clear();
        assert_eq!(cuts.len(), 0);
    }
}
