//! Mesh builders shared by the integration tests

#![allow(dead_code)]

use std::sync::Arc;
use tetraviz_core::{Component, DataSet, Field, Point3f, VolumeMesh};

/// The six tetrahedra of a cube split along its main diagonal, as corner
/// bit masks (x = 1, y = 2, z = 4)
const CUBE_TETRAHEDRA: [[usize; 4]; 6] = [
    [0, 1, 3, 7],
    [0, 1, 5, 7],
    [0, 2, 3, 7],
    [0, 2, 6, 7],
    [0, 4, 5, 7],
    [0, 4, 6, 7],
];

/// Vertices of an `n`×`n`×`n` grid of cubes spanning the unit cube
pub fn grid_vertices(n: usize) -> Vec<Point3f> {
    let step = 1.0 / n as f32;
    let mut vertices = Vec::with_capacity((n + 1).pow(3));
    for k in 0..=n {
        for j in 0..=n {
            for i in 0..=n {
                vertices.push(Point3f::new(i as f32 * step, j as f32 * step, k as f32 * step));
            }
        }
    }
    vertices
}

/// Tetrahedra of an `n`×`n`×`n` grid, six per cube
pub fn grid_tetrahedra(n: usize) -> Vec<[u32; 4]> {
    let side = n + 1;
    let index = |i: usize, j: usize, k: usize| (i + j * side + k * side * side) as u32;
    let mut tetrahedra = Vec::with_capacity(6 * n * n * n);
    for k in 0..n {
        for j in 0..n {
            for i in 0..n {
                let corner = |bits: usize| index(i + (bits & 1), j + ((bits >> 1) & 1), k + ((bits >> 2) & 1));
                for tetra in &CUBE_TETRAHEDRA {
                    tetrahedra.push(tetra.map(&corner));
                }
            }
        }
    }
    tetrahedra
}

/// Grid mesh with a scalar field `f` evaluated at the vertices and a
/// constant two-component field
pub fn grid_mesh(n: usize, f: impl Fn(&Point3f) -> f32) -> Arc<VolumeMesh> {
    let vertices = grid_vertices(n);
    let values: Vec<f32> = vertices.iter().map(&f).collect();
    let count = vertices.len();
    let data = DataSet::new(vec![
        Field::scalar("f", values),
        Field::new(
            "velocity",
            vec![
                Component::new("vX", vec![1.0; count]),
                Component::new("vY", vec![-2.0; count]),
            ],
        ),
    ]);
    Arc::new(VolumeMesh::from_tetrahedra(vertices, grid_tetrahedra(n), data).expect("valid grid mesh"))
}

/// Grid mesh with explicit per-vertex values
pub fn grid_mesh_with_values(n: usize, values: Vec<f32>) -> Arc<VolumeMesh> {
    let data = DataSet::new(vec![Field::scalar("f", values)]);
    Arc::new(VolumeMesh::from_tetrahedra(grid_vertices(n), grid_tetrahedra(n), data).expect("valid grid mesh"))
}

/// Triangles as sortable bit patterns, for order-independent comparison
pub fn triangle_keys(positions: &[Point3f]) -> Vec<[u32; 9]> {
    let mut keys: Vec<[u32; 9]> = positions
        .chunks_exact(3)
        .map(|t| {
            let mut key = [0u32; 9];
            for (v, p) in t.iter().enumerate() {
                for axis in 0..3 {
                    key[v * 3 + axis] = p[axis].to_bits();
                }
            }
            key
        })
        .collect();
    keys.sort_unstable();
    keys
}
