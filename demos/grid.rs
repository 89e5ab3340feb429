//! Synthetic tetrahedral meshes shared by the demos

use rand::{rngs::StdRng, Rng, SeedableRng};
use tetraviz_core::{Component, DataSet, Field, Point3f, Result, Vector3f, VolumeMesh};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const CUBE_TETRAHEDRA: [[usize; 4]; 6] = [
    [0, 1, 3, 7],
    [0, 1, 5, 7],
    [0, 2, 3, 7],
    [0, 2, 6, 7],
    [0, 4, 5, 7],
    [0, 4, 6, 7],
];

/// Log to stderr, `RUST_LOG` overrides the default `info` filter
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

/// A `size`³ grid of cubes over `[-1, 1]³`, six tetrahedra per cube.
///
/// Fields: a noisy `pressure` decreasing away from the center and a swirling
/// `velocity` with three components.
pub fn swirl_mesh(size: usize, seed: u64) -> Result<VolumeMesh> {
    let mut rng = StdRng::seed_from_u64(seed);
    let side = size + 1;

    let mut vertices = Vec::with_capacity(side * side * side);
    for k in 0..side {
        for j in 0..side {
            for i in 0..side {
                let p = Point3f::new(i as f32, j as f32, k as f32) * (2.0 / size as f32);
                vertices.push(p - Vector3f::repeat(1.0));
            }
        }
    }

    let index = |i: usize, j: usize, k: usize| (i + j * side + k * side * side) as u32;
    let mut tetrahedra = Vec::with_capacity(6 * size * size * size);
    for k in 0..size {
        for j in 0..size {
            for i in 0..size {
                let corner = |bits: usize| index(i + (bits & 1), j + ((bits >> 1) & 1), k + ((bits >> 2) & 1));
                tetrahedra.extend(CUBE_TETRAHEDRA.iter().map(|tetra| tetra.map(&corner)));
            }
        }
    }

    let pressure = vertices
        .iter()
        .map(|p| 1.0 - p.coords.norm() + rng.gen_range(-0.01..0.01))
        .collect();
    let vx = vertices.iter().map(|p| -p.y).collect();
    let vy = vertices.iter().map(|p| p.x).collect();
    let vz = vertices.iter().map(|p| 0.2 * p.z).collect();

    let data = DataSet::new(vec![
        Field::scalar("pressure", pressure),
        Field::new(
            "velocity",
            vec![
                Component::new("vX", vx),
                Component::new("vY", vy),
                Component::new("vZ", vz),
            ],
        ),
    ]);
    VolumeMesh::from_tetrahedra(vertices, tetrahedra, data)
}
