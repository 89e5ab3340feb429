//! Iso-surface example for tetraviz
//!
//! This example demonstrates:
//! - Interactive iso-value sweeps reusing the previous query
//! - Threshold surfaces bounding a value interval
//! - A warp feeding an iso-surface in a block tree

mod grid;

use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use tetraviz_algorithms::{IsoSurfaceUtils, ThresholdUtils};
use tetraviz_pipeline::{BlockKind, BlockTree, EffectParameter};

fn main() -> Result<()> {
    grid::init_tracing();

    println!("tetraviz iso-surface demo");
    println!("=========================");

    let mesh = Arc::new(grid::swirl_mesh(24, 11)?);
    println!("Mesh: {} vertices, {} tetrahedra", mesh.vertex_count(), mesh.tetra_count());

    let mut iso = IsoSurfaceUtils::new(Arc::clone(&mesh))?;
    iso.update_input_component("pressure", "pressure")?;
    let range = mesh.data.component_range("pressure", "pressure")?;
    println!("\npressure in [{:.3}, {:.3}], default iso value {:?}", range.min, range.max, iso.default_value());

    // Small steps, as a slider would produce them
    let start = Instant::now();
    let mut triangles = 0;
    let steps = 40;
    for step in 0..steps {
        let value = 0.2 + 0.4 * step as f32 / steps as f32;
        triangles += iso.create_iso_surface(value)?.triangle_count();
    }
    println!(
        "Incremental sweep: {} surfaces, {} triangles in {:?}",
        steps,
        triangles,
        start.elapsed()
    );

    let start = Instant::now();
    let mut fresh_triangles = 0;
    for step in 0..steps {
        let value = 0.2 + 0.4 * step as f32 / steps as f32;
        fresh_triangles += iso.create_iso_surface_fresh(value)?.triangle_count();
    }
    println!(
        "Fresh sweep:       {} surfaces, {} triangles in {:?}",
        steps,
        fresh_triangles,
        start.elapsed()
    );

    // Everything with a pressure between the two bounds
    let mut threshold = ThresholdUtils::new(Arc::clone(&mesh), "pressure", "pressure")?;
    threshold.set_bounds(0.3, 0.6)?;
    let kept = threshold.alpha().iter().filter(|&&a| a > 0.0).count();
    println!(
        "\nThreshold [{}, {}]: {} vertices kept, bounding surfaces with {} and {} triangles",
        threshold.lower_bound(),
        threshold.upper_bound(),
        kept,
        threshold.lower_surface().map_or(0, |s| s.triangle_count()),
        threshold.upper_surface().map_or(0, |s| s.triangle_count())
    );

    // Warp the mesh along the velocity, then take the iso-surface of the
    // warped mesh
    let mut tree = BlockTree::new(Arc::unwrap_or_clone(mesh));
    let warp = tree.add_block(tree.root(), BlockKind::Warp)?;
    tree.apply(
        warp,
        EffectParameter::Input {
            data: "velocity".to_string(),
            components: vec!["vX".into(), "vY".into(), "vZ".into()],
        },
    )?;
    let surface = tree.add_block(warp, BlockKind::IsoSurface)?;
    tree.apply(surface, EffectParameter::IsoValue(0.5))?;

    println!("\nWarped iso-surface at 0.5:");
    for factor in [0.0, 0.25, 0.5] {
        tree.apply(warp, EffectParameter::WarpFactor(factor))?;
        let output = tree.output(surface)?;
        println!("  warp factor {:.2}: {} triangles", factor, output.surfaces[0].triangle_count());
    }

    Ok(())
}
