//! Slicing example for tetraviz
//!
//! This example demonstrates:
//! - Building a tetrahedral mesh with per-vertex fields
//! - Sweeping a slice plane across the mesh
//! - Slicing a moved and scaled mesh
//! - Composing a slice and a clip plane in a block tree
//!
//! Run with `RUST_LOG=tetraviz_algorithms=debug` to see the octree and
//! slicing summaries.

mod grid;

use anyhow::{Context, Result};
use std::sync::Arc;
use tetraviz_algorithms::{SliceUtils, TetraMesh};
use tetraviz_core::{Bounded, Point3f, Vector3f};
use tetraviz_pipeline::{BlockKind, BlockTree, EffectParameter};
use tracing::info;

fn main() -> Result<()> {
    grid::init_tracing();

    println!("tetraviz slicing demo");
    println!("=====================");

    let mesh = Arc::new(grid::swirl_mesh(16, 7)?);
    println!(
        "Mesh: {} vertices, {} tetrahedra, centered at {:?}",
        mesh.vertex_count(),
        mesh.tetra_count(),
        mesh.center()
    );

    // Sweep a tilted plane through the whole mesh
    let mut slicer = SliceUtils::new(Arc::clone(&mesh), false).context("building the slicer")?;
    slicer.update_plane(1.0, 1.0, 0.5, 0.0)?;
    let (pos_min, pos_max) = (slicer.pos_min(), slicer.pos_max());
    println!("\nSweeping normal {:?} over [{:.3}, {:.3}]", slicer.normal(), pos_min, pos_max);

    let steps = 8;
    for step in 0..=steps {
        let position = pos_min + (pos_max - pos_min) * step as f32 / steps as f32;
        let slice = slicer.create_slice(1.0, 1.0, 0.5, position)?;
        let pressure = slice.data.component("pressure", "pressure")?;
        println!(
            "  position {:>7.3}: {:>5} triangles, pressure in [{:.3}, {:.3}]",
            position,
            slice.triangle_count(),
            pressure.array.iter().copied().fold(f32::INFINITY, f32::min),
            pressure.array.iter().copied().fold(f32::NEG_INFINITY, f32::max),
        );
    }

    // Move the mesh and slice it in world space, the octree is not rebuilt
    let mut moved = TetraMesh::new(Arc::clone(&mesh))?;
    moved.set_scale(2.0)?;
    moved.move_to(&Point3f::new(10.0, 0.0, 0.0));
    let slice = moved.make_slice(1.0, 0.0, 0.0, -10.5)?;
    println!(
        "\nMesh scaled by {} and moved to x = 10: slice at x = 10.5 has {} triangles",
        moved.scale(),
        slice.triangle_count()
    );
    info!("Moved slice bounds: {:?}", slice.bounding_box());

    // The same cut through a block tree, with a clip plane next to it
    let mut tree = BlockTree::new(Arc::unwrap_or_clone(mesh));
    let root = tree.root();
    let slice = tree.add_block(root, BlockKind::Slice)?;
    tree.apply(slice, EffectParameter::SliceNormal(Vector3f::new(0.0, 0.0, 1.0)))?;
    tree.apply(slice, EffectParameter::SlicePosition(0.25))?;

    let clip = tree.add_block(root, BlockKind::ClipPlane)?;
    tree.apply(clip, EffectParameter::PlanePosition(-0.2))?;

    let slice_output = tree.output(slice)?;
    let clip_output = tree.output(clip)?;
    println!("\nBlock tree:");
    println!("  slice z = 0.25: {} triangles", slice_output.surfaces[0].triangle_count());
    println!(
        "  clip x <= -0.2: {} of {} vertices visible, fill has {} triangles",
        clip_output.visible_vertex_count(),
        clip_output.mesh.vertex_count(),
        clip_output.surfaces.first().map_or(0, |s| s.triangle_count())
    );

    Ok(())
}
