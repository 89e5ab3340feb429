//! Integration tests for tetraviz-algorithms
//!
//! These tests run slicing and iso-surface extraction on small structured
//! tetrahedral grids and check the geometric guarantees of the output.

mod common;

use approx::assert_relative_eq;
use common::*;
use std::collections::HashSet;
use std::sync::Arc;
use tetraviz_algorithms::*;
use tetraviz_core::{DataSet, Error, Field, Point3f, Vector3f, VolumeMesh};

fn shallow() -> OctreeConfig {
    OctreeConfig { max_depth: 3 }
}

/// Count the triangles a plane must produce, without the octree
fn expected_triangles(mesh: &VolumeMesh, origin: &Point3f, normal: &Vector3f) -> usize {
    mesh.tetrahedra()
        .unwrap()
        .iter()
        .map(|tetra| {
            let below = mesh
                .tetra_vertices(tetra)
                .iter()
                .filter(|v| normal.dot(&(origin - *v)) > 0.0)
                .count();
            match below {
                1 | 3 => 1,
                2 => 2,
                _ => 0,
            }
        })
        .sum()
}

#[test]
fn test_iso_surface_single_tetra_scenario() {
    let vertices = vec![
        Point3f::new(0.0, 0.0, 0.0),
        Point3f::new(1.0, 0.0, 0.0),
        Point3f::new(0.0, 1.0, 0.0),
        Point3f::new(0.0, 0.0, 1.0),
    ];
    let data = DataSet::new(vec![Field::scalar("f", vec![0.0, 1.0, 1.0, 1.0])]);
    let mesh = Arc::new(VolumeMesh::from_tetrahedra(vertices, vec![[0, 1, 2, 3]], data).unwrap());

    let mut iso = IsoSurfaceUtils::new(mesh).unwrap();
    iso.update_input(vec![0.0, 1.0, 1.0, 1.0], 0.0, 1.0).unwrap();
    let surface = iso.create_iso_surface(0.5).unwrap();

    assert_eq!(surface.vertex_count(), 3);
    assert_eq!(surface.indices().collect::<Vec<_>>(), vec![0, 1, 2]);
    for value in &surface.data.component("f", "f").unwrap().array {
        assert_relative_eq!(*value, 0.5);
    }
}

#[test]
fn test_bipyramid_slice_scenario() {
    let vertices = vec![
        Point3f::new(0.0, 0.0, 0.0),
        Point3f::new(0.0, 1.0, 0.0),
        Point3f::new(0.0, 0.0, 1.0),
        Point3f::new(1.0, 0.0, 0.0),
        Point3f::new(-1.0, 0.0, 0.0),
    ];
    let data = DataSet::new(vec![Field::scalar("f", vec![0.0, 0.0, 0.0, 1.0, -1.0])]);
    let mesh = VolumeMesh::from_tetrahedra(vertices, vec![[0, 1, 2, 3], [0, 1, 2, 4]], data).unwrap();
    let tetra_mesh = TetraMesh::new(Arc::new(mesh)).unwrap();

    let slice = tetra_mesh.make_slice(1.0, 0.0, 0.0, -0.5).unwrap();
    assert_eq!(slice.vertex_count(), 3);
    for p in &slice.positions {
        assert_relative_eq!(p.x, 0.5, epsilon = 1e-6);
    }
    for value in &slice.data.component("f", "f").unwrap().array {
        assert_relative_eq!(*value, 0.5, epsilon = 1e-6);
    }
}

#[test]
fn test_slice_only_crosses_straddling_tetrahedra() {
    let mesh = grid_mesh(4, |p| p.x + p.y + p.z);
    let tetra_mesh = TetraMesh::with_config(Arc::clone(&mesh), &shallow()).unwrap();

    let planes = [
        (1.0, 0.0, 0.0, -0.3),
        (0.0, 1.0, 0.0, -0.55),
        (1.0, 2.0, -0.5, -0.7),
        (-0.3, 0.4, 1.0, -0.21),
    ];
    for (a, b, c, d) in planes {
        let slice = tetra_mesh.make_slice(a, b, c, d).unwrap();
        let plane = tetraviz_core::Plane::from_equation(a, b, c, d);
        let normal = plane.normal.normalize();
        assert_eq!(
            slice.triangle_count(),
            expected_triangles(&mesh, &plane.origin, &normal),
            "plane ({}, {}, {}, {})",
            a, b, c, d
        );
        for p in &slice.positions {
            assert_relative_eq!(plane.signed_distance(p) / plane.normal.norm(), 0.0, epsilon = 1e-5);
        }
    }
}

#[test]
fn test_slice_is_deterministic() {
    let mesh = grid_mesh(3, |p| p.x * p.y - p.z);
    let tetra_mesh = TetraMesh::with_config(mesh, &shallow()).unwrap();

    let first = tetra_mesh.make_slice(0.2, 1.0, 0.3, -0.4).unwrap();
    let second = tetra_mesh.make_slice(0.2, 1.0, 0.3, -0.4).unwrap();
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn test_slice_winding_is_consistent() {
    let mesh = grid_mesh(4, |p| p.x);
    let tetra_mesh = TetraMesh::with_config(mesh, &shallow()).unwrap();

    let normal = Vector3f::new(0.3, -0.8, 0.5);
    let slice = tetra_mesh.make_slice(normal.x, normal.y, normal.z, -0.13).unwrap();
    assert!(slice.triangle_count() > 10);
    for n in slice.face_normals() {
        assert!(n.dot(&normal) <= 1e-6, "triangle normal {:?} faces the plane normal", n);
    }
}

#[test]
fn test_slice_interpolates_linear_field_exactly() {
    let mesh = grid_mesh(4, |p| p.x + 2.0 * p.y + 3.0 * p.z);
    let tetra_mesh = TetraMesh::with_config(mesh, &shallow()).unwrap();

    let slice = tetra_mesh.make_slice(1.0, 1.0, 1.0, -1.2).unwrap();
    let values = &slice.data.component("f", "f").unwrap().array;
    assert_eq!(values.len(), slice.vertex_count());
    for (p, v) in slice.positions.iter().zip(values) {
        assert_relative_eq!(*v, p.x + 2.0 * p.y + 3.0 * p.z, epsilon = 1e-4);
    }

    // constant components stay constant, and the ranges are copied forward
    let vx = slice.data.component("velocity", "vX").unwrap();
    assert!(vx.array.iter().all(|&v| v == 1.0));
    assert_eq!(slice.data.component_range("f", "f").unwrap().max, 6.0);
    assert!(slice.data.field("velocity").unwrap().magnitude_range().is_some());
}

#[test]
fn test_octree_holds_every_tetrahedron_once() {
    let mesh = grid_mesh(5, |p| p.x);
    let tetra_mesh = TetraMesh::new(Arc::clone(&mesh)).unwrap();
    let octree = tetra_mesh.octree();

    assert_eq!(octree.leaves().len(), 8usize.pow(6));

    let mut seen = HashSet::new();
    for leaf in octree.leaves() {
        for &index in leaf.indices() {
            assert!(seen.insert(index));
            let aabb = &tetra_mesh.tetra_aabbs()[index];
            assert!(leaf.split_bound().point_inside(&aabb.compute_center()));
            assert!(aabb.is_inside(leaf.loose_bound()));
        }
    }
    assert_eq!(seen.len(), mesh.tetra_count());
}

#[test]
fn test_iso_surface_of_linear_field() {
    let mesh = grid_mesh(4, |p| p.x + p.y + p.z);
    let mut iso = IsoSurfaceUtils::new(mesh).unwrap();
    iso.update_input_component("f", "f").unwrap();
    assert_relative_eq!(iso.default_value().unwrap(), 1.5);

    let surface = iso.create_iso_surface(1.1).unwrap();
    assert!(!surface.is_empty());
    for p in &surface.positions {
        assert_relative_eq!(p.x + p.y + p.z, 1.1, epsilon = 1e-5);
    }
    for v in &surface.data.component("f", "f").unwrap().array {
        assert_relative_eq!(*v, 1.1, epsilon = 1e-5);
    }
    assert_eq!(surface.data.component("velocity", "vY").unwrap().array.len(), surface.vertex_count());
}

#[test]
fn test_incremental_iso_surface_on_exact_values() {
    // Field values and queries on multiples of 0.25, so queries land on
    // vertex values and tetrahedron extrema
    let count = 4usize.pow(3);
    let values: Vec<f32> = (0..count).map(|i| ((i * 7 + 3) % 5) as f32 * 0.25).collect();
    let mesh = grid_mesh_with_values(3, values.clone());
    let mut iso = IsoSurfaceUtils::new(mesh).unwrap();
    iso.update_input(values, 0.0, 1.0).unwrap();

    for value in [0.5, 0.5, 0.75, 0.25, 0.25, 1.0, 0.0, 0.5, 0.75, 0.75, 0.0] {
        let incremental = iso.create_iso_surface(value).unwrap();
        let fresh = iso.create_iso_surface_fresh(value).unwrap();
        assert_eq!(
            triangle_keys(&incremental.positions),
            triangle_keys(&fresh.positions),
            "surfaces differ at {}",
            value
        );
    }
}

#[test]
fn test_slice_utils_front_end() {
    let mesh = grid_mesh(2, |p| p.z);
    let mut slicer = SliceUtils::with_config(mesh, false, &shallow()).unwrap();

    let slice = slicer.create_slice(0.0, 0.0, 2.0, 0.25).unwrap();
    assert_relative_eq!(slicer.normal(), Vector3f::new(0.0, 0.0, 1.0));
    assert_eq!((slicer.pos_min(), slicer.pos_max()), (0.0, 1.0));
    for v in &slice.data.component("f", "f").unwrap().array {
        assert_relative_eq!(*v, 0.25, epsilon = 1e-6);
    }
}

#[test]
fn test_errors_are_reported() {
    let mesh = grid_mesh(1, |p| p.x);
    let tetra_mesh = TetraMesh::with_config(Arc::clone(&mesh), &shallow()).unwrap();
    assert!(matches!(
        tetra_mesh.make_slice(0.0, 0.0, 0.0, 0.0),
        Err(Error::InvalidPlane { .. })
    ));

    let iso = IsoSurfaceUtils::new(Arc::clone(&mesh)).unwrap();
    assert_eq!(iso.create_iso_surface_fresh(0.5), Err(Error::IsoSurfaceNotInitialized));

    assert_eq!(
        SliceUtils::new(mesh, true).unwrap_err(),
        Error::TransformedMesh
    );
}
