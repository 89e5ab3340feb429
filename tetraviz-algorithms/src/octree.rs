//! Loose octree over indexed primitives
//!
//! Each cell carries two bounds. The *split* bound decides which primitives
//! land in the cell: a primitive belongs to the cell containing the center
//! of its [`Aabb`]. The *loose* bound starts as the split bound and grows to
//! contain every primitive assigned to the cell, so culling against it never
//! misses a primitive that sticks out of its cell.
//!
//! The tree is always subdivided down to the configured depth. Primitive
//! indices are only stored in leaves.

use tetraviz_core::{Aabb, Point3f, Vector3f};
use tracing::{debug, instrument, trace};

/// Default maximum depth of the octree
pub const MAX_DEPTH: usize = 6;

/// Octant layout as (upper x, upper y, upper z) halves of the split bound
const OCTANTS: [[bool; 3]; 8] = [
    [false, false, false],
    [true, false, false],
    [true, false, true],
    [false, false, true],
    [false, true, false],
    [true, true, false],
    [true, true, true],
    [false, true, true],
];

/// Configuration for octree construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OctreeConfig {
    /// Depth of the leaves, the root being at depth 0
    pub max_depth: usize,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
        }
    }
}

/// A cell of a loose octree
#[derive(Debug, Clone)]
pub struct Octree {
    depth: usize,
    loose: Aabb,
    split: Aabb,
    indices: Vec<usize>,
    children: Option<Box<[Octree; 8]>>,
}

impl Octree {
    /// Build an octree with the default configuration.
    ///
    /// `id_aabb[i]` is the bounding box of primitive `i` and `cell_aabb` the
    /// split bound of the root.
    pub fn build(indices: &[usize], id_aabb: &[Aabb], cell_aabb: &Aabb) -> Self {
        Self::build_with_config(indices, id_aabb, cell_aabb, &OctreeConfig::default())
    }

    /// Build an octree with a custom configuration
    #[instrument(skip_all, fields(primitives = indices.len(), max_depth = config.max_depth))]
    pub fn build_with_config(
        indices: &[usize],
        id_aabb: &[Aabb],
        cell_aabb: &Aabb,
        config: &OctreeConfig,
    ) -> Self {
        let tree = Self::build_cell(0, indices, id_aabb, cell_aabb, config.max_depth);
        debug!(
            "Built octree: {} cells, {} leaves, depth {}",
            tree.cell_count(),
            tree.leaves().len(),
            config.max_depth
        );
        tree
    }

    fn build_cell(
        depth: usize,
        indices: &[usize],
        id_aabb: &[Aabb],
        cell_aabb: &Aabb,
        max_depth: usize,
    ) -> Self {
        let split = cell_aabb.clone();
        let mut loose = cell_aabb.clone();
        let mut kept = Vec::new();

        for &index in indices {
            let Some(aabb) = id_aabb.get(index) else {
                continue;
            };
            if split.point_inside(&aabb.compute_center()) {
                loose.expand_with_aabb(aabb);
                kept.push(index);
            }
        }

        let children = if depth < max_depth {
            let center = split.compute_center();
            let children: [Octree; 8] = std::array::from_fn(|i| {
                let octant = octant_aabb(&split, &center, &OCTANTS[i]);
                Self::build_cell(depth + 1, &kept, id_aabb, &octant, max_depth)
            });
            kept = Vec::new();
            Some(Box::new(children))
        } else {
            if !kept.is_empty() {
                trace!("Leaf at depth {} holds {} primitives", depth, kept.len());
            }
            None
        };

        Self {
            depth,
            loose,
            split,
            indices: kept,
            children,
        }
    }

    /// Indices of the primitives in every leaf whose loose bound may be
    /// crossed by the plane. `normal` must be unit length.
    pub fn intersect_plane(&self, origin: &Point3f, normal: &Vector3f) -> Vec<usize> {
        let mut result = Vec::new();
        self.collect(&mut result, &|aabb| aabb.intersect_plane(origin, normal));
        result
    }

    /// Indices of the primitives in every leaf whose loose bound is hit by
    /// the ray
    pub fn intersect_ray(&self, near: &Point3f, ray_inv: &Vector3f) -> Vec<usize> {
        let mut result = Vec::new();
        self.collect(&mut result, &|aabb| aabb.intersect_ray(near, ray_inv));
        result
    }

    fn collect(&self, result: &mut Vec<usize>, hit: &dyn Fn(&Aabb) -> bool) {
        if !hit(&self.loose) {
            return;
        }
        match &self.children {
            Some(children) => children.iter().for_each(|child| child.collect(result, hit)),
            None => result.extend_from_slice(&self.indices),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Bound grown to contain every primitive of the cell
    pub fn loose_bound(&self) -> &Aabb {
        &self.loose
    }

    /// Bound used to assign primitives to the cell
    pub fn split_bound(&self) -> &Aabb {
        &self.split
    }

    /// Primitives stored in the cell, always empty for internal cells
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn children(&self) -> Option<&[Octree; 8]> {
        self.children.as_deref()
    }

    /// All leaf cells, depth first
    pub fn leaves(&self) -> Vec<&Octree> {
        let mut leaves = Vec::new();
        let mut stack = vec![self];
        while let Some(cell) = stack.pop() {
            match cell.children() {
                Some(children) => stack.extend(children.iter().rev()),
                None => leaves.push(cell),
            }
        }
        leaves
    }

    /// Number of cells in the tree, root included
    pub fn cell_count(&self) -> usize {
        1 + self
            .children()
            .map_or(0, |children| children.iter().map(Octree::cell_count).sum())
    }
}

/// One eighth of `split`, cut at `center`
fn octant_aabb(split: &Aabb, center: &Point3f, upper: &[bool; 3]) -> Aabb {
    let mut min = split.min;
    let mut max = *center;
    for axis in 0..3 {
        if upper[axis] {
            min[axis] = center[axis];
            max[axis] = split.max[axis];
        }
    }
    Aabb::new(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn unit_box() -> Aabb {
        Aabb::new(Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 1.0, 1.0))
    }

    fn small_box(x: f32, y: f32, z: f32, half: f32) -> Aabb {
        Aabb::new(
            Point3f::new(x - half, y - half, z - half),
            Point3f::new(x + half, y + half, z + half),
        )
    }

    #[test]
    fn test_octants_tile_parent() {
        let split = Aabb::new(Point3f::new(-1.0, 0.0, 2.0), Point3f::new(3.0, 0.3, 2.7));
        let center = split.compute_center();

        let mut volume = 0.0;
        for octant in &OCTANTS {
            let aabb = octant_aabb(&split, &center, octant);
            assert!(aabb.is_inside(&split));
            let size = aabb.max - aabb.min;
            volume += size.x * size.y * size.z;
        }
        let size = split.max - split.min;
        approx::assert_relative_eq!(volume, size.x * size.y * size.z, epsilon = 1e-5);
    }

    #[test]
    fn test_full_subdivision() {
        let config = OctreeConfig { max_depth: 2 };
        let tree = Octree::build_with_config(&[], &[], &unit_box(), &config);

        assert_eq!(tree.cell_count(), 1 + 8 + 64);
        assert_eq!(tree.leaves().len(), 64);
        assert!(tree.leaves().iter().all(|leaf| leaf.depth() == 2 && leaf.is_leaf()));
        assert!(!tree.is_leaf());
        assert!(tree.indices().is_empty());
        assert_eq!(OctreeConfig::default().max_depth, 6);
    }

    #[test]
    fn test_each_primitive_in_exactly_one_leaf() {
        let aabbs: Vec<Aabb> = (0..50)
            .map(|i| {
                let t = i as f32 / 50.0;
                small_box(t, (t * 7.0).fract(), (t * 13.0).fract(), 0.05)
            })
            .collect();
        let indices: Vec<usize> = (0..aabbs.len()).collect();
        let root = Aabb::new(Point3f::new(-0.1, -0.1, -0.1), Point3f::new(1.1, 1.1, 1.1));
        let tree = Octree::build_with_config(&indices, &aabbs, &root, &OctreeConfig { max_depth: 3 });

        let mut seen = HashSet::new();
        for leaf in tree.leaves() {
            for &index in leaf.indices() {
                assert!(seen.insert(index), "primitive {} stored twice", index);
                assert!(leaf.split_bound().point_inside(&aabbs[index].compute_center()));
                assert!(aabbs[index].is_inside(leaf.loose_bound()));
            }
        }
        assert_eq!(seen.len(), aabbs.len());
    }

    #[test]
    fn test_loose_bound_grows() {
        let aabbs = vec![Aabb::new(Point3f::new(0.1, 0.1, 0.1), Point3f::new(0.9, 0.2, 0.2))];
        let tree = Octree::build_with_config(&[0], &aabbs, &unit_box(), &OctreeConfig { max_depth: 1 });

        let leaf = tree
            .leaves()
            .into_iter()
            .find(|leaf| !leaf.indices().is_empty())
            .unwrap();
        assert_eq!(leaf.split_bound().max.x, 0.5);
        assert_eq!(leaf.loose_bound().max.x, 0.9);
    }

    #[test]
    fn test_plane_query() {
        let aabbs = vec![small_box(0.1, 0.5, 0.5, 0.05), small_box(0.9, 0.5, 0.5, 0.05)];
        let tree = Octree::build_with_config(&[0, 1], &aabbs, &unit_box(), &OctreeConfig { max_depth: 3 });
        let normal = Vector3f::new(1.0, 0.0, 0.0);

        let hits = tree.intersect_plane(&Point3f::new(0.1, 0.0, 0.0), &normal);
        assert!(hits.contains(&0));
        assert!(!hits.contains(&1));

        let hits = tree.intersect_plane(&Point3f::new(5.0, 0.0, 0.0), &normal);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_ray_query() {
        let aabbs = vec![small_box(0.1, 0.1, 0.1, 0.05), small_box(0.9, 0.9, 0.9, 0.05)];
        let tree = Octree::build_with_config(&[0, 1], &aabbs, &unit_box(), &OctreeConfig { max_depth: 3 });

        let near = Point3f::new(-1.0, 0.1, 0.1);
        let inv = Vector3f::new(1.0, 0.0, 0.0).map(|c| 1.0 / c);
        let hits = tree.intersect_ray(&near, &inv);
        assert_eq!(hits, vec![0]);
    }
}
