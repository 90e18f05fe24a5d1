//! Bounding volume hierarchy over mesh triangles.
//!
//! Candidate-pair search for the boolean engine: instead of testing
//! every triangle of A against every triangle of B, each triangle's
//! bounding box is queried against the other mesh's tree.

use mold_types::{Aabb, IndexedMesh, MeshTopology, Triangle};
use smallvec::SmallVec;

/// Number of triangles above which subtree construction forks onto rayon.
const PARALLEL_BUILD_THRESHOLD: usize = 1024;

#[derive(Debug)]
enum Node {
    Leaf {
        bounds: Aabb,
        faces: SmallVec<[u32; 8]>,
    },
    Branch {
        bounds: Aabb,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn bounds(&self) -> &Aabb {
        match self {
            Self::Leaf { bounds, .. } | Self::Branch { bounds, .. } => bounds,
        }
    }
}

/// A binary BVH over the faces of a mesh.
///
/// Built once per operand; leaves hold face indices. Splits use the
/// midpoint of the longest axis of the node bounds.
///
/// # Example
///
/// ```
/// use mold_boolean::bvh::Bvh;
/// use mold_types::{unit_cube, Aabb, Point3};
///
/// let cube = unit_cube();
/// let bvh = Bvh::build(&cube, 4);
///
/// let query = Aabb::new(Point3::new(-0.1, -0.1, -0.1), Point3::new(0.1, 0.1, 0.1));
/// assert!(!bvh.query(&query, 0.0).is_empty());
/// ```
#[derive(Debug)]
pub struct Bvh {
    root: Option<Node>,
    face_count: usize,
}

fn triangle_bounds(tri: &Triangle) -> Aabb {
    Aabb::from_points([&tri.v0, &tri.v1, &tri.v2])
}

fn axis_coord(b: &Aabb, axis: usize) -> f64 {
    let c = b.center();
    match axis {
        0 => c.x,
        1 => c.y,
        _ => c.z,
    }
}

impl Bvh {
    /// Build a BVH over the faces of a mesh.
    ///
    /// `max_leaf_size` is clamped to at least 1. An empty mesh yields
    /// an empty tree.
    #[must_use]
    pub fn build(mesh: &IndexedMesh, max_leaf_size: usize) -> Self {
        Self::build_inner(mesh, max_leaf_size, false)
    }

    /// Build a BVH with subtree construction parallelized via rayon.
    #[must_use]
    pub fn build_parallel(mesh: &IndexedMesh, max_leaf_size: usize) -> Self {
        Self::build_inner(mesh, max_leaf_size, true)
    }

    #[allow(clippy::cast_possible_truncation)]
    // Truncation: face indices share the u32 index space of the mesh
    fn build_inner(mesh: &IndexedMesh, max_leaf_size: usize, parallel: bool) -> Self {
        if mesh.faces.is_empty() {
            return Self {
                root: None,
                face_count: 0,
            };
        }

        let boxes: Vec<(u32, Aabb)> = mesh
            .triangles()
            .enumerate()
            .map(|(i, tri)| (i as u32, triangle_bounds(&tri)))
            .collect();

        let order: Vec<usize> = (0..boxes.len()).collect();
        let root = Self::split(&boxes, order, max_leaf_size.max(1), parallel);

        Self {
            root: Some(root),
            face_count: mesh.faces.len(),
        }
    }

    fn split(boxes: &[(u32, Aabb)], mut order: Vec<usize>, max_leaf: usize, parallel: bool) -> Node {
        let mut bounds = Aabb::empty();
        for &i in &order {
            bounds.expand_to_contain_box(&boxes[i].1);
        }

        if order.len() <= max_leaf {
            let faces: SmallVec<[u32; 8]> = order.iter().map(|&i| boxes[i].0).collect();
            return Node::Leaf { bounds, faces };
        }

        let axis = bounds.longest_axis();
        order.sort_by(|&a, &b| {
            let va = axis_coord(&boxes[a].1, axis);
            let vb = axis_coord(&boxes[b].1, axis);
            va.partial_cmp(&vb).unwrap_or(std::cmp::Ordering::Equal)
        });

        let mid = order.len() / 2;
        let right_order = order.split_off(mid);
        let left_order = order;

        let (left, right) = if parallel && right_order.len() >= PARALLEL_BUILD_THRESHOLD {
            rayon::join(
                || Self::split(boxes, left_order, max_leaf, parallel),
                || Self::split(boxes, right_order, max_leaf, parallel),
            )
        } else {
            (
                Self::split(boxes, left_order, max_leaf, false),
                Self::split(boxes, right_order, max_leaf, false),
            )
        };

        Node::Branch {
            bounds,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Collect the faces whose bounds overlap `query` (grown by
    /// `tolerance` on all sides). Conservative: a returned face is a
    /// candidate, not a guaranteed intersection.
    #[must_use]
    pub fn query(&self, query: &Aabb, tolerance: f64) -> Vec<u32> {
        let query = if tolerance > 0.0 {
            query.inflated(tolerance)
        } else {
            *query
        };
        let mut hits = Vec::new();
        if let Some(root) = &self.root {
            Self::collect(root, &query, &mut hits);
        }
        hits
    }

    fn collect(node: &Node, query: &Aabb, hits: &mut Vec<u32>) {
        if !node.bounds().intersects(query) {
            return;
        }
        match node {
            Node::Leaf { faces, .. } => hits.extend(faces.iter().copied()),
            Node::Branch { left, right, .. } => {
                Self::collect(left, query, hits);
                Self::collect(right, query, hits);
            }
        }
    }

    /// Number of faces in the tree.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.face_count
    }

    /// Whether the tree holds no faces.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }
}
