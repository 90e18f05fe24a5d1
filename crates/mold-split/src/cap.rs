//! Cap triangulation along the cut plane.
//!
//! The chained cut loops are projected into the plane basis and
//! triangulated together with constrained Delaunay. Interior faces
//! are picked by even-odd depth from the outer face, so a section
//! with holes (block plus cavity) caps as an annulus. The same
//! triangulation is emitted to both halves with opposite windings.

use crate::error::{SplitError, SplitResult};
use crate::split::{CutNode, HalfBuilder};
use hashbrown::{HashMap, HashSet};
use mold_types::{IndexedMesh, Plane, Point3};
use spade::handles::FixedFaceHandle;
use spade::{ConstrainedDelaunayTriangulation, Point2 as SpadePoint2, Triangulation};
use std::collections::VecDeque;

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

fn node_position(
    mesh: &IndexedMesh,
    node: CutNode,
    cut_points: &HashMap<(u32, u32), Point3<f64>>,
) -> SplitResult<Point3<f64>> {
    match node {
        CutNode::Vertex(v) => Ok(mesh.vertices[v as usize].position),
        CutNode::Edge(a, b) => cut_points
            .get(&(a, b))
            .copied()
            .ok_or_else(|| SplitError::unsplittable("cut point lost during capping")),
    }
}

/// Triangulate the cut loops and emit caps into both halves.
///
/// The cap faces the negative side with the plane normal and the
/// positive side against it, keeping both halves outward-wound.
pub(crate) fn build_caps(
    mesh: &IndexedMesh,
    plane: &Plane,
    loops: &[Vec<CutNode>],
    cut_points: &HashMap<(u32, u32), Point3<f64>>,
    pos: &mut HalfBuilder,
    neg: &mut HalfBuilder,
) -> SplitResult<()> {
    let mut cdt = Cdt::new();
    let mut node_of_bits: HashMap<(u64, u64), CutNode> = HashMap::new();

    for ring in loops {
        let mut handles = Vec::with_capacity(ring.len());
        for &node in ring {
            let p3 = node_position(mesh, node, cut_points)?;
            let (u, v) = plane.to_plane_coords(&p3);
            node_of_bits.insert((u.to_bits(), v.to_bits()), node);

            let handle = cdt
                .insert(SpadePoint2::new(u, v))
                .map_err(|e| SplitError::unsplittable(format!("cap insertion: {e}")))?;
            handles.push(handle);
        }

        for i in 0..handles.len() {
            let from = handles[i];
            let to = handles[(i + 1) % handles.len()];
            if from != to {
                cdt.add_constraint(from, to);
            }
        }
    }

    let interior = classify_interior_faces(&cdt);

    for face_handle in cdt.inner_faces() {
        if !interior.contains(&face_handle.fix().index()) {
            continue;
        }

        let mut nodes = [CutNode::Vertex(0); 3];
        for (slot, vh) in nodes.iter_mut().zip(face_handle.vertices().iter()) {
            let p = vh.position();
            *slot = *node_of_bits
                .get(&(p.x.to_bits(), p.y.to_bits()))
                .ok_or_else(|| {
                    SplitError::unsplittable("cap triangulation introduced an unexpected vertex")
                })?;
        }

        // CCW in the (u, v) basis maps to a +normal facing triangle
        let n0 = neg.node_index(mesh, nodes[0], cut_points)?;
        let n1 = neg.node_index(mesh, nodes[1], cut_points)?;
        let n2 = neg.node_index(mesh, nodes[2], cut_points)?;
        neg.mesh.faces.push([n0, n1, n2]);

        let p0 = pos.node_index(mesh, nodes[0], cut_points)?;
        let p1 = pos.node_index(mesh, nodes[1], cut_points)?;
        let p2 = pos.node_index(mesh, nodes[2], cut_points)?;
        pos.mesh.faces.push([p0, p2, p1]);
    }

    Ok(())
}

/// Even-odd classification of CDT faces by BFS from the outer face.
/// Depth increments on every constraint edge crossed; odd depth is
/// inside the cut section.
fn classify_interior_faces(cdt: &Cdt) -> HashSet<usize> {
    let mut interior = HashSet::new();
    let mut depth_of: HashMap<usize, u32> = HashMap::new();
    let mut queue: VecDeque<(FixedFaceHandle<spade::handles::InnerTag>, u32)> = VecDeque::new();

    let outer_fix = cdt.outer_face().fix();

    for edge in cdt.directed_edges() {
        if edge.face().fix() == outer_fix {
            if let Some(inner) = edge.rev().face().as_inner() {
                let idx = inner.fix().index();
                if depth_of.contains_key(&idx) {
                    continue;
                }
                let depth = u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
                depth_of.insert(idx, depth);
                if depth % 2 == 1 {
                    interior.insert(idx);
                }
                queue.push_back((inner.fix(), depth));
            }
        }
    }

    while let Some((face_fix, depth)) = queue.pop_front() {
        for edge in cdt.face(face_fix).adjacent_edges() {
            if let Some(neighbor) = edge.rev().face().as_inner() {
                let idx = neighbor.fix().index();
                if depth_of.contains_key(&idx) {
                    continue;
                }
                let next_depth = if cdt.is_constraint_edge(edge.as_undirected().fix()) {
                    depth + 1
                } else {
                    depth
                };
                depth_of.insert(idx, next_depth);
                if next_depth % 2 == 1 {
                    interior.insert(idx);
                }
                queue.push_back((neighbor.fix(), next_depth));
            }
        }
    }

    interior
}
