//! Result cleanup: welding, degenerate removal, seam closing and
//! manifold verification.
//!
//! The keep/discard assembly leaves the two kept shells meeting along
//! the intersection curve with duplicated (unwelded) vertices and, in
//! degenerate spots, sliver triangles. Stitching welds the seam shut,
//! drops the slivers, closes any residual pinholes, and finally checks
//! that every edge has exactly two incident faces.

use crate::config::BooleanConfig;
use crate::error::{BooleanError, BooleanResult};
use hashbrown::HashMap;
use mold_types::{IndexedMesh, Point3, Vertex};
use smallvec::SmallVec;

/// Merge vertices closer than `tolerance` and remap faces.
#[allow(clippy::cast_possible_truncation)]
pub fn weld_vertices(mesh: &mut IndexedMesh, tolerance: f64) {
    if mesh.vertices.is_empty() {
        return;
    }

    // Spatial hash on a tolerance-sized grid; candidates come from the
    // 27 neighboring cells so near-boundary pairs are not missed.
    let cell = tolerance.max(f64::MIN_POSITIVE);
    let key_of = |p: &Point3<f64>| -> (i64, i64, i64) {
        (
            (p.x / cell).floor() as i64,
            (p.y / cell).floor() as i64,
            (p.z / cell).floor() as i64,
        )
    };

    let tol_sq = tolerance * tolerance;
    let mut grid: HashMap<(i64, i64, i64), SmallVec<[u32; 4]>> = HashMap::new();
    let mut remap: Vec<u32> = Vec::with_capacity(mesh.vertices.len());
    let mut kept: Vec<Vertex> = Vec::with_capacity(mesh.vertices.len());

    for vertex in &mesh.vertices {
        let p = vertex.position;
        let (kx, ky, kz) = key_of(&p);

        let mut found = None;
        'search: for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    if let Some(bucket) = grid.get(&(kx + dx, ky + dy, kz + dz)) {
                        for &ki in bucket {
                            if (kept[ki as usize].position - p).norm_squared() < tol_sq {
                                found = Some(ki);
                                break 'search;
                            }
                        }
                    }
                }
            }
        }

        match found {
            Some(ki) => remap.push(ki),
            None => {
                let ki = kept.len() as u32;
                kept.push(*vertex);
                grid.entry((kx, ky, kz)).or_default().push(ki);
                remap.push(ki);
            }
        }
    }

    for face in &mut mesh.faces {
        for v in face.iter_mut() {
            *v = remap[*v as usize];
        }
    }
    mesh.vertices = kept;
}

/// Drop faces that reference the same vertex twice.
pub fn remove_degenerate_faces(mesh: &mut IndexedMesh) {
    mesh.faces
        .retain(|f| f[0] != f[1] && f[1] != f[2] && f[0] != f[2]);
}

/// Drop vertices no face references and remap the rest.
#[allow(clippy::cast_possible_truncation)]
pub fn remove_unreferenced_vertices(mesh: &mut IndexedMesh) {
    if mesh.faces.is_empty() {
        mesh.vertices.clear();
        return;
    }

    let mut referenced = vec![false; mesh.vertices.len()];
    for face in &mesh.faces {
        for &v in face {
            referenced[v as usize] = true;
        }
    }

    let mut remap = vec![0u32; mesh.vertices.len()];
    let mut kept = Vec::with_capacity(mesh.vertices.len());
    for (i, (is_ref, vertex)) in referenced.iter().zip(&mesh.vertices).enumerate() {
        if *is_ref {
            remap[i] = kept.len() as u32;
            kept.push(*vertex);
        }
    }

    for face in &mut mesh.faces {
        for v in face.iter_mut() {
            *v = remap[*v as usize];
        }
    }
    mesh.vertices = kept;
}

fn edge_key(a: u32, b: u32) -> (u32, u32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Directed boundary edges: for every undirected edge with exactly one
/// incident face, the reversed direction of how that face walks it.
/// Filling along these directions winds the patch opposite the hole.
fn boundary_edges(mesh: &IndexedMesh) -> Vec<(u32, u32)> {
    let mut counts: HashMap<(u32, u32), u32> = HashMap::new();
    let mut directed: HashMap<(u32, u32), (u32, u32)> = HashMap::new();

    for &[a, b, c] in &mesh.faces {
        for (u, v) in [(a, b), (b, c), (c, a)] {
            let key = edge_key(u, v);
            *counts.entry(key).or_insert(0) += 1;
            directed.insert(key, (v, u));
        }
    }

    counts
        .iter()
        .filter(|(_, &n)| n == 1)
        .map(|(key, _)| directed[key])
        .collect()
}

/// Chain directed boundary edges into closed loops.
///
/// Returns `Err` with the unchainable edges when some vertex has
/// anything other than exactly one outgoing boundary edge, or a chain
/// fails to return to its start.
fn chain_loops(edges: &[(u32, u32)]) -> Result<Vec<Vec<u32>>, Vec<(u32, u32)>> {
    let mut next: HashMap<u32, u32> = HashMap::with_capacity(edges.len());
    for &(from, to) in edges {
        if next.insert(from, to).is_some() {
            return Err(edges.to_vec());
        }
    }

    let mut visited: HashMap<u32, bool> = HashMap::new();
    let mut loops = Vec::new();

    for &(start, _) in edges {
        if visited.get(&start).copied().unwrap_or(false) {
            continue;
        }

        let mut ring = vec![start];
        visited.insert(start, true);
        let mut current = start;
        loop {
            let Some(&to) = next.get(&current) else {
                return Err(edges.to_vec());
            };
            if to == start {
                break;
            }
            if visited.get(&to).copied().unwrap_or(false) {
                return Err(edges.to_vec());
            }
            ring.push(to);
            visited.insert(to, true);
            current = to;
        }
        loops.push(ring);
    }

    Ok(loops)
}

/// Close residual boundary loops with centroid fans.
///
/// Seam pinholes left by welding are small and near-planar, so a fan
/// from the loop centroid closes them without self-intersection.
///
/// # Errors
///
/// [`BooleanError::NonManifoldResult`] when the boundary edges cannot
/// be chained into closed loops.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn close_boundary_loops(mesh: &mut IndexedMesh) -> BooleanResult<usize> {
    let open = boundary_edges(mesh);
    if open.is_empty() {
        return Ok(0);
    }

    let loops = chain_loops(&open).map_err(|edges| {
        let (a, b) = edges[0];
        BooleanError::NonManifoldResult {
            open_edge_count: edges.len(),
            edge_start: mesh.vertices[a as usize].position,
            edge_end: mesh.vertices[b as usize].position,
        }
    })?;

    let mut filled = 0;
    for ring in loops {
        if ring.len() == 3 {
            mesh.faces.push([ring[0], ring[1], ring[2]]);
            filled += 1;
            continue;
        }

        let mut centroid = mold_types::Vector3::zeros();
        for &v in &ring {
            centroid += mesh.vertices[v as usize].position.coords;
        }
        let centroid = Point3::from(centroid / ring.len() as f64);
        let center = mesh.vertices.len() as u32;
        mesh.vertices.push(Vertex::new(centroid));

        let n = ring.len();
        for i in 0..n {
            mesh.faces.push([center, ring[i], ring[(i + 1) % n]]);
            filled += 1;
        }
    }
    Ok(filled)
}

/// Verify every edge has exactly two incident faces.
///
/// # Errors
///
/// [`BooleanError::NonManifoldResult`] with the offending edge count
/// and a sample edge when the mesh is not a closed 2-manifold.
pub fn verify_closed_manifold(mesh: &IndexedMesh) -> BooleanResult<()> {
    let mut counts: HashMap<(u32, u32), u32> = HashMap::new();
    for &[a, b, c] in &mesh.faces {
        for (u, v) in [(a, b), (b, c), (c, a)] {
            *counts.entry(edge_key(u, v)).or_insert(0) += 1;
        }
    }

    let bad: Vec<(u32, u32)> = counts
        .iter()
        .filter(|(_, &n)| n != 2)
        .map(|(&key, _)| key)
        .collect();

    if let Some(&(a, b)) = bad.first() {
        return Err(BooleanError::NonManifoldResult {
            open_edge_count: bad.len(),
            edge_start: mesh.vertices[a as usize].position,
            edge_end: mesh.vertices[b as usize].position,
        });
    }
    Ok(())
}

/// Run the configured cleanup pipeline on an assembled result.
///
/// # Errors
///
/// At [`CleanupLevel::Full`](crate::CleanupLevel::Full), forwards
/// [`BooleanError::NonManifoldResult`] from loop closing or the final
/// verification.
pub fn cleanup(mesh: &mut IndexedMesh, config: &BooleanConfig) -> BooleanResult<()> {
    match config.cleanup {
        crate::config::CleanupLevel::None => Ok(()),
        crate::config::CleanupLevel::Fast => {
            weld_vertices(mesh, config.weld_tolerance);
            remove_degenerate_faces(mesh);
            Ok(())
        }
        crate::config::CleanupLevel::Full => {
            weld_vertices(mesh, config.weld_tolerance);
            remove_degenerate_faces(mesh);
            remove_unreferenced_vertices(mesh);
            let filled = close_boundary_loops(mesh)?;
            if filled > 0 {
                tracing::debug!(filled, "closed residual boundary loops");
            }
            verify_closed_manifold(mesh)
        }
    }
}
