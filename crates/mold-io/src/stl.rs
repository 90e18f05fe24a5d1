//! STL reading and writing, ASCII and binary.
//!
//! # Format detection
//!
//! ASCII files start with `solid` and contain no null bytes in the
//! first 80 bytes; everything else is treated as binary (an 80-byte
//! header, a `u32` triangle count, then 50 bytes per triangle).
//!
//! STL stores a bare triangle soup. The loader merges vertices with
//! bit-identical coordinates while indexing, so a well-formed solid
//! comes back as a connected mesh that adjacency checks can verify.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use hashbrown::HashMap;
use mold_types::{IndexedMesh, Vertex};
use tracing::debug;

use crate::error::{StlError, StlResult};

/// STL binary header size in bytes.
const HEADER_SIZE: usize = 80;

/// Size of one triangle record in binary STL.
const TRIANGLE_SIZE: usize = 50;

/// Builds an indexed mesh from a triangle soup, merging vertices with
/// bit-identical coordinates.
#[derive(Default)]
struct SoupIndexer {
    mesh: IndexedMesh,
    seen: HashMap<(u64, u64, u64), u32>,
}

impl SoupIndexer {
    #[allow(clippy::cast_possible_truncation)]
    // Truncation: mesh indices are u32, meshes with >4B vertices are unsupported
    fn index(&mut self, v: Vertex) -> u32 {
        let p = v.position;
        let key = (p.x.to_bits(), p.y.to_bits(), p.z.to_bits());
        let vertices = &mut self.mesh.vertices;
        *self.seen.entry(key).or_insert_with(|| {
            let idx = vertices.len() as u32;
            vertices.push(v);
            idx
        })
    }

    fn push_triangle(&mut self, v0: Vertex, v1: Vertex, v2: Vertex) {
        let face = [self.index(v0), self.index(v1), self.index(v2)];
        // Degenerate soup triangles collapse onto a repeated index
        if face[0] != face[1] && face[1] != face[2] && face[0] != face[2] {
            self.mesh.faces.push(face);
        }
    }
}

/// Load a mesh from an STL file, auto-detecting ASCII vs binary.
///
/// # Errors
///
/// Returns [`StlError`] when the file cannot be read or its content
/// is not valid STL.
///
/// # Example
///
/// ```no_run
/// let mesh = mold_io::load_stl("part.stl")?;
/// println!("loaded {} faces", mesh.faces.len());
/// # Ok::<(), mold_io::StlError>(())
/// ```
pub fn load_stl<P: AsRef<Path>>(path: P) -> StlResult<IndexedMesh> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StlError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            StlError::Io(e)
        }
    })?;

    let mut reader = BufReader::new(file);
    let mut header = [0u8; HEADER_SIZE + 4];
    let bytes_read = reader.read(&mut header)?;

    if bytes_read < 6 {
        return Err(StlError::invalid_content("file too small to be valid STL"));
    }

    let head = String::from_utf8_lossy(&header[..bytes_read.min(HEADER_SIZE)]);
    let mesh = if head.trim_start().starts_with("solid") && !header[..bytes_read].contains(&0) {
        // ASCII; re-read from the start
        drop(reader);
        load_stl_ascii(BufReader::new(File::open(path)?))?
    } else {
        load_stl_binary(&header[..bytes_read], reader)?
    };

    debug!(
        path = %path.display(),
        vertices = mesh.vertices.len(),
        faces = mesh.faces.len(),
        "loaded STL"
    );
    Ok(mesh)
}

fn load_stl_binary<R: Read>(header: &[u8], mut reader: R) -> StlResult<IndexedMesh> {
    if header.len() < HEADER_SIZE + 4 {
        return Err(StlError::invalid_content("binary STL header too short"));
    }

    let face_count = u32::from_le_bytes([
        header[HEADER_SIZE],
        header[HEADER_SIZE + 1],
        header[HEADER_SIZE + 2],
        header[HEADER_SIZE + 3],
    ]);

    let mut indexer = SoupIndexer::default();
    indexer.mesh.reserve(face_count as usize / 2, face_count as usize);

    let mut buf = [0u8; TRIANGLE_SIZE];
    for i in 0..face_count {
        let mut filled = 0;
        while filled < TRIANGLE_SIZE {
            let n = reader.read(&mut buf[filled..])?;
            if n == 0 {
                return Err(StlError::Truncated {
                    expected: face_count,
                    got: i,
                });
            }
            filled += n;
        }

        // Skip the stored normal; it is recomputed on save
        let v0 = read_vertex(&buf[12..24]);
        let v1 = read_vertex(&buf[24..36]);
        let v2 = read_vertex(&buf[36..48]);
        indexer.push_triangle(v0, v1, v2);
    }

    Ok(indexer.mesh)
}

fn read_vertex(buf: &[u8]) -> Vertex {
    let x = f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let y = f32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
    let z = f32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
    Vertex::from_coords(f64::from(x), f64::from(y), f64::from(z))
}

fn load_stl_ascii<R: BufRead>(reader: R) -> StlResult<IndexedMesh> {
    let mut indexer = SoupIndexer::default();
    let mut corners: Vec<Vertex> = Vec::with_capacity(3);

    for line in reader.lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };

        match keyword {
            "vertex" => {
                let mut coord = || -> StlResult<f64> {
                    parts
                        .next()
                        .ok_or_else(|| StlError::invalid_content("vertex with missing coordinate"))?
                        .parse()
                        .map_err(StlError::from)
                };
                let (x, y, z) = (coord()?, coord()?, coord()?);
                corners.push(Vertex::from_coords(x, y, z));
            }
            "endfacet" => {
                if corners.len() == 3 {
                    indexer.push_triangle(corners[0], corners[1], corners[2]);
                }
                corners.clear();
            }
            "endsolid" => break,
            _ => {}
        }
    }

    Ok(indexer.mesh)
}

/// Save a mesh to an STL file, binary when `binary` is set.
///
/// # Errors
///
/// Returns [`StlError::Io`] when the file cannot be written.
///
/// # Example
///
/// ```no_run
/// use mold_types::unit_cube;
///
/// mold_io::save_stl(&unit_cube(), "cube.stl", true)?;
/// # Ok::<(), mold_io::StlError>(())
/// ```
pub fn save_stl<P: AsRef<Path>>(mesh: &IndexedMesh, path: P, binary: bool) -> StlResult<()> {
    let path = path.as_ref();
    let writer = BufWriter::new(File::create(path)?);

    if binary {
        save_stl_binary(mesh, writer)?;
    } else {
        save_stl_ascii(mesh, writer)?;
    }

    debug!(path = %path.display(), faces = mesh.faces.len(), binary, "saved STL");
    Ok(())
}

fn face_normal(mesh: &IndexedMesh, face: [u32; 3]) -> (f64, f64, f64) {
    let v0 = &mesh.vertices[face[0] as usize].position;
    let v1 = &mesh.vertices[face[1] as usize].position;
    let v2 = &mesh.vertices[face[2] as usize].position;

    let normal = (v1 - v0).cross(&(v2 - v0));
    let len = normal.norm();
    if len > f64::EPSILON {
        (normal.x / len, normal.y / len, normal.z / len)
    } else {
        (0.0, 0.0, 0.0)
    }
}

#[allow(clippy::cast_possible_truncation)]
// Truncation: STL stores f32 coordinates and a u32 face count
fn save_stl_binary<W: Write>(mesh: &IndexedMesh, mut writer: W) -> StlResult<()> {
    let mut header = [b' '; HEADER_SIZE];
    let text = b"Binary STL generated by moldforge";
    header[..text.len()].copy_from_slice(text);
    writer.write_all(&header)?;
    writer.write_all(&(mesh.faces.len() as u32).to_le_bytes())?;

    for &face in &mesh.faces {
        let (nx, ny, nz) = face_normal(mesh, face);
        writer.write_all(&(nx as f32).to_le_bytes())?;
        writer.write_all(&(ny as f32).to_le_bytes())?;
        writer.write_all(&(nz as f32).to_le_bytes())?;

        for &i in &face {
            let p = &mesh.vertices[i as usize].position;
            writer.write_all(&(p.x as f32).to_le_bytes())?;
            writer.write_all(&(p.y as f32).to_le_bytes())?;
            writer.write_all(&(p.z as f32).to_le_bytes())?;
        }
        writer.write_all(&0u16.to_le_bytes())?;
    }

    Ok(())
}

fn save_stl_ascii<W: Write>(mesh: &IndexedMesh, mut writer: W) -> StlResult<()> {
    writeln!(writer, "solid moldforge")?;

    for &face in &mesh.faces {
        let (nx, ny, nz) = face_normal(mesh, face);
        writeln!(writer, "  facet normal {nx:.6e} {ny:.6e} {nz:.6e}")?;
        writeln!(writer, "    outer loop")?;
        for &i in &face {
            let p = &mesh.vertices[i as usize].position;
            writeln!(writer, "      vertex {:.6e} {:.6e} {:.6e}", p.x, p.y, p.z)?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }

    writeln!(writer, "endsolid moldforge")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mold_types::{unit_cube, MeshAdjacency, MeshTopology};

    #[test]
    fn binary_roundtrip_rebuilds_a_closed_cube() {
        let cube = unit_cube();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.stl");

        save_stl(&cube, &path, true).unwrap();
        let loaded = load_stl(&path).unwrap();

        assert_eq!(loaded.face_count(), 12);
        assert_eq!(loaded.vertex_count(), 8);
        assert!(MeshAdjacency::build(&loaded).is_closed_manifold());
    }

    #[test]
    fn ascii_roundtrip_rebuilds_a_closed_cube() {
        let cube = unit_cube();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube_ascii.stl");

        save_stl(&cube, &path, false).unwrap();
        let loaded = load_stl(&path).unwrap();

        assert_eq!(loaded.face_count(), 12);
        assert_eq!(loaded.vertex_count(), 8);
        assert!((loaded.volume() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn missing_file_is_reported() {
        let result = load_stl("no_such_file_29381.stl");
        assert!(matches!(result, Err(StlError::FileNotFound { .. })));
    }

    #[test]
    fn truncated_binary_is_reported() {
        let cube = unit_cube();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cut.stl");
        save_stl(&cube, &path, true).unwrap();

        // Chop the last triangle record
        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 25]).unwrap();

        assert!(matches!(load_stl(&path), Err(StlError::Truncated { .. })));
    }

    #[test]
    fn ascii_parses_from_text() {
        let text = b"solid t\n  facet normal 0 0 1\n    outer loop\n      vertex 0 0 0\n      vertex 1 0 0\n      vertex 0 1 0\n    endloop\n  endfacet\nendsolid t\n";
        let mesh = load_stl_ascii(BufReader::new(&text[..])).unwrap();
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn degenerate_soup_triangles_are_dropped() {
        let text = b"solid t\n  facet normal 0 0 1\n    outer loop\n      vertex 0 0 0\n      vertex 0 0 0\n      vertex 0 1 0\n    endloop\n  endfacet\nendsolid t\n";
        let mesh = load_stl_ascii(BufReader::new(&text[..])).unwrap();
        assert_eq!(mesh.face_count(), 0);
    }
}
