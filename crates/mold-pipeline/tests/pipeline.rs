//! End-to-end mold generation tests.

use mold_pipeline::{generate_mold, MoldError, MoldParams};
use mold_types::{cuboid, unit_cube, Axis, MeshAdjacency, Point3, Vector3};

#[test]
fn unit_cube_produces_two_closed_halves() {
    let halves = generate_mold(&unit_cube(), &MoldParams::default()).unwrap();

    assert!(MeshAdjacency::build(&halves.top).is_closed_manifold());
    assert!(MeshAdjacency::build(&halves.bottom).is_closed_manifold());

    // Block is 21^3 = 9261 with a unit cavity; each plain half holds
    // 4630. Keys add material to the bottom, the recesses and spout
    // remove material from the top.
    let top = halves.top.volume();
    let bottom = halves.bottom.volume();
    assert!(top > 4000.0 && top < 4630.0, "top volume {top}");
    assert!(bottom > 4630.0 && bottom < 5300.0, "bottom volume {bottom}");
    assert!(top + bottom < 9261.0);
}

#[test]
fn parting_plane_defaults_to_longest_axis() {
    let tall = cuboid(Point3::origin(), Vector3::new(2.0, 2.0, 8.0));
    let halves = generate_mold(&tall, &MoldParams::default()).unwrap();
    assert!((halves.parting_plane.normal.z - 1.0).abs() < 1e-12);
    assert!((halves.parting_plane.point.z - 4.0).abs() < 1e-12);
}

#[test]
fn explicit_parting_axis_is_honored() {
    let tall = cuboid(Point3::origin(), Vector3::new(2.0, 2.0, 8.0));
    let params = MoldParams::default().with_parting_axis(Axis::X);
    let halves = generate_mold(&tall, &params).unwrap();
    assert!((halves.parting_plane.normal.x - 1.0).abs() < 1e-12);
}

#[test]
fn zero_keys_leaves_a_plain_bottom_half() {
    let params = MoldParams::default().with_key_count(0);
    let halves = generate_mold(&unit_cube(), &params).unwrap();

    // Bottom is exactly half the block minus half the cavity.
    assert!((halves.bottom.volume() - 4630.0).abs() < 1e-5);
    // The spout still cuts into the top.
    assert!(halves.top.volume() < 4630.0 - 1.0);
}

#[test]
fn open_mesh_is_rejected() {
    let mut open = unit_cube();
    open.faces.pop();

    let err = generate_mold(&open, &MoldParams::default()).unwrap_err();
    match err {
        MoldError::InvalidInput {
            boundary_edges,
            non_manifold_edges,
        } => {
            assert_eq!(boundary_edges, 3);
            assert_eq!(non_manifold_edges, 0);
        }
        other => panic!("expected InvalidInput, got {other}"),
    }
}

#[test]
fn empty_mesh_is_rejected() {
    let empty = mold_types::IndexedMesh::new();
    assert!(generate_mold(&empty, &MoldParams::default()).is_err());
}

#[test]
fn nonpositive_wall_is_rejected() {
    let params = MoldParams::default().with_wall_thickness(-1.0);
    let err = generate_mold(&unit_cube(), &params).unwrap_err();
    assert!(matches!(err, MoldError::InvalidParams(_)));
}

#[test]
fn oversized_keys_report_insufficient_space() {
    // Keys half as wide as the whole block cannot be placed.
    let params = MoldParams::default().with_key_radius(10.0);
    let err = generate_mold(&unit_cube(), &params).unwrap_err();
    assert!(matches!(err, MoldError::Feature(_)), "got {err}");
}

#[test]
fn recesses_make_the_top_lighter_than_without_keys() {
    let with_keys = generate_mold(&unit_cube(), &MoldParams::default()).unwrap();
    let params = MoldParams::default().with_key_count(0);
    let without = generate_mold(&unit_cube(), &params).unwrap();
    assert!(with_keys.top.volume() < without.top.volume());
}
