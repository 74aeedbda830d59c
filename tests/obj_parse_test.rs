use std::io::Cursor;

use solid_ngin::{
    geometry::{BRIGHTNESS, ObjMesh, obj::QUAD_TRIANGLES, palette},
    resources,
};

mod common;
use common::test_utils::{assert_close, assert_vec_close, assets_dir, init_logger};

const SQUARE: &str = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
";

fn parse(text: &str) -> ObjMesh {
    init_logger();
    let mut mesh = ObjMesh::new();
    mesh.parse_str(text);
    mesh
}

#[test]
fn quads_split_into_two_triangles() {
    let mesh = parse(&format!("{SQUARE}f 1 2 3 4\n"));
    assert_eq!(QUAD_TRIANGLES, [0, 1, 2, 0, 2, 3]);
    assert_eq!(mesh.indices(), &[0, 1, 2, 0, 2, 3]);

    let data = mesh.build(palette::TEAPOT_GREEN);
    assert_eq!(data.index_count(), 6);
    assert!(data.vertices.iter().all(|v| v.normal == [0.0, 0.0, BRIGHTNESS]));
}

#[test]
fn negative_indices_count_back_from_the_last_vertex() {
    let mesh = parse(&format!("{SQUARE}v 2 2 2\nf -1 -2 -3\n"));
    assert_eq!(mesh.indices(), &[4, 3, 2]);
}

#[test]
fn larger_polygons_become_fans_and_short_faces_are_skipped() {
    let mesh = parse(&format!("{SQUARE}v 0.5 1.5 0\nf 1 2 3 5 4\nf 1 2\n"));
    assert_eq!(mesh.indices(), &[0, 1, 2, 0, 2, 4, 0, 4, 3]);
}

#[test]
fn malformed_numbers_read_as_zero() {
    let mesh = parse("v 1.0 abc 2.0\nv 3.0\nvn 0 1 x\n");
    assert_eq!(mesh.positions(), &[[1.0, 0.0, 2.0], [3.0, 0.0, 0.0]]);
    assert_eq!(mesh.normals(), &[[0.0, 1.0, 0.0]]);
}

#[test]
fn corner_attributes_are_recorded_separately() {
    let mesh = parse(&format!(
        "{SQUARE}vt 0 0\nvt 1 0\nvt 1 1\nvn 0 0 1\nf 1/1/1 2/2/1 3/3/1\nf 1//1 3//1 4//1\n"
    ));
    assert_eq!(mesh.tex_coords().len(), 3);
    assert_eq!(
        mesh.texture_indices(),
        &[Some(0), Some(1), Some(2), None, None, None]
    );
    assert_eq!(mesh.normal_indices(), &[Some(0); 6]);
    assert_eq!(mesh.indices(), &[0, 1, 2, 0, 2, 3]);
}

#[test]
fn mixed_corners_stay_aligned_with_their_indices() {
    let mesh = parse(&format!(
        "{SQUARE}vt 0.5 0.5\nvn 0 0 1\nf 1 2/1 3//1 4/1/1\n"
    ));
    assert_eq!(mesh.indices(), &[0, 1, 2, 0, 2, 3]);
    assert_eq!(
        mesh.texture_indices(),
        &[None, Some(0), None, None, None, Some(0)]
    );
    assert_eq!(
        mesh.normal_indices(),
        &[None, None, Some(0), None, Some(0), Some(0)]
    );
    assert_eq!(mesh.normal_indices().len(), mesh.indices().len());
}

#[test]
fn shared_vertices_keep_the_last_face_normal() {
    // Face one lies in the xy plane, face two in the xz plane. Both use
    // vertices 1 and 2.
    let mesh = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nv 0 0 -1\nf 1 2 3\nf 1 2 4\n");
    let data = mesh.build(palette::WHITE);

    assert_vec_close(data.vertices[0].normal, [0.0, BRIGHTNESS, 0.0]);
    assert_vec_close(data.vertices[1].normal, [0.0, BRIGHTNESS, 0.0]);
    assert_vec_close(data.vertices[2].normal, [0.0, 0.0, BRIGHTNESS]);
    assert_vec_close(data.vertices[3].normal, [0.0, BRIGHTNESS, 0.0]);
}

#[test]
fn triangles_with_out_of_range_indices_are_skipped() {
    let mesh = parse(&format!("{SQUARE}f 1 2 9\nf 1 2 3\n"));
    assert_eq!(mesh.indices().len(), 6);

    let data = mesh.build(palette::WHITE);
    assert_eq!(data.indices, Some(vec![0, 1, 2]));
    assert_eq!(data.vertices[3].normal, [0.0; 3]);
}

#[test]
fn bounds_drive_the_auto_scale() {
    let mesh = parse("v -1 -1 -1\nv 1 2 3\nv 0 0 0\n");
    let bounds = mesh.bounds().unwrap();
    assert_eq!(bounds.min, [-1.0, -1.0, -1.0]);
    assert_eq!(bounds.max, [1.0, 2.0, 3.0]);
    assert_close(mesh.auto_scale(), 1.0 / 3.0);

    assert_eq!(ObjMesh::new().bounds(), None);
    assert_eq!(ObjMesh::new().auto_scale(), 1.0);
}

#[test]
fn vertices_take_the_active_material_color() {
    init_logger();
    let mut mesh = ObjMesh::new();
    mesh.parse_materials(&mut Cursor::new("newmtl red\nKa 0.5 0.0 0.0\n"))
        .unwrap();
    mesh.parse_str("v 0 0 0\nusemtl red\nv 1 0 0\nusemtl missing\nv 0 1 0\nf 1 2 3\n");

    let data = mesh.build(palette::TEAPOT_GREEN);
    assert_eq!(data.vertices[0].color, palette::TEAPOT_GREEN);
    assert_eq!(data.vertices[1].color, [0.5, 0.0, 0.0, 1.0]);
    // An unknown material keeps the previous one active.
    assert_eq!(data.vertices[2].color, [0.5, 0.0, 0.0, 1.0]);
}

#[test]
fn cube_asset_loads_with_materials() {
    init_logger();
    let mesh = resources::load_mesh(&assets_dir(), "cube").unwrap();

    assert_eq!(mesh.positions().len(), 8);
    assert_eq!(mesh.indices().len(), 36);
    assert_eq!(&mesh.indices()[..6], &[0, 1, 2, 0, 2, 3]);
    assert_eq!(mesh.normal_indices().len(), 36);
    assert_eq!(mesh.normal_indices().iter().flatten().count(), 12);
    assert_close(mesh.auto_scale(), 2.0 / 3.0);

    let data = mesh.build(palette::WHITE);
    assert_eq!(data.vertices[0].color, [0.6, 0.0, 0.0, 1.0]);
    assert_eq!(data.vertices[7].color, [0.85, 0.71, 0.33, 1.0]);
    assert_eq!(data.index_count(), 36);
}

#[test]
fn missing_mesh_file_is_an_error() {
    init_logger();
    assert!(resources::load_mesh(&assets_dir(), "no_such_mesh").is_err());
}
