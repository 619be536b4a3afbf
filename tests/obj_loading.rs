use std::fs;
use std::path::Path;

use chromabake::mesh::Mesh;
use chromabake::output::save_texture;
use chromabake::texture::Texture;
use chromabake::{BakeError, BakeOptions, Scene};
use image::Rgba;

const LOWPOLY: &str = "\
v 0 0 0
v 2 0 0
v 0 2 0
vt 0 0
vt 2 0
vt 0 2
f 1/1 2/2 3/3
";

const HIGHPOLY: &str = "\
mtllib high.mtl
v -1 -1 -1 0.5 0 0
v 3 -1 -1 0.5 0 0
v -1 3 -1 0.5 0 0
vt 0 0
vt 1 0
vt 0 1
usemtl painted
f 1/1 2/2 3/3
";

const MATERIALS: &str = "\
newmtl painted
Kd 1 1 1
map_Kd diffuse.png
map_ID id.png
";

fn write_fixture(dir: &Path, diffuse: Rgba<u8>, id: Rgba<u8>) {
    fs::write(dir.join("low.obj"), LOWPOLY).unwrap();
    fs::write(dir.join("high.obj"), HIGHPOLY).unwrap();
    fs::write(dir.join("high.mtl"), MATERIALS).unwrap();
    save_texture(&Texture::filled(4, 4, diffuse), dir.join("diffuse.png")).unwrap();
    save_texture(&Texture::filled(4, 4, id), dir.join("id.png")).unwrap();
}

#[test]
fn loads_geometry_materials_and_vertex_alpha() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), Rgba([40, 80, 120, 255]), Rgba([10, 20, 255, 255]));

    let low = Mesh::load_obj(dir.path().join("low.obj"), false).unwrap();
    assert_eq!(low.len(), 1);
    assert!(low.triangles[0].material.is_none());

    let high = Mesh::load_obj(dir.path().join("high.obj"), true).unwrap();
    assert_eq!(high.len(), 1);
    let triangle = &high.triangles[0];
    assert_eq!(triangle.v0.alpha, 0.5);
    let material = triangle.material.as_ref().unwrap();
    assert!(material.diffuse.is_some());
    assert!(material.id.is_some());
    assert!(material.normal.is_none());
}

#[test]
fn baked_scene_from_obj_files() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), Rgba([40, 80, 120, 255]), Rgba([10, 20, 255, 255]));

    let mut scene = Scene::new(8).unwrap();
    scene.lowpoly = Mesh::load_obj(dir.path().join("low.obj"), false).unwrap();
    scene.highpoly = Mesh::load_obj(dir.path().join("high.obj"), true).unwrap();
    let report = scene.bake(&BakeOptions::with_workers(2)).unwrap();
    assert_eq!(report.baked_texels, 64);

    for y in 0..8 {
        for x in 0..8 {
            assert_eq!(scene.baked_diffuse().pixel(x, y), Rgba([40, 80, 120, 255]));
            // Blue is scaled by the vertex color's red channel, alpha by depth.
            assert_eq!(scene.baked_id().pixel(x, y), Rgba([10, 20, 127, 255]));
        }
    }
}

#[test]
fn missing_textures_fall_back() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("high.obj"), HIGHPOLY).unwrap();
    fs::write(dir.path().join("high.mtl"), MATERIALS).unwrap();

    let high = Mesh::load_obj(dir.path().join("high.obj"), true).unwrap();
    let material = high.triangles[0].material.as_ref().unwrap();
    assert!(material.diffuse.is_none());
    assert_eq!(material.sample_diffuse(0.5, 0.5), Rgba([255, 255, 255, 255]));
}

#[test]
fn missing_mesh_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Mesh::load_obj(dir.path().join("nope.obj"), false);
    assert!(matches!(result, Err(BakeError::Obj { .. })));
}
