#![allow(dead_code)]

use std::path::{Path, PathBuf};

use scroll_orbit::config::{SceneConfig, Variant};
use scroll_orbit::core::HeadlessHost;
use scroll_orbit::render::RecordingRenderer;
use scroll_orbit::{PageLayout, SceneController};

pub const WIDTH: u32 = 800;
pub const HEIGHT: u32 = 600;

/// Two-level glTF with one red triangle mesh used by two nodes:
/// `body` (translated) > `detail` (mesh), and `side` (mesh, scaled).
pub fn write_triangle_model(dir: &Path) -> PathBuf {
    let mut bin = Vec::new();
    for value in [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0] {
        bin.extend_from_slice(&value.to_le_bytes());
    }
    for index in [0u16, 1, 2] {
        bin.extend_from_slice(&index.to_le_bytes());
    }
    bin.extend_from_slice(&[0, 0]);
    std::fs::write(dir.join("model.bin"), &bin).unwrap();

    let json = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [ { "nodes": [0, 2] } ],
        "nodes": [
            { "name": "body", "children": [1], "translation": [0.0, 1.0, 0.0] },
            { "name": "detail", "mesh": 0 },
            { "name": "side", "mesh": 0, "scale": [2.0, 2.0, 2.0] }
        ],
        "meshes": [
            { "name": "tri", "primitives": [ { "attributes": { "POSITION": 0 }, "indices": 1, "material": 0 } ] }
        ],
        "materials": [
            { "name": "paint", "pbrMetallicRoughness": { "baseColorFactor": [1.0, 0.0, 0.0, 1.0] } }
        ],
        "buffers": [ { "uri": "model.bin", "byteLength": 44 } ],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
            { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
        ]
    }"#;
    let path = dir.join("model.gltf");
    std::fs::write(&path, json).unwrap();
    path
}

pub fn host() -> HeadlessHost {
    HeadlessHost::new("container", WIDTH, HEIGHT)
}

pub fn config(variant: Variant, model_path: &Path) -> SceneConfig {
    let mut config = SceneConfig::new(variant);
    config.model_path = model_path.to_path_buf();
    config
}

pub fn controller(
    variant: Variant,
    model_path: &Path,
    sections: usize,
    host: &HeadlessHost,
) -> SceneController<RecordingRenderer> {
    SceneController::new(
        config(variant, model_path),
        PageLayout::with_sections(sections),
        host,
        RecordingRenderer::new(),
    )
    .unwrap()
}

/// Controller with the triangle model already attached
pub fn loaded_controller(
    variant: Variant,
    sections: usize,
    host: &HeadlessHost,
) -> (tempfile::TempDir, SceneController<RecordingRenderer>) {
    let dir = tempfile::tempdir().unwrap();
    let path = write_triangle_model(dir.path());
    let mut controller = controller(variant, &path, sections, host);
    pollster::block_on(controller.load_model()).unwrap();
    (dir, controller)
}
