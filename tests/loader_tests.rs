mod common;

use glam::{Vec3, Vec4};
use scroll_orbit::error::AssetError;
use scroll_orbit::loaders::{load_model, load_model_file, spawn_model_load, ColorSpace, TextureData};

use common::write_triangle_model;

#[cfg(test)]
mod gltf_tests {
    use super::*;

    #[test]
    fn test_loads_hierarchy_and_geometry() {
        let dir = tempfile::tempdir().unwrap();
        let model = load_model_file(write_triangle_model(dir.path())).unwrap();

        assert_eq!(model.roots.len(), 2);
        assert_eq!(model.nodes.len(), 3);
        assert_eq!(model.mesh_count(), 2);
        assert_eq!(model.triangle_count(), 2);

        let body = &model.nodes[model.roots[0]];
        assert_eq!(body.name.as_deref(), Some("body"));
        assert_eq!(body.transform.position, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(body.children.len(), 1);
        assert!(body.primitives.is_empty());

        let side = &model.nodes[model.roots[1]];
        assert_eq!(side.transform.scale, Vec3::splat(2.0));
    }

    #[test]
    fn test_missing_attributes_get_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let model = load_model_file(write_triangle_model(dir.path())).unwrap();

        let geometry = &model.geometries[0];
        assert_eq!(geometry.indices, vec![0, 1, 2]);
        assert_eq!(geometry.normals, vec![[0.0, 0.0, 1.0]; 3]);
        assert_eq!(geometry.uvs, vec![[0.0, 0.0]; 3]);
    }

    #[test]
    fn test_authored_materials_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let model = load_model_file(write_triangle_model(dir.path())).unwrap();

        assert_eq!(model.materials.len(), 1);
        assert_eq!(model.materials[0].name.as_deref(), Some("paint"));
        assert_eq!(model.materials[0].base_color, Vec4::new(1.0, 0.0, 0.0, 1.0));
        let detail = &model.nodes[model.nodes[model.roots[0]].children[0]];
        assert_eq!(detail.primitives[0].1, Some(0));
    }

    #[test]
    fn test_malformed_file_is_an_import_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.gltf");
        std::fs::write(&path, "{ not json").unwrap();

        match pollster::block_on(load_model(path)) {
            Err(AssetError::Import { path, message }) => {
                assert!(path.ends_with("broken.gltf"));
                assert!(!message.is_empty());
            }
            other => panic!("expected import error, got {:?}", other.map(|m| m.source)),
        }
    }

    #[test]
    fn test_spawned_load_reports_on_worker_thread() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_triangle_model(dir.path());
        let (sender, receiver) = std::sync::mpsc::channel();

        spawn_model_load(path, move |outcome| {
            let thread = std::thread::current().name().map(str::to_string);
            sender.send((thread, outcome.map(|m| m.mesh_count()))).unwrap();
        })
        .unwrap();

        let (thread, meshes) = receiver.recv().unwrap();
        assert_eq!(thread.as_deref(), Some("model-loader"));
        assert_eq!(meshes.unwrap(), 2);
    }
}

#[cfg(test)]
mod texture_tests {
    use super::*;

    #[test]
    fn test_png_decodes_to_rgba8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("normal.png");
        image::RgbaImage::from_pixel(4, 2, image::Rgba([128, 128, 255, 255]))
            .save(&path)
            .unwrap();

        let texture = TextureData::load(&path, ColorSpace::Linear).unwrap();
        assert_eq!((texture.width, texture.height), (4, 2));
        assert_eq!(texture.data.len(), texture.byte_len());
        assert_eq!(&texture.data[..4], &[128, 128, 255, 255]);
    }

    #[test]
    fn test_unreadable_texture_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.jpg");
        std::fs::write(&path, b"not an image").unwrap();

        let texture = TextureData::load_or(Some(path.as_path()), ColorSpace::Srgb, TextureData::white);
        assert_eq!(texture, TextureData::white());
    }
}
