pub mod gltf;
pub mod texture;

pub use gltf::{load_model, load_model_file, spawn_model_load, AuthoredMaterial, LoadedModel, ModelNode};
pub use texture::{ColorSpace, TextureData};
