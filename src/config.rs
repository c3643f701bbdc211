use glam::Vec3;
use std::path::PathBuf;

/// Which material the scene renders the model with
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Variant {
    /// Lit standard material with a normal map, ambient + directional light
    Standard,
    /// Custom WGSL shader material driven by a time uniform, no scene lights
    Shader,
}

/// Per-variant constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariantProfile {
    pub model_scale: Vec3,
    pub model_position: Vec3,
    /// Radius of the circular camera path around the model
    pub orbit_radius: f32,
    /// Camera height along the path
    pub orbit_height: f32,
    pub scene_lights: bool,
}

impl Variant {
    pub const fn profile(self) -> VariantProfile {
        match self {
            Variant::Standard => VariantProfile {
                model_scale: Vec3::new(1.0, 1.0, 1.0),
                model_position: Vec3::new(0.0, -8.0, -1.0),
                orbit_radius: 15.0,
                orbit_height: 5.0,
                scene_lights: true,
            },
            Variant::Shader => VariantProfile {
                model_scale: Vec3::new(0.9, 0.9, 0.9),
                model_position: Vec3::new(1.0, -0.6, 0.0),
                orbit_radius: 10.0,
                orbit_height: 3.0,
                scene_lights: false,
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Variant::Standard => "standard",
            Variant::Shader => "shader",
        }
    }
}

/// Vertex + fragment WGSL sources for the shader variant
#[derive(Debug, Clone)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

impl Default for ShaderSources {
    fn default() -> Self {
        Self {
            vertex: include_str!("shaders/shader_vertex.wgsl").to_string(),
            fragment: include_str!("shaders/shader_fragment.wgsl").to_string(),
        }
    }
}

/// Everything the controller needs to know at construction time
#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub container: String,
    pub variant: Variant,
    pub model_path: PathBuf,
    /// Normal map (standard) or base map (shader)
    pub texture_path: Option<PathBuf>,
    pub shaders: ShaderSources,
    pub show_ui: bool,
}

impl SceneConfig {
    pub fn new(variant: Variant) -> Self {
        Self {
            container: DEFAULT_CONTAINER.to_string(),
            variant,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            texture_path: None,
            shaders: ShaderSources::default(),
            show_ui: true,
        }
    }

    pub fn profile(&self) -> VariantProfile {
        self.variant.profile()
    }
}

pub const DEFAULT_CONTAINER: &str = "container";
pub const DEFAULT_MODEL_PATH: &str = "assets/model.glb";
pub const DEFAULT_PAGE_PATH: &str = "assets/page.json";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_profile_matches_scene_constants() {
        let p = Variant::Standard.profile();
        assert_eq!(p.model_position, Vec3::new(0.0, -8.0, -1.0));
        assert_eq!(p.model_scale, Vec3::ONE);
        assert_eq!((p.orbit_radius, p.orbit_height), (15.0, 5.0));
        assert!(p.scene_lights);
    }

    #[test]
    fn shader_profile_has_no_lights() {
        let p = Variant::Shader.profile();
        assert_eq!(p.model_position, Vec3::new(1.0, -0.6, 0.0));
        assert_eq!(p.model_scale, Vec3::splat(0.9));
        assert_eq!((p.orbit_radius, p.orbit_height), (10.0, 3.0));
        assert!(!p.scene_lights);
    }

    #[test]
    fn default_shader_sources_are_not_empty() {
        let sources = ShaderSources::default();
        assert!(sources.vertex.contains("vs_main"));
        assert!(sources.fragment.contains("fs_main"));
    }
}
