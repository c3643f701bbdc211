// cli.rs - Command-line interface configuration
use clap::Parser;
use std::path::PathBuf;

use crate::config::{
    SceneConfig, ShaderSources, Variant, DEFAULT_CONTAINER, DEFAULT_MODEL_PATH, DEFAULT_PAGE_PATH,
};

#[derive(Parser, Debug, Clone)]
#[command(name = "scroll-orbit")]
#[command(about = "Scroll-driven orbit camera around a glTF model", long_about = None)]
pub struct Cli {
    /// Material variant to render the model with
    #[arg(long, value_enum, default_value = "standard")]
    pub variant: Variant,

    /// glTF/GLB model to load (falls back to $GLTF_FILE)
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Normal map (standard) or base map (shader)
    #[arg(long)]
    pub texture: Option<PathBuf>,

    /// Page layout describing the scroll sections
    #[arg(long, default_value = DEFAULT_PAGE_PATH)]
    pub page: PathBuf,

    /// WGSL vertex stage for the shader variant
    #[arg(long = "vertex-shader")]
    pub vertex_shader: Option<PathBuf>,

    /// WGSL fragment stage for the shader variant
    #[arg(long = "fragment-shader")]
    pub fragment_shader: Option<PathBuf>,

    /// Container the render surface is mounted into
    #[arg(long, default_value = DEFAULT_CONTAINER)]
    pub container: String,

    /// Disable the debug panel and section overlays
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,
}

impl Cli {
    /// Resolve paths and read shader sources into a scene config
    pub fn scene_config(&self) -> anyhow::Result<SceneConfig> {
        use anyhow::Context;

        let model_path = self
            .model
            .clone()
            .or_else(|| std::env::var("GLTF_FILE").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH));

        let mut shaders = ShaderSources::default();
        if let Some(path) = &self.vertex_shader {
            shaders.vertex = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read vertex shader {:?}", path))?;
        }
        if let Some(path) = &self.fragment_shader {
            shaders.fragment = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read fragment shader {:?}", path))?;
        }

        Ok(SceneConfig {
            container: self.container.clone(),
            variant: self.variant,
            model_path,
            texture_path: self.texture.clone(),
            shaders,
            show_ui: !self.no_ui,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_standard_variant() {
        let cli = Cli::parse_from(["scroll-orbit", "--model", "a.glb"]);
        assert_eq!(cli.variant, Variant::Standard);
        assert_eq!(cli.container, "container");
        assert!(!cli.no_ui);

        let config = cli.scene_config().unwrap();
        assert_eq!(config.model_path, PathBuf::from("a.glb"));
        assert!(config.show_ui);
    }

    #[test]
    fn parses_shader_variant() {
        let cli = Cli::parse_from(["scroll-orbit", "--variant", "shader", "--no-ui"]);
        assert_eq!(cli.variant, Variant::Shader);
        assert!(cli.no_ui);
    }

    #[test]
    fn missing_shader_file_is_reported() {
        let cli = Cli::parse_from([
            "scroll-orbit",
            "--model",
            "a.glb",
            "--vertex-shader",
            "does/not/exist.wgsl",
        ]);
        let err = cli.scene_config().unwrap_err();
        assert!(err.to_string().contains("vertex shader"));
    }
}
