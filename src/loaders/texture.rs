use anyhow::{Context, Result};
use std::path::Path;

/// How texel values should be interpreted when sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Data textures such as normal maps
    Linear,
    /// Color textures
    Srgb,
}

/// Decoded RGBA8 texture
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>, // RGBA8
    pub color_space: ColorSpace,
}

impl TextureData {
    pub fn load(path: impl AsRef<Path>, color_space: ColorSpace) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path)
            .with_context(|| format!("Failed to load texture: {:?}", path))?
            .to_rgba8();
        let (width, height) = image.dimensions();
        log::info!("Loaded texture {:?}: {}x{}", path, width, height);

        Ok(Self {
            width,
            height,
            data: image.into_raw(),
            color_space,
        })
    }

    /// Load `path`, or fall back to `fallback` when it is absent or unreadable
    pub fn load_or(path: Option<&Path>, color_space: ColorSpace, fallback: fn() -> Self) -> Self {
        let Some(path) = path else {
            return fallback();
        };
        match Self::load(path, color_space) {
            Ok(texture) => texture,
            Err(e) => {
                log::warn!("{:#}; using a flat fallback texture", e);
                fallback()
            }
        }
    }

    /// 1x1 normal pointing straight out of the surface
    pub fn flat_normal() -> Self {
        Self::solid([128, 128, 255, 255], ColorSpace::Linear)
    }

    pub fn white() -> Self {
        Self::solid([255, 255, 255, 255], ColorSpace::Srgb)
    }

    fn solid(rgba: [u8; 4], color_space: ColorSpace) -> Self {
        Self {
            width: 1,
            height: 1,
            data: rgba.to_vec(),
            color_space,
        }
    }

    pub fn byte_len(&self) -> usize {
        (self.width * self.height * 4) as usize
    }
}
