use glam::{Vec2, Vec3, Vec4};

use crate::loaders::TextureData;

/// Index into the scene's material table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub(crate) usize);

/// Standard lit material
#[derive(Debug, Clone)]
pub struct StandardMaterial {
    pub color: Vec3,
    pub metalness: f32,
    pub roughness: f32,
    pub normal_map: TextureData,
}

impl StandardMaterial {
    pub fn new(normal_map: TextureData) -> Self {
        Self {
            color: hex_color(0x999999),
            metalness: 0.5,
            roughness: 0.5,
            normal_map,
        }
    }
}

/// Custom WGSL material; the sources are handed to the GPU unchanged
#[derive(Debug, Clone)]
pub struct ShaderMaterial {
    pub time: f32,
    pub texture: TextureData,
    pub resolution: Vec4,
    pub uv_rate: Vec2,
    pub vertex_source: String,
    pub fragment_source: String,
}

impl ShaderMaterial {
    pub fn new(texture: TextureData, vertex_source: String, fragment_source: String) -> Self {
        Self {
            time: 0.0,
            texture,
            resolution: Vec4::ZERO,
            uv_rate: Vec2::ONE,
            vertex_source,
            fragment_source,
        }
    }

    /// Drawing-buffer size in xy, cover-fit UV scale in zw
    pub fn set_resolution(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let (a1, a2) = if height / width > 1.0 {
            (width / height, 1.0)
        } else {
            (1.0, height / width)
        };
        self.resolution = Vec4::new(width, height, a1, a2);
    }
}

#[derive(Debug, Clone)]
pub enum Material {
    Standard(StandardMaterial),
    Shader(ShaderMaterial),
    /// Material authored in an imported asset
    Authored { name: Option<String>, base_color: Vec4 },
}

impl Material {
    pub fn kind(&self) -> &'static str {
        match self {
            Material::Standard(_) => "standard",
            Material::Shader(_) => "shader",
            Material::Authored { .. } => "authored",
        }
    }

    pub fn texture(&self) -> Option<&TextureData> {
        match self {
            Material::Standard(m) => Some(&m.normal_map),
            Material::Shader(m) => Some(&m.texture),
            Material::Authored { .. } => None,
        }
    }
}

/// Standard material uniform buffer data for GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StandardUniform {
    pub color: [f32; 4],
    pub metalness: f32,
    pub roughness: f32,
    pub _pad: [f32; 2],
}

/// Shader material uniform buffer data for GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShaderUniform {
    pub resolution: [f32; 4],
    pub uv_rate: [f32; 2],
    pub time: f32,
    pub _pad: f32,
}

impl Material {
    /// Raw bytes for the material's uniform block
    pub fn uniform_bytes(&self) -> Vec<u8> {
        match self {
            Material::Standard(m) => bytemuck::bytes_of(&StandardUniform {
                color: m.color.extend(1.0).to_array(),
                metalness: m.metalness,
                roughness: m.roughness,
                _pad: [0.0; 2],
            })
            .to_vec(),
            Material::Shader(m) => bytemuck::bytes_of(&ShaderUniform {
                resolution: m.resolution.to_array(),
                uv_rate: m.uv_rate.to_array(),
                time: m.time,
                _pad: 0.0,
            })
            .to_vec(),
            Material::Authored { base_color, .. } => bytemuck::bytes_of(&StandardUniform {
                color: base_color.to_array(),
                metalness: 0.0,
                roughness: 1.0,
                _pad: [0.0; 2],
            })
            .to_vec(),
        }
    }
}

/// 0xRRGGBB to linear-ish RGB in [0, 1]
pub fn hex_color(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}
