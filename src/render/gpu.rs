use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::event::WindowEvent;
use winit::window::Window;

use super::{FrameContext, FrameRenderer, OverlayView};
use crate::camera::CameraUniform;
use crate::core::{GpuContext, Surface};
use crate::debug_panel::DebugSettings;
use crate::loaders::{ColorSpace, TextureData};
use crate::material::{Material, MaterialId, ShaderMaterial};
use crate::scene::{Geometry, GeometryId, NodeId, SceneGraph, SceneLights};

pub const MSAA_SAMPLES: u32 = 4;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Light uniform buffer data for GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct LightsUniform {
    ambient: [f32; 4],
    direction: [f32; 4],
    color: [f32; 4],
}

impl From<SceneLights> for LightsUniform {
    fn from(lights: SceneLights) -> Self {
        Self {
            ambient: lights.ambient.extend(1.0).to_array(),
            direction: lights.directional_dir.extend(0.0).to_array(),
            color: lights.directional.extend(1.0).to_array(),
        }
    }
}

/// Per-mesh transform uniform
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct ModelUniform {
    model: [[f32; 4]; 4],
    normal: [[f32; 4]; 4],
}

struct GpuGeometry {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

struct GpuMaterial {
    uniform: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    /// Custom pipeline; None draws with the standard pipeline
    pipeline: Option<wgpu::RenderPipeline>,
}

struct GpuModel {
    uniform: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Multisampled color + depth attachments sized to the surface
struct Targets {
    color: wgpu::TextureView,
    depth: wgpu::TextureView,
}

/// wgpu scene renderer with an egui pass for overlays and the debug panel
pub struct GpuRenderer {
    window: Arc<Window>,
    gpu: GpuContext,
    camera_buffer: wgpu::Buffer,
    lights_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    material_layout: wgpu::BindGroupLayout,
    model_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    standard_pipeline: wgpu::RenderPipeline,
    sampler: wgpu::Sampler,
    targets: Targets,
    geometries: HashMap<GeometryId, GpuGeometry>,
    materials: HashMap<MaterialId, GpuMaterial>,
    models: HashMap<NodeId, GpuModel>,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl GpuRenderer {
    pub async fn new(window: Arc<Window>, surface: &Surface) -> Result<Self> {
        let gpu = GpuContext::new(window.clone(), surface).await?;
        let device = gpu.device();

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let lights_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Lights Buffer"),
            size: std::mem::size_of::<LightsUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bind_group_layout"),
            entries: &[uniform_entry(0), uniform_entry(1)],
        });
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material_bind_group_layout"),
            entries: &[
                uniform_entry(0),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let model_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("model_bind_group_layout"),
            entries: &[uniform_entry(0)],
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lights_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &material_layout, &model_layout],
            push_constant_ranges: &[],
        });

        let standard_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Standard Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/standard.wgsl").into()),
        });
        let standard_pipeline = create_pipeline(
            device,
            &pipeline_layout,
            &standard_shader,
            &standard_shader,
            gpu.format(),
            "Standard Pipeline",
        );

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Material Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let targets = create_targets(device, gpu.format(), gpu.size());

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer =
            egui_wgpu::Renderer::new(device, gpu.format(), egui_wgpu::RendererOptions::default());

        Ok(Self {
            window,
            gpu,
            camera_buffer,
            lights_buffer,
            frame_bind_group,
            material_layout,
            model_layout,
            pipeline_layout,
            standard_pipeline,
            sampler,
            targets,
            geometries: HashMap::new(),
            materials: HashMap::new(),
            models: HashMap::new(),
            egui_ctx,
            egui_state,
            egui_renderer,
        })
    }

    /// Let egui see the event first; true if it consumed it
    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        self.egui_state.on_window_event(&self.window, event).consumed
    }

    /// Upload anything the scene gained since the last frame and refresh uniforms
    fn sync_scene(&mut self, scene: &SceneGraph) {
        for (id, material) in scene.materials() {
            if !self.materials.contains_key(&id) {
                log::debug!("Uploading {} material {:?}", material.kind(), id);
                let gpu_material = self.create_material(material);
                self.materials.insert(id, gpu_material);
            }
            if let Some(gpu_material) = self.materials.get(&id) {
                self.gpu
                    .queue()
                    .write_buffer(&gpu_material.uniform, 0, &material.uniform_bytes());
            }
        }

        for (node, world, mesh) in scene.visible_meshes() {
            if !self.geometries.contains_key(&mesh.geometry) {
                if let Some(geometry) = self.create_geometry(scene.geometry(mesh.geometry)) {
                    self.geometries.insert(mesh.geometry, geometry);
                }
            }

            let uniform = ModelUniform {
                model: world.to_cols_array_2d(),
                normal: world.inverse().transpose().to_cols_array_2d(),
            };
            if !self.models.contains_key(&node) {
                let model = self.create_model();
                self.models.insert(node, model);
            }
            if let Some(model) = self.models.get(&node) {
                self.gpu
                    .queue()
                    .write_buffer(&model.uniform, 0, bytemuck::bytes_of(&uniform));
            }
        }
    }

    fn create_geometry(&self, geometry: &Geometry) -> Option<GpuGeometry> {
        if geometry.indices.is_empty() {
            return None;
        }
        let vertices: Vec<Vertex> = geometry
            .positions
            .iter()
            .enumerate()
            .map(|(i, &position)| Vertex {
                position,
                normal: geometry.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                uv: geometry.uvs.get(i).copied().unwrap_or([0.0, 0.0]),
            })
            .collect();

        let device = self.gpu.device();
        Some(GpuGeometry {
            vertices: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            indices: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Index Buffer"),
                contents: bytemuck::cast_slice(&geometry.indices),
                usage: wgpu::BufferUsages::INDEX,
            }),
            index_count: geometry.indices.len() as u32,
        })
    }

    fn create_material(&self, material: &Material) -> GpuMaterial {
        let device = self.gpu.device();
        let uniform = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material Buffer"),
            contents: &material.uniform_bytes(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let fallback;
        let texture = match material.texture() {
            Some(texture) => texture,
            None => {
                fallback = TextureData::flat_normal();
                &fallback
            }
        };
        let view = self.upload_texture(texture);

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("material_bind_group"),
            layout: &self.material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let pipeline = match material {
            Material::Shader(shader) => self.create_shader_pipeline(shader),
            _ => None,
        };

        GpuMaterial {
            uniform,
            bind_group,
            pipeline,
        }
    }

    /// Compile the user's WGSL; a rejected program falls back to the standard pipeline
    fn create_shader_pipeline(&self, material: &ShaderMaterial) -> Option<wgpu::RenderPipeline> {
        let device = self.gpu.device();
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let vertex = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Custom Vertex Shader"),
            source: wgpu::ShaderSource::Wgsl(material.vertex_source.as_str().into()),
        });
        let fragment = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Custom Fragment Shader"),
            source: wgpu::ShaderSource::Wgsl(material.fragment_source.as_str().into()),
        });
        let pipeline = create_pipeline(
            device,
            &self.pipeline_layout,
            &vertex,
            &fragment,
            self.gpu.format(),
            "Custom Shader Pipeline",
        );

        match pollster::block_on(device.pop_error_scope()) {
            None => Some(pipeline),
            Some(e) => {
                log::error!("Custom shader rejected, drawing with the standard pipeline: {}", e);
                None
            }
        }
    }

    fn create_model(&self) -> GpuModel {
        let device = self.gpu.device();
        let uniform = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Model Buffer"),
            size: std::mem::size_of::<ModelUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("model_bind_group"),
            layout: &self.model_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.as_entire_binding(),
            }],
        });
        GpuModel { uniform, bind_group }
    }

    fn upload_texture(&self, texture: &TextureData) -> wgpu::TextureView {
        let format = match texture.color_space {
            ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
        };
        let gpu_texture = self.gpu.device().create_texture_with_data(
            self.gpu.queue(),
            &wgpu::TextureDescriptor {
                label: Some("Material Texture"),
                size: wgpu::Extent3d {
                    width: texture.width,
                    height: texture.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &texture.data,
        );
        gpu_texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Run egui and record its pass; returns the command buffers egui needs submitted first
    fn draw_ui(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        overlays: &[OverlayView<'_>],
        settings: &mut DebugSettings,
    ) -> Vec<wgpu::CommandBuffer> {
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            draw_overlays(ctx, overlays);
            settings.show(ctx);
        });

        self.egui_state
            .handle_platform_output(&self.window, full_output.platform_output);

        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(self.gpu.device(), self.gpu.queue(), *id, image_delta);
        }

        let (width, height) = self.gpu.size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let commands = self.egui_renderer.update_buffers(
            self.gpu.device(),
            self.gpu.queue(),
            encoder,
            &tris,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();

            self.egui_renderer
                .render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        commands
    }
}

impl FrameRenderer for GpuRenderer {
    fn resize(&mut self, surface: &Surface) {
        self.gpu.resize(surface);
        self.targets = create_targets(self.gpu.device(), self.gpu.format(), self.gpu.size());
    }

    fn render(&mut self, frame: FrameContext<'_>) -> Result<()> {
        self.sync_scene(frame.scene);

        let queue = self.gpu.queue();
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&frame.camera.to_uniform(frame.time)),
        );
        queue.write_buffer(
            &self.lights_buffer,
            0,
            bytemuck::bytes_of(&LightsUniform::from(frame.scene.lights())),
        );

        let output = self.gpu.acquire()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.color,
                    resolve_target: Some(&view),
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Discard,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
            for (node, _, mesh) in frame.scene.visible_meshes() {
                let (Some(geometry), Some(material), Some(model)) = (
                    self.geometries.get(&mesh.geometry),
                    self.materials.get(&mesh.material),
                    self.models.get(&node),
                ) else {
                    continue;
                };
                render_pass.set_pipeline(material.pipeline.as_ref().unwrap_or(&self.standard_pipeline));
                render_pass.set_bind_group(1, &material.bind_group, &[]);
                render_pass.set_bind_group(2, &model.bind_group, &[]);
                render_pass.set_vertex_buffer(0, geometry.vertices.slice(..));
                render_pass.set_index_buffer(geometry.indices.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..geometry.index_count, 0, 0..1);
            }
        }

        let ui_commands = if frame.show_ui {
            self.draw_ui(&mut encoder, &view, frame.overlays, frame.settings)
        } else {
            Vec::new()
        };

        self.gpu
            .queue()
            .submit(ui_commands.into_iter().chain(std::iter::once(encoder.finish())));
        output.present();
        Ok(())
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    vertex: &wgpu::ShaderModule,
    fragment: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: vertex,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: fragment,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: MSAA_SAMPLES,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}

fn create_targets(device: &wgpu::Device, format: wgpu::TextureFormat, (width, height): (u32, u32)) -> Targets {
    let attachment = |label: &str, format: wgpu::TextureFormat| {
        device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: MSAA_SAMPLES,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default())
    };

    Targets {
        color: attachment("MSAA Color", format),
        depth: attachment("Depth", DEPTH_FORMAT),
    }
}

fn draw_overlays(ctx: &egui::Context, overlays: &[OverlayView<'_>]) {
    egui::Area::new(egui::Id::new("section-overlays"))
        .anchor(egui::Align2::LEFT_CENTER, egui::vec2(24.0, 0.0))
        .interactable(false)
        .show(ctx, |ui| {
            for overlay in overlays {
                let alpha = (overlay.opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
                if alpha == 0 {
                    continue;
                }
                let color = egui::Color32::from_white_alpha(alpha);
                ui.label(egui::RichText::new(overlay.title).size(28.0).color(color));
                ui.label(egui::RichText::new(overlay.text).size(16.0).color(color));
                ui.add_space(16.0);
            }
        });
}
