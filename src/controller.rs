//! Scene controller: owns the camera, scene graph, shared material, scroll
//! timeline and render loop, and drives a [`FrameRenderer`].
//!
//! The controller never talks to a window directly. Everything it needs
//! from the outside comes through a [`HostEnvironment`], so the same code
//! runs under winit and in headless tests.

use glam::{Vec2, Vec3, Vec4};

use crate::camera::{PerspectiveCamera, CAMERA_FAR, CAMERA_FOV_DEGREES, CAMERA_NEAR};
use crate::config::{SceneConfig, Variant};
use crate::controls::OrbitControls;
use crate::core::{FrameInfo, HostEnvironment, LoopState, RenderLoop, Surface};
use crate::debug_panel::DebugSettings;
use crate::error::{AssetError, SceneError, SceneResult};
use crate::loaders::{self, ColorSpace, LoadedModel, TextureData};
use crate::material::{Material, MaterialId, ShaderMaterial, StandardMaterial};
use crate::page::PageLayout;
use crate::render::{FrameContext, FrameRenderer, OverlayView};
use crate::scene::{Geometry, GeometryId, Light, Mesh, Node, NodeId, NodeKind, SceneGraph, Transform};
use crate::timeline::ScrollTimeline;

const AMBIENT_INTENSITY: f32 = 0.5;
const DIRECTIONAL_INTENSITY: f32 = 1.0;
const DIRECTIONAL_POSITION: Vec3 = Vec3::new(5.0, 5.0, 5.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelStatus {
    Pending,
    Loaded,
    Failed,
}

pub struct SceneController<R: FrameRenderer> {
    config: SceneConfig,
    page: PageLayout,
    surface: Surface,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    scene: SceneGraph,
    material: MaterialId,
    plane: NodeId,
    model: Option<NodeId>,
    model_status: ModelStatus,
    timeline: Option<ScrollTimeline>,
    overlay_opacity: Vec<f32>,
    scroll: f32,
    render_loop: RenderLoop,
    settings: DebugSettings,
    renderer: R,
    renders: u64,
}

impl<R: FrameRenderer> SceneController<R> {
    /// Validate the host and page, then build the initial scene
    pub fn new(
        config: SceneConfig,
        page: PageLayout,
        host: &impl HostEnvironment,
        mut renderer: R,
    ) -> SceneResult<Self> {
        if !host.has_container(&config.container) {
            return Err(SceneError::MissingContainer(config.container.clone()));
        }
        page.validate()?;

        let viewport = host.viewport();
        let surface = Surface::from_viewport(viewport);
        let aspect = if viewport.is_empty() { 1.0 } else { viewport.aspect() };

        let mut camera = PerspectiveCamera::new(CAMERA_FOV_DEGREES, aspect, CAMERA_NEAR, CAMERA_FAR);
        camera.look_at(Vec3::ZERO);

        let mut scene = SceneGraph::new();
        let profile = config.profile();
        if profile.scene_lights {
            add_lights(&mut scene);
        }

        let material = scene.add_material(create_material(&config, &surface));
        let plane_geometry = scene.add_geometry(Geometry::plane(1.0, 1.0));
        let plane = scene.add(
            scene.root(),
            Node::new(NodeKind::Mesh(Mesh {
                geometry: plane_geometry,
                material,
            }))
            .named("plane"),
        );

        renderer.resize(&surface);

        log::info!(
            "Scene ready: variant {}, {} sections, viewport {}x{} @{}",
            config.variant.name(),
            page.section_count(),
            viewport.width,
            viewport.height,
            viewport.pixel_ratio
        );

        Ok(Self {
            overlay_opacity: page.initial_opacities(),
            config,
            page,
            surface,
            camera,
            controls: OrbitControls::new(),
            scene,
            material,
            plane,
            model: None,
            model_status: ModelStatus::Pending,
            timeline: None,
            scroll: host.scroll_offset(),
            render_loop: RenderLoop::new(),
            settings: DebugSettings::new(),
            renderer,
            renders: 0,
        })
    }

    /// Follow the host viewport. Runs while paused too, without drawing.
    pub fn resize(&mut self, host: &impl HostEnvironment) {
        let viewport = host.viewport();
        self.surface.set_size(viewport.width, viewport.height);
        self.surface.set_pixel_ratio(viewport.pixel_ratio);

        if !viewport.is_empty() {
            self.camera.set_aspect(viewport.aspect());
            self.camera.update_projection();
        }

        let (width, height) = self.surface.drawing_buffer_size();
        if let Material::Shader(shader) = self.scene.material_mut(self.material) {
            shader.set_resolution(width as f32, height as f32);
        }

        self.renderer.resize(&self.surface);
        log::debug!("Resized to {}x{} ({}x{} px)", viewport.width, viewport.height, width, height);
    }

    /// Load the configured model on a worker thread and attach it once done
    pub async fn load_model(&mut self) -> SceneResult<()> {
        let outcome = loaders::load_model(self.config.model_path.clone()).await;
        self.on_model_loaded(outcome)
    }

    /// Completion of the background model load.
    ///
    /// A failure is recorded and returned as `AssetLoad`; the scene keeps
    /// rendering without a timeline and a later completion may still attach.
    /// Only the first successful model is attached.
    pub fn on_model_loaded(&mut self, outcome: Result<LoadedModel, AssetError>) -> SceneResult<()> {
        if self.model.is_some() {
            return Err(SceneError::ModelAlreadyAttached);
        }

        let model = match outcome {
            Ok(model) => model,
            Err(e) => {
                self.model_status = ModelStatus::Failed;
                return Err(SceneError::AssetLoad(e));
            }
        };

        let root = self.attach_model(&model);
        let bound = self.scene.bind_material(root, self.material);
        log::info!(
            "Attached {:?}: {} meshes bound to the {} material",
            model.source,
            bound,
            self.scene.material(self.material).kind()
        );

        let profile = self.config.profile();
        self.controls.target = profile.model_position;
        self.timeline = Some(ScrollTimeline::build(
            &self.page.initial_opacities(),
            self.surface.height as f32,
            self.camera.position,
            profile.model_position,
            profile.orbit_radius,
            profile.orbit_height,
        )?);
        self.model = Some(root);
        self.model_status = ModelStatus::Loaded;

        self.apply_scroll();
        Ok(())
    }

    /// Copy the model hierarchy under a group carrying the variant transform
    fn attach_model(&mut self, model: &LoadedModel) -> NodeId {
        let profile = self.config.profile();
        let root = self.scene.add(
            self.scene.root(),
            Node::new(NodeKind::Group).named("model").with_transform(Transform {
                position: profile.model_position,
                scale: profile.model_scale,
                ..Transform::IDENTITY
            }),
        );

        let geometries: Vec<GeometryId> = model
            .geometries
            .iter()
            .map(|geometry| self.scene.add_geometry(geometry.clone()))
            .collect();
        let materials: Vec<MaterialId> = model
            .materials
            .iter()
            .map(|material| {
                self.scene.add_material(Material::Authored {
                    name: material.name.clone(),
                    base_color: material.base_color,
                })
            })
            .collect();
        let default_material = self.scene.add_material(Material::Authored {
            name: None,
            base_color: Vec4::ONE,
        });

        let mut stack: Vec<(NodeId, usize)> = model.roots.iter().rev().map(|&i| (root, i)).collect();
        while let Some((parent, index)) = stack.pop() {
            let source = &model.nodes[index];
            let mut node = Node::new(NodeKind::Group).with_transform(source.transform);
            node.name = source.name.clone();
            let id = self.scene.add(parent, node);

            for &(geometry, material) in &source.primitives {
                let material = material
                    .and_then(|m| materials.get(m).copied())
                    .unwrap_or(default_material);
                self.scene.add(
                    id,
                    Node::new(NodeKind::Mesh(Mesh {
                        geometry: geometries[geometry],
                        material,
                    })),
                );
            }
            stack.extend(source.children.iter().rev().map(|&child| (id, child)));
        }

        root
    }

    /// Scroll offset changed; evaluates the timeline if there is one
    pub fn on_scroll(&mut self, offset: f32) {
        self.scroll = offset;
        self.apply_scroll();
    }

    fn apply_scroll(&mut self) {
        let Some(timeline) = &self.timeline else {
            return;
        };
        let sample = timeline.sample(self.scroll);
        self.camera.position = sample.camera_position;
        self.camera.look_at(sample.look_at);
        self.overlay_opacity = sample.overlay_opacity;
    }

    /// Drag the orbit controls by `delta` logical pixels
    pub fn rotate(&mut self, delta: Vec2) {
        self.controls.rotate(delta, self.surface.height as f32);
    }

    pub fn zoom(&mut self, steps: f32) {
        self.controls.zoom(steps);
    }

    /// One display refresh. Does nothing while paused.
    pub fn tick(&mut self, host: &impl HostEnvironment) -> SceneResult<Option<FrameInfo>> {
        let Some(frame) = self.render_loop.begin_frame() else {
            return Ok(None);
        };

        if let Material::Shader(shader) = self.scene.material_mut(self.material) {
            shader.time = frame.time;
        }
        self.controls.update(&mut self.camera);
        host.request_frame();
        self.render(frame.time)?;
        Ok(Some(frame))
    }

    fn render(&mut self, time: f32) -> SceneResult<()> {
        let overlays: Vec<OverlayView<'_>> = self
            .page
            .sections
            .iter()
            .zip(&self.overlay_opacity)
            .map(|(section, &opacity)| OverlayView {
                title: &section.title,
                text: section.overlay.as_ref().map_or("", |o| o.text.as_str()),
                opacity,
            })
            .collect();

        self.renderer
            .render(FrameContext {
                scene: &self.scene,
                camera: &self.camera,
                overlays: &overlays,
                settings: &mut self.settings,
                time,
                show_ui: self.config.show_ui,
            })
            .map_err(|e| SceneError::Render(format!("{:#}", e)))?;
        self.renders += 1;
        Ok(())
    }

    /// Cancel the frame task; later ticks are no-ops
    pub fn stop(&mut self) -> bool {
        let stopped = self.render_loop.stop();
        if stopped {
            log::info!("Paused at t={:.2}", self.render_loop.time());
        }
        stopped
    }

    /// Resume with one immediate tick. No-op while already running.
    pub fn play(&mut self, host: &impl HostEnvironment) -> SceneResult<Option<FrameInfo>> {
        match self.render_loop.play() {
            Some(_) => {
                log::info!("Resumed at t={:.2}", self.render_loop.time());
                self.tick(host)
            }
            None => Ok(None),
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn page(&self) -> &PageLayout {
        &self.page
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    /// The shared material every model mesh is bound to
    pub fn material_id(&self) -> MaterialId {
        self.material
    }

    pub fn plane_node(&self) -> NodeId {
        self.plane
    }

    pub fn model_node(&self) -> Option<NodeId> {
        self.model
    }

    pub fn model_status(&self) -> ModelStatus {
        self.model_status
    }

    pub fn timeline(&self) -> Option<&ScrollTimeline> {
        self.timeline.as_ref()
    }

    pub fn overlay_opacity(&self) -> &[f32] {
        &self.overlay_opacity
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll
    }

    /// Document height added by the pinned trigger, zero before the timeline exists
    pub fn pin_spacing(&self) -> f32 {
        self.timeline
            .as_ref()
            .map_or(0.0, |timeline| timeline.trigger().pin_spacing())
    }

    pub fn loop_state(&self) -> LoopState {
        self.render_loop.state()
    }

    pub fn is_running(&self) -> bool {
        self.render_loop.is_running()
    }

    pub fn time(&self) -> f32 {
        self.render_loop.time()
    }

    pub fn render_count(&self) -> u64 {
        self.renders
    }

    pub fn settings(&self) -> &DebugSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut DebugSettings {
        &mut self.settings
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}

fn add_lights(scene: &mut SceneGraph) {
    scene.add(
        scene.root(),
        Node::new(NodeKind::AmbientLight(Light {
            color: Vec3::ONE,
            intensity: AMBIENT_INTENSITY,
        }))
        .named("ambient"),
    );
    scene.add(
        scene.root(),
        Node::new(NodeKind::DirectionalLight(Light {
            color: Vec3::ONE,
            intensity: DIRECTIONAL_INTENSITY,
        }))
        .named("directional")
        .with_transform(Transform {
            position: DIRECTIONAL_POSITION,
            ..Transform::IDENTITY
        }),
    );
}

/// The variant's shared material; a missing texture degrades to a flat one
fn create_material(config: &SceneConfig, surface: &Surface) -> Material {
    let texture_path = config.texture_path.as_deref();
    match config.variant {
        Variant::Standard => Material::Standard(StandardMaterial::new(
            TextureData::load_or(texture_path, ColorSpace::Linear, TextureData::flat_normal),
        )),
        Variant::Shader => {
            let mut shader = ShaderMaterial::new(
                TextureData::load_or(texture_path, ColorSpace::Srgb, TextureData::white),
                config.shaders.vertex.clone(),
                config.shaders.fragment.clone(),
            );
            let (width, height) = surface.drawing_buffer_size();
            shader.set_resolution(width as f32, height as f32);
            Material::Shader(shader)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::HeadlessHost;
    use crate::render::RecordingRenderer;

    fn controller(variant: Variant) -> SceneController<RecordingRenderer> {
        let host = HeadlessHost::new("container", 800, 600);
        SceneController::new(
            SceneConfig::new(variant),
            PageLayout::with_sections(3),
            &host,
            RecordingRenderer::new(),
        )
        .unwrap()
    }

    #[test]
    fn camera_starts_looking_at_origin() {
        let c = controller(Variant::Standard);
        assert_eq!(c.camera().position, Vec3::new(0.0, 0.0, 10.0));
        assert!((c.camera().forward() - Vec3::NEG_Z).length() < 1e-5);
        assert_eq!(c.camera().fov, 90.0);
        assert_eq!(c.camera().aspect(), 800.0 / 600.0);
    }

    #[test]
    fn plane_uses_shared_material() {
        let c = controller(Variant::Shader);
        let mesh = c.scene().node(c.plane_node()).mesh().copied().unwrap();
        assert_eq!(mesh.material, c.material_id());
        assert_eq!(c.scene().material(c.material_id()).kind(), "shader");
    }

    #[test]
    fn tick_writes_clock_into_shader_time() {
        let host = HeadlessHost::new("container", 800, 600);
        let mut c = controller(Variant::Shader);
        c.tick(&host).unwrap();
        c.tick(&host).unwrap();

        match c.scene().material(c.material_id()) {
            Material::Shader(shader) => assert!((shader.time - 0.1).abs() < 1e-6),
            other => panic!("unexpected material {}", other.kind()),
        }
    }

    #[test]
    fn failed_load_builds_no_timeline() {
        let mut c = controller(Variant::Standard);
        let result = c.on_model_loaded(Err(AssetError::Cancelled));
        assert!(matches!(result, Err(SceneError::AssetLoad(AssetError::Cancelled))));
        assert_eq!(c.model_status(), ModelStatus::Failed);
        assert!(c.timeline().is_none());
        assert_eq!(c.pin_spacing(), 0.0);
    }
}
