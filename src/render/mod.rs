//! Frame rendering seam between the scene controller and the GPU.

pub mod gpu;

use anyhow::Result;
use glam::Vec3;

use crate::camera::PerspectiveCamera;
use crate::core::Surface;
use crate::debug_panel::DebugSettings;
use crate::scene::SceneGraph;

pub use gpu::GpuRenderer;

/// One section overlay as it should appear this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayView<'a> {
    pub title: &'a str,
    pub text: &'a str,
    pub opacity: f32,
}

/// Everything a renderer needs to draw one frame
pub struct FrameContext<'a> {
    pub scene: &'a SceneGraph,
    pub camera: &'a PerspectiveCamera,
    pub overlays: &'a [OverlayView<'a>],
    pub settings: &'a mut DebugSettings,
    /// Virtual clock time
    pub time: f32,
    pub show_ui: bool,
}

/// Draws scene frames to some output
pub trait FrameRenderer {
    /// The drawing surface changed size or pixel ratio
    fn resize(&mut self, surface: &Surface);

    fn render(&mut self, frame: FrameContext<'_>) -> Result<()>;
}

/// What a [`RecordingRenderer`] saw for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedFrame {
    pub time: f32,
    pub camera_position: Vec3,
    pub mesh_count: usize,
    pub overlay_opacity: Vec<f32>,
}

/// Renderer without an output, records each frame instead of drawing it
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    frames: Vec<RecordedFrame>,
    resizes: Vec<(u32, u32)>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[RecordedFrame] {
        &self.frames
    }

    pub fn render_count(&self) -> usize {
        self.frames.len()
    }

    /// Drawing-buffer sizes passed to `resize`, in order
    pub fn resizes(&self) -> &[(u32, u32)] {
        &self.resizes
    }
}

impl FrameRenderer for RecordingRenderer {
    fn resize(&mut self, surface: &Surface) {
        self.resizes.push(surface.drawing_buffer_size());
    }

    fn render(&mut self, frame: FrameContext<'_>) -> Result<()> {
        self.frames.push(RecordedFrame {
            time: frame.time,
            camera_position: frame.camera.position,
            mesh_count: frame.scene.visible_meshes().len(),
            overlay_opacity: frame.overlays.iter().map(|o| o.opacity).collect(),
        });
        Ok(())
    }
}
