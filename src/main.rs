use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use scroll_orbit::cli::Cli;
use scroll_orbit::core::{HostEnvironment, InputAction, InputAdapter, Surface, Viewport};
use scroll_orbit::loaders::{spawn_model_load, LoadedModel};
use scroll_orbit::render::GpuRenderer;
use scroll_orbit::{AssetError, PageLayout, PageScroll, SceneConfig, SceneController};

// === Constants ===

const INITIAL_WINDOW_WIDTH: u32 = 1280;
const INITIAL_WINDOW_HEIGHT: u32 = 800;

// === Events ===

/// Events posted to the event loop from worker threads
#[derive(Debug)]
enum AppEvent {
    ModelLoaded(Result<LoadedModel, AssetError>),
}

// === Host ===

/// The window is the only container; the page scroll lives here
struct WinitHost {
    window: Arc<Window>,
    container: String,
    section_count: usize,
    scroll: PageScroll,
}

impl WinitHost {
    fn new(window: Arc<Window>, container: String, section_count: usize) -> Self {
        let mut host = Self {
            window,
            container,
            section_count,
            scroll: PageScroll::default(),
        };
        host.update_range(0.0);
        host
    }

    fn update_range(&mut self, pin_spacing: f32) {
        let height = self.viewport().height as f32;
        self.scroll.set_range(self.section_count, height, pin_spacing);
    }
}

impl HostEnvironment for WinitHost {
    fn has_container(&self, id: &str) -> bool {
        self.container == id
    }

    fn viewport(&self) -> Viewport {
        let size = self.window.inner_size();
        let scale = self.window.scale_factor();
        Viewport::new(
            (size.width as f64 / scale).round() as u32,
            (size.height as f64 / scale).round() as u32,
            scale as f32,
        )
    }

    fn scroll_offset(&self) -> f32 {
        self.scroll.offset()
    }

    fn request_frame(&self) {
        self.window.request_redraw();
    }
}

// === Application ===

struct App {
    config: SceneConfig,
    page: Option<PageLayout>,
    proxy: EventLoopProxy<AppEvent>,
    host: Option<WinitHost>,
    controller: Option<SceneController<GpuRenderer>>,
    input: InputAdapter,
}

impl App {
    fn new(config: SceneConfig, page: PageLayout, proxy: EventLoopProxy<AppEvent>) -> Self {
        Self {
            config,
            page: Some(page),
            proxy,
            host: None,
            controller: None,
            input: InputAdapter::new(1.0),
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop, page: PageLayout) -> Result<()> {
        let window = Arc::new(
            event_loop.create_window(
                Window::default_attributes()
                    .with_title(format!("scroll-orbit ({})", self.config.variant.name()))
                    .with_inner_size(winit::dpi::LogicalSize::new(
                        INITIAL_WINDOW_WIDTH,
                        INITIAL_WINDOW_HEIGHT,
                    )),
            )?,
        );
        self.input.set_scale_factor(window.scale_factor() as f32);

        let host = WinitHost::new(window.clone(), self.config.container.clone(), page.section_count());
        let surface = Surface::from_viewport(host.viewport());
        let renderer = pollster::block_on(GpuRenderer::new(window.clone(), &surface))?;
        let controller = SceneController::new(self.config.clone(), page, &host, renderer)?;

        let proxy = self.proxy.clone();
        spawn_model_load(self.config.model_path.clone(), move |outcome| {
            if proxy.send_event(AppEvent::ModelLoaded(outcome)).is_err() {
                log::warn!("Event loop closed before the model finished loading");
            }
        })?;

        window.request_redraw();
        self.host = Some(host);
        self.controller = Some(controller);
        Ok(())
    }

    fn handle_input(&mut self, action: InputAction) {
        let (Some(host), Some(controller)) = (&mut self.host, &mut self.controller) else {
            return;
        };
        match action {
            InputAction::Rotate(delta) => controller.rotate(delta),
            InputAction::Zoom(steps) => controller.zoom(steps),
            InputAction::Scroll(delta) => {
                let offset = host.scroll.scroll_by(delta);
                controller.on_scroll(offset);
            }
        }
        host.request_frame();
    }

    fn toggle_pause(&mut self) {
        let (Some(host), Some(controller)) = (&self.host, &mut self.controller) else {
            return;
        };
        if controller.is_running() {
            controller.stop();
        } else if let Err(e) = controller.play(host) {
            log::error!("{}", e);
        }
    }
}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(page) = self.page.take() else {
            return;
        };
        if let Err(e) = self.start(event_loop, page) {
            log::error!("Failed to start scene: {:#}", e);
            event_loop.exit();
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: AppEvent) {
        let AppEvent::ModelLoaded(outcome) = event;
        let (Some(host), Some(controller)) = (&mut self.host, &mut self.controller) else {
            return;
        };
        if let Err(e) = controller.on_model_loaded(outcome) {
            log::error!("{}", e);
        }
        host.update_range(controller.pin_spacing());
        host.request_frame();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Let egui handle the event first
        if let Some(controller) = &mut self.controller {
            if controller.renderer_mut().handle_event(&event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => {
                if let Some(controller) = &mut self.controller {
                    controller.stop();
                }
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Space),
                        repeat: false,
                        ..
                    },
                ..
            } => self.toggle_pause(),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.input.set_scale_factor(scale_factor as f32);
            }
            WindowEvent::Resized(_) => {
                if let (Some(host), Some(controller)) = (&mut self.host, &mut self.controller) {
                    controller.resize(&*host);
                    host.update_range(controller.pin_spacing());
                    controller.on_scroll(host.scroll_offset());
                }
            }
            WindowEvent::RedrawRequested => {
                if let (Some(host), Some(controller)) = (&self.host, &mut self.controller) {
                    if let Err(e) = controller.tick(host) {
                        log::error!("{}", e);
                    }
                }
            }
            event => {
                if let Some(action) = self.input.process_event(&event) {
                    self.handle_input(action);
                }
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.scene_config()?;
    let page = PageLayout::load(&cli.page)?;

    let event_loop = EventLoop::<AppEvent>::with_user_event().build()?;
    let mut app = App::new(config, page, event_loop.create_proxy());

    println!("scroll-orbit - Controls: wheel scrolls, drag orbits, Ctrl+wheel zooms, Space pauses, Escape quits");
    event_loop.run_app(&mut app)?;

    Ok(())
}
