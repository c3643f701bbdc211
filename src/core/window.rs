use std::cell::{Cell, RefCell};

/// Logical viewport size plus the device pixel ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32, pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            pixel_ratio,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Host environment abstraction - what the scene needs from the window system
pub trait HostEnvironment {
    /// Whether a container with this id can receive the render surface
    fn has_container(&self, id: &str) -> bool;

    /// Current viewport size
    fn viewport(&self) -> Viewport;

    /// Current document scroll offset in logical pixels
    fn scroll_offset(&self) -> f32;

    /// Schedule one more frame at the next display refresh
    fn request_frame(&self);
}

/// Host without a window, driven by tests and tools
#[derive(Debug)]
pub struct HeadlessHost {
    container: String,
    viewport: Cell<Viewport>,
    scroll: Cell<f32>,
    frame_requests: Cell<usize>,
    log: RefCell<Vec<&'static str>>,
}

impl HeadlessHost {
    pub fn new(container: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            container: container.into(),
            viewport: Cell::new(Viewport::new(width, height, 1.0)),
            scroll: Cell::new(0.0),
            frame_requests: Cell::new(0),
            log: RefCell::new(Vec::new()),
        }
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        self.viewport.set(viewport);
        self.log.borrow_mut().push("resize");
    }

    pub fn set_scroll(&self, offset: f32) {
        self.scroll.set(offset);
        self.log.borrow_mut().push("scroll");
    }

    /// Frames requested and not yet delivered
    pub fn pending_frames(&self) -> usize {
        self.frame_requests.get()
    }

    /// Hand out one pending frame request, if any
    pub fn take_frame(&self) -> bool {
        let pending = self.frame_requests.get();
        if pending == 0 {
            return false;
        }
        self.frame_requests.set(pending - 1);
        true
    }

    pub fn events(&self) -> Vec<&'static str> {
        self.log.borrow().clone()
    }
}

impl HostEnvironment for HeadlessHost {
    fn has_container(&self, id: &str) -> bool {
        self.container == id
    }

    fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    fn scroll_offset(&self) -> f32 {
        self.scroll.get()
    }

    fn request_frame(&self) {
        self.frame_requests.set(self.frame_requests.get() + 1);
        self.log.borrow_mut().push("frame");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_aspect() {
        assert_eq!(Viewport::new(1920, 1080, 1.0).aspect(), 1920.0 / 1080.0);
        assert!(Viewport::new(0, 10, 1.0).is_empty());
        assert!(!Viewport::new(1, 1, 2.0).is_empty());
    }

    #[test]
    fn test_headless_container_lookup() {
        let host = HeadlessHost::new("container", 800, 600);
        assert!(host.has_container("container"));
        assert!(!host.has_container("other"));
    }

    #[test]
    fn test_headless_frame_requests() {
        let host = HeadlessHost::new("container", 800, 600);
        assert!(!host.take_frame());

        host.request_frame();
        host.request_frame();
        assert_eq!(host.pending_frames(), 2);
        assert!(host.take_frame());
        assert_eq!(host.pending_frames(), 1);
    }

    #[test]
    fn test_headless_records_events() {
        let host = HeadlessHost::new("container", 800, 600);
        host.set_viewport(Viewport::new(1024, 768, 2.0));
        host.set_scroll(120.0);
        host.request_frame();

        assert_eq!(host.viewport().pixel_ratio, 2.0);
        assert_eq!(host.scroll_offset(), 120.0);
        assert_eq!(host.events(), vec!["resize", "scroll", "frame"]);
    }
}
