use super::window::Viewport;

/// Drawable output target - logical size and pixel density
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    /// Width in logical pixels
    pub width: u32,
    /// Height in logical pixels
    pub height: u32,
    pub pixel_ratio: f32,
}

impl Surface {
    pub fn from_viewport(viewport: Viewport) -> Self {
        Self {
            width: viewport.width,
            height: viewport.height,
            pixel_ratio: viewport.pixel_ratio,
        }
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn set_pixel_ratio(&mut self, pixel_ratio: f32) {
        self.pixel_ratio = pixel_ratio;
    }

    /// Size of the backing buffer in physical pixels, never zero
    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        let scale = |v: u32| ((v as f32 * self.pixel_ratio).round() as u32).max(1);
        (scale(self.width), scale(self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drawing_buffer_scales_with_pixel_ratio() {
        let surface = Surface::from_viewport(Viewport::new(800, 600, 2.0));
        assert_eq!(surface.drawing_buffer_size(), (1600, 1200));
    }

    #[test]
    fn fractional_ratios_round() {
        let mut surface = Surface::from_viewport(Viewport::new(101, 50, 1.0));
        surface.set_pixel_ratio(1.5);
        assert_eq!(surface.drawing_buffer_size(), (152, 75));
    }

    #[test]
    fn empty_surface_keeps_one_pixel() {
        let mut surface = Surface::from_viewport(Viewport::new(800, 600, 1.0));
        surface.set_size(0, 0);
        assert_eq!(surface.drawing_buffer_size(), (1, 1));
    }
}
