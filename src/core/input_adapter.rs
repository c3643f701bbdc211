use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// Logical pixels scrolled per wheel line
pub const LINE_HEIGHT: f32 = 40.0;

/// What a window event asks the scene to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    /// Orbit drag, in logical pixels
    Rotate(Vec2),
    /// Orbit zoom, positive moves closer
    Zoom(f32),
    /// Page scroll, positive moves down the page
    Scroll(f32),
}

/// Adapter that turns Winit events into scene input actions
///
/// Left-drag orbits the camera. The wheel scrolls the page; with Ctrl held
/// it zooms the orbit controls instead.
#[derive(Debug, Clone, Default)]
pub struct InputAdapter {
    dragging: bool,
    ctrl: bool,
    cursor: Option<Vec2>,
    scale_factor: f32,
}

impl InputAdapter {
    pub fn new(scale_factor: f32) -> Self {
        Self {
            scale_factor,
            ..Default::default()
        }
    }

    pub fn set_scale_factor(&mut self, scale_factor: f32) {
        self.scale_factor = scale_factor;
    }

    /// Process a Winit WindowEvent and return the resulting action, if any
    pub fn process_event(&mut self, event: &WindowEvent) -> Option<InputAction> {
        match event {
            WindowEvent::ModifiersChanged(modifiers) => {
                self.ctrl = modifiers.state().control_key();
                None
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = *state == ElementState::Pressed;
                None
            }
            WindowEvent::CursorMoved { position, .. } => {
                let logical = Vec2::new(position.x as f32, position.y as f32) / self.scale();
                let previous = self.cursor.replace(logical);
                match previous {
                    Some(previous) if self.dragging => Some(InputAction::Rotate(logical - previous)),
                    _ => None,
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                None
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(position) => {
                        position.y as f32 / self.scale() / LINE_HEIGHT
                    }
                };
                if self.ctrl {
                    Some(InputAction::Zoom(lines))
                } else {
                    // Wheel up (positive) scrolls towards the top of the page
                    Some(InputAction::Scroll(-lines * LINE_HEIGHT))
                }
            }
            _ => None,
        }
    }

    fn scale(&self) -> f32 {
        if self.scale_factor > 0.0 {
            self.scale_factor
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;
    use winit::event::{DeviceId, TouchPhase};

    fn device() -> DeviceId {
        unsafe { DeviceId::dummy() }
    }

    fn wheel(lines: f32) -> WindowEvent {
        WindowEvent::MouseWheel {
            device_id: device(),
            delta: MouseScrollDelta::LineDelta(0.0, lines),
            phase: TouchPhase::Moved,
        }
    }

    fn cursor(x: f64, y: f64) -> WindowEvent {
        WindowEvent::CursorMoved {
            device_id: device(),
            position: PhysicalPosition::new(x, y),
        }
    }

    fn left(state: ElementState) -> WindowEvent {
        WindowEvent::MouseInput {
            device_id: device(),
            state,
            button: MouseButton::Left,
        }
    }

    #[test]
    fn wheel_scrolls_page() {
        let mut input = InputAdapter::new(1.0);
        assert_eq!(input.process_event(&wheel(-2.0)), Some(InputAction::Scroll(80.0)));
    }

    #[test]
    fn moving_without_drag_does_not_rotate() {
        let mut input = InputAdapter::new(1.0);
        assert_eq!(input.process_event(&cursor(10.0, 10.0)), None);
        assert_eq!(input.process_event(&cursor(20.0, 10.0)), None);
    }

    #[test]
    fn drag_rotates_in_logical_pixels() {
        let mut input = InputAdapter::new(2.0);
        input.process_event(&cursor(10.0, 10.0));
        input.process_event(&left(ElementState::Pressed));

        assert_eq!(
            input.process_event(&cursor(30.0, 14.0)),
            Some(InputAction::Rotate(Vec2::new(10.0, 2.0)))
        );

        input.process_event(&left(ElementState::Released));
        assert_eq!(input.process_event(&cursor(40.0, 14.0)), None);
    }
}
