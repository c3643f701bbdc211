//! Debug panel with a single `time` control.
//!
//! The value is stored and displayed only; nothing in the scene reads it.

pub const TIME_RANGE: std::ops::RangeInclusive<f32> = 0.0..=100.0;
pub const TIME_STEP: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DebugSettings {
    time: f32,
}

impl DebugSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Clamp to the slider range and snap to its step
    pub fn set_time(&mut self, value: f32) -> f32 {
        let clamped = value.clamp(*TIME_RANGE.start(), *TIME_RANGE.end());
        self.time = (clamped / TIME_STEP).round() * TIME_STEP;
        self.time
    }

    /// Draw the panel; returns true if the value was edited
    pub fn show(&mut self, ctx: &egui::Context) -> bool {
        let mut value = self.time;
        let response = egui::Window::new("Debug")
            .resizable(false)
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-10.0, 10.0))
            .show(ctx, |ui| {
                ui.add(
                    egui::Slider::new(&mut value, TIME_RANGE)
                        .step_by(TIME_STEP as f64)
                        .text("time"),
                )
            });

        let changed = response
            .and_then(|window| window.inner)
            .is_some_and(|slider| slider.changed());
        if changed {
            self.set_time(value);
        }
        changed
    }
}
