/// Time advanced per rendered frame
pub const CLOCK_STEP: f32 = 0.05;

/// Virtual frame clock - advances a fixed step per tick, independent of wall time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualClock {
    time: f32,
    step: f32,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::with_step(CLOCK_STEP)
    }

    pub fn with_step(step: f32) -> Self {
        Self { time: 0.0, step }
    }

    /// Advance one step and return the new time
    pub fn tick(&mut self) -> f32 {
        self.time += self.step;
        self.time
    }

    pub fn time(&self) -> f32 {
        self.time
    }
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new()
    }
}
