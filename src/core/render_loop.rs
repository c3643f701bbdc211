use super::clock::VirtualClock;
use super::frame::FrameInfo;

/// Handle for the recurring per-frame work; replaced on every `play`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTask {
    pub id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running(FrameTask),
    Paused,
}

/// Render loop lifecycle: a cancellable frame task plus the virtual clock
#[derive(Debug, Clone)]
pub struct RenderLoop {
    state: LoopState,
    clock: VirtualClock,
    frames: u64,
    next_task: u64,
}

impl RenderLoop {
    /// Starts running
    pub fn new() -> Self {
        Self {
            state: LoopState::Running(FrameTask { id: 0 }),
            clock: VirtualClock::new(),
            frames: 0,
            next_task: 1,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, LoopState::Running(_))
    }

    /// Cancel the frame task. Returns false if already paused.
    pub fn stop(&mut self) -> bool {
        match self.state {
            LoopState::Running(task) => {
                log::debug!("Render loop paused (task {})", task.id);
                self.state = LoopState::Paused;
                true
            }
            LoopState::Paused => false,
        }
    }

    /// Issue a fresh frame task. Returns None if a task is already active.
    pub fn play(&mut self) -> Option<FrameTask> {
        match self.state {
            LoopState::Running(_) => None,
            LoopState::Paused => {
                let task = FrameTask { id: self.next_task };
                self.next_task += 1;
                self.state = LoopState::Running(task);
                log::debug!("Render loop resumed (task {})", task.id);
                Some(task)
            }
        }
    }

    /// Advance the clock for one frame, or nothing when cancelled
    pub fn begin_frame(&mut self) -> Option<FrameInfo> {
        match self.state {
            LoopState::Running(_) => {
                let time = self.clock.tick();
                self.frames += 1;
                Some(FrameInfo::new(self.frames, time))
            }
            LoopState::Paused => None,
        }
    }

    pub fn time(&self) -> f32 {
        self.clock.time()
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}
