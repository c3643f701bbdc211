//! Scroll-scrubbed camera timeline.
//!
//! The timeline is laid out on a unit time axis: section `i` owns the slot
//! `[i, i + 1]`. A [`ScrollTrigger`] maps the document scroll offset onto
//! that axis, so sampling is a pure function of the offset and scrubbing
//! backwards replays exactly the same states.

use glam::Vec3;
use std::f32::consts::PI;

use crate::error::{SceneError, SceneResult};

/// Easing curves available to tweens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ease {
    /// Linear
    None,
    /// Quadratic ease-in-out
    Power1InOut,
}

impl Ease {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::None => t,
            Ease::Power1InOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// Maps scroll offsets onto timeline progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollTrigger {
    pub start: f32,
    pub end: f32,
    pub pin: bool,
}

impl ScrollTrigger {
    /// Trigger spanning `(section_count - 1)` viewports from the top of the page
    pub fn for_sections(section_count: usize, viewport_height: f32) -> SceneResult<Self> {
        if section_count == 0 {
            return Err(SceneError::NoSections);
        }
        Ok(Self {
            start: 0.0,
            end: (section_count - 1) as f32 * viewport_height,
            pin: true,
        })
    }

    /// Progress in `[0, 1]`
    pub fn progress(&self, scroll: f32) -> f32 {
        let span = self.end - self.start;
        if span <= 0.0 {
            return if scroll >= self.start { 1.0 } else { 0.0 };
        }
        ((scroll - self.start) / span).clamp(0.0, 1.0)
    }

    /// Whether the trigger element is held in place at this offset
    pub fn is_pinned(&self, scroll: f32) -> bool {
        self.pin && scroll >= self.start && scroll <= self.end
    }

    /// Extra document height added while pinned
    pub fn pin_spacing(&self) -> f32 {
        if self.pin {
            (self.end - self.start).max(0.0)
        } else {
            0.0
        }
    }
}

/// Tween from `from` to `to` over one timeline slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween<T> {
    pub from: T,
    pub to: T,
    pub ease: Ease,
}

impl Tween<Vec3> {
    pub fn sample(&self, local: f32) -> Vec3 {
        self.from.lerp(self.to, self.ease.apply(local))
    }
}

impl Tween<f32> {
    pub fn sample(&self, local: f32) -> f32 {
        self.from + (self.to - self.from) * self.ease.apply(local)
    }
}

/// One section's slot on the timeline
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineStep {
    pub section: usize,
    /// Start on the unit time axis
    pub offset: f32,
    pub duration: f32,
    pub camera: Tween<Vec3>,
    pub overlay: Tween<f32>,
}

impl TimelineStep {
    fn local_time(&self, time: f32) -> f32 {
        ((time - self.offset) / self.duration).clamp(0.0, 1.0)
    }
}

/// Camera state and overlay opacities at one scroll offset
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineSample {
    pub time: f32,
    pub camera_position: Vec3,
    pub look_at: Vec3,
    pub overlay_opacity: Vec<f32>,
}

/// Waypoint on a circle of `radius` at `height`, for section `index` of `count`
pub fn orbit_waypoint(index: usize, count: usize, radius: f32, height: f32) -> Vec3 {
    let angle = (index + 1) as f32 * (360.0 / count as f32);
    let radians = angle * (PI / 180.0);
    Vec3::new(radians.sin() * radius, height, radians.cos() * radius)
}

#[derive(Debug, Clone)]
pub struct ScrollTimeline {
    trigger: ScrollTrigger,
    steps: Vec<TimelineStep>,
    look_at: Vec3,
}

impl ScrollTimeline {
    /// Build one step per section. Camera tweens chain: each starts where
    /// the previous one ends, the first at `camera_start`.
    pub fn build(
        initial_opacity: &[f32],
        viewport_height: f32,
        camera_start: Vec3,
        look_at: Vec3,
        radius: f32,
        height: f32,
    ) -> SceneResult<Self> {
        let count = initial_opacity.len();
        let trigger = ScrollTrigger::for_sections(count, viewport_height)?;

        let mut from = camera_start;
        let steps = initial_opacity
            .iter()
            .enumerate()
            .map(|(i, &opacity)| {
                let to = orbit_waypoint(i, count, radius, height);
                let step = TimelineStep {
                    section: i,
                    offset: i as f32,
                    duration: 1.0,
                    camera: Tween { from, to, ease: Ease::Power1InOut },
                    overlay: Tween { from: opacity, to: 1.0, ease: Ease::None },
                };
                from = to;
                step
            })
            .collect();

        Ok(Self { trigger, steps, look_at })
    }

    pub fn trigger(&self) -> &ScrollTrigger {
        &self.trigger
    }

    pub fn steps(&self) -> &[TimelineStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Total length on the unit time axis
    pub fn duration(&self) -> f32 {
        self.steps
            .iter()
            .map(|s| s.offset + s.duration)
            .fold(0.0, f32::max)
    }

    /// Unit time reached at this scroll offset
    pub fn time_at(&self, scroll: f32) -> f32 {
        self.trigger.progress(scroll) * self.duration()
    }

    /// Scroll offset at which the timeline reaches `time`
    pub fn scroll_for_time(&self, time: f32) -> f32 {
        let duration = self.duration();
        if duration <= 0.0 {
            return self.trigger.start;
        }
        self.trigger.start + (self.trigger.end - self.trigger.start) * (time / duration)
    }

    pub fn sample(&self, scroll: f32) -> TimelineSample {
        self.sample_time(self.time_at(scroll))
    }

    pub fn sample_time(&self, time: f32) -> TimelineSample {
        let camera_position = self
            .active_step(time)
            .map(|step| step.camera.sample(step.local_time(time)))
            .unwrap_or(self.look_at);

        let overlay_opacity = self
            .steps
            .iter()
            .map(|step| step.overlay.sample(step.local_time(time)))
            .collect();

        TimelineSample {
            time,
            camera_position,
            look_at: self.look_at,
            overlay_opacity,
        }
    }

    /// The camera tween that owns `time`; past the end the last one holds
    fn active_step(&self, time: f32) -> Option<&TimelineStep> {
        self.steps
            .iter()
            .rev()
            .find(|step| time >= step.offset)
            .or_else(|| self.steps.first())
    }
}
