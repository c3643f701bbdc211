//! Orbit-style camera controls with damped inertia.
//!
//! Pointer drags and zoom gestures accumulate into a pending spherical delta.
//! Every `update` applies the pending delta around `target`, then decays it
//! by the damping factor so the motion eases out over following frames.

use glam::{Vec2, Vec3};
use std::f32::consts::PI;

use crate::camera::PerspectiveCamera;

pub const DAMPING_FACTOR: f32 = 0.25;
const ROTATE_SPEED: f32 = 1.0;
const ZOOM_STEP: f32 = 0.95;
const MIN_DISTANCE: f32 = 0.01;
const MAX_DISTANCE: f32 = 1000.0;
const POLAR_EPSILON: f32 = 1e-6;
const SETTLED: f32 = 1e-6;

/// Polar/azimuth offset from the orbit target
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    /// Angle from +Y
    phi: f32,
    /// Angle around +Y, measured from +Z
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self { radius, phi: 0.0, theta: 0.0 };
        }
        Self {
            radius,
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            theta: offset.x.atan2(offset.z),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub enable_zoom: bool,
    /// Pending (theta, phi) rotation
    rotate_delta: Vec2,
    /// Pending multiplicative zoom, 1.0 = none
    zoom_scale: f32,
}

impl OrbitControls {
    pub fn new() -> Self {
        Self {
            target: Vec3::ZERO,
            enable_damping: true,
            damping_factor: DAMPING_FACTOR,
            enable_zoom: true,
            rotate_delta: Vec2::ZERO,
            zoom_scale: 1.0,
        }
    }

    /// Drag by `delta` logical pixels on a viewport `viewport_height` tall
    pub fn rotate(&mut self, delta: Vec2, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        let scale = 2.0 * PI * ROTATE_SPEED / viewport_height;
        self.rotate_delta.x -= delta.x * scale;
        self.rotate_delta.y -= delta.y * scale;
    }

    /// Positive steps move the camera towards the target
    pub fn zoom(&mut self, steps: f32) {
        if !self.enable_zoom {
            return;
        }
        self.zoom_scale *= ZOOM_STEP.powf(steps);
    }

    pub fn is_settled(&self) -> bool {
        self.rotate_delta.length() < SETTLED && (self.zoom_scale - 1.0).abs() < SETTLED
    }

    /// Apply pending motion to `camera` and aim it at the target.
    /// Returns true if the camera position changed.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        if self.is_settled() {
            self.rotate_delta = Vec2::ZERO;
            self.zoom_scale = 1.0;
            camera.look_at(self.target);
            return false;
        }

        let mut spherical = Spherical::from_offset(camera.position - self.target);
        let (theta_step, phi_step) = if self.enable_damping {
            (self.rotate_delta.x * self.damping_factor, self.rotate_delta.y * self.damping_factor)
        } else {
            (self.rotate_delta.x, self.rotate_delta.y)
        };

        spherical.theta += theta_step;
        spherical.phi = (spherical.phi + phi_step).clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        spherical.radius = (spherical.radius * self.zoom_scale).clamp(MIN_DISTANCE, MAX_DISTANCE);

        camera.position = self.target + spherical.to_offset();
        camera.look_at(self.target);

        if self.enable_damping {
            self.rotate_delta *= 1.0 - self.damping_factor;
        } else {
            self.rotate_delta = Vec2::ZERO;
        }
        self.zoom_scale = 1.0;
        true
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{CAMERA_FAR, CAMERA_FOV_DEGREES, CAMERA_NEAR};

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::new(CAMERA_FOV_DEGREES, 1.0, CAMERA_NEAR, CAMERA_FAR)
    }

    #[test]
    fn spherical_round_trips_offsets() {
        let offset = Vec3::new(3.0, 4.0, -5.0);
        let back = Spherical::from_offset(offset).to_offset();
        assert!((back - offset).length() < 1e-4);
    }

    #[test]
    fn settled_update_keeps_position() {
        let mut controls = OrbitControls::new();
        let mut cam = camera();
        cam.position = Vec3::new(1.5, 2.0, 7.25);
        let before = cam.position;

        assert!(!controls.update(&mut cam));
        assert_eq!(cam.position, before);
    }

    #[test]
    fn drag_rotates_around_target_and_keeps_distance() {
        let mut controls = OrbitControls::new();
        let mut cam = camera();
        controls.rotate(Vec2::new(100.0, 0.0), 600.0);

        assert!(controls.update(&mut cam));
        assert!((cam.position.length() - 10.0).abs() < 1e-3);
        assert!(cam.position.x.abs() > 0.1);
    }

    #[test]
    fn damping_decays_motion() {
        let mut controls = OrbitControls::new();
        let mut cam = camera();
        controls.rotate(Vec2::new(200.0, 0.0), 600.0);

        let mut steps = Vec::new();
        let mut last = cam.position;
        for _ in 0..3 {
            controls.update(&mut cam);
            steps.push((cam.position - last).length());
            last = cam.position;
        }
        assert!(steps[0] > steps[1] && steps[1] > steps[2]);
    }

    #[test]
    fn zoom_moves_towards_target() {
        let mut controls = OrbitControls::new();
        let mut cam = camera();
        controls.zoom(2.0);
        controls.update(&mut cam);
        assert!((cam.position.length() - 10.0 * 0.95 * 0.95).abs() < 1e-3);
    }

    #[test]
    fn disabled_zoom_is_ignored() {
        let mut controls = OrbitControls::new();
        controls.enable_zoom = false;
        controls.zoom(3.0);
        assert!(controls.is_settled());
    }
}
