use glam::{Mat4, Quat, Vec3};

pub const CAMERA_FOV_DEGREES: f32 = 90.0;
pub const CAMERA_NEAR: f32 = 0.001;
pub const CAMERA_FAR: f32 = 1000.0;
pub const CAMERA_START: Vec3 = Vec3::new(0.0, 0.0, 10.0);

/// Camera uniform buffer data for GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub position: [f32; 3],
    pub time: f32,
}

/// Perspective camera with a look-at orientation
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub orientation: Quat,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    aspect: f32,
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            position: CAMERA_START,
            orientation: Quat::IDENTITY,
            fov,
            near,
            far,
            aspect,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection();
        camera
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Set the aspect ratio; call `update_projection` afterwards
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn update_projection(&mut self) {
        self.projection = Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far);
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// Rotate so the camera's -Z axis points at `target`
    pub fn look_at(&mut self, target: Vec3) {
        let forward = target - self.position;
        if forward.length_squared() <= f32::EPSILON {
            return;
        }
        let view = Mat4::look_at_rh(self.position, target, Vec3::Y);
        let (_, rotation, _) = view.inverse().to_scale_rotation_translation();
        self.orientation = rotation.normalize();
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    pub fn view(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position).inverse()
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view()
    }

    pub fn to_uniform(&self, time: f32) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_projection().to_cols_array_2d(),
            position: self.position.to_array(),
            time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn look_at_points_forward_at_target() {
        let mut camera = PerspectiveCamera::new(CAMERA_FOV_DEGREES, 1.0, CAMERA_NEAR, CAMERA_FAR);
        camera.position = Vec3::new(10.0, 5.0, 0.0);
        camera.look_at(Vec3::new(0.0, -8.0, -1.0));

        let expected = (Vec3::new(0.0, -8.0, -1.0) - camera.position).normalize();
        assert!(approx(camera.forward(), expected));
    }

    #[test]
    fn look_at_own_position_keeps_orientation() {
        let mut camera = PerspectiveCamera::new(CAMERA_FOV_DEGREES, 1.0, CAMERA_NEAR, CAMERA_FAR);
        camera.look_at(Vec3::ZERO);
        let before = camera.orientation;
        camera.look_at(camera.position);
        assert_eq!(camera.orientation, before);
    }

    #[test]
    fn projection_follows_aspect() {
        let mut camera = PerspectiveCamera::new(CAMERA_FOV_DEGREES, 1.0, CAMERA_NEAR, CAMERA_FAR);
        let square = camera.projection();
        camera.set_aspect(2.0);
        assert_eq!(camera.projection(), square);
        camera.update_projection();
        // x scale halves when the viewport gets twice as wide
        assert!((camera.projection().x_axis.x - square.x_axis.x / 2.0).abs() < 1e-6);
    }

    #[test]
    fn view_maps_target_onto_negative_z() {
        let mut camera = PerspectiveCamera::new(CAMERA_FOV_DEGREES, 1.0, CAMERA_NEAR, CAMERA_FAR);
        camera.look_at(Vec3::ZERO);
        let in_view = camera.view().transform_point3(Vec3::ZERO);
        assert!(approx(in_view, Vec3::new(0.0, 0.0, -10.0)));
    }
}
