use glam::{EulerRot, Mat4, Quat, Vec3};

/// Perspective camera placed by a position and pitch/yaw/roll in degrees.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    rotation: Vec3,
    home: (Vec3, Vec3),

    fov_y: f32,
    aspect: f32,
    near: f32,
    far: f32,
}

impl Camera {
    pub const FOV_Y_DEGREES: f32 = 45.0;
    pub const NEAR: f32 = 0.1;
    pub const FAR: f32 = 10_000.0;

    /// Camera at `position` with `rotation` (pitch, yaw, roll in degrees).
    /// [`reset`](Self::reset) returns here.
    pub fn new(position: Vec3, rotation: Vec3, aspect: f32) -> Self {
        Self {
            position,
            rotation,
            home: (position, rotation),
            fov_y: Self::FOV_Y_DEGREES.to_radians(),
            aspect: sanitize_aspect(aspect),
            near: Self::NEAR,
            far: Self::FAR,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = sanitize_aspect(aspect);
    }

    pub fn reset(&mut self) {
        (self.position, self.rotation) = self.home;
    }

    fn orientation(&self) -> Quat {
        let [pitch, yaw, roll] = self.rotation.to_array().map(f32::to_radians);
        Quat::from_euler(EulerRot::YXZ, yaw, pitch, roll)
    }

    /// World to view space.
    pub fn view(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation(), self.position).inverse()
    }

    /// View to clip space, right-handed, depth in `[0, 1]`.
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }
}

fn sanitize_aspect(aspect: f32) -> f32 {
    if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_moves_camera_to_origin() {
        let camera = Camera::new(Vec3::new(7.5, 2.0, 0.0), Vec3::new(0.0, 80.0, 0.0), 1.5);
        let eye = camera.view().transform_point3(camera.position());
        assert!(eye.abs_diff_eq(Vec3::ZERO, 1e-4));
    }

    #[test]
    fn unrotated_camera_looks_down_negative_z() {
        let camera = Camera::new(Vec3::ZERO, Vec3::ZERO, 1.0);
        let ahead = camera.view().transform_point3(Vec3::new(0.0, 0.0, -5.0));
        assert!(ahead.abs_diff_eq(Vec3::new(0.0, 0.0, -5.0), 1e-5));
    }

    #[test]
    fn reset_restores_home_pose() {
        let mut camera = Camera::new(Vec3::Y, Vec3::new(10.0, 20.0, 0.0), 1.0);
        camera.position = Vec3::splat(42.0);
        camera.rotation = Vec3::ZERO;
        camera.reset();
        assert_eq!(camera.position(), Vec3::Y);
        assert_eq!(camera.rotation(), Vec3::new(10.0, 20.0, 0.0));
    }

    #[test]
    fn aspect_follows_resize_and_rejects_degenerate_values() {
        let mut camera = Camera::new(Vec3::ZERO, Vec3::ZERO, 16.0 / 9.0);
        camera.set_aspect(800.0 / 600.0);
        assert_eq!(camera.aspect(), 800.0 / 600.0);
        assert_eq!(
            camera.projection(),
            Mat4::perspective_rh(45f32.to_radians(), 800.0 / 600.0, 0.1, 10_000.0)
        );

        camera.set_aspect(0.0);
        assert_eq!(camera.aspect(), 1.0);
        camera.set_aspect(f32::NAN);
        assert_eq!(camera.aspect(), 1.0);
    }
}
