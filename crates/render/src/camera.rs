use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

pub const MIN_FOV_DEGREES: f32 = 1.0;
pub const MAX_FOV_DEGREES: f32 = 120.0;
pub const PITCH_LIMIT_DEGREES: f32 = 89.0;

/// Fly camera with position, yaw, pitch, and projection parameters.
///
/// Angles are exposed in degrees. Pitch stays within ±89° so the view never
/// flips; field of view stays within [1°, 120°].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    yaw: f32,
    pitch: f32,
    fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub speed: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            yaw: -90.0,
            pitch: 0.0,
            fov: 90.0,
            aspect: 16.0 / 9.0,
            near: 0.01,
            far: 100.0,
            speed: 1.5,
        }
    }
}

impl Camera {
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn set_yaw(&mut self, degrees: f32) {
        self.yaw = degrees;
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn set_pitch(&mut self, degrees: f32) {
        self.pitch = degrees.clamp(-PITCH_LIMIT_DEGREES, PITCH_LIMIT_DEGREES);
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn set_fov(&mut self, degrees: f32) {
        self.fov = degrees.clamp(MIN_FOV_DEGREES, MAX_FOV_DEGREES);
    }

    /// Update the aspect ratio from a framebuffer size. Zero-sized viewports
    /// (minimised windows) are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn front(&self) -> Vec3 {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.front().cross(Vec3::Y).normalize()
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(self.front()).normalize()
    }

    pub fn move_forward(&mut self, dt: f32) {
        self.position += self.front() * self.speed * dt;
    }

    pub fn move_backward(&mut self, dt: f32) {
        self.position -= self.front() * self.speed * dt;
    }

    pub fn move_left(&mut self, dt: f32) {
        self.position -= self.right() * self.speed * dt;
    }

    pub fn move_right(&mut self, dt: f32) {
        self.position += self.right() * self.speed * dt;
    }

    /// Vertical moves follow world up, not the view.
    pub fn move_up(&mut self, dt: f32) {
        self.position.y += self.speed * dt;
    }

    pub fn move_down(&mut self, dt: f32) {
        self.position.y -= self.speed * dt;
    }

    /// Add to yaw and subtract from pitch, in degrees.
    pub fn turn(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.yaw += yaw_delta;
        self.set_pitch(self.pitch - pitch_delta);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front(), self.up())
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera_looks_down_negative_z() {
        let cam = Camera::default();
        assert!(cam.front().abs_diff_eq(Vec3::NEG_Z, 1e-5));
        assert!(cam.up().abs_diff_eq(Vec3::Y, 1e-5));
        let vp = cam.view_projection();
        assert!(!vp.is_nan());
    }

    #[test]
    fn default_lens_is_a_right_angle() {
        let cam = Camera::default();
        assert_eq!(cam.fov(), 90.0);
        assert_eq!((cam.near, cam.far, cam.speed), (0.01, 100.0, 1.5));
        // A 90 degree vertical fov puts the y focal length at 1.
        assert!((cam.projection_matrix().y_axis.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = Camera::default();
        cam.set_pitch(120.0);
        assert_eq!(cam.pitch(), 89.0);
        cam.turn(0.0, 500.0);
        assert_eq!(cam.pitch(), -89.0);
    }

    #[test]
    fn fov_is_clamped() {
        let mut cam = Camera::default();
        cam.set_fov(500.0);
        assert_eq!(cam.fov(), 120.0);
        cam.set_fov(0.0);
        assert_eq!(cam.fov(), 1.0);
    }

    #[test]
    fn movement_scales_with_delta_time() {
        let mut cam = Camera::default();
        cam.move_forward(2.0);
        assert!(cam.position.abs_diff_eq(Vec3::new(0.0, 0.0, 0.0), 1e-5));
        cam.move_right(1.0);
        assert!((cam.position.x - 1.5).abs() < 1e-5);
    }

    #[test]
    fn zero_viewport_keeps_aspect() {
        let mut cam = Camera::default();
        cam.set_viewport(800, 600);
        let aspect = cam.aspect;
        cam.set_viewport(0, 600);
        assert_eq!(cam.aspect, aspect);
    }

    #[test]
    fn view_matrix_maps_target_in_front_of_eye() {
        let cam = Camera::default();
        let p = cam.view_matrix().transform_point3(Vec3::ZERO);
        assert!((p.z + 3.0).abs() < 1e-5);
    }
}
