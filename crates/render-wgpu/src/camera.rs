use glam::{Mat4, Quat, Vec3};
use std::f32::consts::{FRAC_PI_2, TAU};

/// First-person perspective camera: position, Euler rotation, and lens
/// parameters.
///
/// Only the x (pitch) and y (yaw) rotation components are meaningful; z is
/// reserved and ignored. Pitch is always within [-pi/2, +pi/2] and yaw
/// within [0, 2*pi).
///
/// Lens parameters are not validated here; near >= 0 and far > near are the
/// caller's responsibility, and a violating pair produces a degenerate
/// projection.
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub rotation: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    /// Width / height.
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveCamera {
    pub fn new(position: Vec3, rotation: Vec3, fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            rotation,
            fov,
            aspect,
            near,
            far,
        }
    }

    /// Translate by a motion vector given in camera-local axes (right, up,
    /// forward = -z).
    ///
    /// The motion is brought into world space through the inverse of the
    /// yaw rotation only; pitch is deliberately excluded so that looking up
    /// or down never changes horizontal movement speed or direction.
    pub fn move_local(&mut self, motion: Vec3) {
        let world = Quat::from_rotation_y(-self.rotation.y) * motion;
        self.position += world;
    }

    /// Apply a rotation delta. Pitch (x) is clamped to [-pi/2, +pi/2] so the
    /// camera cannot flip over the poles; yaw (y) is wrapped into [0, 2*pi)
    /// so it never grows without bound. Roll (z) is not supported.
    pub fn rotate(&mut self, delta: Vec3) {
        self.rotation.x = (self.rotation.x + delta.x).clamp(-FRAC_PI_2, FRAC_PI_2);
        self.rotation.y = (self.rotation.y + delta.y).rem_euclid(TAU);
    }

    /// World-to-camera transform: Rx(pitch) * Ry(yaw) * T(-position).
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_x(self.rotation.x)
            * Mat4::from_rotation_y(self.rotation.y)
            * Mat4::from_translation(-self.position)
    }

    /// Symmetric perspective projection with the GL-style [-1, 1] depth
    /// range, matching the shader's depth convention.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov, self.aspect, self.near, self.far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::new(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::ZERO,
            70.0_f32.to_radians(),
            2.0,
            0.5,
            100.0,
        )
    }

    fn assert_approx(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-5, "{a} != {b}");
    }

    #[test]
    fn pitch_saturates_at_half_pi() {
        let mut cam = camera();
        for _ in 0..10 {
            cam.rotate(Vec3::new(10.0, 0.0, 0.0));
            assert!(cam.rotation.x <= FRAC_PI_2);
        }
        assert_eq!(cam.rotation.x, FRAC_PI_2);

        for _ in 0..10 {
            cam.rotate(Vec3::new(-10.0, 0.0, 0.0));
        }
        assert_eq!(cam.rotation.x, -FRAC_PI_2);
    }

    #[test]
    fn yaw_wraps_into_zero_to_tau() {
        let mut cam = camera();
        let mut total: f64 = 0.0;
        for _ in 0..10 {
            cam.rotate(Vec3::new(0.0, 7.0, 0.0));
            total += 7.0;
            assert!((0.0..TAU).contains(&cam.rotation.y));
        }
        let expected = (total % (TAU as f64)) as f32;
        assert!((cam.rotation.y - expected).abs() < 1e-3);
    }

    #[test]
    fn negative_yaw_stays_in_range() {
        let mut cam = camera();
        cam.rotate(Vec3::new(0.0, -0.25, 0.0));
        assert_approx(cam.rotation.y, TAU - 0.25);
    }

    #[test]
    fn forward_motion_at_quarter_turn_moves_along_world_x() {
        let mut cam = camera();
        cam.rotate(Vec3::new(0.0, FRAC_PI_2, 0.0));
        // Pitch must not affect horizontal movement.
        cam.rotate(Vec3::new(1.0, 0.0, 0.0));
        let start = cam.position;
        cam.move_local(Vec3::new(0.0, 0.0, -1.0));
        let delta = cam.position - start;
        assert_approx(delta.x, 1.0);
        assert_approx(delta.y, 0.0);
        assert_approx(delta.z, 0.0);
    }

    #[test]
    fn motion_at_zero_yaw_is_untransformed() {
        let mut cam = camera();
        let start = cam.position;
        cam.move_local(Vec3::new(1.0, 2.0, 3.0));
        let delta = cam.position - start;
        assert_approx(delta.x, 1.0);
        assert_approx(delta.y, 2.0);
        assert_approx(delta.z, 3.0);
    }

    #[test]
    fn view_matrix_composes_rotation_after_translation() {
        let mut cam = camera();
        cam.rotation = Vec3::new(0.3, 1.2, 0.0);
        let expected = Mat4::from_rotation_x(0.3)
            * Mat4::from_rotation_y(1.2)
            * Mat4::from_translation(-cam.position);
        let got = cam.view_matrix();
        for (a, b) in got.to_cols_array().iter().zip(expected.to_cols_array()) {
            assert_approx(*a, b);
        }
    }

    #[test]
    fn view_matrix_at_identity_pose_is_pure_translation() {
        let mut cam = camera();
        cam.position = Vec3::new(1.0, 2.0, 3.0);
        cam.rotation = Vec3::ZERO;
        let v = cam.view_matrix();
        let p = v.transform_point3(Vec3::new(1.0, 2.0, 3.0));
        assert_approx(p.length(), 0.0);
    }

    #[test]
    fn projection_matrix_has_expected_entries() {
        let cam = camera();
        let m = cam.projection_matrix().to_cols_array_2d();
        let f = 1.0 / (cam.fov / 2.0).tan();
        assert_approx(m[0][0], f / cam.aspect);
        assert_approx(m[1][1], f);
        assert_approx(m[2][2], -(cam.far + cam.near) / (cam.far - cam.near));
        assert_approx(m[2][3], -1.0);
        assert_approx(m[3][2], -2.0 * cam.far * cam.near / (cam.far - cam.near));
        assert_approx(m[3][3], 0.0);
    }
}
