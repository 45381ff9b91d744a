//! Free-look camera.
//!
//! Orientation changes are frame deltas applied cumulatively to the triad;
//! `update_view_matrix` re-orthonormalizes before building the view matrix so
//! floating-point drift never accumulates past one frame.

use cgmath::{InnerSpace, Matrix3, Point3, Rad, Vector3};

use super::{Camera, CameraCore};
use crate::constants::camera::PITCH_LIMIT_COS;

#[derive(Debug, Clone, Default)]
pub struct FirstPersonCamera {
    core: CameraCore,
}

impl FirstPersonCamera {
    pub fn new() -> Self {
        Self {
            core: CameraCore::new(),
        }
    }

    /// Direct positional override; used to keep the eye clamped to the
    /// tracked vehicle each frame.
    pub fn set_position(&mut self, pos: Point3<f32>) {
        self.core.position = pos;
    }

    /// Re-derive the full triad from a forward direction and an approximate
    /// up vector. This is the re-anchoring operation used on camera-mode
    /// switch to avoid a discontinuous jump.
    pub fn look_to(&mut self, pos: Point3<f32>, direction: Vector3<f32>, world_up: Vector3<f32>) {
        let look = direction.normalize();
        let right = world_up.cross(look).normalize();
        let up = look.cross(right);

        self.core.position = pos;
        self.core.look = look;
        self.core.right = right;
        self.core.up = up;
    }

    /// Pitch: rotate up/look about the current right axis.
    ///
    /// The rotation is rejected outright (no-op) if it would push |look.y|
    /// beyond cos(2*pi/9); clamping by rejection keeps the view angle away
    /// from the gimbal-flip zone near vertical. An overshooting delta is
    /// dropped whole, not truncated to the boundary.
    pub fn rotate_z(&mut self, rad: f32) {
        let rotation = Matrix3::from_axis_angle(self.core.right, Rad(rad));
        let up = rotation * self.core.up;
        let look = rotation * self.core.look;

        if look.y.abs() > PITCH_LIMIT_COS {
            return;
        }

        self.core.up = up;
        self.core.look = look;
    }

    /// Yaw: rotate the whole triad about world Y. No clamp.
    pub fn rotate_y(&mut self, rad: f32) {
        let rotation = Matrix3::from_angle_y(Rad(rad));
        self.core.right = rotation * self.core.right;
        self.core.up = rotation * self.core.up;
        self.core.look = rotation * self.core.look;
    }
}

impl Camera for FirstPersonCamera {
    fn core(&self) -> &CameraCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CameraCore {
        &mut self.core
    }

    fn update_view_matrix(&mut self) {
        // Re-orthonormalize: look stays authoritative, up and right are
        // rebuilt from it.
        let look = self.core.look.normalize();
        let up = look.cross(self.core.right).normalize();
        let right = up.cross(look);

        self.core.look = look;
        self.core.up = up;
        self.core.right = right;

        self.core.rebuild_view();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;
    use std::f32::consts::PI;

    fn anchored() -> FirstPersonCamera {
        let mut cam = FirstPersonCamera::new();
        cam.look_to(
            Point3::new(0.0, 1.5, 0.0),
            Vector3::new(-1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        );
        cam
    }

    fn assert_orthonormal(core: &CameraCore) {
        let (r, u, l) = (core.right_vector(), core.up_vector(), core.look_vector());
        assert!((r.magnitude() - 1.0).abs() < 1e-4);
        assert!((u.magnitude() - 1.0).abs() < 1e-4);
        assert!((l.magnitude() - 1.0).abs() < 1e-4);
        assert!(r.dot(u).abs() < 1e-4);
        assert!(u.dot(l).abs() < 1e-4);
        assert!(l.dot(r).abs() < 1e-4);
    }

    #[test]
    fn triad_stays_orthonormal_under_rotation_sequences() {
        let mut cam = anchored();
        for i in 0..500 {
            cam.rotate_y(0.013 * (i % 7) as f32 - 0.03);
            cam.rotate_z(0.009 * (i % 5) as f32 - 0.02);
            cam.update_view_matrix();
        }
        assert_orthonormal(cam.core());
    }

    #[test]
    fn pitch_limit_rejects_rather_than_clamps() {
        let mut cam = anchored();
        // Walk pitch close to the limit.
        for _ in 0..200 {
            cam.rotate_z(0.005);
        }
        let look_before = cam.core().look_vector();
        assert!(look_before.y.abs() <= PITCH_LIMIT_COS + 1e-5);

        // A delta that would overshoot is dropped whole: look is unchanged,
        // not clamped to the boundary.
        cam.rotate_z(0.5);
        assert_eq!(cam.core().look_vector(), look_before);
        cam.rotate_z(0.5);
        assert_eq!(cam.core().look_vector(), look_before);
    }

    #[test]
    fn yaw_has_no_clamp() {
        let mut cam = anchored();
        for _ in 0..100 {
            cam.rotate_y(0.2);
        }
        cam.update_view_matrix();
        assert_orthonormal(cam.core());
        // 20 radians of yaw leaves look horizontal.
        assert!(cam.core().look_vector().y.abs() < 1e-3);
    }

    #[test]
    fn view_matrix_translation_uses_dot_products() {
        let mut cam = anchored();
        cam.set_position(Point3::new(3.0, 4.0, 5.0));
        cam.update_view_matrix();

        let core = cam.core();
        let p = Vector3::new(3.0, 4.0, 5.0);
        let view = core.view_matrix();
        assert!((view[3][0] - -p.dot(core.right_vector())).abs() < 1e-5);
        assert!((view[3][1] - -p.dot(core.up_vector())).abs() < 1e-5);
        assert!((view[3][2] - -p.dot(core.look_vector())).abs() < 1e-5);
        assert_eq!(view[3][3], 1.0);
    }

    #[test]
    fn half_turn_yaw_reverses_look() {
        let mut cam = anchored();
        cam.rotate_y(PI);
        cam.update_view_matrix();
        let look = cam.core().look_vector();
        assert!((look.x - 1.0).abs() < 1e-5);
        assert!(look.z.abs() < 1e-5);
    }
}
