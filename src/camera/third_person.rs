//! Orbit camera.
//!
//! Position is always derived from spherical coordinates (distance, theta,
//! phi) around the tracked target, never set directly. Theta is unbounded but
//! wrapped to [-pi, pi); phi is clamped to [pi/6, pi/2] so the orbit can
//! neither dip below the horizon nor cross the pole.

use cgmath::{InnerSpace, Point3, Vector3};

use super::{safe_normalize, wrap_angle, Camera, CameraCore};
use crate::constants::camera::{ORBIT_PHI_MAX, ORBIT_PHI_MIN};

#[derive(Debug, Clone)]
pub struct ThirdPersonCamera {
    core: CameraCore,
    target_pos: Point3<f32>,
    distance: f32,
    /// Polar angle from world +Y, radians.
    phi: f32,
    /// Azimuth around the target, radians, wrapped to [-pi, pi).
    theta: f32,
    min_dist: f32,
    max_dist: f32,
}

impl ThirdPersonCamera {
    pub fn new() -> Self {
        Self {
            core: CameraCore::new(),
            target_pos: Point3::new(0.0, 0.0, 0.0),
            distance: 0.0,
            phi: 0.0,
            theta: 0.0,
            min_dist: 0.0,
            max_dist: 0.0,
        }
    }

    pub fn target_position(&self) -> Point3<f32> {
        self.target_pos
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn rotation_x(&self) -> f32 {
        self.phi
    }

    pub fn rotation_y(&self) -> f32 {
        self.theta
    }

    /// Set the orbited point; called every frame from the tracked entity.
    pub fn set_target_pos(&mut self, target_pos: Point3<f32>) {
        self.target_pos = target_pos;
    }

    /// Set the orbit radius. Deliberately not clamped here: the original
    /// only enforces [min, max] on the next `approach` call, and that lazy
    /// clamp is preserved (see the test suite).
    pub fn set_distance(&mut self, dist: f32) {
        self.distance = dist;
    }

    pub fn set_distance_min_max(&mut self, min_dist: f32, max_dist: f32) {
        self.min_dist = min_dist;
        self.max_dist = max_dist;
    }

    pub fn set_rotation_x(&mut self, phi: f32) {
        self.phi = wrap_angle(phi).clamp(ORBIT_PHI_MIN, ORBIT_PHI_MAX);
    }

    pub fn set_rotation_y(&mut self, theta: f32) {
        self.theta = wrap_angle(theta);
    }

    /// Orbit pitch.
    pub fn rotate_x(&mut self, rad: f32) {
        self.phi = (self.phi - rad).clamp(ORBIT_PHI_MIN, ORBIT_PHI_MAX);
    }

    /// Orbit yaw; unbounded input, canonical wrapped representative.
    pub fn rotate_y(&mut self, rad: f32) {
        self.theta = wrap_angle(self.theta - rad);
    }

    /// Move along the view ray toward (negative) or away from the target.
    pub fn approach(&mut self, delta: f32) {
        self.distance = (self.distance + delta).clamp(self.min_dist, self.max_dist);
    }
}

impl Default for ThirdPersonCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera for ThirdPersonCamera {
    fn core(&self) -> &CameraCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CameraCore {
        &mut self.core
    }

    fn update_view_matrix(&mut self) {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();

        self.core.position = Point3::new(
            self.target_pos.x + self.distance * sin_phi * cos_theta,
            self.target_pos.y + self.distance * cos_phi,
            self.target_pos.z + self.distance * sin_phi * sin_theta,
        );

        let look = (self.target_pos - self.core.position).normalize();
        // Near the poles cross(world_up, look) degenerates; fall back to the
        // previous right vector instead of dividing by near-zero.
        let world_up = Vector3::new(0.0, 1.0, 0.0);
        let fallback = if self.core.right.magnitude2() > 0.5 {
            self.core.right
        } else {
            Vector3::new(1.0, 0.0, 0.0)
        };
        let right = safe_normalize(world_up.cross(look), fallback);
        let up = look.cross(right);

        self.core.right = right;
        self.core.up = up;
        self.core.look = look;

        self.core.rebuild_view();
    }
}
