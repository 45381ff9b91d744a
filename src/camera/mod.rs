//! Camera system.
//!
//! `CameraCore` holds the state every camera shares: a position, the
//! orthonormal right/up/look triad, the frustum, and the derived view and
//! projection matrices. The two concrete cameras (`FirstPersonCamera`,
//! `ThirdPersonCamera`) implement the `Camera` trait on top of it; the scene
//! driver picks the active one through an explicit mode tag, never through
//! downcasting.
//!
//! Conventions: cgmath column vectors, left-handed projection with clip z in
//! [0, 1] (what wgpu wants). The view matrix is always rebuilt from the triad
//! and position, never mutated independently.

pub mod first_person;
pub mod third_person;

pub use first_person::FirstPersonCamera;
pub use third_person::ThirdPersonCamera;

use cgmath::{InnerSpace, Matrix4, Point3, SquareMatrix, Vector3};

/// Render-target rectangle plus depth range, default depth [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// State shared by every camera variant.
#[derive(Debug, Clone)]
pub struct CameraCore {
    pub(crate) position: Point3<f32>,
    pub(crate) right: Vector3<f32>,
    pub(crate) up: Vector3<f32>,
    pub(crate) look: Vector3<f32>,

    near_z: f32,
    far_z: f32,
    aspect: f32,
    fov_y: f32,
    near_window_height: f32,
    far_window_height: f32,

    view: Matrix4<f32>,
    proj: Matrix4<f32>,
    viewport: Viewport,
}

impl CameraCore {
    pub fn new() -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 0.0),
            right: Vector3::new(0.0, 0.0, 0.0),
            up: Vector3::new(0.0, 0.0, 0.0),
            look: Vector3::new(0.0, 0.0, 0.0),
            near_z: 0.0,
            far_z: 0.0,
            aspect: 0.0,
            fov_y: 0.0,
            near_window_height: 0.0,
            far_window_height: 0.0,
            view: Matrix4::identity(),
            proj: Matrix4::identity(),
            viewport: Viewport::default(),
        }
    }

    /// Recompute the projection matrix and the near/far window heights.
    ///
    /// Must be called once at init and again on every resize; inputs are
    /// caller-guaranteed valid (fov_y in (0, pi), aspect > 0,
    /// 0 < near_z < far_z).
    pub fn set_frustum(&mut self, fov_y: f32, aspect: f32, near_z: f32, far_z: f32) {
        self.fov_y = fov_y;
        self.aspect = aspect;
        self.near_z = near_z;
        self.far_z = far_z;

        self.near_window_height = 2.0 * near_z * (0.5 * fov_y).tan();
        self.far_window_height = 2.0 * far_z * (0.5 * fov_y).tan();

        self.proj = perspective_lh(fov_y, aspect, near_z, far_z);
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn set_viewport_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.viewport = Viewport {
            x,
            y,
            width,
            height,
            ..Viewport::default()
        };
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    pub fn right_vector(&self) -> Vector3<f32> {
        self.right
    }

    pub fn up_vector(&self) -> Vector3<f32> {
        self.up
    }

    pub fn look_vector(&self) -> Vector3<f32> {
        self.look
    }

    pub fn near_window_height(&self) -> f32 {
        self.near_window_height
    }

    pub fn near_window_width(&self) -> f32 {
        self.aspect * self.near_window_height
    }

    pub fn far_window_height(&self) -> f32 {
        self.far_window_height
    }

    pub fn far_window_width(&self) -> f32 {
        self.aspect * self.far_window_height
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.view
    }

    pub fn proj_matrix(&self) -> Matrix4<f32> {
        self.proj
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Rebuild the view matrix from the current triad and position: the
    /// inverse of the camera's rigid transform, with the triad as rows and
    /// dot-product translation terms.
    pub(crate) fn rebuild_view(&mut self) {
        let p = Vector3::new(self.position.x, self.position.y, self.position.z);
        let (r, u, l) = (self.right, self.up, self.look);
        self.view = Matrix4::new(
            r.x, u.x, l.x, 0.0,
            r.y, u.y, l.y, 0.0,
            r.z, u.z, l.z, 0.0,
            -p.dot(r), -p.dot(u), -p.dot(l), 1.0,
        );
    }
}

impl Default for CameraCore {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared camera contract. The concrete cameras only differ in how frame
/// input maps to position and orientation; everything else lives on the core.
pub trait Camera {
    fn core(&self) -> &CameraCore;
    fn core_mut(&mut self) -> &mut CameraCore;

    /// Derive position/orientation into the view matrix. Invoked exactly once
    /// per frame, after all positional and rotational updates, before the
    /// matrix is consumed by rendering.
    fn update_view_matrix(&mut self);

    fn set_frustum(&mut self, fov_y: f32, aspect: f32, near_z: f32, far_z: f32) {
        self.core_mut().set_frustum(fov_y, aspect, near_z, far_z);
    }

    fn view_matrix(&self) -> Matrix4<f32> {
        self.core().view_matrix()
    }

    fn proj_matrix(&self) -> Matrix4<f32> {
        self.core().proj_matrix()
    }

    fn position(&self) -> Point3<f32> {
        self.core().position()
    }
}

/// Left-handed perspective projection mapping z to [0, 1].
///
/// Column-major: [2][2] = far/(far-near), [2][3] = 1,
/// [3][2] = -near*far/(far-near).
pub fn perspective_lh(fov_y: f32, aspect: f32, near_z: f32, far_z: f32) -> Matrix4<f32> {
    let h = 1.0 / (0.5 * fov_y).tan();
    let w = h / aspect;
    let range = far_z / (far_z - near_z);
    Matrix4::new(
        w, 0.0, 0.0, 0.0,
        0.0, h, 0.0, 0.0,
        0.0, 0.0, range, 1.0,
        0.0, 0.0, -range * near_z, 0.0,
    )
}

/// Wrap an angle into the canonical [-pi, pi) range.
pub fn wrap_angle(theta: f32) -> f32 {
    use std::f32::consts::PI;
    (theta + PI).rem_euclid(2.0 * PI) - PI
}

/// Normalize, falling back when the input is too short to divide by.
/// Degenerate cross products at the orbit poles land here; a real-time
/// camera clamps instead of erroring out mid-frame.
pub(crate) fn safe_normalize(v: Vector3<f32>, fallback: Vector3<f32>) -> Vector3<f32> {
    const EPSILON_SQ: f32 = 1e-12;
    if v.magnitude2() < EPSILON_SQ {
        fallback
    } else {
        v.normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn projection_matches_lh_perspective_formula() {
        let mut core = CameraCore::new();
        let (fov_y, aspect, near, far) = (PI / 3.0, 16.0 / 9.0, 0.5, 1000.0);
        core.set_frustum(fov_y, aspect, near, far);

        let proj = core.proj_matrix();
        assert_eq!(proj[2][2], far / (far - near));
        assert_eq!(proj[2][3], 1.0);
        assert_eq!(proj[3][2], -near * far / (far - near));
        assert_eq!(proj[3][3], 0.0);
    }

    #[test]
    fn frustum_window_heights() {
        let mut core = CameraCore::new();
        core.set_frustum(PI / 2.0, 2.0, 1.0, 10.0);
        // tan(pi/4) = 1, so the near window is 2*near high.
        assert!((core.near_window_height() - 2.0).abs() < 1e-6);
        assert!((core.far_window_height() - 20.0).abs() < 1e-5);
        assert!((core.near_window_width() - 4.0).abs() < 1e-6);
    }

    #[test]
    fn viewport_defaults_to_unit_depth_range() {
        let mut core = CameraCore::new();
        core.set_viewport_rect(0.0, 0.0, 800.0, 600.0);
        let vp = core.viewport();
        assert_eq!(vp.min_depth, 0.0);
        assert_eq!(vp.max_depth, 1.0);
        assert_eq!(vp.width, 800.0);
    }

    #[test]
    fn wrap_angle_is_canonical() {
        assert!((wrap_angle(3.0 * PI) - (-PI)).abs() < 1e-6);
        assert!((wrap_angle(-PI) - (-PI)).abs() < 1e-6);
        assert!(wrap_angle(100.0) >= -PI && wrap_angle(100.0) < PI);
        assert!((wrap_angle(0.25) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn safe_normalize_falls_back_on_degenerate_input() {
        let fallback = Vector3::new(1.0, 0.0, 0.0);
        let out = safe_normalize(Vector3::new(0.0, 1e-9, 0.0), fallback);
        assert_eq!(out, fallback);
        let out = safe_normalize(Vector3::new(0.0, 3.0, 0.0), fallback);
        assert!((out.y - 1.0).abs() < 1e-6);
    }
}
