//! Hierarchical car model: a base, a body and four wheels, each a rigid part
//! with a fixed local transform in the car frame, composed with the shared
//! vehicle world transform.
//!
//! Invariants: the heading direction stays unit-length (re-normalized after
//! every rotation), and a part's effective world matrix is always
//! `vehicle_world * local_world`, recomputed whenever either side changes.

use cgmath::{Deg, InnerSpace, Matrix3, Matrix4, Point3, Rad, SquareMatrix, Vector3};

use crate::constants::car::{
    BASE_SCALE, BODY_OFFSET, BODY_SCALE, MOVE_SPEED, TURN_SPEED, WHEEL_OFFSETS, WHEEL_SCALE,
    WHEEL_SPIN_STEP,
};
use crate::scene::{Material, MeshKind, SceneObject};

/// Drive state. Purely a flag affecting turn-direction semantics (steering
/// feels reversed while backing up); it does not itself produce motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveState {
    Forward,
    Backward,
    Stopped,
}

/// One rigid part: a scene object plus its decomposed local transform in the
/// car frame. Only the rotation (wheel spin) ever changes after creation.
#[derive(Debug, Clone)]
pub struct CarPart {
    pub object: SceneObject,
    local_scale: Matrix4<f32>,
    local_rot: Matrix4<f32>,
    local_trans: Matrix4<f32>,
    local_world: Matrix4<f32>,
}

impl CarPart {
    fn new(mesh: MeshKind, material: Material) -> Self {
        let mut part = Self {
            object: SceneObject::new(mesh, material),
            local_scale: Matrix4::identity(),
            local_rot: Matrix4::identity(),
            local_trans: Matrix4::identity(),
            local_world: Matrix4::identity(),
        };
        part.update_local_world();
        part
    }

    /// Recompose local scale/rotation/translation (applied in that order).
    fn update_local_world(&mut self) {
        self.local_world = self.local_trans * self.local_rot * self.local_scale;
    }

    pub fn local_world(&self) -> Matrix4<f32> {
        self.local_world
    }
}

// Part indices; wheels are everything from WHEEL_FIRST on.
const BASE: usize = 0;
const BODY: usize = 1;
const WHEEL_FIRST: usize = 2;
const NUM_PARTS: usize = 6;

pub struct CarModel {
    parts: Vec<CarPart>,

    world: Matrix4<f32>,
    scale: Matrix4<f32>,
    rotation: Matrix4<f32>,
    translation: Matrix4<f32>,

    position: Point3<f32>,
    heading: Vector3<f32>,
    state: MoveState,

    /// Cumulative yaw of the vehicle, radians. The rotation matrix is rebuilt
    /// from this absolute angle every turn, so incremental drift cannot
    /// accumulate.
    world_angle: f32,
    /// Cosmetic wheel roll angle; advances a fixed step per move call and
    /// never rewinds exactly with motion.
    wheel_spin: f32,
}

impl CarModel {
    pub fn new() -> Self {
        let wheel_material = Material::tinted(0.15, 0.15, 0.15);
        let mut parts = vec![
            CarPart::new(MeshKind::Box, Material::tinted(0.55, 0.12, 0.12)),
            CarPart::new(MeshKind::Box, Material::tinted(0.75, 0.2, 0.2)),
            CarPart::new(MeshKind::Cylinder, wheel_material),
            CarPart::new(MeshKind::Cylinder, wheel_material),
            CarPart::new(MeshKind::Cylinder, wheel_material),
            CarPart::new(MeshKind::Cylinder, wheel_material),
        ];

        parts[BASE].local_scale = Matrix4::from_nonuniform_scale(
            BASE_SCALE[0],
            BASE_SCALE[1],
            BASE_SCALE[2],
        );

        parts[BODY].local_scale = Matrix4::from_nonuniform_scale(
            BODY_SCALE[0],
            BODY_SCALE[1],
            BODY_SCALE[2],
        );
        parts[BODY].local_trans =
            Matrix4::from_translation(Vector3::from(BODY_OFFSET));

        for (wheel, offset) in parts[WHEEL_FIRST..].iter_mut().zip(WHEEL_OFFSETS) {
            wheel.local_scale = Matrix4::from_nonuniform_scale(
                WHEEL_SCALE[0],
                WHEEL_SCALE[1],
                WHEEL_SCALE[2],
            );
            // Cylinders are authored with their axis along Y; lay them on
            // their side so the axle runs along the car's lateral (Z) axis.
            wheel.local_rot = Matrix4::from_angle_x(Deg(90.0));
            wheel.local_trans = Matrix4::from_translation(Vector3::from(offset));
        }

        for part in &mut parts {
            part.update_local_world();
        }

        let mut car = Self {
            parts,
            world: Matrix4::identity(),
            scale: Matrix4::identity(),
            rotation: Matrix4::identity(),
            translation: Matrix4::identity(),
            position: Point3::new(0.0, 0.0, 0.0),
            heading: Vector3::new(-1.0, 0.0, 0.0),
            state: MoveState::Stopped,
            world_angle: 0.0,
            wheel_spin: 0.0,
        };
        car.update_world_matrix();
        car
    }

    pub fn world_matrix(&self) -> Matrix4<f32> {
        self.world
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    /// Unit forward direction in world space.
    pub fn heading(&self) -> Vector3<f32> {
        self.heading
    }

    /// Cumulative yaw in radians since creation.
    pub fn heading_angle(&self) -> f32 {
        self.world_angle
    }

    pub fn wheel_spin(&self) -> f32 {
        self.wheel_spin
    }

    pub fn move_state(&self) -> MoveState {
        self.state
    }

    pub fn parts(&self) -> &[CarPart] {
        &self.parts
    }

    pub fn set_moving_forward(&mut self) {
        self.state = MoveState::Forward;
    }

    pub fn set_moving_backward(&mut self) {
        self.state = MoveState::Backward;
    }

    pub fn set_stopped(&mut self) {
        self.state = MoveState::Stopped;
    }

    /// Advance along the heading by `dt * MOVE_SPEED` world units; callers
    /// pass negative `dt` to reverse. Also rolls the wheels by a fixed step
    /// in the matching direction (cosmetic, unrelated to wheel circumference).
    pub fn drive(&mut self, dt: f32) {
        let distance = dt * MOVE_SPEED;

        self.wheel_spin += if distance > 0.0 {
            WHEEL_SPIN_STEP
        } else {
            -WHEEL_SPIN_STEP
        };
        let spin = Matrix4::from_angle_z(Rad(self.wheel_spin)) * Matrix4::from_angle_x(Deg(90.0));
        for wheel in &mut self.parts[WHEEL_FIRST..] {
            wheel.local_rot = spin;
            wheel.update_local_world();
        }

        self.position += self.heading * distance;
        self.translation = Matrix4::from_translation(Vector3::new(
            self.position.x,
            self.position.y,
            self.position.z,
        ));

        self.update_world_matrix();
    }

    /// Rotate the heading around world Y by `dt * TURN_SPEED`. While backing
    /// up the rotation sign flips, modeling reversed steering feel. The
    /// vehicle rotation matrix is rebuilt from the cumulative angle, not
    /// composed incrementally.
    pub fn turn(&mut self, dt: f32) {
        let degree = dt * TURN_SPEED;
        let signed = match self.state {
            MoveState::Forward | MoveState::Stopped => degree,
            MoveState::Backward => -degree,
        };

        self.heading = (Matrix3::from_angle_y(Rad(signed)) * self.heading).normalize();
        self.world_angle += signed;
        self.rotation = Matrix4::from_angle_y(Rad(self.world_angle));

        self.update_world_matrix();
    }

    /// Recompose the vehicle world matrix (scale, then rotation, then
    /// translation) and push it down into every part.
    pub fn update_world_matrix(&mut self) {
        self.world = self.translation * self.rotation * self.scale;
        for part in &mut self.parts {
            part.object.world = self.world * part.local_world;
        }
    }
}

impl Default for CarModel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec3_near(a: Vector3<f32>, b: Vector3<f32>, tol: f32) {
        assert!(
            (a - b).magnitude() < tol,
            "expected {:?} ~= {:?}",
            a,
            b
        );
    }

    #[test]
    fn starts_stopped_heading_negative_x() {
        let car = CarModel::new();
        assert_eq!(car.move_state(), MoveState::Stopped);
        assert_vec3_near(car.heading(), Vector3::new(-1.0, 0.0, 0.0), 1e-6);
        assert_eq!(car.parts().len(), NUM_PARTS);
    }

    #[test]
    fn turn_accumulates_into_world_angle() {
        let mut car = CarModel::new();
        car.turn(1.0);
        assert!((car.heading_angle() - 0.25).abs() < 1e-6);

        let expected = Matrix3::from_angle_y(Rad(0.25)) * Vector3::new(-1.0, 0.0, 0.0);
        assert_vec3_near(car.heading(), expected, 1e-5);
    }

    #[test]
    fn repeated_turns_match_one_big_turn() {
        // The rotation matrix is rebuilt from the cumulative angle, so N
        // small turns and one N-times-larger turn agree.
        let mut steps = CarModel::new();
        for _ in 0..10 {
            steps.turn(0.1);
        }
        let mut once = CarModel::new();
        once.turn(1.0);

        assert_vec3_near(steps.heading(), once.heading(), 1e-4);
        assert!((steps.heading_angle() - once.heading_angle()).abs() < 1e-5);
    }

    #[test]
    fn reverse_steering_flips_turn_direction() {
        let mut forward = CarModel::new();
        forward.set_moving_forward();
        forward.turn(1.0);

        let mut backward = CarModel::new();
        backward.set_moving_backward();
        backward.turn(1.0);

        assert!((forward.heading_angle() + backward.heading_angle()).abs() < 1e-6);
    }

    #[test]
    fn drive_round_trip_restores_position_but_not_wheel_spin() {
        let mut car = CarModel::new();
        let start = car.position();
        let spin_start = car.wheel_spin();

        car.drive(0.5);
        car.drive(-0.5);

        let end = car.position();
        assert!((end.x - start.x).abs() < 1e-5);
        assert!((end.y - start.y).abs() < 1e-5);
        assert!((end.z - start.z).abs() < 1e-5);

        // The spin step is fixed per call, not proportional to displacement:
        // two forward calls of very different dt advance it equally.
        car.drive(0.001);
        car.drive(10.0);
        assert!((car.wheel_spin() - (spin_start + 2.0 * WHEEL_SPIN_STEP)).abs() < 1e-6);
    }

    #[test]
    fn drive_moves_along_heading() {
        let mut car = CarModel::new();
        car.drive(2.0);
        // heading (-1,0,0), speed 3 -> 6 units along -x.
        assert!((car.position().x + 6.0).abs() < 1e-5);
        assert!(car.position().z.abs() < 1e-6);
    }

    #[test]
    fn part_world_composes_local_with_vehicle() {
        let mut car = CarModel::new();
        car.drive(1.0);
        car.turn(1.0);

        let vehicle = car.world_matrix();
        for part in car.parts() {
            let expected = vehicle * part.local_world();
            let got = part.object.world;
            for c in 0..4 {
                for r in 0..4 {
                    assert!((expected[c][r] - got[c][r]).abs() < 1e-4);
                }
            }
        }
    }

    #[test]
    fn body_rides_above_base() {
        let car = CarModel::new();
        let body_y = car.parts()[BODY].object.world[3][1];
        let base_y = car.parts()[BASE].object.world[3][1];
        assert!((body_y - base_y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn wheels_follow_the_vehicle_frame() {
        let mut car = CarModel::new();
        car.drive(1.0); // moves 3 units along -x
        let wheel = &car.parts()[WHEEL_FIRST];
        let x = wheel.object.world[3][0];
        let z = wheel.object.world[3][2];
        assert!((x - (-3.0 - 3.0)).abs() < 1e-4);
        assert!((z - -2.0).abs() < 1e-4);
    }
}
