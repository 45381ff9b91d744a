//! Scene driver.
//!
//! Owns the car, the static scenery and both camera states, and runs the
//! fixed per-frame sequence: input -> car move/turn -> camera follow ->
//! mouse rotation -> update_view_matrix. The renderer only ever sees the
//! resulting matrices.
//!
//! Both cameras are held by value behind an explicit `CameraMode` tag; no
//! downcasting, no shared ownership.

use cgmath::{Matrix4, Point3, Vector3, Vector4};

use crate::camera::{Camera, FirstPersonCamera, ThirdPersonCamera};
use crate::car::CarModel;
use crate::config::DemoConfig;
use crate::constants::camera::{
    FAR_Z, FIRST_PERSON_OFFSET, NEAR_Z, ORBIT_DISTANCE, ORBIT_DISTANCE_MAX, ORBIT_DISTANCE_MIN,
};
use crate::constants::scene::{GROUND_Y, HOUSE_POSITION, SHADOW_LIGHT, SHADOW_PLANE};
use crate::input::{InputState, KeyCode};
use crate::scene::{
    shadow_matrix, DirectionalLight, Material, MeshKind, PointLight, SceneObject,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    FirstPerson,
    ThirdPerson,
}

/// Both camera states plus the active discriminant.
pub struct Cameras {
    pub first: FirstPersonCamera,
    pub third: ThirdPersonCamera,
    pub mode: CameraMode,
}

impl Cameras {
    pub fn active(&self) -> &dyn Camera {
        match self.mode {
            CameraMode::FirstPerson => &self.first,
            CameraMode::ThirdPerson => &self.third,
        }
    }

    pub fn active_mut(&mut self) -> &mut dyn Camera {
        match self.mode {
            CameraMode::FirstPerson => &mut self.first,
            CameraMode::ThirdPerson => &mut self.third,
        }
    }
}

pub struct DemoApp {
    car: CarModel,
    ground: SceneObject,
    house: SceneObject,
    cameras: Cameras,

    dir_light: DirectionalLight,
    point_light: PointLight,
    shadow: Matrix4<f32>,

    mouse_sensitivity: f32,
    fov_y: f32,
    tab_was_down: bool,
}

impl DemoApp {
    pub fn new(config: &DemoConfig) -> Self {
        let car = CarModel::new();

        let ground = SceneObject::with_world(
            MeshKind::Plane,
            Material::tinted(0.35, 0.55, 0.3),
            Matrix4::from_translation(Vector3::new(0.0, GROUND_Y, 0.0)),
        );

        let house = SceneObject::with_world(
            MeshKind::House,
            Material::tinted(0.8, 0.7, 0.55),
            Matrix4::from_translation(Vector3::new(
                HOUSE_POSITION[0],
                GROUND_Y,
                HOUSE_POSITION[2],
            )),
        );

        let mut first = FirstPersonCamera::new();
        let eye = first_person_eye(&car);
        first.look_to(eye, car.heading(), Vector3::new(0.0, 1.0, 0.0));

        let mut third = ThirdPersonCamera::new();
        third.set_target_pos(car.position());
        third.set_distance(ORBIT_DISTANCE);
        third.set_distance_min_max(ORBIT_DISTANCE_MIN, ORBIT_DISTANCE_MAX);

        let mut app = Self {
            car,
            ground,
            house,
            cameras: Cameras {
                first,
                third,
                mode: CameraMode::FirstPerson,
            },
            dir_light: DirectionalLight::overhead(),
            point_light: PointLight::fill(),
            shadow: shadow_matrix(Vector4::from(SHADOW_PLANE), Vector4::from(SHADOW_LIGHT)),
            mouse_sensitivity: config.mouse_sensitivity,
            fov_y: config.fov_y,
            tab_was_down: false,
        };
        app.on_resize(config.window_width, config.window_height);
        app.cameras.active_mut().update_view_matrix();
        app
    }

    pub fn camera_mode(&self) -> CameraMode {
        self.cameras.mode
    }

    pub fn car(&self) -> &CarModel {
        &self.car
    }

    pub fn active_camera(&self) -> &dyn Camera {
        self.cameras.active()
    }

    pub fn dir_light(&self) -> &DirectionalLight {
        &self.dir_light
    }

    pub fn point_light(&self) -> &PointLight {
        &self.point_light
    }

    /// Planar shadow projection (fixed plane and light).
    pub fn shadow_projection(&self) -> Matrix4<f32> {
        self.shadow
    }

    /// Everything drawn in the lit pass.
    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.car
            .parts()
            .iter()
            .map(|part| &part.object)
            .chain([&self.ground, &self.house])
    }

    /// Objects that drop a projected shadow (ground excluded: it receives).
    pub fn shadow_casters(&self) -> impl Iterator<Item = &SceneObject> {
        self.car
            .parts()
            .iter()
            .map(|part| &part.object)
            .chain([&self.house])
    }

    pub fn on_resize(&mut self, width: u32, height: u32) {
        let aspect = width as f32 / height.max(1) as f32;
        self.cameras.first.set_frustum(self.fov_y, aspect, NEAR_Z, FAR_Z);
        self.cameras.third.set_frustum(self.fov_y, aspect, NEAR_Z, FAR_Z);
        self.cameras
            .first
            .core_mut()
            .set_viewport_rect(0.0, 0.0, width as f32, height as f32);
        self.cameras
            .third
            .core_mut()
            .set_viewport_rect(0.0, 0.0, width as f32, height as f32);
    }

    /// One simulation tick. Call order is the contract: car first, then the
    /// active camera's follow/rotate, and `update_view_matrix` last.
    pub fn update(&mut self, input: &InputState, dt: f32) {
        // Car movement and steering.
        if input.is_key_pressed(KeyCode::KeyW) {
            self.car.drive(dt);
            self.car.set_moving_forward();
        }
        if input.is_key_pressed(KeyCode::KeyS) {
            self.car.drive(-dt);
            self.car.set_moving_backward();
        }
        if input.is_key_pressed(KeyCode::KeyA) {
            self.car.turn(-dt);
        }
        if input.is_key_pressed(KeyCode::KeyD) {
            self.car.turn(dt);
        }
        if !input.is_key_pressed(KeyCode::KeyW) && !input.is_key_pressed(KeyCode::KeyS) {
            self.car.set_stopped();
        }

        // Camera follow and look.
        let (mouse_x, mouse_y) = input.get_mouse_delta();
        let rate = dt * self.mouse_sensitivity;
        match self.cameras.mode {
            CameraMode::FirstPerson => {
                self.cameras.first.set_position(first_person_eye(&self.car));
                self.cameras.first.rotate_z(mouse_y * rate);
                self.cameras.first.rotate_y(mouse_x * rate);
            }
            CameraMode::ThirdPerson => {
                self.cameras.third.set_target_pos(self.car.position());
                self.cameras.third.rotate_x(mouse_y * rate);
                self.cameras.third.rotate_y(mouse_x * rate);
                self.cameras.third.approach(-input.get_scroll_delta());
            }
        }

        // Camera mode toggle on Tab edge.
        let tab_down = input.is_key_pressed(KeyCode::Tab);
        if tab_down && !self.tab_was_down {
            self.toggle_camera_mode();
        }
        self.tab_was_down = tab_down;

        self.cameras.active_mut().update_view_matrix();
    }

    /// Switch between free-look and orbit, re-anchoring the incoming camera
    /// to the car so the cut is continuous.
    fn toggle_camera_mode(&mut self) {
        match self.cameras.mode {
            CameraMode::ThirdPerson => {
                let pos = self.car.position();
                self.cameras.first.look_to(
                    Point3::new(pos.x + FIRST_PERSON_OFFSET[0], FIRST_PERSON_OFFSET[1], pos.z),
                    self.car.heading(),
                    Vector3::new(0.0, 1.0, 0.0),
                );
                self.cameras.mode = CameraMode::FirstPerson;
                log::info!("[app] Camera mode: first person");
            }
            CameraMode::FirstPerson => {
                self.cameras.third.set_target_pos(self.car.position());
                self.cameras.third.set_distance(ORBIT_DISTANCE);
                self.cameras
                    .third
                    .set_distance_min_max(ORBIT_DISTANCE_MIN, ORBIT_DISTANCE_MAX);
                self.cameras.mode = CameraMode::ThirdPerson;
                log::info!("[app] Camera mode: third person");
            }
        }
    }
}

/// Eye point of the first-person camera: a fixed world-axis offset from the
/// car position.
fn first_person_eye(car: &CarModel) -> Point3<f32> {
    let pos = car.position();
    Point3::new(
        pos.x + FIRST_PERSON_OFFSET[0],
        pos.y + FIRST_PERSON_OFFSET[1],
        pos.z + FIRST_PERSON_OFFSET[2],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;
    use winit::event::ElementState;

    fn app() -> DemoApp {
        DemoApp::new(&DemoConfig::default())
    }

    fn press(input: &mut InputState, key: KeyCode) {
        input.process_key(key, ElementState::Pressed);
    }

    fn release(input: &mut InputState, key: KeyCode) {
        input.process_key(key, ElementState::Released);
    }

    #[test]
    fn starts_in_first_person_following_the_car() {
        let app = app();
        assert_eq!(app.camera_mode(), CameraMode::FirstPerson);
        let eye = app.active_camera().position();
        let car = app.car.position();
        assert!((eye.x - (car.x - 2.5)).abs() < 1e-5);
        assert!((eye.y - (car.y + 1.5)).abs() < 1e-5);
    }

    #[test]
    fn throttle_drives_the_car_and_sets_state() {
        let mut a = app();
        let mut input = InputState::new();
        press(&mut input, KeyCode::KeyW);
        let before = a.car.position();
        a.update(&input, 0.5);
        assert!((a.car.position() - before).magnitude() > 0.0);
        assert_eq!(a.car.move_state(), crate::car::MoveState::Forward);

        release(&mut input, KeyCode::KeyW);
        a.update(&input, 0.5);
        assert_eq!(a.car.move_state(), crate::car::MoveState::Stopped);
    }

    #[test]
    fn tab_toggles_mode_on_edge_only() {
        let mut a = app();
        let mut input = InputState::new();
        press(&mut input, KeyCode::Tab);
        a.update(&input, 0.016);
        assert_eq!(a.camera_mode(), CameraMode::ThirdPerson);

        // Held Tab must not toggle again.
        a.update(&input, 0.016);
        assert_eq!(a.camera_mode(), CameraMode::ThirdPerson);

        release(&mut input, KeyCode::Tab);
        a.update(&input, 0.016);
        press(&mut input, KeyCode::Tab);
        a.update(&input, 0.016);
        assert_eq!(a.camera_mode(), CameraMode::FirstPerson);
    }

    #[test]
    fn orbit_camera_tracks_the_moving_car() {
        let mut a = app();
        let mut input = InputState::new();
        press(&mut input, KeyCode::Tab);
        a.update(&input, 0.016);
        release(&mut input, KeyCode::Tab);

        press(&mut input, KeyCode::KeyW);
        for _ in 0..10 {
            a.update(&input, 0.1);
        }
        let target = a.cameras.third.target_position();
        let car = a.car.position();
        assert!((target.x - car.x).abs() < 1e-5);
        assert!((target.z - car.z).abs() < 1e-5);

        // Camera stays on its orbit sphere around the target.
        let eye = a.active_camera().position();
        let d = (eye - target).magnitude();
        assert!((d - a.cameras.third.distance()).abs() < 1e-3);
    }

    #[test]
    fn objects_enumerate_car_parts_and_scenery() {
        let a = app();
        assert_eq!(a.objects().count(), 8);
        assert_eq!(a.shadow_casters().count(), 7);
    }

    #[test]
    fn scroll_wheel_zooms_the_orbit_camera() {
        let mut a = app();
        let mut input = InputState::new();
        press(&mut input, KeyCode::Tab);
        a.update(&input, 0.016);
        release(&mut input, KeyCode::Tab);

        input.process_scroll(winit::event::MouseScrollDelta::LineDelta(0.0, 2.0));
        a.update(&input, 0.016);
        assert!(a.cameras.third.distance() < ORBIT_DISTANCE);
    }
}
