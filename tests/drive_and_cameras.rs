//! Headless end-to-end tests: drive the demo through `DemoApp::update` with
//! synthetic input and check the car and camera behavior that a player would
//! observe.

use cgmath::{EuclideanSpace, InnerSpace, Point3, Vector3};
use winit::event::ElementState;

use gokart::{CameraMode, DemoApp, DemoConfig, InputState, MoveState};
use gokart::constants::{camera, car};
use gokart::input::KeyCode;

fn app_and_input() -> (DemoApp, InputState) {
    (DemoApp::new(&DemoConfig::default()), InputState::new())
}

fn press(input: &mut InputState, key: KeyCode) {
    input.process_key(key, ElementState::Pressed);
}

fn release(input: &mut InputState, key: KeyCode) {
    input.process_key(key, ElementState::Released);
}

/// Runs `frames` fixed-step frames, clearing per-frame deltas like the event
/// loop does.
fn run_frames(app: &mut DemoApp, input: &mut InputState, dt: f32, frames: usize) {
    for _ in 0..frames {
        app.update(input, dt);
        input.clear_frame_deltas();
    }
}

#[test]
fn holding_w_drives_the_car_along_its_heading() {
    let (mut app, mut input) = app_and_input();
    let start = app.car().position();
    let heading = app.car().heading();

    press(&mut input, KeyCode::KeyW);
    run_frames(&mut app, &mut input, 1.0 / 60.0, 60);

    let moved = app.car().position() - start;
    let expected = heading * car::MOVE_SPEED; // one second of travel
    assert!(
        (moved - expected).magnitude() < 1e-3,
        "moved {:?}, expected {:?}",
        moved,
        expected
    );
    assert_eq!(app.car().move_state(), MoveState::Forward);

    release(&mut input, KeyCode::KeyW);
    run_frames(&mut app, &mut input, 1.0 / 60.0, 1);
    assert_eq!(app.car().move_state(), MoveState::Stopped);
}

#[test]
fn steering_only_turns_while_driving_changes_course() {
    let (mut app, mut input) = app_and_input();

    // Steering alone re-aims the heading but does not move the car.
    let start = app.car().position();
    press(&mut input, KeyCode::KeyA);
    run_frames(&mut app, &mut input, 1.0 / 60.0, 120);
    release(&mut input, KeyCode::KeyA);
    assert!((app.car().position() - start).magnitude() < 1e-6);
    assert!(app.car().heading_angle().abs() > 1e-4);

    // Driving afterwards follows the new heading.
    let heading = app.car().heading();
    press(&mut input, KeyCode::KeyW);
    run_frames(&mut app, &mut input, 1.0 / 60.0, 30);
    let moved = (app.car().position() - start).normalize();
    assert!(moved.dot(heading) > 0.999);
}

#[test]
fn reversing_flips_steering_direction() {
    let (mut app, mut input) = app_and_input();

    press(&mut input, KeyCode::KeyW);
    press(&mut input, KeyCode::KeyA);
    run_frames(&mut app, &mut input, 1.0 / 60.0, 60);
    let forward_angle = app.car().heading_angle();
    release(&mut input, KeyCode::KeyW);
    release(&mut input, KeyCode::KeyA);

    let (mut app2, mut input2) = app_and_input();
    press(&mut input2, KeyCode::KeyS);
    press(&mut input2, KeyCode::KeyA);
    run_frames(&mut app2, &mut input2, 1.0 / 60.0, 60);
    let backward_angle = app2.car().heading_angle();

    assert!(forward_angle * backward_angle < 0.0);
    assert!((forward_angle + backward_angle).abs() < 1e-5);
}

#[test]
fn tab_toggles_camera_mode_on_press_only() {
    let (mut app, mut input) = app_and_input();
    assert_eq!(app.camera_mode(), CameraMode::FirstPerson);

    press(&mut input, KeyCode::Tab);
    run_frames(&mut app, &mut input, 1.0 / 60.0, 10);
    assert_eq!(app.camera_mode(), CameraMode::ThirdPerson);

    release(&mut input, KeyCode::Tab);
    run_frames(&mut app, &mut input, 1.0 / 60.0, 1);
    press(&mut input, KeyCode::Tab);
    run_frames(&mut app, &mut input, 1.0 / 60.0, 1);
    assert_eq!(app.camera_mode(), CameraMode::FirstPerson);
}

#[test]
fn first_person_camera_rides_with_the_car() {
    let (mut app, mut input) = app_and_input();

    press(&mut input, KeyCode::KeyW);
    run_frames(&mut app, &mut input, 1.0 / 60.0, 120);

    let car_pos = app.car().position();
    let cam_pos = app.active_camera().position();
    let offset = Vector3::from(camera::FIRST_PERSON_OFFSET);
    // Camera anchors at a fixed lateral/vertical offset from the car.
    assert!((cam_pos.x - (car_pos.x + offset.x)).abs() < 1e-3);
    assert!((cam_pos.y - (car_pos.y + offset.y)).abs() < 1e-3);
    assert!((cam_pos.z - (car_pos.z + offset.z)).abs() < 1e-3);
}

#[test]
fn orbit_camera_stays_on_its_sphere_while_the_car_moves() {
    let (mut app, mut input) = app_and_input();

    press(&mut input, KeyCode::Tab);
    run_frames(&mut app, &mut input, 1.0 / 60.0, 1);
    release(&mut input, KeyCode::Tab);
    assert_eq!(app.camera_mode(), CameraMode::ThirdPerson);

    press(&mut input, KeyCode::KeyW);
    for _ in 0..180 {
        input.process_mouse_motion((3.0, 2.0));
        app.update(&input, 1.0 / 60.0);
        input.clear_frame_deltas();

        let target = app.car().position();
        let radius = (app.active_camera().position() - target).magnitude();
        assert!(
            (radius - camera::ORBIT_DISTANCE).abs() < 1e-3,
            "orbit radius drifted to {radius}"
        );
        // Elevation clamp keeps the camera above the target plane.
        assert!(app.active_camera().position().y >= target.y - 1e-4);
    }
}

#[test]
fn scroll_zoom_is_clamped_to_the_distance_range() {
    let (mut app, mut input) = app_and_input();
    press(&mut input, KeyCode::Tab);
    run_frames(&mut app, &mut input, 1.0 / 60.0, 1);
    release(&mut input, KeyCode::Tab);

    for _ in 0..200 {
        input.process_scroll(winit::event::MouseScrollDelta::LineDelta(0.0, 1.0));
        app.update(&input, 1.0 / 60.0);
        input.clear_frame_deltas();
    }
    let target = app.car().position();
    let radius = (app.active_camera().position() - target).magnitude();
    assert!((radius - camera::ORBIT_DISTANCE_MIN).abs() < 1e-3);

    for _ in 0..400 {
        input.process_scroll(winit::event::MouseScrollDelta::LineDelta(0.0, -1.0));
        app.update(&input, 1.0 / 60.0);
        input.clear_frame_deltas();
    }
    let radius = (app.active_camera().position() - target).magnitude();
    assert!((radius - camera::ORBIT_DISTANCE_MAX).abs() < 1e-3);
}

#[test]
fn shadow_projection_flattens_the_car_onto_the_shadow_plane() {
    let (app, _) = app_and_input();
    let shadow = app.shadow_projection();

    for object in app.shadow_casters() {
        let world = shadow * object.world;
        for corner in [
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(-1.0, -1.0, -1.0),
            Point3::new(1.0, -1.0, 1.0),
        ] {
            let v = world * corner.to_homogeneous();
            let y = v.y / v.w;
            assert!((y - (-1.98)).abs() < 1e-3, "shadow vertex at y={y}");
        }
    }
}
