//! Fixed tuning values for the demo scene.
//!
//! Everything here mirrors the hand-tuned values of the original scene; they
//! are not meant to be user-configurable (window/input settings live in
//! `config` instead).

pub mod camera {
    /// Vertical field of view, radians.
    pub const FOV_Y: f32 = std::f32::consts::PI / 3.0;
    pub const NEAR_Z: f32 = 0.5;
    pub const FAR_Z: f32 = 1000.0;

    /// First-person eye offset from the car position, world axes.
    pub const FIRST_PERSON_OFFSET: [f32; 3] = [-2.5, 1.5, 0.0];

    /// Orbit camera distance and its clamp range.
    pub const ORBIT_DISTANCE: f32 = 12.0;
    pub const ORBIT_DISTANCE_MIN: f32 = 3.0;
    pub const ORBIT_DISTANCE_MAX: f32 = 20.0;

    /// Orbit pitch clamp, radians.
    pub const ORBIT_PHI_MIN: f32 = std::f32::consts::PI / 6.0;
    pub const ORBIT_PHI_MAX: f32 = std::f32::consts::FRAC_PI_2;

    /// Free-look pitch is rejected once |look.y| exceeds cos(2*pi/9),
    /// keeping the view angle inside [2pi/9, 7pi/9] from vertical.
    pub const PITCH_LIMIT_COS: f32 = 0.766_044_4; // cos(2*pi/9)

    /// Mouse delta to radians, per second.
    pub const MOUSE_SENSITIVITY: f32 = 1.25;
}

pub mod car {
    /// World units per second.
    pub const MOVE_SPEED: f32 = 3.0;
    /// Radians per second of heading change.
    pub const TURN_SPEED: f32 = 0.25;
    /// Cosmetic wheel spin advance per move call, radians.
    pub const WHEEL_SPIN_STEP: f32 = 0.02;

    pub const BASE_SCALE: [f32; 3] = [4.0, 0.5, 2.0];
    pub const BODY_SCALE: [f32; 3] = [3.0, 0.5, 2.0];
    pub const BODY_OFFSET: [f32; 3] = [0.0, 1.0, 0.0];
    pub const WHEEL_SCALE: [f32; 3] = [0.8, 0.25, 0.8];
    /// Wheel centers in the car frame: front pair at -x, rear pair at +x.
    pub const WHEEL_OFFSETS: [[f32; 3]; 4] = [
        [-3.0, -1.0, -2.0],
        [-3.0, -1.0, 2.0],
        [3.0, -1.0, -2.0],
        [3.0, -1.0, 2.0],
    ];
}

pub mod scene {
    pub const GROUND_Y: f32 = -2.0;
    pub const GROUND_SIZE: f32 = 10_000.0;
    pub const HOUSE_POSITION: [f32; 3] = [-70.0, 0.0, 70.0];

    /// Ground plane for projected shadows, offset slightly above the ground
    /// mesh so shadow geometry never z-fights with it.
    pub const SHADOW_PLANE: [f32; 4] = [0.0, 0.5, 0.0, 0.99];
    /// Shadow-casting point light (w = 1 marks a positional light for the
    /// planar projection).
    pub const SHADOW_LIGHT: [f32; 4] = [0.0, 10.0, -10.0, 1.0];
}
