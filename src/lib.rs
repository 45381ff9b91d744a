//! Gokart: a small driveable-car demo.
//!
//! A hierarchical car model (chassis, body, four wheels) drives around a
//! ground plane under WASD control, watched by either a mouse-look
//! first-person camera or an orbiting third-person camera. Rendering is
//! wgpu with procedurally built meshes, planar projected shadows and a
//! gradient sky.

pub mod app;
pub mod camera;
pub mod car;
pub mod config;
pub mod constants;
pub mod error;
pub mod input;
pub mod renderer;
pub mod scene;

pub use app::{CameraMode, DemoApp};
pub use camera::{Camera, FirstPersonCamera, ThirdPersonCamera};
pub use car::{CarModel, MoveState};
pub use config::DemoConfig;
pub use error::{EngineError, EngineResult};
pub use input::InputState;

use winit::event_loop::EventLoop;

/// Owns the demo configuration and the winit event loop until `run` is
/// called. `run` consumes the loop and blocks until the window closes.
pub struct Engine {
    config: DemoConfig,
    event_loop: Option<EventLoop<()>>,
}

impl Engine {
    pub fn new(config: DemoConfig) -> EngineResult<Self> {
        let event_loop = EventLoop::new()?;
        Ok(Self {
            config,
            event_loop: Some(event_loop),
        })
    }

    pub fn run(mut self) -> anyhow::Result<()> {
        let event_loop = self
            .event_loop
            .take()
            .ok_or_else(|| anyhow::anyhow!("event loop already consumed"))?;
        renderer::run(event_loop, self.config)
    }
}
