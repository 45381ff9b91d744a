//! wgpu renderer: procedural meshes, a Blinn-Phong scene pipeline, planar
//! shadow and sky pipelines, and the windowed event loop.

pub mod gpu_state;
pub mod mesh;
pub mod vertex;

pub use gpu_state::{CameraUniform, GpuState};
pub use mesh::{GpuMesh, MeshData};
pub use vertex::Vertex;

use anyhow::Result;
use winit::event_loop::EventLoop;

use crate::config::DemoConfig;

/// Runs the windowed demo to completion on the calling thread.
pub fn run(event_loop: EventLoop<()>, config: DemoConfig) -> Result<()> {
    pollster::block_on(gpu_state::run_app(event_loop, config))
}
