//! Engine-level error types.
//!
//! The transform/camera core is infallible by contract (degenerate geometry
//! is clamped, not propagated), so errors here only cover window and GPU
//! setup, where failure is real and recoverable reporting matters.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("window creation failed: {0}")]
    WindowCreation(#[from] winit::error::OsError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("surface creation failed: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible GPU adapter found")]
    AdapterNotFound,

    #[error("device request failed: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),
}

pub type EngineResult<T> = Result<T, EngineError>;
