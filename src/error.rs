use particle_simulation::SimulationError;
use thiserror::Error;

/// Failure while bringing up the window and GPU state
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("could not create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("could not create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("could not open GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("simulation setup failed: {0}")]
    Simulation(#[from] SimulationError),
}
