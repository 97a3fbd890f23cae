//! # Particle Simulation Engine
//!
//! GPU integration of the attractor swarm using a compute shader dispatched
//! over the particle grid.

pub mod error;
pub mod params;
pub mod simulation;

pub use error::*;
pub use params::*;
pub use simulation::*;
