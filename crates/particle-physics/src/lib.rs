//! # Particle Physics
//!
//! CPU side of the attractor swarm: the grid layout codec, the central force
//! field, the particle state store and a reference integrator that the GPU
//! kernel must agree with.

pub mod constants;
pub mod error;
pub mod forces;
pub mod grid;
pub mod integrate;
pub mod particle;
pub mod stats;

pub use constants::*;
pub use error::*;
pub use forces::*;
pub use grid::*;
pub use integrate::*;
pub use particle::*;
pub use stats::*;
