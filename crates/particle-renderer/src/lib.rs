//! # Particle Renderer
//!
//! Instanced mesh rendering of the particle swarm, reading positions straight
//! from the simulation's storage buffer.

pub mod camera;
pub mod mesh;
pub mod renderer;
pub mod shading;

pub use camera::*;
pub use mesh::*;
pub use renderer::*;
pub use shading::*;
