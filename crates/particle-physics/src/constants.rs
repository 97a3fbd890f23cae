//! Default constants for the attractor swarm
//!
//! Values are in simulation units and tuned for real-time viewing, not for
//! any physical system.

/// Attractor strength `K` in `a = K / r^p`
pub const ATTRACTOR_STRENGTH: f32 = 2000.0;

/// Spacing between neighbouring grid cells at spawn
pub const CELL_SIZE: f32 = 4.0;

/// Default grid extent along x
pub const GRID_X: u32 = 32;
/// Default grid extent along y
pub const GRID_Y: u32 = 32;
/// Default grid extent along z
pub const GRID_Z: u32 = 16;

/// Workgroup shape of the integration shader.
/// Must match `@workgroup_size` in `integrate.wgsl`.
pub const TILE_X: u32 = 8;
pub const TILE_Y: u32 = 8;
pub const TILE_Z: u32 = 4;

/// Per-axis workgroup limit guaranteed by `wgpu::Limits::default()`
pub const MAX_WORKGROUPS_PER_DIMENSION: u32 = 65535;

/// Neutral grey base tint for instance coloring
pub const BASE_TINT_NEUTRAL: [f32; 3] = [0.5, 0.5, 0.5];

/// Purple-ish base tint for instance coloring
pub const BASE_TINT_DUSK: [f32; 3] = [0.3, 0.1, 0.3];

/// Storage binding size guaranteed by `wgpu::Limits::default()` (128 MiB)
pub const MAX_STORAGE_BUFFER_BINDING_SIZE: u64 = 128 << 20;

/// Buffer size guaranteed by `wgpu::Limits::default()` (256 MiB)
pub const MAX_BUFFER_SIZE: u64 = 256 << 20;
