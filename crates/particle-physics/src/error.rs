//! Layout contract violations
//!
//! Every variant is raised while building the store or the GPU dispatch,
//! never while a tick is running.

use crate::grid::GridDims;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    /// One of the grid extents is zero
    #[error("grid dimensions ({x}, {y}, {z}) contain a zero extent")]
    ZeroDimension { x: u32, y: u32, z: u32 },

    /// `x * y * z` does not fit in a `u32` index
    #[error("grid dimensions ({x}, {y}, {z}) overflow a u32 particle index")]
    GridTooLarge { x: u32, y: u32, z: u32 },

    /// Grid product differs from the particle count
    #[error("grid holds {grid} cells but {count} particles were supplied")]
    CountMismatch { grid: usize, count: usize },

    /// Same particle count laid out on a different grid
    #[error("expected a {expected} grid but got {found}")]
    DimsMismatch { expected: GridDims, found: GridDims },

    /// Position and velocity buffers have different lengths
    #[error("position buffer has {positions} entries but velocity buffer has {velocities}")]
    LengthMismatch { positions: usize, velocities: usize },

    /// Dispatch along one axis exceeds the device limit
    #[error("{workgroups} workgroups along {axis} exceeds the device limit of {limit}")]
    DispatchTooLarge {
        axis: char,
        workgroups: u32,
        limit: u32,
    },

    /// A particle buffer would not fit the device's buffer or binding limit
    #[error("{buffer} buffer needs {bytes} bytes but the device allows {limit}")]
    BufferTooLarge {
        buffer: &'static str,
        bytes: u64,
        limit: u64,
    },
}
