//! Semi-implicit Euler integration
//!
//! CPU reference for `integrate.wgsl`. Velocity is advanced first and the new
//! velocity moves the position within the same step:
//!
//! ```text
//! v += F(p) * dt
//! p += v * dt
//! ```

use crate::forces::ForceField;
use crate::grid::{tile_coords, TileSize};
use crate::particle::{ParticleStore, Slot};
use glam::UVec3;

/// Per-tick timing supplied by the host
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldInfo {
    /// Simulated seconds since start
    pub time: f32,
    /// Simulated seconds since the previous tick
    pub delta: f32,
}

impl WorldInfo {
    pub fn new(time: f32, delta: f32) -> Self {
        Self { time, delta }
    }

    /// Advance the clock by `delta` and return the info for that tick.
    pub fn advance(&mut self, delta: f32) -> WorldInfo {
        self.time += delta;
        self.delta = delta;
        *self
    }
}

/// Order in which tiles are visited by [`integrate_tiled`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileOrder {
    Forward,
    Reverse,
}

fn advance_slot(position: &mut Slot, velocity: &mut Slot, field: &ForceField, delta: f32) {
    let p = ParticleStore::read_slot(position);
    let v = ParticleStore::read_slot(velocity) + field.acceleration(p) * delta;
    ParticleStore::write_slot(velocity, v);
    ParticleStore::write_slot(position, p + v * delta);
}

/// Advance every particle one tick, in index order.
pub fn integrate(store: &mut ParticleStore, field: &ForceField, world: WorldInfo) {
    let (positions, velocities) = store.slots_mut();
    for (position, velocity) in positions.iter_mut().zip(velocities.iter_mut()) {
        advance_slot(position, velocity, field, world.delta);
    }
}

/// Advance every particle one tick by walking the same tiles the GPU dispatch
/// uses, resolving each invocation's index through the grid codec.
pub fn integrate_tiled(
    store: &mut ParticleStore,
    field: &ForceField,
    world: WorldInfo,
    tile: TileSize,
    order: TileOrder,
) {
    let dims = store.dims();
    let groups = dims.workgroup_count(tile);
    let mut tiles: Vec<UVec3> = (0..groups.z)
        .flat_map(move |z| {
            (0..groups.y).flat_map(move |y| (0..groups.x).map(move |x| UVec3::new(x, y, z)))
        })
        .collect();
    if order == TileOrder::Reverse {
        tiles.reverse();
    }

    let (positions, velocities) = store.slots_mut();
    for group in tiles {
        for coord in tile_coords(dims, tile, group) {
            let i = dims.encode(coord) as usize;
            advance_slot(&mut positions[i], &mut velocities[i], field, world.delta);
        }
    }
}
