//! Startup configuration for the viewer

use particle_physics::{
    Falloff, ForceField, GridDims, InitialVelocity, SpawnConfig, CELL_SIZE,
};
use particle_renderer::Palette;

pub struct AppConfig {
    pub grid: GridDims,
    pub spawn: SpawnConfig,
    pub force: ForceField,
    pub palette: Palette,
    /// Multiplier from wall-clock to simulated seconds
    pub time_scale: f32,
    /// Upper bound on a single tick's delta, so a stalled frame cannot fling
    /// particles through the attractor
    pub max_delta: f32,
    /// Frames between diagnostic readbacks (0 disables them)
    pub diagnostics_interval: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        let grid = GridDims::default();
        Self {
            grid,
            spawn: SpawnConfig::centered(grid, CELL_SIZE).with_velocity(InitialVelocity::Random {
                max_speed: 1.0,
                seed: 0x5eed,
            }),
            force: ForceField::new(particle_physics::ATTRACTOR_STRENGTH, Falloff::InverseSquare),
            palette: Palette::NEUTRAL,
            time_scale: 1.0,
            max_delta: 0.05,
            diagnostics_interval: 600,
        }
    }
}

impl AppConfig {
    /// Clamp a measured frame time into a simulation delta.
    pub fn tick_delta(&self, frame_seconds: f32) -> f32 {
        (frame_seconds * self.time_scale).clamp(0.0, self.max_delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_matches_tile_multiples() {
        let config = AppConfig::default();
        let tile = particle_physics::TileSize::INTEGRATION;
        assert_eq!(config.grid.x() % tile.x, 0);
        assert_eq!(config.grid.y() % tile.y, 0);
        assert_eq!(config.grid.z() % tile.z, 0);
    }

    #[test]
    fn default_spawn_keeps_particles_off_the_origin() {
        let config = AppConfig::default();
        assert!((0..config.grid.count() as u32)
            .all(|i| config.spawn.position_of(config.grid, i).length() > 0.0));
    }

    #[test]
    fn tick_delta_is_scaled_and_clamped() {
        let config = AppConfig {
            time_scale: 2.0,
            max_delta: 0.1,
            ..Default::default()
        };
        assert!((config.tick_delta(0.02) - 0.04).abs() < 1e-6);
        assert_eq!(config.tick_delta(1.0), 0.1);
        assert_eq!(config.tick_delta(-1.0), 0.0);
    }
}
