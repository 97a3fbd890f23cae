//! Uniform block for the integration shader

use bytemuck::{Pod, Zeroable};
use particle_physics::{ForceField, GridDims, WorldInfo};

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct IntegrationParams {
    // x: time, y: delta, z: padding, w: padding
    pub world: [f32; 4],

    // x: strength K, y: falloff exponent, z: min_distance, w: padding
    pub force: [f32; 4],

    // x, y, z: grid dimensions, w: padding
    pub grid: [u32; 4],
}

impl IntegrationParams {
    pub fn new(world: WorldInfo, field: &ForceField, dims: GridDims) -> Self {
        let mut params = Self::zeroed();
        params.set_world(world);
        params.set_force(field);
        params.grid = dims.to_array();
        params
    }

    pub fn set_world(&mut self, world: WorldInfo) {
        self.world = [world.time, world.delta, 0.0, 0.0];
    }

    pub fn set_force(&mut self, field: &ForceField) {
        self.force = [
            field.strength,
            field.falloff.exponent(),
            field.min_distance,
            0.0,
        ];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use particle_physics::Falloff;

    #[test]
    fn matches_wgsl_layout() {
        // Three vec4s, no implicit padding
        assert_eq!(std::mem::size_of::<IntegrationParams>(), 48);
        assert_eq!(std::mem::align_of::<IntegrationParams>(), 4);
    }

    #[test]
    fn packs_world_force_and_grid() {
        let dims = GridDims::new(8, 4, 2).unwrap();
        let field = ForceField::new(5.0, Falloff::InverseLinear).with_min_distance(0.25);
        let params = IntegrationParams::new(WorldInfo::new(1.5, 0.02), &field, dims);

        assert_eq!(params.world, [1.5, 0.02, 0.0, 0.0]);
        assert_eq!(params.force, [5.0, 1.0, 0.25, 0.0]);
        assert_eq!(params.grid, [8, 4, 2, 0]);
    }

    #[test]
    fn world_update_keeps_force_and_grid() {
        let dims = GridDims::new(2, 2, 2).unwrap();
        let mut params = IntegrationParams::new(WorldInfo::default(), &ForceField::default(), dims);
        let before = params;
        params.set_world(WorldInfo::new(10.0, 0.5));

        assert_eq!(params.world, [10.0, 0.5, 0.0, 0.0]);
        assert_eq!(params.force, before.force);
        assert_eq!(params.grid, before.grid);
    }
}
