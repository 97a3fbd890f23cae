//! Particle state store
//!
//! Two parallel slot arrays, positions and velocities, indexed by particle id.
//! Each slot is 4 floats wide so the same bytes are a valid WGSL
//! `array<vec4<f32>>` and a `Float32x3` instance attribute with a 16-byte
//! stride. The `w` lane is padding and always written as zero.

use crate::constants::CELL_SIZE;
use crate::error::LayoutError;
use crate::grid::GridDims;
use glam::{Vec3, Vec4Swizzles};
use rand::{Rng, SeedableRng};

/// One padded position or velocity slot
pub type Slot = [f32; 4];

fn to_slot(v: Vec3) -> Slot {
    [v.x, v.y, v.z, 0.0]
}

fn from_slot(slot: &Slot) -> Vec3 {
    glam::Vec4::from_array(*slot).xyz()
}

/// Size in bytes of one slot
pub const SLOT_BYTES: u64 = std::mem::size_of::<Slot>() as u64;

/// Check that the particle buffers for `dims` fit the device.
///
/// Each slot array is bound whole as one storage buffer, and the readback
/// staging buffer holds positions followed by velocities.
pub fn check_buffer_limits(
    dims: GridDims,
    max_storage_binding: u64,
    max_buffer: u64,
) -> Result<(), LayoutError> {
    let slots = SLOT_BYTES * dims.count() as u64;
    if slots > max_storage_binding {
        return Err(LayoutError::BufferTooLarge {
            buffer: "position",
            bytes: slots,
            limit: max_storage_binding,
        });
    }

    let staging = 2 * slots;
    if staging > max_buffer {
        return Err(LayoutError::BufferTooLarge {
            buffer: "staging",
            bytes: staging,
            limit: max_buffer,
        });
    }
    Ok(())
}

/// Initial velocity assigned at spawn
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InitialVelocity {
    #[default]
    Zero,
    /// Uniform in `[-max_speed, max_speed]` per axis, reproducible from `seed`
    Random { max_speed: f32, seed: u64 },
}

/// How particles are laid out when the store is created
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnConfig {
    pub cell_size: f32,
    /// Added to every scaled grid coordinate
    pub offset: Vec3,
    pub velocity: InitialVelocity,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            cell_size: CELL_SIZE,
            offset: Vec3::ZERO,
            velocity: InitialVelocity::Zero,
        }
    }
}

impl SpawnConfig {
    /// Spawn config whose grid is centred on the attractor.
    ///
    /// With an even extent on every axis no particle lands on the origin.
    pub fn centered(dims: GridDims, cell_size: f32) -> Self {
        Self {
            cell_size,
            offset: -(dims.as_vec3() - Vec3::ONE) * cell_size * 0.5,
            velocity: InitialVelocity::Zero,
        }
    }

    pub fn with_velocity(mut self, velocity: InitialVelocity) -> Self {
        self.velocity = velocity;
        self
    }

    /// Spawn position of grid cell `index`
    pub fn position_of(&self, dims: GridDims, index: u32) -> Vec3 {
        dims.decode(index).as_vec3() * self.cell_size + self.offset
    }
}

/// Position and velocity buffers for a fixed population of particles
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleStore {
    dims: GridDims,
    positions: Vec<Slot>,
    velocities: Vec<Slot>,
}

impl ParticleStore {
    /// Lay out one particle per grid cell.
    pub fn spawn(dims: GridDims, config: &SpawnConfig) -> Self {
        let count = dims.count();
        let positions: Vec<Slot> = (0..count as u32)
            .map(|i| to_slot(config.position_of(dims, i)))
            .collect();

        let velocities: Vec<Slot> = match config.velocity {
            InitialVelocity::Zero => vec![[0.0; 4]; count],
            InitialVelocity::Random { max_speed, seed } => {
                let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
                let speed = max_speed.abs();
                (0..count)
                    .map(|_| {
                        to_slot(Vec3::new(
                            rng.random_range(-speed..=speed),
                            rng.random_range(-speed..=speed),
                            rng.random_range(-speed..=speed),
                        ))
                    })
                    .collect()
            }
        };

        log::debug!(
            "Spawned {} particles on a {} grid (cell size {})",
            count,
            dims,
            config.cell_size
        );

        Self {
            dims,
            positions,
            velocities,
        }
    }

    /// Wrap existing buffers, rejecting any length that disagrees with `dims`.
    pub fn from_parts(
        dims: GridDims,
        positions: Vec<Slot>,
        velocities: Vec<Slot>,
    ) -> Result<Self, LayoutError> {
        if positions.len() != velocities.len() {
            return Err(LayoutError::LengthMismatch {
                positions: positions.len(),
                velocities: velocities.len(),
            });
        }
        dims.check_count(positions.len())?;

        Ok(Self {
            dims,
            positions,
            velocities,
        })
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn position(&self, index: usize) -> Vec3 {
        from_slot(&self.positions[index])
    }

    pub fn velocity(&self, index: usize) -> Vec3 {
        from_slot(&self.velocities[index])
    }

    pub fn set_position(&mut self, index: usize, position: Vec3) {
        self.positions[index] = to_slot(position);
    }

    pub fn set_velocity(&mut self, index: usize, velocity: Vec3) {
        self.velocities[index] = to_slot(velocity);
    }

    /// Raw position slots, ready for upload
    pub fn positions(&self) -> &[Slot] {
        &self.positions
    }

    /// Raw velocity slots, ready for upload
    pub fn velocities(&self) -> &[Slot] {
        &self.velocities
    }

    /// Mutable access to both buffers at once, for the integrator.
    pub(crate) fn slots_mut(&mut self) -> (&mut [Slot], &mut [Slot]) {
        (&mut self.positions, &mut self.velocities)
    }

    pub(crate) fn read_slot(slot: &Slot) -> Vec3 {
        from_slot(slot)
    }

    pub(crate) fn write_slot(slot: &mut Slot, v: Vec3) {
        *slot = to_slot(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{
        MAX_BUFFER_SIZE, MAX_STORAGE_BUFFER_BINDING_SIZE, MAX_WORKGROUPS_PER_DIMENSION,
    };

    fn unit_grid() -> GridDims {
        GridDims::new(2, 2, 2).unwrap()
    }

    #[test]
    fn spawn_places_particles_at_decoded_coordinates() {
        let config = SpawnConfig {
            cell_size: 1.0,
            ..Default::default()
        };
        let store = ParticleStore::spawn(unit_grid(), &config);
        assert_eq!(store.len(), 8);
        assert_eq!(store.position(5), Vec3::new(1.0, 0.0, 1.0));
        for i in 0..8 {
            assert_eq!(store.velocity(i), Vec3::ZERO);
            assert_eq!(store.positions()[i][3], 0.0);
        }
    }

    #[test]
    fn spawn_applies_cell_size_and_offset() {
        let dims = GridDims::new(3, 1, 1).unwrap();
        let config = SpawnConfig {
            cell_size: 2.0,
            offset: Vec3::new(10.0, -1.0, 0.5),
            velocity: InitialVelocity::Zero,
        };
        let store = ParticleStore::spawn(dims, &config);
        assert_eq!(store.position(2), Vec3::new(14.0, -1.0, 0.5));
    }

    #[test]
    fn centered_grid_avoids_origin() {
        let dims = GridDims::new(4, 4, 2).unwrap();
        let store = ParticleStore::spawn(dims, &SpawnConfig::centered(dims, 3.0));
        let mean = (0..store.len()).map(|i| store.position(i)).sum::<Vec3>() / store.len() as f32;
        assert!(mean.length() < 1e-5);
        assert!((0..store.len()).all(|i| store.position(i).length() > 0.0));
    }

    #[test]
    fn random_velocity_is_bounded_and_reproducible() {
        let config = SpawnConfig::default().with_velocity(InitialVelocity::Random {
            max_speed: 1.5,
            seed: 7,
        });
        let a = ParticleStore::spawn(unit_grid(), &config);
        let b = ParticleStore::spawn(unit_grid(), &config);
        assert_eq!(a, b);
        for i in 0..a.len() {
            let v = a.velocity(i);
            assert!(v.abs().max_element() <= 1.5);
            assert_eq!(a.velocities()[i][3], 0.0);
        }
    }

    #[test]
    fn from_parts_rejects_length_mismatch() {
        let err = ParticleStore::from_parts(unit_grid(), vec![[0.0; 4]; 8], vec![[0.0; 4]; 7]);
        assert_eq!(
            err,
            Err(LayoutError::LengthMismatch {
                positions: 8,
                velocities: 7
            })
        );
    }

    #[test]
    fn from_parts_rejects_count_mismatch() {
        let err = ParticleStore::from_parts(unit_grid(), vec![[0.0; 4]; 6], vec![[0.0; 4]; 6]);
        assert_eq!(err, Err(LayoutError::CountMismatch { grid: 8, count: 6 }));
    }

    #[test]
    fn slot_is_sixteen_bytes() {
        assert_eq!(SLOT_BYTES, 16);
    }

    #[test]
    fn default_grid_fits_default_limits() {
        assert_eq!(
            check_buffer_limits(
                GridDims::default(),
                MAX_STORAGE_BUFFER_BINDING_SIZE,
                MAX_BUFFER_SIZE
            ),
            Ok(())
        );
    }

    #[test]
    fn oversized_grid_exceeds_storage_binding() {
        // 4096 x 4096 x 1 passes the workgroup limit but needs 256 MiB per slot array
        let dims = GridDims::new(4096, 4096, 1).unwrap();
        assert!(dims
            .checked_workgroup_count(crate::TileSize::INTEGRATION, MAX_WORKGROUPS_PER_DIMENSION)
            .is_ok());
        assert_eq!(
            check_buffer_limits(dims, MAX_STORAGE_BUFFER_BINDING_SIZE, MAX_BUFFER_SIZE),
            Err(LayoutError::BufferTooLarge {
                buffer: "position",
                bytes: 268_435_456,
                limit: MAX_STORAGE_BUFFER_BINDING_SIZE,
            })
        );
    }

    #[test]
    fn staging_buffer_holds_both_arrays() {
        // 2048 x 4096 x 1: 128 MiB per array fits the binding, 256 MiB staging fits exactly
        let dims = GridDims::new(2048, 4096, 1).unwrap();
        assert_eq!(
            check_buffer_limits(dims, MAX_STORAGE_BUFFER_BINDING_SIZE, MAX_BUFFER_SIZE),
            Ok(())
        );
        assert_eq!(
            check_buffer_limits(dims, MAX_STORAGE_BUFFER_BINDING_SIZE, MAX_BUFFER_SIZE - 1),
            Err(LayoutError::BufferTooLarge {
                buffer: "staging",
                bytes: 268_435_456,
                limit: MAX_BUFFER_SIZE - 1,
            })
        );
    }

    #[test]
    fn setters_ignore_padding_lane() {
        let mut store = ParticleStore::spawn(unit_grid(), &SpawnConfig::default());
        store.set_velocity(3, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(store.velocities()[3], [1.0, 2.0, 3.0, 0.0]);
    }
}
