//! Grid layout codec
//!
//! Maps a flat particle index to 3D grid coordinates and back. Spawning,
//! dispatch sizing and instance coloring all go through [`GridDims`]; the WGSL
//! shaders repeat the same formula:
//!
//! ```text
//! index = x + y * dx + z * dx * dy
//! ```

use crate::constants::{TILE_X, TILE_Y, TILE_Z};
use crate::error::LayoutError;
use glam::{UVec3, Vec3};

/// Extents of the particle grid. `x * y * z` is the particle count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridDims {
    x: u32,
    y: u32,
    z: u32,
}

impl GridDims {
    pub fn new(x: u32, y: u32, z: u32) -> Result<Self, LayoutError> {
        if x == 0 || y == 0 || z == 0 {
            return Err(LayoutError::ZeroDimension { x, y, z });
        }
        x.checked_mul(y)
            .and_then(|xy| xy.checked_mul(z))
            .ok_or(LayoutError::GridTooLarge { x, y, z })?;

        Ok(Self { x, y, z })
    }

    /// Build dimensions and check them against an existing particle count.
    pub fn with_count(x: u32, y: u32, z: u32, count: usize) -> Result<Self, LayoutError> {
        let dims = Self::new(x, y, z)?;
        dims.check_count(count)?;
        Ok(dims)
    }

    pub fn check_count(&self, count: usize) -> Result<(), LayoutError> {
        if self.count() != count {
            return Err(LayoutError::CountMismatch {
                grid: self.count(),
                count,
            });
        }
        Ok(())
    }

    /// Reject a grid of a different shape, even when the counts agree.
    pub fn check_same(&self, found: GridDims) -> Result<(), LayoutError> {
        if *self != found {
            return Err(LayoutError::DimsMismatch {
                expected: *self,
                found,
            });
        }
        Ok(())
    }

    pub fn x(&self) -> u32 {
        self.x
    }

    pub fn y(&self) -> u32 {
        self.y
    }

    pub fn z(&self) -> u32 {
        self.z
    }

    pub fn as_uvec3(&self) -> UVec3 {
        UVec3::new(self.x, self.y, self.z)
    }

    pub fn as_vec3(&self) -> Vec3 {
        self.as_uvec3().as_vec3()
    }

    /// Number of particles in the grid
    pub fn count(&self) -> usize {
        self.x as usize * self.y as usize * self.z as usize
    }

    pub fn contains(&self, coord: UVec3) -> bool {
        coord.x < self.x && coord.y < self.y && coord.z < self.z
    }

    /// Flatten grid coordinates into a particle index.
    pub fn encode(&self, coord: UVec3) -> u32 {
        debug_assert!(self.contains(coord), "{coord} outside grid {self:?}");
        coord.x + coord.y * self.x + coord.z * self.x * self.y
    }

    /// Recover grid coordinates from a particle index.
    pub fn decode(&self, index: u32) -> UVec3 {
        UVec3::new(
            index % self.x,
            (index / self.x) % self.y,
            (index / (self.x * self.y)) % self.z,
        )
    }

    /// Workgroups needed to cover the grid with `tile`, rounded up per axis.
    pub fn workgroup_count(&self, tile: TileSize) -> UVec3 {
        UVec3::new(
            self.x.div_ceil(tile.x),
            self.y.div_ceil(tile.y),
            self.z.div_ceil(tile.z),
        )
    }

    /// Like [`GridDims::workgroup_count`], rejecting dispatches above `limit` on any axis.
    pub fn checked_workgroup_count(&self, tile: TileSize, limit: u32) -> Result<UVec3, LayoutError> {
        let groups = self.workgroup_count(tile);
        for (axis, workgroups) in [('x', groups.x), ('y', groups.y), ('z', groups.z)] {
            if workgroups > limit {
                return Err(LayoutError::DispatchTooLarge {
                    axis,
                    workgroups,
                    limit,
                });
            }
        }
        Ok(groups)
    }

    /// Extents padded to a `vec4<u32>` for uniform upload
    pub fn to_array(&self) -> [u32; 4] {
        [self.x, self.y, self.z, 0]
    }
}

impl Default for GridDims {
    fn default() -> Self {
        use crate::constants::{GRID_X, GRID_Y, GRID_Z};
        Self {
            x: GRID_X,
            y: GRID_Y,
            z: GRID_Z,
        }
    }
}

impl std::fmt::Display for GridDims {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.x, self.y, self.z)
    }
}

/// Shape of one execution tile (compute workgroup)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSize {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl TileSize {
    /// Tile used by the integration shader
    pub const INTEGRATION: TileSize = TileSize {
        x: TILE_X,
        y: TILE_Y,
        z: TILE_Z,
    };

    /// Flat tile, for grids with a single z layer
    pub const FLAT: TileSize = TileSize { x: 8, y: 8, z: 1 };

    pub fn invocations(&self) -> u32 {
        self.x * self.y * self.z
    }

    /// WGSL attribute text for this tile
    pub fn wgsl_attribute(&self) -> String {
        format!("@workgroup_size({}, {}, {})", self.x, self.y, self.z)
    }
}

impl Default for TileSize {
    fn default() -> Self {
        Self::INTEGRATION
    }
}

/// Iterate every in-grid coordinate covered by the tile at `group`,
/// mirroring a single workgroup's invocations.
pub fn tile_coords(dims: GridDims, tile: TileSize, group: UVec3) -> impl Iterator<Item = UVec3> {
    let base = group * UVec3::new(tile.x, tile.y, tile.z);
    (0..tile.z).flat_map(move |lz| {
        (0..tile.y).flat_map(move |ly| {
            (0..tile.x).filter_map(move |lx| {
                let coord = base + UVec3::new(lx, ly, lz);
                dims.contains(coord).then_some(coord)
            })
        })
    })
}
