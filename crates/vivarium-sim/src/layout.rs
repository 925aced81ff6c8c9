//! Compile-time capacities of the persisted [`State`](crate::State).
//!
//! Changing any of these changes the byte layout of the state file; an
//! existing file is then rejected or reset, never reinterpreted.

/// Creature slots.
pub const MAX_CREATURES: usize = 1024;

/// Particle slots.
pub const MAX_PARTICLES: usize = 2048;

/// Voxels per axis of the planar creature grid.
pub const CREATURE_GRID_RESOLUTION: u32 = 32;

/// Voxel heads in the creature grid.
pub const CREATURE_VOXELS: usize = (CREATURE_GRID_RESOLUTION * CREATURE_GRID_RESOLUTION) as usize;

/// Voxels per axis of the volumetric particle grid.
pub const PARTICLE_GRID_RESOLUTION: u32 = 16;

/// Voxel heads in the particle grid.
pub const PARTICLE_VOXELS: usize =
    (PARTICLE_GRID_RESOLUTION * PARTICLE_GRID_RESOLUTION * PARTICLE_GRID_RESOLUTION) as usize;

/// Field cells along x.
pub const FIELD_WIDTH: u32 = 128;

/// Field cells along y.
pub const FIELD_HEIGHT: u32 = 128;

/// Cells per field side.
pub const FIELD_CELLS: usize = (FIELD_WIDTH * FIELD_HEIGHT) as usize;

/// Identifies a Vivarium state file (`"VIVA"` little-endian).
pub const MAGIC: u32 = u32::from_le_bytes(*b"VIVA");

/// Bumped whenever the persisted layout changes.
pub const LAYOUT_VERSION: u32 = 1;
