//! The persisted simulation aggregate.
//!
//! [`State`] is one `#[repr(C)]` record with no pointers: every
//! cross-reference is a slot index. Its byte image is the state file.

use bytemuck::{Pod, Zeroable};
use vivarium_arena::{DoubleBuffered, FieldShape, FreeList, Persistent};
use vivarium_space::FixedVoxelStore;

use crate::error::SimError;
use crate::layout::{
    CREATURE_VOXELS, FIELD_CELLS, FIELD_HEIGHT, FIELD_WIDTH, LAYOUT_VERSION, MAGIC,
    MAX_CREATURES, MAX_PARTICLES, PARTICLE_VOXELS,
};
use crate::species::SpeciesRecord;

/// Voxel store behind the creature grid.
pub type CreatureStore = FixedVoxelStore<MAX_CREATURES, CREATURE_VOXELS>;

/// Voxel store behind the particle grid.
pub type ParticleStore = FixedVoxelStore<MAX_PARTICLES, PARTICLE_VOXELS>;

/// Scalar simulation parameters and file identification.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Params {
    /// [`MAGIC`] once initialized.
    pub magic: u32,
    /// [`LAYOUT_VERSION`] the file was written with.
    pub layout_version: u32,
    /// Tick counter as `[low, high]` words.
    pub tick: [u32; 2],
    /// World bounds the grids were last reset to.
    pub world_min: [f32; 3],
    /// World bounds the grids were last reset to.
    pub world_max: [f32; 3],
}

impl Params {
    /// Completed ticks.
    pub fn tick(&self) -> u64 {
        u64::from(self.tick[0]) | (u64::from(self.tick[1]) << 32)
    }

    /// Overwrite the tick counter.
    pub fn set_tick(&mut self, tick: u64) {
        self.tick = [tick as u32, (tick >> 32) as u32];
    }
}

/// A creature: planar kinematics plus tagged species data.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Creature {
    /// World position.
    pub position: [f32; 2],
    /// World units per second.
    pub velocity: [f32; 2],
    /// Species discriminator and payload.
    pub species: SpeciesRecord,
}

/// A short-lived volumetric particle.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Particle {
    /// World position.
    pub position: [f32; 3],
    /// World units per second.
    pub velocity: [f32; 3],
    /// Ticks left before the particle expires.
    pub ttl: u32,
}

/// Everything that survives a restart.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct State {
    /// Header and scalars.
    pub params: Params,
    /// Creature records, indexed by slot id.
    pub creatures: [Creature; MAX_CREATURES],
    /// Particle records, indexed by slot id.
    pub particles: [Particle; MAX_PARTICLES],
    /// Creature slot allocator.
    pub creature_pool: FreeList<MAX_CREATURES>,
    /// Particle slot allocator.
    pub particle_pool: FreeList<MAX_PARTICLES>,
    /// Planar grid over creature positions.
    pub creature_grid: CreatureStore,
    /// Volumetric grid over particle positions.
    pub particle_grid: ParticleStore,
    /// Trail laid by foraging ants.
    pub pheromone: DoubleBuffered<f32, FIELD_CELLS>,
    /// Terrain built up by settling particles.
    pub height: DoubleBuffered<f32, FIELD_CELLS>,
}

impl State {
    /// Shape shared by both fields.
    pub const FIELD_SHAPE: FieldShape = FieldShape::planar(FIELD_WIDTH, FIELD_HEIGHT);

    /// Whether the header has never been written.
    pub fn is_blank(&self) -> bool {
        self.params.magic == 0 && self.params.layout_version == 0
    }

    /// Check a reopened image before trusting it.
    pub fn verify(&self) -> Result<(), SimError> {
        if self.params.magic != MAGIC || self.params.layout_version != LAYOUT_VERSION {
            return Err(SimError::LayoutMismatch {
                magic: self.params.magic,
                version: self.params.layout_version,
            });
        }
        self.creature_pool.verify()?;
        self.particle_pool.verify()?;
        self.pheromone.ensure_configured()?;
        self.height.ensure_configured()?;
        Ok(())
    }
}

impl Persistent for State {
    fn initialize(&mut self) {
        bytemuck::bytes_of_mut(self).fill(0);
        self.params.magic = MAGIC;
        self.params.layout_version = LAYOUT_VERSION;
        self.creature_pool.reset();
        self.particle_pool.reset();
        self.pheromone.configure_planar::<FIELD_WIDTH, FIELD_HEIGHT>();
        self.height.configure_planar::<FIELD_WIDTH, FIELD_HEIGHT>();
    }
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("params", &self.params)
            .field("creatures_live", &self.creature_pool.live_count())
            .field("particles_live", &self.particle_pool.live_count())
            .field("pheromone", &self.pheromone)
            .field("height", &self.height)
            .finish()
    }
}
