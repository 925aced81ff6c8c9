//! Benchmark profiles for the Vivarium simulation core.
//!
//! - [`planar_grid`]: a heap-backed creature grid filled with scattered ids
//! - [`populated_context`]: a full [`SimContext`] with creatures and particles
//!
//! Both are deterministic in `seed`.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::Path;

use glam::{Vec2, Vec3};
use vivarium_core::ObjectId;
use vivarium_sim::layout::CREATURE_GRID_RESOLUTION;
use vivarium_sim::{SimConfig, SimContext, SimError, Species};
use vivarium_space::{
    EdgeBehavior, Hashspace, HeapVoxelStore, Planar, ShellTable, SpaceError,
};
use vivarium_test_utils::fixtures::{scatter_2d, scatter_3d};

/// Side length of the square benchmark world.
pub const WORLD_EXTENT: f32 = 450.0;

/// Shell table matching the persisted creature grid.
pub fn creature_shells(edge: EdgeBehavior) -> Result<ShellTable, SpaceError> {
    ShellTable::new(2, CREATURE_GRID_RESOLUTION, edge)
}

/// Build a planar grid over `[0, WORLD_EXTENT]^2` holding `count`
/// scattered ids. The positions are returned alongside in id order.
pub fn planar_grid(
    shells: &ShellTable,
    seed: u64,
    count: usize,
) -> Result<(Hashspace<'_, Planar, HeapVoxelStore>, Vec<Vec2>), SpaceError> {
    let store = HeapVoxelStore::new(count, shells.voxel_count());
    let mut grid = Hashspace::attach(shells, store)?;
    grid.reset(Vec2::ZERO, Vec2::splat(WORLD_EXTENT))?;
    let points = scatter_2d(seed, count, Vec2::ZERO, Vec2::splat(WORLD_EXTENT));
    grid.rebuild(
        points
            .iter()
            .enumerate()
            .map(|(i, p)| (ObjectId(i as u32), *p)),
    )?;
    Ok((grid, points))
}

/// Open a context at `path` and fill it with the given population.
///
/// Creatures alternate between carrying ants and fungi so both field
/// deposits run. Particles live long enough to survive a benchmark run.
pub fn populated_context(
    path: &Path,
    seed: u64,
    creatures: usize,
    particles: usize,
) -> Result<SimContext, SimError> {
    let config = SimConfig {
        worker_count: Some(4),
        ..SimConfig::with_path(path)
    };
    let mut ctx = SimContext::initialize(config)?;
    let extent = Vec2::splat(WORLD_EXTENT);
    for (i, p) in scatter_2d(seed, creatures, Vec2::ZERO, extent).into_iter().enumerate() {
        let species = if i % 2 == 0 {
            Species::Ant {
                carrying: true,
                heading: 0.0,
            }
        } else {
            Species::Fungus {
                spore_timer: 0,
                energy: 1.0,
            }
        };
        ctx.spawn_creature(p, Vec2::new(1.5, -0.5), species)?;
    }
    let max = Vec3::new(WORLD_EXTENT, WORLD_EXTENT, 100.0);
    for p in scatter_3d(seed ^ 0x5eed, particles, Vec3::ZERO, max) {
        ctx.spawn_particle(p, Vec3::new(0.0, 0.0, -0.1), u32::MAX)?;
    }
    Ok(ctx)
}
