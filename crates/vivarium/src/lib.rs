//! Vivarium: a persistent simulation core for artificial-life worlds.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Vivarium sub-crates. For most users, adding `vivarium` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use vivarium::prelude::*;
//! use glam::Vec2;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let config = SimConfig::with_path(dir.path().join("world.state"));
//! let mut ctx = SimContext::initialize(config).unwrap();
//!
//! let ant = Species::Ant { carrying: true, heading: 0.0 };
//! let a = ctx.spawn_creature(Vec2::new(10.0, 10.0), Vec2::X, ant).unwrap().unwrap();
//! let b = ctx.spawn_creature(Vec2::new(14.0, 10.0), Vec2::ZERO, ant).unwrap().unwrap();
//!
//! ctx.advance(&mut NullHost).unwrap();
//! assert_eq!(ctx.tick(), 1);
//! assert_eq!(ctx.neighbors_of(a).unwrap(), vec![b]);
//!
//! // Flush the mapped image so the next run picks up where this one ended.
//! ctx.finalize(&mut NullHost, true).unwrap();
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `vivarium-core` | Object ids, voxel hashes, the `NIL` sentinel |
//! | [`space`] | `vivarium-space` | Spatial hash grid, shell tables, radius queries |
//! | [`arena`] | `vivarium-arena` | Mapped state file, free-list pools, double-buffered fields |
//! | [`sim`] | `vivarium-sim` | State layout, species, diffusion and the tick pipeline |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Identifiers and sentinels (`vivarium-core`).
pub use vivarium_core as types;

/// Spatial hash grid (`vivarium-space`).
///
/// [`space::Hashspace`] binds a [`space::ShellTable`] to a voxel store,
/// either the heap-backed [`space::HeapVoxelStore`] or the fixed-size
/// [`space::FixedVoxelStore`] that lives inside a persisted image.
pub use vivarium_space as space;

/// Persistent storage primitives (`vivarium-arena`).
///
/// [`arena::StateArena`] maps a plain-old-data aggregate onto a file;
/// [`arena::FreeList`] and [`arena::DoubleBuffered`] are designed to sit
/// inside such an aggregate.
pub use vivarium_arena as arena;

/// Simulation context and tick pipeline (`vivarium-sim`).
pub use vivarium_sim as sim;

/// Common imports for typical Vivarium usage.
///
/// ```rust
/// use vivarium::prelude::*;
/// ```
pub mod prelude {
    // Identifiers
    pub use vivarium_core::{ObjectId, VoxelHash, NIL};

    // Spatial index
    pub use vivarium_space::{
        EdgeBehavior, FixedVoxelStore, Hashspace, HeapVoxelStore, Planar, ShellTable, SpaceError,
        Volumetric,
    };

    // Storage
    pub use vivarium_arena::{
        ArenaConfig, ArenaError, ArenaOrigin, DoubleBuffered, FieldShape, FreeList, Persistent,
        StateArena,
    };

    // Simulation
    pub use vivarium_sim::{
        DiffusionParams, Host, NullHost, SimConfig, SimContext, SimError, Species, TickMetrics,
    };
}
