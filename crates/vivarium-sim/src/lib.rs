//! Simulation layer for Vivarium.
//!
//! Ties the spatial grids, pools and fields together inside one persisted
//! [`State`] aggregate and drives them through an explicit [`SimContext`]:
//!
//! ```text
//! SimContext
//! ├── SimConfig
//! ├── ShellTable × 2          (creature 2D, particle 3D)
//! └── StateArena<State>       (mmap'd file)
//!     ├── Params
//!     ├── Creature[] + FreeList + FixedVoxelStore (Planar)
//!     ├── Particle[] + FreeList + FixedVoxelStore (Volumetric)
//!     └── DoubleBuffered pheromone / height fields
//! ```
//!
//! Each [`SimContext::advance`] call runs the host's tick hook, integrates
//! and re-indexes entities, then diffuses both fields on worker threads
//! and commits their swaps.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod context;
pub mod diffusion;
pub mod error;
pub mod host;
pub mod layout;
pub mod metrics;
pub mod species;
pub mod state;

pub use config::{ConfigError, SimConfig};
pub use context::SimContext;
pub use diffusion::DiffusionParams;
pub use error::SimError;
pub use host::{Host, NullHost};
pub use metrics::TickMetrics;
pub use species::{Species, SpeciesRecord, SpeciesTag};
pub use state::{Creature, CreatureStore, Params, Particle, ParticleStore, State};
