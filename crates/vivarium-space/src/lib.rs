//! Spatial hash grid for Vivarium simulations.
//!
//! The [`Hashspace`] buckets up to a fixed number of entities into voxels
//! and answers "everything within radius `r` of `p`" by walking a
//! precomputed, distance-sorted [`ShellTable`] outward from the query's
//! voxel, stopping as soon as the next shell cannot contain a hit.
//!
//! # Layout
//!
//! ```text
//! Hashspace<L, S>
//! ├── &ShellTable          (built once per resolution + edge behavior)
//! ├── GridTransform<L>     (world ↔ voxel affine, derived from GridFrame)
//! └── S: VoxelStore
//!     ├── GridFrame        (bounds, resolution, reset flag, live count)
//!     ├── Object[]         (position + intrusive next/prev + hash)
//!     └── heads[]          (first object of each voxel chain, or NIL)
//! ```
//!
//! Stores are either heap-backed ([`HeapVoxelStore`]) or plain-old-data
//! ([`FixedVoxelStore`]) so they can live inside a memory-mapped arena.
//! No operation after construction allocates.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod edge;
pub mod error;
pub mod hashspace;
pub mod lattice;
pub mod query;
mod raw;
pub mod shell;
pub mod store;
pub mod transform;

pub use edge::EdgeBehavior;
pub use error::SpaceError;
pub use hashspace::Hashspace;
pub use lattice::{Lattice, Planar, Volumetric};
pub use query::{Chain, QueryRadius};
pub use shell::{Shell, ShellTable};
pub use store::{
    FixedVoxelStore, GridFrame, HeapVoxelStore, Object, StoreParts, VoxelStore, VoxelStoreMut,
};
pub use transform::GridTransform;
