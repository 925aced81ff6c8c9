//! Fixed-layout storage building blocks for Vivarium.
//!
//! Everything here is plain-old-data so it can sit inside one persisted
//! aggregate:
//!
//! ```text
//! StateArena<T: Persistent>   (file-backed mmap, Deref<Target = T>)
//! └── T
//!     ├── FreeList<N>               LIFO slot allocator with generations
//!     └── DoubleBuffered<C, CELLS>  two grids + active flag, O(1) swap
//! ```
//!
//! This crate and `vivarium-space` are the only ones containing `unsafe`
//! code, confined to their `raw` modules.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod mapped;
pub mod pingpong;
pub mod pool;
mod raw;

pub use config::ArenaConfig;
pub use error::{ArenaError, FieldError, PoolError};
pub use mapped::{ArenaOrigin, Persistent, StateArena};
pub use pingpong::{Cell, DoubleBuffered, FieldShape, PassGuard, Side};
pub use pool::FreeList;
