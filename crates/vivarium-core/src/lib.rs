//! Core types for the Vivarium simulation core.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! identifiers shared by the spatial index, the entity pools and the
//! persisted state aggregate, along with the sentinel values those
//! structures use in place of pointers.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod id;

pub use id::{ObjectId, VoxelHash, NIL};
