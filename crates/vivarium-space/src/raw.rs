//! Plain-old-data marker impls for const-generic stores.
//!
//! `bytemuck`'s derive cannot prove the absence of padding for generic
//! structs, so these impls are written by hand. This is the only module in
//! the crate allowed to contain `unsafe` code.

#![allow(unsafe_code)]

use bytemuck::{Pod, Zeroable};

use crate::store::FixedVoxelStore;

// SAFETY: `FixedVoxelStore` is `#[repr(C)]` over `GridFrame`, `[Object; O]`
// and `[u32; V]`. All three have 4-byte alignment and sizes that are
// multiples of 4, so the struct has no padding, and every field is itself
// `Pod`, so any bit pattern (including all zeroes) is valid.
unsafe impl<const OBJECTS: usize, const VOXELS: usize> Zeroable
    for FixedVoxelStore<OBJECTS, VOXELS>
{
}

// SAFETY: see the `Zeroable` impl above.
unsafe impl<const OBJECTS: usize, const VOXELS: usize> Pod for FixedVoxelStore<OBJECTS, VOXELS> {}
