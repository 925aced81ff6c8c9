//! The crate's `unsafe` surface: file mapping and plain-old-data impls.
//!
//! Each block carries a `// SAFETY:` comment stating the invariant it
//! relies on.

#![allow(unsafe_code)]

use std::fs::File;
use std::io;

use bytemuck::{Pod, Zeroable};
use memmap2::MmapMut;

use crate::pingpong::{Cell, DoubleBuffered};
use crate::pool::FreeList;

/// Map the whole of `file` read-write.
pub(crate) fn map_file(file: &File) -> io::Result<MmapMut> {
    // SAFETY: the arena owns the mapping for its whole lifetime and exposes
    // it only through `&`/`&mut` borrows of the arena. Concurrent
    // modification of the file by another process is outside the arena's
    // contract (the file is its single source of truth).
    unsafe { MmapMut::map_mut(file) }
}

// SAFETY: `FreeList` is `#[repr(C)]` over a `u32` and two `[u32; N]`
// arrays, so it has no padding and every bit pattern is a valid value.
unsafe impl<const N: usize> Zeroable for FreeList<N> {}

// SAFETY: see the `Zeroable` impl above.
unsafe impl<const N: usize> Pod for FreeList<N> {}

// SAFETY: `DoubleBuffered` is `#[repr(C)]` over a 12-byte `FieldShape`,
// two `u32`s and `[[T; CELLS]; 2]`. `Cell` is sealed to 4-byte aligned
// `Pod` types whose size is a multiple of 4, so the 20-byte header needs
// no padding before the buffers and none is needed after them.
unsafe impl<T: Cell, const CELLS: usize> Zeroable for DoubleBuffered<T, CELLS> {}

// SAFETY: see the `Zeroable` impl above.
unsafe impl<T: Cell, const CELLS: usize> Pod for DoubleBuffered<T, CELLS> {}
