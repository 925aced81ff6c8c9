//! Distance-sorted voxel offsets grouped into shells.
//!
//! A [`ShellTable`] lists every voxel offset a radius query may need to
//! visit, sorted by the smallest squared distance (in voxel units) between
//! any point of the origin voxel and any point of the offset voxel. Offsets
//! sharing that distance form one [`Shell`]. A query walks shells in order
//! and stops at the first shell whose distance class exceeds its radius.
//!
//! For a wrapping grid each axis contributes exactly one offset per
//! residue class (`-R/2 .. R - R/2`), so every voxel is reached once and by
//! its shortest wrapped offset. A bounded grid needs the full
//! `-(R-1) ..= R-1` span because the origin may sit in a corner; offsets
//! that leave the grid are skipped at query time.

use crate::edge::EdgeBehavior;
use crate::error::SpaceError;

/// A contiguous `[start, end)` range of the offset array with a common
/// minimum distance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shell {
    /// First offset index (inclusive).
    pub start: u32,
    /// Last offset index (exclusive).
    pub end: u32,
    /// Minimum squared distance from the origin voxel, in voxel units².
    pub ring: u32,
}

impl Shell {
    /// Number of offsets in the shell.
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    /// Whether the shell holds no offsets (never true for built tables).
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Precomputed shells for one grid resolution, dimensionality and edge
/// behavior. Immutable once built.
#[derive(Clone, Debug)]
pub struct ShellTable {
    ndim: usize,
    resolution: u32,
    edge: EdgeBehavior,
    voxel_count: usize,
    offsets: Vec<[i32; 3]>,
    shells: Vec<Shell>,
}

impl ShellTable {
    /// Build the table for an `ndim`-dimensional grid of `resolution`
    /// voxels per axis.
    ///
    /// Returns `Err(SpaceError::InvalidResolution)` if `ndim` is not 2 or 3,
    /// `resolution` is zero, or the voxel count does not fit a `u32` hash.
    ///
    /// # Examples
    ///
    /// ```
    /// use vivarium_space::{EdgeBehavior, ShellTable};
    ///
    /// let table = ShellTable::new(2, 4, EdgeBehavior::Wrap).unwrap();
    /// assert_eq!(table.offset_count(), 16);
    /// // The origin voxel and its eight touching neighbours share ring 0.
    /// assert_eq!(table.shells()[0].len(), 9);
    /// ```
    pub fn new(ndim: usize, resolution: u32, edge: EdgeBehavior) -> Result<Self, SpaceError> {
        let invalid = SpaceError::InvalidResolution { resolution, ndim };
        if !(2..=3).contains(&ndim) || resolution == 0 {
            return Err(invalid);
        }
        let voxel_count = (resolution as u64).pow(ndim as u32);
        if voxel_count >= u32::MAX as u64 {
            return Err(invalid);
        }

        let r = resolution as i32;
        let (lo, hi) = match edge {
            EdgeBehavior::Wrap => (-(r / 2), r - r / 2 - 1),
            EdgeBehavior::Bounded => (-(r - 1), r - 1),
        };
        let span = |axis: usize| if axis < ndim { lo..=hi } else { 0..=0 };

        let mut keyed: Vec<(u32, [i32; 3])> = Vec::new();
        for z in span(2) {
            for y in span(1) {
                for x in span(0) {
                    let o = [x, y, z];
                    keyed.push((ring_of(o), o));
                }
            }
        }
        keyed.sort_unstable();

        let mut shells = Vec::new();
        let mut start = 0usize;
        for i in 1..=keyed.len() {
            if i == keyed.len() || keyed[i].0 != keyed[start].0 {
                shells.push(Shell {
                    start: start as u32,
                    end: i as u32,
                    ring: keyed[start].0,
                });
                start = i;
            }
        }

        Ok(Self {
            ndim,
            resolution,
            edge,
            voxel_count: voxel_count as usize,
            offsets: keyed.into_iter().map(|(_, o)| o).collect(),
            shells,
        })
    }

    /// Dimensionality the table was built for.
    pub fn ndim(&self) -> usize {
        self.ndim
    }

    /// Voxels per axis.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Edge behavior the offsets were generated for.
    pub fn edge(&self) -> EdgeBehavior {
        self.edge
    }

    /// Number of voxels in a grid of this shape.
    pub fn voxel_count(&self) -> usize {
        self.voxel_count
    }

    /// Shells in increasing ring order.
    pub fn shells(&self) -> &[Shell] {
        &self.shells
    }

    /// Offsets belonging to `shell`.
    pub fn offsets(&self, shell: &Shell) -> &[[i32; 3]] {
        &self.offsets[shell.start as usize..shell.end as usize]
    }

    /// Offset at a flat index into the sorted offset array.
    #[inline]
    pub(crate) fn offset(&self, index: u32) -> [i32; 3] {
        self.offsets[index as usize]
    }

    /// Total number of offsets across all shells.
    pub fn offset_count(&self) -> usize {
        self.offsets.len()
    }
}

/// Squared gap between the origin voxel and the voxel at offset `o`.
fn ring_of(o: [i32; 3]) -> u32 {
    o.iter()
        .map(|&c| {
            let gap = c.unsigned_abs().saturating_sub(1);
            gap * gap
        })
        .sum()
}
