//! Strongly-typed identifiers and index sentinels.
//!
//! Everything that lives inside the persisted aggregate refers to other
//! records by array index, never by address. The raw `u32` forms of these
//! identifiers are what get stored; the newtypes are the API surface.

use std::fmt;

/// End-of-chain / empty-slot marker for index-linked structures.
pub const NIL: u32 = u32::MAX;

/// Identifies an entity slot within a fixed-capacity pool.
///
/// Ids are stable for the lifetime of an allocation and range over
/// `0..capacity`. A released id may be handed out again later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

impl ObjectId {
    /// The id as an array index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ObjectId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Flattened voxel coordinate within a spatial hash grid.
///
/// For a grid of resolution `R`, the voxel at `(x, y, z)` has hash
/// `x + R * (y + R * z)`. [`VoxelHash::UNASSIGNED`] marks an entity that
/// is not currently indexed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoxelHash(pub u32);

impl VoxelHash {
    /// Hash carried by entities that belong to no voxel chain.
    pub const UNASSIGNED: VoxelHash = VoxelHash(NIL);

    /// Whether this hash refers to an actual voxel.
    #[inline]
    pub const fn is_assigned(self) -> bool {
        self.0 != NIL
    }

    /// The hash as an array index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VoxelHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_assigned() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "unassigned")
        }
    }
}

impl From<u32> for VoxelHash {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_id_index_matches_raw() {
        assert_eq!(ObjectId(17).index(), 17);
        assert_eq!(ObjectId::from(3), ObjectId(3));
    }

    #[test]
    fn unassigned_hash_is_nil() {
        assert!(!VoxelHash::UNASSIGNED.is_assigned());
        assert!(VoxelHash(0).is_assigned());
        assert_eq!(VoxelHash::UNASSIGNED.0, NIL);
    }

    #[test]
    fn display_formats() {
        assert_eq!(ObjectId(5).to_string(), "5");
        assert_eq!(VoxelHash(12).to_string(), "12");
        assert_eq!(VoxelHash::UNASSIGNED.to_string(), "unassigned");
    }
}
