//! Error types for grid construction and grid operations.

use std::fmt;

use vivarium_core::ObjectId;

/// Errors arising from building or operating a [`Hashspace`](crate::Hashspace).
///
/// Every variant signals a contract violation by the caller: the grid
/// never silently drops an entity or truncates a query.
#[derive(Clone, Debug, PartialEq)]
pub enum SpaceError {
    /// Resolution is zero or the voxel count does not fit in a `u32` hash.
    InvalidResolution {
        /// The offending resolution.
        resolution: u32,
        /// Number of spatial dimensions it was requested for.
        ndim: usize,
    },
    /// World bounds are non-finite or empty along some axis.
    InvalidBounds {
        /// Human-readable description of the problem.
        reason: String,
    },
    /// A shell table built for one dimensionality was paired with a lattice
    /// of another.
    DimensionMismatch {
        /// Dimensions the table was built for.
        table: usize,
        /// Dimensions of the lattice.
        lattice: usize,
    },
    /// The store's shape does not match the shell table or its persisted
    /// frame disagrees with the grid configuration.
    StoreMismatch {
        /// What disagreed.
        reason: String,
    },
    /// An id outside `0..capacity` was passed to the grid.
    IdOutOfRange {
        /// The offending id.
        id: ObjectId,
        /// Object capacity of the store.
        capacity: usize,
    },
    /// The grid was used before [`Hashspace::reset`](crate::Hashspace::reset).
    NotReset,
    /// A position or query point contained NaN or infinity.
    NonFinitePosition,
    /// A position lies outside the bounds of a [`Bounded`](crate::EdgeBehavior::Bounded) world.
    OutOfBounds {
        /// The position, padded to three axes.
        position: [f32; 3],
    },
    /// A query radius was negative or NaN.
    InvalidRadius {
        /// The offending radius.
        radius: f32,
    },
    /// Chain linkage is inconsistent (reported by
    /// [`Hashspace::check_invariants`](crate::Hashspace::check_invariants)).
    Corrupt {
        /// Description of the first inconsistency found.
        reason: String,
    },
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidResolution { resolution, ndim } => {
                write!(f, "invalid resolution {resolution} for a {ndim}D grid")
            }
            Self::InvalidBounds { reason } => write!(f, "invalid world bounds: {reason}"),
            Self::DimensionMismatch { table, lattice } => write!(
                f,
                "shell table is {table}D but the lattice is {lattice}D"
            ),
            Self::StoreMismatch { reason } => write!(f, "voxel store mismatch: {reason}"),
            Self::IdOutOfRange { id, capacity } => {
                write!(f, "object id {id} out of range (capacity {capacity})")
            }
            Self::NotReset => write!(f, "grid used before reset()"),
            Self::NonFinitePosition => write!(f, "position is not finite"),
            Self::OutOfBounds { position } => {
                write!(f, "position {position:?} lies outside the world bounds")
            }
            Self::InvalidRadius { radius } => {
                write!(f, "query radius must be finite and >= 0, got {radius}")
            }
            Self::Corrupt { reason } => write!(f, "corrupt voxel chains: {reason}"),
        }
    }
}

impl std::error::Error for SpaceError {}
