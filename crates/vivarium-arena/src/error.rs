//! Arena-specific error types.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use vivarium_core::ObjectId;

/// Errors from a [`FreeList`](crate::FreeList).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolError {
    /// Every slot is live. Expected under load; callers skip the spawn.
    Exhausted {
        /// Pool capacity.
        capacity: usize,
    },
    /// An id outside `0..capacity`.
    OutOfRange {
        /// The offending id.
        id: ObjectId,
        /// Pool capacity.
        capacity: usize,
    },
    /// Released an id that is not currently allocated.
    NotAllocated {
        /// The offending id.
        id: ObjectId,
    },
    /// A persisted pool image is inconsistent.
    Corrupt {
        /// What was inconsistent.
        reason: String,
    },
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted { capacity } => {
                write!(f, "pool exhausted: all {capacity} slots are live")
            }
            Self::OutOfRange { id, capacity } => {
                write!(f, "id {id} out of range for pool of {capacity} slots")
            }
            Self::NotAllocated { id } => write!(f, "id {id} is not allocated"),
            Self::Corrupt { reason } => write!(f, "corrupt pool image: {reason}"),
        }
    }
}

impl Error for PoolError {}

/// Errors from a [`DoubleBuffered`](crate::DoubleBuffered) field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldError {
    /// The shape's cell count differs from the field's fixed capacity.
    ShapeMismatch {
        /// Requested extents.
        extents: [u32; 3],
        /// Cells the field holds.
        cells: usize,
    },
    /// A persisted field has no shape (never configured).
    Unconfigured,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeMismatch { extents, cells } => write!(
                f,
                "shape {}x{}x{} does not cover exactly {cells} cells",
                extents[0], extents[1], extents[2]
            ),
            Self::Unconfigured => write!(f, "field shape was never configured"),
        }
    }
}

impl Error for FieldError {}

/// Errors from creating or flushing a [`StateArena`](crate::StateArena).
#[derive(Debug)]
pub enum ArenaError {
    /// A filesystem or mapping call failed.
    Io {
        /// The operation that failed (`"open"`, `"resize"`, `"map"`, ...).
        op: &'static str,
        /// The backing file.
        path: PathBuf,
        /// Underlying OS error.
        source: io::Error,
    },
    /// The persisted type has no bytes to map.
    ZeroSizedLayout,
    /// The mapping is not aligned for the persisted type.
    Misaligned {
        /// Required alignment.
        align: usize,
        /// Address the mapping landed at.
        address: usize,
    },
    /// The arena configuration is unusable.
    InvalidConfig {
        /// Why the configuration was rejected.
        reason: String,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { op, path, source } => {
                write!(f, "{op} failed for {}: {source}", path.display())
            }
            Self::ZeroSizedLayout => write!(f, "cannot map a zero-sized layout"),
            Self::Misaligned { align, address } => {
                write!(f, "mapping at {address:#x} is not {align}-byte aligned")
            }
            Self::InvalidConfig { reason } => write!(f, "invalid arena config: {reason}"),
        }
    }
}

impl Error for ArenaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
