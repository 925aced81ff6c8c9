//! Simulation-level error type.

use std::error::Error;
use std::fmt;

use vivarium_arena::{ArenaError, FieldError, PoolError};
use vivarium_core::ObjectId;
use vivarium_space::SpaceError;

use crate::config::ConfigError;

/// Errors surfaced by [`SimContext`](crate::SimContext) and [`Host`](crate::Host) hooks.
#[derive(Debug)]
pub enum SimError {
    /// Configuration failed validation.
    Config(ConfigError),
    /// The state file could not be created, mapped or flushed.
    Arena(ArenaError),
    /// A grid operation was rejected.
    Space(SpaceError),
    /// A pool operation was rejected or a pool image is corrupt.
    Pool(PoolError),
    /// A field image is unusable.
    Field(FieldError),
    /// The state file was written by another layout.
    LayoutMismatch {
        /// Magic word found in the file.
        magic: u32,
        /// Layout version found in the file.
        version: u32,
    },
    /// The id does not name a live entity.
    NotLive {
        /// The offending id.
        id: ObjectId,
    },
    /// A supplied velocity has a NaN or infinite component.
    InvalidVelocity {
        /// The rejected velocity, padded with zeroes in 2D.
        velocity: [f32; 3],
    },
    /// Integrating the entity this tick would leave it at a non-finite
    /// position. Nothing was moved.
    UnstableMotion {
        /// The entity whose motion overflowed.
        id: ObjectId,
    },
    /// A creature's species tag is not recognised.
    UnknownSpecies {
        /// The raw tag.
        tag: u32,
    },
    /// A host hook failed.
    Host {
        /// Host-supplied description.
        reason: String,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Arena(e) => write!(f, "arena: {e}"),
            Self::Space(e) => write!(f, "space: {e}"),
            Self::Pool(e) => write!(f, "pool: {e}"),
            Self::Field(e) => write!(f, "field: {e}"),
            Self::LayoutMismatch { magic, version } => write!(
                f,
                "state file layout mismatch: magic {magic:#010x}, version {version}"
            ),
            Self::NotLive { id } => write!(f, "entity {id} is not live"),
            Self::InvalidVelocity { velocity } => {
                write!(f, "velocity {velocity:?} is not finite")
            }
            Self::UnstableMotion { id } => {
                write!(f, "entity {id} would reach a non-finite position")
            }
            Self::UnknownSpecies { tag } => write!(f, "unknown species tag {tag}"),
            Self::Host { reason } => write!(f, "host: {reason}"),
        }
    }
}

impl Error for SimError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Arena(e) => Some(e),
            Self::Space(e) => Some(e),
            Self::Pool(e) => Some(e),
            Self::Field(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for SimError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ArenaError> for SimError {
    fn from(e: ArenaError) -> Self {
        Self::Arena(e)
    }
}

impl From<SpaceError> for SimError {
    fn from(e: SpaceError) -> Self {
        Self::Space(e)
    }
}

impl From<PoolError> for SimError {
    fn from(e: PoolError) -> Self {
        Self::Pool(e)
    }
}

impl From<FieldError> for SimError {
    fn from(e: FieldError) -> Self {
        Self::Field(e)
    }
}
