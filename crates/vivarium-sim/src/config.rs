//! Simulation configuration and validation.

use std::error::Error;
use std::fmt;

use vivarium_arena::{ArenaConfig, ArenaError};
use vivarium_space::EdgeBehavior;

use crate::diffusion::DiffusionParams;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`SimConfig::validate()`].
#[derive(Debug)]
pub enum ConfigError {
    /// Arena configuration is invalid.
    Arena(ArenaError),
    /// World bounds are non-finite or empty along an axis.
    InvalidBounds {
        /// The offending axis.
        axis: usize,
    },
    /// Time step is NaN, infinite, zero or negative.
    InvalidTimeStep {
        /// The invalid value.
        value: f32,
    },
    /// Neighbor radius is NaN, infinite or negative.
    InvalidNeighborRadius {
        /// The invalid value.
        value: f32,
    },
    /// Diffusion parameters would make the stencil unstable.
    InvalidDiffusion {
        /// Which field.
        field: &'static str,
        /// Which invariant was violated.
        reason: String,
    },
    /// A deposit amount is NaN, infinite or negative.
    InvalidDeposit {
        /// Which deposit.
        name: &'static str,
        /// The invalid value.
        value: f32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arena(e) => write!(f, "arena: {e}"),
            Self::InvalidBounds { axis } => {
                write!(f, "world bounds on axis {axis} must be finite with min < max")
            }
            Self::InvalidTimeStep { value } => {
                write!(f, "dt must be finite and positive, got {value}")
            }
            Self::InvalidNeighborRadius { value } => {
                write!(f, "neighbor_radius must be finite and non-negative, got {value}")
            }
            Self::InvalidDiffusion { field, reason } => {
                write!(f, "invalid diffusion for {field}: {reason}")
            }
            Self::InvalidDeposit { name, value } => {
                write!(f, "{name} must be finite and non-negative, got {value}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Arena(e) => Some(e),
            _ => None,
        }
    }
}

// ── SimConfig ──────────────────────────────────────────────────────

/// Configuration for a [`SimContext`](crate::SimContext).
///
/// Capacities and grid resolutions are not here: they are fixed by
/// [`layout`](crate::layout) because they define the state file's shape.
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Lower world corner. Creatures use x and y; particles all three.
    pub world_min: [f32; 3],
    /// Upper world corner.
    pub world_max: [f32; 3],
    /// Boundary of the creature grid.
    pub creature_edge: EdgeBehavior,
    /// Boundary of the particle grid.
    pub particle_edge: EdgeBehavior,
    /// Seconds per tick. Default: 1/30.
    pub dt: f32,
    /// Radius used by [`SimContext::neighbors_of`](crate::SimContext::neighbors_of).
    pub neighbor_radius: f32,
    /// Pheromone diffusion.
    pub pheromone: DiffusionParams,
    /// Height relaxation.
    pub height: DiffusionParams,
    /// Pheromone laid per tick by each carrying ant.
    pub pheromone_deposit: f32,
    /// Height added where a particle expires.
    pub sediment: f32,
    /// Diffusion worker threads. `None` = auto-detect
    /// (`available_parallelism / 2`, clamped to `[1, 8]`).
    pub worker_count: Option<usize>,
    /// Backing file for the state.
    pub arena: ArenaConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            world_min: [0.0; 3],
            world_max: [450.0, 450.0, 100.0],
            creature_edge: EdgeBehavior::Wrap,
            particle_edge: EdgeBehavior::Wrap,
            dt: 1.0 / 30.0,
            neighbor_radius: 12.0,
            pheromone: DiffusionParams {
                rate: 0.2,
                decay: 0.01,
            },
            height: DiffusionParams {
                rate: 0.05,
                decay: 0.0,
            },
            pheromone_deposit: 1.0,
            sediment: 0.05,
            worker_count: None,
            arena: ArenaConfig::default(),
        }
    }
}

impl SimConfig {
    /// Config backed by `path`, everything else default.
    pub fn with_path(path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            arena: ArenaConfig::new(path),
            ..Self::default()
        }
    }

    /// Check every invariant before any file is touched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for axis in 0..3 {
            let (lo, hi) = (self.world_min[axis], self.world_max[axis]);
            if !lo.is_finite() || !hi.is_finite() || hi <= lo {
                return Err(ConfigError::InvalidBounds { axis });
            }
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(ConfigError::InvalidTimeStep { value: self.dt });
        }
        if !self.neighbor_radius.is_finite() || self.neighbor_radius < 0.0 {
            return Err(ConfigError::InvalidNeighborRadius {
                value: self.neighbor_radius,
            });
        }
        self.pheromone.validate("pheromone")?;
        self.height.validate("height")?;
        for (name, value) in [
            ("pheromone_deposit", self.pheromone_deposit),
            ("sediment", self.sediment),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidDeposit { name, value });
            }
        }
        self.arena.validate().map_err(ConfigError::Arena)?;
        Ok(())
    }

    /// Resolve the actual worker count, applying auto-detection if `None`.
    ///
    /// Explicit values are clamped to `[1, 64]`.
    pub fn resolved_worker_count(&self) -> usize {
        match self.worker_count {
            Some(n) => n.clamp(1, 64),
            None => {
                let cpus = std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(2);
                (cpus / 2).clamp(1, 8)
            }
        }
    }
}
