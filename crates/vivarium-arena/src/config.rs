//! Arena configuration parameters.

use std::path::PathBuf;

use crate::error::ArenaError;

/// Configuration for a [`StateArena`](crate::StateArena).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Backing file. Created if missing.
    pub path: PathBuf,

    /// Run [`Persistent::initialize`](crate::Persistent::initialize) on a
    /// freshly created or resized (zeroed) image.
    ///
    /// Default: `true`. With `false` the caller sees the zeroed image.
    pub initialize_if_absent: bool,

    /// Flush dirty pages when the arena is dropped without an explicit
    /// [`destroy`](crate::StateArena::destroy).
    ///
    /// Default: `true`.
    pub flush_on_drop: bool,
}

impl ArenaConfig {
    /// Default backing file name, relative to the working directory.
    pub const DEFAULT_PATH: &'static str = "vivarium.state";

    /// Config for `path` with default flags.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            initialize_if_absent: true,
            flush_on_drop: true,
        }
    }

    /// Check the config before touching the filesystem.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.path.as_os_str().is_empty() {
            return Err(ArenaError::InvalidConfig {
                reason: "path must not be empty".into(),
            });
        }
        if self.path.is_dir() {
            return Err(ArenaError::InvalidConfig {
                reason: format!("{} is a directory", self.path.display()),
            });
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PATH)
    }
}
