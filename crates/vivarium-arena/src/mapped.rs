//! File-backed, memory-mapped state arena.
//!
//! A [`StateArena<T>`] maps a file of exactly `size_of::<T>()` bytes and
//! dereferences to `T`. The file holds `T`'s raw byte image, so a later
//! run (or another process) reopening the same path with the same layout
//! sees the same state.

use std::fs::{File, OpenOptions};
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use bytemuck::Pod;
use memmap2::MmapMut;

use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::raw;

/// A fixed-layout aggregate that can live in a [`StateArena`].
pub trait Persistent: Pod {
    /// Bring a zeroed image into its starting state.
    ///
    /// Called when the backing file is created or resized and
    /// [`ArenaConfig::initialize_if_absent`] is set.
    fn initialize(&mut self);
}

/// How the backing file looked when the arena was created.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArenaOrigin {
    /// The file did not exist.
    Created,
    /// The file existed with the expected size; its contents were kept.
    Reopened,
    /// The file existed with another size and was reset to a zeroed image.
    Resized {
        /// Length the file had before.
        previous_len: u64,
    },
}

impl ArenaOrigin {
    /// Whether the image started out zeroed.
    pub fn is_fresh(self) -> bool {
        !matches!(self, Self::Reopened)
    }
}

/// A `T` stored in a memory-mapped file.
pub struct StateArena<T: Persistent> {
    map: MmapMut,
    path: PathBuf,
    origin: ArenaOrigin,
    flush_on_drop: bool,
    _layout: PhantomData<T>,
}

impl<T: Persistent> StateArena<T> {
    /// Open or create the backing file and map it.
    ///
    /// A file whose length differs from `size_of::<T>()` is discarded and
    /// replaced by a zeroed image of the right size; its old contents are
    /// never interpreted.
    pub fn create(config: &ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        let size = std::mem::size_of::<T>();
        if size == 0 {
            return Err(ArenaError::ZeroSizedLayout);
        }
        let path = config.path.clone();
        let io_err = |op: &'static str| {
            let path = path.clone();
            move |source| ArenaError::Io { op, path, source }
        };

        let existed = path.exists();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(io_err("open"))?;
        let previous_len = file.metadata().map_err(io_err("stat"))?.len();
        let expected = size as u64;

        let origin = if !existed {
            ArenaOrigin::Created
        } else if previous_len == expected {
            ArenaOrigin::Reopened
        } else {
            ArenaOrigin::Resized { previous_len }
        };
        resize(&file, previous_len, expected, origin).map_err(io_err("resize"))?;

        let mut map = raw::map_file(&file).map_err(io_err("map"))?;
        let address = map.as_ptr() as usize;
        let align = std::mem::align_of::<T>();
        if address % align != 0 {
            return Err(ArenaError::Misaligned { align, address });
        }

        if origin.is_fresh() && config.initialize_if_absent {
            bytemuck::from_bytes_mut::<T>(&mut map[..]).initialize();
        }

        match origin {
            ArenaOrigin::Resized { previous_len } => tracing::warn!(
                path = %path.display(),
                previous_len,
                bytes = size,
                "state file had the wrong size and was reset"
            ),
            _ => tracing::info!(
                path = %path.display(),
                bytes = size,
                origin = ?origin,
                "state arena mapped"
            ),
        }

        Ok(Self {
            map,
            path,
            origin,
            flush_on_drop: config.flush_on_drop,
            _layout: PhantomData,
        })
    }

    /// How the backing file looked at creation.
    pub fn origin(&self) -> ArenaOrigin {
        self.origin
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the mapped image in bytes.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Always false: zero-sized layouts are rejected at creation.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The raw byte image.
    pub fn as_bytes(&self) -> &[u8] {
        &self.map
    }

    /// Write dirty pages back to the file and wait for completion.
    pub fn flush(&self) -> Result<(), ArenaError> {
        self.map.flush().map_err(|source| ArenaError::Io {
            op: "flush",
            path: self.path.clone(),
            source,
        })
    }

    /// Unmap the arena, flushing first if `flush` is set.
    pub fn destroy(mut self, flush: bool) -> Result<(), ArenaError> {
        self.flush_on_drop = false;
        if flush {
            self.flush()?;
        }
        tracing::info!(path = %self.path.display(), flushed = flush, "state arena unmapped");
        Ok(())
    }
}

fn resize(file: &File, current: u64, expected: u64, origin: ArenaOrigin) -> std::io::Result<()> {
    match origin {
        ArenaOrigin::Reopened => Ok(()),
        ArenaOrigin::Created => file.set_len(expected),
        ArenaOrigin::Resized { .. } => {
            // Truncate first so no byte of the old image survives.
            if current != 0 {
                file.set_len(0)?;
            }
            file.set_len(expected)
        }
    }
}

impl<T: Persistent> Deref for StateArena<T> {
    type Target = T;

    fn deref(&self) -> &T {
        bytemuck::from_bytes(&self.map[..])
    }
}

impl<T: Persistent> DerefMut for StateArena<T> {
    fn deref_mut(&mut self) -> &mut T {
        bytemuck::from_bytes_mut(&mut self.map[..])
    }
}

impl<T: Persistent> Drop for StateArena<T> {
    fn drop(&mut self) {
        if self.flush_on_drop {
            if let Err(err) = self.map.flush() {
                tracing::warn!(path = %self.path.display(), error = %err, "flush on drop failed");
            }
        }
    }
}

impl<T: Persistent> std::fmt::Debug for StateArena<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateArena")
            .field("path", &self.path)
            .field("bytes", &self.map.len())
            .field("origin", &self.origin)
            .finish()
    }
}
