//! Double-buffered ("ping-pong") grid fields.
//!
//! [`DoubleBuffered`] keeps two same-shaped buffers and a flag naming the
//! active (readable) one. An update pass reads the active buffer and
//! writes the inactive one; [`DoubleBuffered::swap`] flips the flag. No
//! data is copied.
//!
//! The lifecycle per update is:
//! 1. `begin_pass()` borrows both sides at once through a [`PassGuard`]
//! 2. The pass computes `next()` from `previous()`
//! 3. `commit()` flips the active side
//!
//! While the guard lives the field is mutably borrowed, so nothing can
//! observe a half-written buffer.

use bytemuck::{Pod, Zeroable};

use crate::error::FieldError;

mod sealed {
    pub trait Sealed {}
}

/// Element types a [`DoubleBuffered`] field can hold.
///
/// Sealed: every implementor is 4-byte aligned with a size that is a
/// multiple of 4, which keeps the field free of padding.
pub trait Cell: Pod + Send + Sync + sealed::Sealed {}

macro_rules! impl_cell {
    ($($ty:ty),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}
            impl Cell for $ty {}
        )*
    };
}

impl_cell!(f32, u32, i32, [f32; 2], [f32; 3], [f32; 4]);

/// Extents of a field grid. Planar fields have depth 1.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct FieldShape {
    /// Width, height, depth.
    pub extents: [u32; 3],
}

impl FieldShape {
    /// A `width × height` grid.
    pub const fn planar(width: u32, height: u32) -> Self {
        Self {
            extents: [width, height, 1],
        }
    }

    /// A `width × height × depth` grid.
    pub const fn volumetric(width: u32, height: u32, depth: u32) -> Self {
        Self {
            extents: [width, height, depth],
        }
    }

    /// Cells along x.
    pub fn width(&self) -> u32 {
        self.extents[0]
    }

    /// Cells along y.
    pub fn height(&self) -> u32 {
        self.extents[1]
    }

    /// Cells along z.
    pub fn depth(&self) -> u32 {
        self.extents[2]
    }

    /// Total cells.
    pub fn cells(&self) -> usize {
        self.extents.iter().map(|&e| e as usize).product()
    }

    /// Whether the grid is a single layer.
    pub fn is_planar(&self) -> bool {
        self.extents[2] == 1
    }

    /// Row-major index of `(x, y, z)`, wrapping each axis.
    pub fn index(&self, x: i32, y: i32, z: i32) -> usize {
        let [w, h, d] = self.extents;
        let x = wrap_axis(x, w);
        let y = wrap_axis(y, h);
        let z = wrap_axis(z, d);
        x + w as usize * (y + h as usize * z)
    }
}

fn wrap_axis(c: i32, extent: u32) -> usize {
    if extent == 0 {
        0
    } else {
        i64::from(c).rem_euclid(i64::from(extent)) as usize
    }
}

/// Which buffer to read, relative to the current flip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// The readable buffer: the last committed state.
    Active,
    /// The buffer the next pass writes: the state before the last commit.
    Inactive,
}

/// Two grids of `CELLS` elements plus an active flag.
///
/// Plain-old-data so it can live inside a persisted aggregate. A zeroed
/// image has no shape; call [`configure`](Self::configure) once.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct DoubleBuffered<T: Cell, const CELLS: usize> {
    shape: FieldShape,
    active: u32,
    generation: u32,
    buffers: [[T; CELLS]; 2],
}

impl<T: Cell, const CELLS: usize> DoubleBuffered<T, CELLS> {
    /// A zero-filled field of `shape` on the heap.
    pub fn new(shape: FieldShape) -> Result<Box<Self>, FieldError> {
        let mut field: Box<Self> = bytemuck::zeroed_box();
        field.configure(shape)?;
        Ok(field)
    }

    /// Set the shape and zero both sides.
    pub fn configure(&mut self, shape: FieldShape) -> Result<(), FieldError> {
        if shape.cells() != CELLS || shape.extents.contains(&0) {
            return Err(FieldError::ShapeMismatch {
                extents: shape.extents,
                cells: CELLS,
            });
        }
        self.apply_shape(shape);
        Ok(())
    }

    /// [`configure`](Self::configure) with a `WIDTH × HEIGHT` planar shape
    /// that is checked against `CELLS` at compile time.
    pub fn configure_planar<const WIDTH: u32, const HEIGHT: u32>(&mut self) {
        const {
            assert!(WIDTH > 0 && HEIGHT > 0, "field extents must be non-zero");
            assert!(
                WIDTH as usize * HEIGHT as usize == CELLS,
                "field extents must cover exactly CELLS cells"
            );
        }
        self.apply_shape(FieldShape::planar(WIDTH, HEIGHT));
    }

    fn apply_shape(&mut self, shape: FieldShape) {
        self.shape = shape;
        self.active = 0;
        self.generation = 0;
        for buffer in &mut self.buffers {
            buffer.fill(T::zeroed());
        }
    }

    /// Check a field read back from storage still has a usable shape.
    pub fn ensure_configured(&self) -> Result<(), FieldError> {
        if self.shape == FieldShape::default() {
            return Err(FieldError::Unconfigured);
        }
        if self.shape.cells() != CELLS {
            return Err(FieldError::ShapeMismatch {
                extents: self.shape.extents,
                cells: CELLS,
            });
        }
        Ok(())
    }

    /// Grid extents.
    pub fn shape(&self) -> FieldShape {
        self.shape
    }

    /// Cells per side.
    pub const fn len(&self) -> usize {
        CELLS
    }

    /// Whether the field holds no cells.
    pub const fn is_empty(&self) -> bool {
        CELLS == 0
    }

    /// Number of committed swaps since configuration.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    fn active_index(&self) -> usize {
        (self.active & 1) as usize
    }

    /// The active side.
    pub fn read(&self) -> &[T] {
        &self.buffers[self.active_index()]
    }

    /// Either side.
    pub fn read_side(&self, side: Side) -> &[T] {
        match side {
            Side::Active => &self.buffers[self.active_index()],
            Side::Inactive => &self.buffers[1 - self.active_index()],
        }
    }

    /// The active value at `(x, y, z)`, wrapping each axis.
    pub fn get(&self, x: i32, y: i32, z: i32) -> T {
        self.read()[self.shape.index(x, y, z)]
    }

    /// Row-major index of `(x, y, z)`, wrapping each axis.
    pub fn index(&self, x: i32, y: i32, z: i32) -> usize {
        self.shape.index(x, y, z)
    }

    /// The inactive side, for the next pass to write.
    pub fn write(&mut self) -> &mut [T] {
        let inactive = 1 - self.active_index();
        &mut self.buffers[inactive]
    }

    /// Make the inactive side active.
    pub fn swap(&mut self) {
        self.active = (self.active & 1) ^ 1;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Borrow the active side for reading and the inactive side for
    /// writing at the same time.
    pub fn begin_pass(&mut self) -> PassGuard<'_, T> {
        let shape = self.shape;
        let active = self.active_index();
        let [a, b] = &mut self.buffers;
        let (previous, next) = if active == 0 {
            (&a[..], &mut b[..])
        } else {
            (&b[..], &mut a[..])
        };
        PassGuard {
            previous,
            next,
            shape,
            active: &mut self.active,
            generation: &mut self.generation,
        }
    }

    /// Set every cell on both sides to `value`.
    pub fn fill(&mut self, value: T) {
        for buffer in &mut self.buffers {
            buffer.fill(value);
        }
    }
}

impl<T: Cell, const CELLS: usize> std::fmt::Debug for DoubleBuffered<T, CELLS> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DoubleBuffered")
            .field("shape", &self.shape)
            .field("active", &self.active_index())
            .field("generation", &self.generation)
            .finish()
    }
}

/// An in-progress update pass over a [`DoubleBuffered`] field.
///
/// Dropping the guard without [`commit`](Self::commit) abandons the pass:
/// the active side is unchanged and the partially written side stays
/// inactive.
#[must_use = "an uncommitted pass leaves the field unchanged"]
pub struct PassGuard<'a, T> {
    previous: &'a [T],
    next: &'a mut [T],
    shape: FieldShape,
    active: &'a mut u32,
    generation: &'a mut u32,
}

impl<T> PassGuard<'_, T> {
    /// The committed state the pass reads from.
    pub fn previous(&self) -> &[T] {
        self.previous
    }

    /// The buffer the pass writes into.
    pub fn next(&mut self) -> &mut [T] {
        &mut *self.next
    }

    /// Both sides at once.
    pub fn split(&mut self) -> (&[T], &mut [T]) {
        (self.previous, &mut *self.next)
    }

    /// Extents of the field.
    pub fn shape(&self) -> FieldShape {
        self.shape
    }

    /// Flip the field so the written side becomes active.
    pub fn commit(self) {
        *self.active = (*self.active & 1) ^ 1;
        *self.generation = self.generation.wrapping_add(1);
    }
}
