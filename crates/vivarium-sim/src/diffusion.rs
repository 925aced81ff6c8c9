//! Explicit Jacobi diffusion over double-buffered fields.
//!
//! Every output cell depends only on the previous buffer, so rows can be
//! split across workers with no synchronisation until the scope joins.

use smallvec::SmallVec;
use vivarium_arena::FieldShape;
use vivarium_space::EdgeBehavior;

use crate::config::ConfigError;

/// Per-field diffusion constants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiffusionParams {
    /// Fraction of the Laplacian applied per tick.
    pub rate: f32,
    /// Fraction of each cell lost per tick, applied after spreading.
    pub decay: f32,
}

impl DiffusionParams {
    /// Largest stable rate for the planar 4-neighbour stencil.
    pub const MAX_PLANAR_RATE: f32 = 0.25;

    pub(crate) fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        if !self.rate.is_finite() || !(0.0..=Self::MAX_PLANAR_RATE).contains(&self.rate) {
            return Err(ConfigError::InvalidDiffusion {
                field,
                reason: format!(
                    "rate {} outside [0, {}]",
                    self.rate,
                    Self::MAX_PLANAR_RATE
                ),
            });
        }
        if !self.decay.is_finite() || !(0.0..=1.0).contains(&self.decay) {
            return Err(ConfigError::InvalidDiffusion {
                field,
                reason: format!("decay {} outside [0, 1]", self.decay),
            });
        }
        Ok(())
    }
}

/// Wrapped face neighbours of `(x, y, z)`: four on a planar field, six on
/// a volumetric one.
fn neighbours(shape: FieldShape, x: i32, y: i32, z: i32) -> SmallVec<[usize; 6]> {
    let mut out = SmallVec::new();
    out.push(shape.index(x - 1, y, z));
    out.push(shape.index(x + 1, y, z));
    out.push(shape.index(x, y - 1, z));
    out.push(shape.index(x, y + 1, z));
    if !shape.is_planar() {
        out.push(shape.index(x, y, z - 1));
        out.push(shape.index(x, y, z + 1));
    }
    out
}

/// Compute `next` from `previous` for rows starting at `first_row`.
fn relax_rows(
    previous: &[f32],
    out: &mut [f32],
    shape: FieldShape,
    params: DiffusionParams,
    first_row: usize,
) {
    let width = shape.width() as usize;
    let height = shape.height() as usize;
    let keep = 1.0 - params.decay;
    for (offset, cell) in out.iter_mut().enumerate() {
        let flat = first_row * width + offset;
        let x = (flat % width) as i32;
        let row = flat / width;
        let y = (row % height) as i32;
        let z = (row / height) as i32;

        let centre = previous[flat];
        let around = neighbours(shape, x, y, z);
        let sum: f32 = around.iter().map(|&n| previous[n]).sum();
        let laplacian = sum - around.len() as f32 * centre;
        *cell = (centre + params.rate * laplacian) * keep;
    }
}

/// One diffusion step from `previous` into `next`.
///
/// Rows are divided evenly among `workers` scoped threads; with a single
/// worker the pass runs on the calling thread. The result does not depend
/// on the worker count.
pub fn diffuse(
    previous: &[f32],
    next: &mut [f32],
    shape: FieldShape,
    params: DiffusionParams,
    workers: usize,
) {
    let width = shape.width() as usize;
    let rows = shape.height() as usize * shape.depth() as usize;
    debug_assert_eq!(previous.len(), next.len());
    if width == 0 || rows == 0 {
        return;
    }
    let workers = workers.clamp(1, rows);
    if workers == 1 {
        relax_rows(previous, next, shape, params, 0);
        return;
    }

    let rows_per_worker = rows.div_ceil(workers);
    std::thread::scope(|scope| {
        for (i, chunk) in next.chunks_mut(rows_per_worker * width).enumerate() {
            scope.spawn(move || relax_rows(previous, chunk, shape, params, i * rows_per_worker));
        }
    });
}

/// Map a world position onto a field cell.
///
/// A wrapping world folds positions outside the bounds back in. A bounded
/// world clamps them, so the max face lands in the last row or column.
pub fn cell_of(
    shape: FieldShape,
    position: [f32; 2],
    min: [f32; 2],
    max: [f32; 2],
    edge: EdgeBehavior,
) -> usize {
    let mut coord = [0i32; 2];
    for axis in 0..2 {
        let extent = max[axis] - min[axis];
        let cells = shape.extents[axis] as i32;
        let c = ((position[axis] - min[axis]) / extent * cells as f32).floor() as i32;
        coord[axis] = match edge {
            EdgeBehavior::Wrap => c,
            EdgeBehavior::Bounded => c.clamp(0, cells - 1),
        };
    }
    shape.index(coord[0], coord[1], 0)
}
