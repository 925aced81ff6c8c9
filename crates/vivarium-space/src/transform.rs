//! World ↔ voxel affine transform.
//!
//! A [`GridTransform`] maps continuous world coordinates onto the grid's
//! `[0, R)` voxel lattice along every axis. Voxels are addressed by a
//! flattened hash `x + R * (y + R * z)`.

use vivarium_core::VoxelHash;

use crate::edge::EdgeBehavior;
use crate::error::SpaceError;
use crate::lattice::Lattice;

/// Affine mapping between world space and voxel space.
///
/// `scale` is the largest per-axis world→voxel factor. One world unit
/// never spans more than `scale` voxels along any axis, which is what lets
/// a radius query convert its world radius into a conservative voxel
/// radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridTransform<L: Lattice> {
    to_voxel: L::Affine,
    to_world: L::Affine,
    scale: f32,
    min: [f32; 3],
    max: [f32; 3],
    extent: [f32; 3],
    resolution: u32,
    edge: EdgeBehavior,
}

impl<L: Lattice> GridTransform<L> {
    /// Build the transform that makes `resolution` voxels span exactly
    /// `[min, max]` along every axis.
    pub fn from_bounds(
        min: L::Point,
        max: L::Point,
        resolution: u32,
        edge: EdgeBehavior,
    ) -> Result<Self, SpaceError> {
        if resolution == 0 {
            return Err(SpaceError::InvalidResolution {
                resolution,
                ndim: L::NDIM,
            });
        }
        let lo = L::to_axes(min);
        let hi = L::to_axes(max);
        let mut extent = [0.0f32; 3];
        let mut factors = [1.0f32; 3];
        let mut translate = [0.0f32; 3];
        let mut scale = 0.0f32;
        for axis in 0..L::NDIM {
            if !lo[axis].is_finite() || !hi[axis].is_finite() {
                return Err(SpaceError::InvalidBounds {
                    reason: format!("axis {axis} bounds must be finite"),
                });
            }
            extent[axis] = hi[axis] - lo[axis];
            if extent[axis] <= 0.0 {
                return Err(SpaceError::InvalidBounds {
                    reason: format!(
                        "axis {axis} is empty: min {} >= max {}",
                        lo[axis], hi[axis]
                    ),
                });
            }
            factors[axis] = resolution as f32 / extent[axis];
            translate[axis] = -lo[axis];
            scale = scale.max(factors[axis]);
        }

        let to_voxel = L::scale_translate(L::from_axes(factors), L::from_axes(translate));
        let to_world = L::invert(&to_voxel);
        Ok(Self {
            to_voxel,
            to_world,
            scale,
            min: lo,
            max: hi,
            extent,
            resolution,
            edge,
        })
    }

    /// World → voxel matrix.
    pub fn to_voxel(&self) -> &L::Affine {
        &self.to_voxel
    }

    /// Voxel → world matrix.
    pub fn to_world(&self) -> &L::Affine {
        &self.to_world
    }

    /// Uniform (largest per-axis) world → voxel scale factor.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Voxels per axis.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Boundary behavior the transform resolves coordinates with.
    pub fn edge(&self) -> EdgeBehavior {
        self.edge
    }

    /// Lower world bound.
    pub fn min(&self) -> L::Point {
        L::from_axes(self.min)
    }

    /// Upper world bound.
    pub fn max(&self) -> L::Point {
        L::from_axes(self.max)
    }

    /// World extent per axis, padded to three axes.
    pub fn extent(&self) -> [f32; 3] {
        self.extent
    }

    /// Continuous voxel-space coordinates of a world position.
    #[inline]
    pub fn grid_coords(&self, p: [f32; 3]) -> [f32; 3] {
        L::to_axes(L::apply(&self.to_voxel, L::from_axes(p)))
    }

    /// Integer voxel coordinate containing `p`.
    ///
    /// Wrapping worlds fold any finite position back into the grid.
    /// Bounded worlds reject positions outside `[min, max]`; a position on
    /// the max face belongs to the last voxel.
    pub fn voxel_of(&self, p: [f32; 3]) -> Result<[u32; 3], SpaceError> {
        if p[..L::NDIM].iter().any(|v| !v.is_finite()) {
            return Err(SpaceError::NonFinitePosition);
        }
        if self.edge == EdgeBehavior::Bounded {
            let outside = (0..L::NDIM).any(|a| p[a] < self.min[a] || p[a] > self.max[a]);
            if outside {
                return Err(SpaceError::OutOfBounds { position: p });
            }
        }

        let g = self.grid_coords(p);
        let r = self.resolution as i64;
        let mut coord = [0u32; 3];
        for axis in 0..L::NDIM {
            let cell = g[axis].floor() as i64;
            coord[axis] = match self.edge {
                EdgeBehavior::Wrap => cell.rem_euclid(r) as u32,
                EdgeBehavior::Bounded => cell.clamp(0, r - 1) as u32,
            };
        }
        Ok(coord)
    }

    /// Flatten a voxel coordinate into its hash.
    #[inline]
    pub fn hash(&self, coord: [u32; 3]) -> VoxelHash {
        let r = self.resolution;
        VoxelHash(coord[0] + r * (coord[1] + r * coord[2]))
    }

    /// Inverse of [`hash`](Self::hash).
    pub fn coord_of(&self, hash: VoxelHash) -> [u32; 3] {
        let r = self.resolution;
        let mut coord = [0u32; 3];
        let mut rest = hash.0;
        for c in coord.iter_mut().take(L::NDIM) {
            *c = rest % r;
            rest /= r;
        }
        coord
    }

    /// World position of a voxel's minimum corner.
    pub fn voxel_origin(&self, coord: [u32; 3]) -> L::Point {
        let g = [coord[0] as f32, coord[1] as f32, coord[2] as f32];
        L::apply(&self.to_world, L::from_axes(g))
    }

    /// Per-axis displacement `a - b`, taken the short way round on a torus.
    #[inline]
    pub fn delta(&self, a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        let mut d = [0.0f32; 3];
        for axis in 0..L::NDIM {
            let mut v = a[axis] - b[axis];
            if self.edge == EdgeBehavior::Wrap {
                let ext = self.extent[axis];
                v -= ext * (v / ext).round();
            }
            d[axis] = v;
        }
        d
    }

    /// Squared world distance honoring the edge behavior.
    #[inline]
    pub fn distance_sq(&self, a: [f32; 3], b: [f32; 3]) -> f32 {
        let d = self.delta(a, b);
        d[0] * d[0] + d[1] * d[1] + d[2] * d[2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::{Planar, Volumetric};
    use glam::{Vec2, Vec3};

    fn planar(edge: EdgeBehavior) -> GridTransform<Planar> {
        GridTransform::from_bounds(Vec2::ZERO, Vec2::new(450.0, 450.0), 45, edge).unwrap()
    }

    #[test]
    fn voxel_of_interior_point() {
        let t = planar(EdgeBehavior::Wrap);
        assert_eq!(t.voxel_of([15.0, 449.0, 0.0]).unwrap(), [1, 44, 0]);
        assert_eq!(t.scale(), 0.1);
    }

    #[test]
    fn wrap_folds_outside_positions() {
        let t = planar(EdgeBehavior::Wrap);
        assert_eq!(t.voxel_of([-5.0, 455.0, 0.0]).unwrap(), [44, 0, 0]);
    }

    #[test]
    fn bounded_rejects_outside_and_keeps_max_face() {
        let t = planar(EdgeBehavior::Bounded);
        assert!(matches!(
            t.voxel_of([-0.5, 10.0, 0.0]),
            Err(SpaceError::OutOfBounds { .. })
        ));
        assert_eq!(t.voxel_of([450.0, 450.0, 0.0]).unwrap(), [44, 44, 0]);
    }

    #[test]
    fn non_finite_rejected() {
        let t = planar(EdgeBehavior::Wrap);
        assert_eq!(
            t.voxel_of([f32::NAN, 1.0, 0.0]),
            Err(SpaceError::NonFinitePosition)
        );
    }

    #[test]
    fn wrapped_distance_is_short_way_round() {
        let t = planar(EdgeBehavior::Wrap);
        let d = t.distance_sq([449.0, 10.0, 0.0], [1.0, 10.0, 0.0]);
        assert!((d - 4.0).abs() < 1e-3);

        let b = planar(EdgeBehavior::Bounded);
        let d = b.distance_sq([449.0, 10.0, 0.0], [1.0, 10.0, 0.0]);
        assert!((d - 448.0 * 448.0).abs() < 1e-1);
    }

    #[test]
    fn hash_round_trips_3d() {
        let t = GridTransform::<Volumetric>::from_bounds(
            Vec3::ZERO,
            Vec3::splat(8.0),
            8,
            EdgeBehavior::Wrap,
        )
        .unwrap();
        let coord = [3, 5, 7];
        let h = t.hash(coord);
        assert_eq!(h, VoxelHash(3 + 8 * (5 + 8 * 7)));
        assert_eq!(t.coord_of(h), coord);
    }

    #[test]
    fn scale_is_largest_axis_factor() {
        let t = GridTransform::<Planar>::from_bounds(
            Vec2::ZERO,
            Vec2::new(100.0, 50.0),
            10,
            EdgeBehavior::Wrap,
        )
        .unwrap();
        assert_eq!(t.scale(), 0.2);
    }

    #[test]
    fn voxel_origin_maps_back_to_world() {
        let t = planar(EdgeBehavior::Wrap);
        let p = t.voxel_origin([2, 3, 0]);
        assert!((p - Vec2::new(20.0, 30.0)).length() < 1e-3);
    }

    #[test]
    fn rejects_empty_axis() {
        let err = GridTransform::<Planar>::from_bounds(
            Vec2::ZERO,
            Vec2::new(10.0, 0.0),
            4,
            EdgeBehavior::Wrap,
        );
        assert!(matches!(err, Err(SpaceError::InvalidBounds { .. })));
        let err = GridTransform::<Planar>::from_bounds(Vec2::ZERO, Vec2::ONE, 0, EdgeBehavior::Wrap);
        assert!(matches!(err, Err(SpaceError::InvalidResolution { .. })));
    }
}
