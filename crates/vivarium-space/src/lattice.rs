//! Dimensionality abstraction over `glam` vector and affine types.
//!
//! The grid logic is written once against [`Lattice`]; [`Planar`] and
//! [`Volumetric`] plug in the 2D and 3D `glam` types. Internally every
//! coordinate is padded to three axes, with unused axes held at zero, so
//! stored records have the same shape regardless of dimensionality.

use std::fmt::Debug;

use glam::{Mat3, Mat4, Vec2, Vec3};

/// A 2D or 3D coordinate system with an affine transform type.
pub trait Lattice: Copy + Debug + Send + Sync + 'static {
    /// Number of spatial axes (2 or 3).
    const NDIM: usize;

    /// World-space point type.
    type Point: Copy + Debug + PartialEq + Send + Sync;

    /// Homogeneous affine matrix (3×3 in 2D, 4×4 in 3D).
    type Affine: Copy + Debug + PartialEq + Send + Sync;

    /// Pad `p` to three axes.
    fn to_axes(p: Self::Point) -> [f32; 3];

    /// Build a point from the first [`NDIM`](Self::NDIM) axes.
    fn from_axes(axes: [f32; 3]) -> Self::Point;

    /// The affine `S · T`: translate by `translate`, then scale by `scale`.
    fn scale_translate(scale: Self::Point, translate: Self::Point) -> Self::Affine;

    /// Inverse of an affine transform.
    fn invert(m: &Self::Affine) -> Self::Affine;

    /// Apply an affine transform to a point.
    fn apply(m: &Self::Affine, p: Self::Point) -> Self::Point;
}

/// Two-dimensional lattice backed by [`Vec2`] and [`Mat3`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Planar;

impl Lattice for Planar {
    const NDIM: usize = 2;
    type Point = Vec2;
    type Affine = Mat3;

    #[inline]
    fn to_axes(p: Vec2) -> [f32; 3] {
        [p.x, p.y, 0.0]
    }

    #[inline]
    fn from_axes(axes: [f32; 3]) -> Vec2 {
        Vec2::new(axes[0], axes[1])
    }

    fn scale_translate(scale: Vec2, translate: Vec2) -> Mat3 {
        Mat3::from_scale(scale) * Mat3::from_translation(translate)
    }

    fn invert(m: &Mat3) -> Mat3 {
        m.inverse()
    }

    #[inline]
    fn apply(m: &Mat3, p: Vec2) -> Vec2 {
        m.transform_point2(p)
    }
}

/// Three-dimensional lattice backed by [`Vec3`] and [`Mat4`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Volumetric;

impl Lattice for Volumetric {
    const NDIM: usize = 3;
    type Point = Vec3;
    type Affine = Mat4;

    #[inline]
    fn to_axes(p: Vec3) -> [f32; 3] {
        p.to_array()
    }

    #[inline]
    fn from_axes(axes: [f32; 3]) -> Vec3 {
        Vec3::from_array(axes)
    }

    fn scale_translate(scale: Vec3, translate: Vec3) -> Mat4 {
        Mat4::from_scale(scale) * Mat4::from_translation(translate)
    }

    fn invert(m: &Mat4) -> Mat4 {
        m.inverse()
    }

    #[inline]
    fn apply(m: &Mat4, p: Vec3) -> Vec3 {
        m.transform_point3(p)
    }
}
