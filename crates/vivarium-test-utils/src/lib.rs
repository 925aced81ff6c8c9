//! Reference oracles and fixtures for Vivarium development.
//!
//! [`brute_force_radius`] is the slow, obviously-correct answer that grid
//! queries are checked against. The scatter helpers produce seeded,
//! reproducible point clouds.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{scatter_2d, scatter_3d, seeded_rng};

/// Squared distance between padded points, computed in `f64`.
///
/// With `wrap = Some(extent)` each axis takes the shorter way around a
/// periodic world of that extent.
pub fn reference_distance_sq(a: [f32; 3], b: [f32; 3], wrap: Option<[f32; 3]>) -> f64 {
    let mut sum = 0.0f64;
    for axis in 0..3 {
        let mut d = (b[axis] as f64 - a[axis] as f64).abs();
        if let Some(extent) = wrap {
            let ext = extent[axis] as f64;
            if ext > 0.0 {
                d %= ext;
                d = d.min(ext - d);
            }
        }
        sum += d * d;
    }
    sum
}

/// Indices of all `points` within `radius` of `center`, inclusive, sorted.
pub fn brute_force_radius(
    points: &[[f32; 3]],
    center: [f32; 3],
    radius: f32,
    wrap: Option<[f32; 3]>,
) -> Vec<u32> {
    let r2 = radius as f64 * radius as f64;
    points
        .iter()
        .enumerate()
        .filter(|(_, p)| reference_distance_sq(center, **p, wrap) <= r2)
        .map(|(i, _)| i as u32)
        .collect()
}

/// Whether any point sits within `margin` of the query sphere's surface.
///
/// Differential tests skip such cases: `f32` rounding may legitimately put
/// them on either side.
pub fn near_boundary(
    points: &[[f32; 3]],
    center: [f32; 3],
    radius: f32,
    wrap: Option<[f32; 3]>,
    margin: f64,
) -> bool {
    points.iter().any(|&p| {
        let d = reference_distance_sq(center, p, wrap).sqrt();
        (d - radius as f64).abs() < margin
    })
}

/// Install a test-friendly `tracing` subscriber once per process.
///
/// Honours `RUST_LOG`; output is captured by the test harness.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_distance_takes_short_way() {
        let d = reference_distance_sq([449.0, 0.0, 0.0], [1.0, 0.0, 0.0], Some([450.0; 3]));
        assert!((d - 4.0).abs() < 1e-9);
        let d = reference_distance_sq([449.0, 0.0, 0.0], [1.0, 0.0, 0.0], None);
        assert!((d - 448.0 * 448.0).abs() < 1e-6);
    }

    #[test]
    fn brute_force_is_inclusive() {
        let points = [[3.0, 4.0, 0.0], [6.0, 0.0, 0.0], [0.0, 0.0, 0.0]];
        assert_eq!(brute_force_radius(&points, [0.0; 3], 5.0, None), vec![0, 2]);
        assert!(near_boundary(&points, [0.0; 3], 5.0, None, 1e-3));
        assert!(!near_boundary(&points, [0.0; 3], 5.5, None, 1e-3));
    }
}
