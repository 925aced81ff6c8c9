//! Seeded point clouds.

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A reproducible RNG for `seed`.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// `count` points uniformly inside `[min, max)`.
pub fn scatter_2d(seed: u64, count: usize, min: Vec2, max: Vec2) -> Vec<Vec2> {
    let mut rng = seeded_rng(seed);
    (0..count)
        .map(|_| {
            Vec2::new(
                rng.gen_range(min.x..max.x),
                rng.gen_range(min.y..max.y),
            )
        })
        .collect()
}

/// `count` points uniformly inside `[min, max)`.
pub fn scatter_3d(seed: u64, count: usize, min: Vec3, max: Vec3) -> Vec<Vec3> {
    let mut rng = seeded_rng(seed);
    (0..count)
        .map(|_| {
            Vec3::new(
                rng.gen_range(min.x..max.x),
                rng.gen_range(min.y..max.y),
                rng.gen_range(min.z..max.z),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scatter_is_reproducible_and_in_range() {
        let a = scatter_3d(7, 64, Vec3::ZERO, Vec3::splat(10.0));
        let b = scatter_3d(7, 64, Vec3::ZERO, Vec3::splat(10.0));
        assert_eq!(a, b);
        assert!(a
            .iter()
            .all(|p| p.cmpge(Vec3::ZERO).all() && p.cmplt(Vec3::splat(10.0)).all()));
        assert_ne!(a, scatter_3d(8, 64, Vec3::ZERO, Vec3::splat(10.0)));
    }
}
