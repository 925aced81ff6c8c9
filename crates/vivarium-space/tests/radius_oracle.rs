//! Grid queries checked against brute-force scans.

use glam::{Vec2, Vec3};
use proptest::prelude::*;
use vivarium_core::ObjectId;
use vivarium_space::{EdgeBehavior, Hashspace, HeapVoxelStore, Planar, ShellTable, Volumetric};
use vivarium_test_utils::{brute_force_radius, near_boundary, scatter_2d, scatter_3d};

const MARGIN: f64 = 1e-3;

fn arb_edge() -> impl Strategy<Value = EdgeBehavior> {
    prop_oneof![Just(EdgeBehavior::Wrap), Just(EdgeBehavior::Bounded)]
}

fn wrap_extent(edge: EdgeBehavior, extent: [f32; 3]) -> Option<[f32; 3]> {
    edge.is_periodic().then_some(extent)
}

fn collect_sorted(iter: impl Iterator<Item = ObjectId>) -> Vec<u32> {
    let mut ids: Vec<u32> = iter.map(|id| id.0).collect();
    ids.sort_unstable();
    ids
}

proptest! {
    #[test]
    fn planar_query_matches_brute_force(
        seed in any::<u64>(),
        count in 1usize..120,
        resolution in 1u32..24,
        edge in arb_edge(),
        cx in 0.0f32..100.0,
        cy in 0.0f32..60.0,
        radius in 0.0f32..45.0,
    ) {
        let max = Vec2::new(100.0, 60.0);
        let points = scatter_2d(seed, count, Vec2::ZERO, max);
        let padded: Vec<[f32; 3]> = points.iter().map(|p| [p.x, p.y, 0.0]).collect();
        let center = [cx, cy, 0.0];
        let wrap = wrap_extent(edge, [100.0, 60.0, 0.0]);
        prop_assume!(!near_boundary(&padded, center, radius, wrap, MARGIN));

        let shells = ShellTable::new(2, resolution, edge).unwrap();
        let store = HeapVoxelStore::new(count, shells.voxel_count());
        let mut grid = Hashspace::<Planar, _>::attach(&shells, store).unwrap();
        grid.reset(Vec2::ZERO, max).unwrap();
        for (i, p) in points.iter().enumerate() {
            grid.insert_or_update(ObjectId(i as u32), *p).unwrap();
        }

        let got = collect_sorted(grid.query_radius(Vec2::new(cx, cy), radius).unwrap());
        prop_assert_eq!(got, brute_force_radius(&padded, center, radius, wrap));
    }

    #[test]
    fn volumetric_query_matches_brute_force(
        seed in any::<u64>(),
        count in 1usize..120,
        resolution in 1u32..10,
        edge in arb_edge(),
        c in (0.0f32..40.0, 0.0f32..40.0, 0.0f32..20.0),
        radius in 0.0f32..25.0,
    ) {
        let max = Vec3::new(40.0, 40.0, 20.0);
        let points = scatter_3d(seed, count, Vec3::ZERO, max);
        let padded: Vec<[f32; 3]> = points.iter().map(|p| p.to_array()).collect();
        let center = [c.0, c.1, c.2];
        let wrap = wrap_extent(edge, max.to_array());
        prop_assume!(!near_boundary(&padded, center, radius, wrap, MARGIN));

        let shells = ShellTable::new(3, resolution, edge).unwrap();
        let store = HeapVoxelStore::new(count, shells.voxel_count());
        let mut grid = Hashspace::<Volumetric, _>::attach(&shells, store).unwrap();
        grid.reset(Vec3::ZERO, max).unwrap();
        grid.rebuild(points.iter().enumerate().map(|(i, p)| (ObjectId(i as u32), *p)))
            .unwrap();

        let got = collect_sorted(grid.query_radius(Vec3::from_array(center), radius).unwrap());
        prop_assert_eq!(got, brute_force_radius(&padded, center, radius, wrap));
    }

    #[test]
    fn pruning_never_changes_the_result(
        seed in any::<u64>(),
        count in 1usize..200,
        resolution in 1u32..32,
        edge in arb_edge(),
        cx in 0.0f32..50.0,
        cy in 0.0f32..50.0,
        radius in 0.0f32..30.0,
    ) {
        let points = scatter_2d(seed, count, Vec2::ZERO, Vec2::splat(50.0));
        let shells = ShellTable::new(2, resolution, edge).unwrap();
        let store = HeapVoxelStore::new(count, shells.voxel_count());
        let mut grid = Hashspace::<Planar, _>::attach(&shells, store).unwrap();
        grid.reset(Vec2::ZERO, Vec2::splat(50.0)).unwrap();
        for (i, p) in points.iter().enumerate() {
            grid.insert_or_update(ObjectId(i as u32), *p).unwrap();
        }

        let center = Vec2::new(cx, cy);
        let mut pruned = grid.query_radius(center, radius).unwrap();
        let pruned_ids = collect_sorted(pruned.by_ref());
        let mut full = grid.query_radius_full(center, radius).unwrap();
        let full_ids = collect_sorted(full.by_ref());
        prop_assert_eq!(pruned_ids, full_ids);
        prop_assert!(pruned.voxels_visited() <= full.voxels_visited());
    }

    #[test]
    fn volumetric_pruning_never_changes_the_result(
        seed in any::<u64>(),
        count in 1usize..200,
        resolution in 1u32..12,
        edge in arb_edge(),
        c in (-15.0f32..45.0, 0.0f32..30.0, 2.0f32..26.0),
        radius in 0.0f32..35.0,
    ) {
        let (min, max) = (Vec3::new(-15.0, 0.0, 2.0), Vec3::new(45.0, 30.0, 26.0));
        let points = scatter_3d(seed, count, min, max);
        let shells = ShellTable::new(3, resolution, edge).unwrap();
        let store = HeapVoxelStore::new(count, shells.voxel_count());
        let mut grid = Hashspace::<Volumetric, _>::attach(&shells, store).unwrap();
        grid.reset(min, max).unwrap();
        grid.rebuild(points.iter().enumerate().map(|(i, p)| (ObjectId(i as u32), *p)))
            .unwrap();

        let center = Vec3::new(c.0, c.1, c.2);
        let mut pruned = grid.query_radius(center, radius).unwrap();
        let pruned_ids = collect_sorted(pruned.by_ref());
        let mut full = grid.query_radius_full(center, radius).unwrap();
        let full_ids = collect_sorted(full.by_ref());
        prop_assert_eq!(pruned_ids, full_ids);
        prop_assert!(pruned.voxels_visited() <= full.voxels_visited());
    }
}

#[derive(Clone, Debug)]
enum Op {
    Upsert(u32, f32, f32),
    Remove(u32),
}

fn arb_op(capacity: u32) -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..capacity, -20.0f32..120.0, -20.0f32..120.0)
            .prop_map(|(id, x, y)| Op::Upsert(id, x, y)),
        1 => (0..capacity).prop_map(Op::Remove),
    ]
}

proptest! {
    #[test]
    fn every_live_id_sits_in_exactly_one_chain(
        ops in proptest::collection::vec(arb_op(16), 1..80),
    ) {
        let shells = ShellTable::new(2, 8, EdgeBehavior::Wrap).unwrap();
        let store = HeapVoxelStore::new(16, shells.voxel_count());
        let mut grid = Hashspace::<Planar, _>::attach(&shells, store).unwrap();
        grid.reset(Vec2::ZERO, Vec2::splat(100.0)).unwrap();
        let mut live = [false; 16];

        for op in ops {
            match op {
                Op::Upsert(id, x, y) => {
                    grid.insert_or_update(ObjectId(id), Vec2::new(x, y)).unwrap();
                    live[id as usize] = true;
                    let hash = grid.hash_of(ObjectId(id)).unwrap();
                    prop_assert!(grid.chain(hash).any(|member| member == ObjectId(id)));
                }
                Op::Remove(id) => {
                    grid.remove(ObjectId(id)).unwrap();
                    live[id as usize] = false;
                }
            }
            prop_assert!(grid.check_invariants().is_ok());
        }

        let expected: Vec<u32> = (0..16).filter(|&i| live[i as usize]).collect();
        prop_assert_eq!(collect_sorted(grid.iter_active()), expected);
        prop_assert_eq!(grid.len(), live.iter().filter(|&&l| l).count());
    }
}

#[test]
fn dense_cluster_in_one_voxel_is_fully_reported() {
    let shells = ShellTable::new(2, 16, EdgeBehavior::Bounded).unwrap();
    let store = HeapVoxelStore::new(256, shells.voxel_count());
    let mut grid = Hashspace::<Planar, _>::attach(&shells, store).unwrap();
    grid.reset(Vec2::ZERO, Vec2::splat(160.0)).unwrap();
    for i in 0..256u32 {
        let jitter = i as f32 * 0.01;
        grid.insert_or_update(ObjectId(i), Vec2::new(41.0 + jitter, 42.0 + jitter))
            .unwrap();
    }
    let hash = grid.hash_of(ObjectId(0)).unwrap();
    assert_eq!(grid.chain(hash).count(), 256);
    assert_eq!(grid.query_radius(Vec2::new(42.0, 43.0), 5.0).unwrap().count(), 256);
}
