//! Simulation state across a simulated process restart.

use glam::{Vec2, Vec3};
use vivarium_arena::ArenaOrigin;
use vivarium_core::ObjectId;
use vivarium_sim::{NullHost, SimConfig, SimContext, SimError, Species};
use vivarium_test_utils::{init_tracing, scatter_2d};

fn config(dir: &tempfile::TempDir) -> SimConfig {
    SimConfig {
        worker_count: Some(3),
        ..SimConfig::with_path(dir.path().join("colony.state"))
    }
}

fn sorted(mut ids: Vec<ObjectId>) -> Vec<ObjectId> {
    ids.sort_unstable();
    ids
}

#[test]
fn restart_restores_entities_grids_and_fields() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();

    let mut ctx = SimContext::initialize(config(&dir)).unwrap();
    assert_eq!(ctx.origin(), ArenaOrigin::Created);
    let points = scatter_2d(11, 200, Vec2::ZERO, Vec2::splat(450.0));
    for (i, p) in points.iter().enumerate() {
        let species = if i % 3 == 0 {
            Species::Fungus {
                spore_timer: i as u32,
                energy: 1.0,
            }
        } else {
            Species::Ant {
                carrying: i % 2 == 0,
                heading: 0.5,
            }
        };
        ctx.spawn_creature(*p, Vec2::new(3.0, -2.0), species)
            .unwrap()
            .unwrap();
    }
    for i in 0..20 {
        ctx.spawn_particle(Vec3::new(i as f32 * 20.0, 40.0, 10.0), Vec3::Z, 100)
            .unwrap()
            .unwrap();
    }
    ctx.despawn_creature(ObjectId(7)).unwrap();
    for _ in 0..5 {
        ctx.advance(&mut NullHost).unwrap();
    }

    let probe = Vec2::new(225.0, 225.0);
    let before_neighbors = sorted(ctx.neighbors(probe, 60.0).unwrap());
    let before_creature = ctx.creature(ObjectId(12)).unwrap();
    let before_pheromone = ctx.state().pheromone.read().to_vec();
    let before_particles = ctx.particle_count();
    assert!(!before_neighbors.is_empty());
    ctx.finalize(&mut NullHost, true).unwrap();

    let ctx = SimContext::initialize(config(&dir)).unwrap();
    assert_eq!(ctx.origin(), ArenaOrigin::Reopened);
    assert_eq!(ctx.tick(), 5);
    assert_eq!(ctx.creature_count(), 199);
    assert_eq!(ctx.particle_count(), before_particles);
    assert!(matches!(
        ctx.creature(ObjectId(7)),
        Err(SimError::NotLive { .. })
    ));
    assert_eq!(ctx.creature(ObjectId(12)).unwrap(), before_creature);
    assert_eq!(sorted(ctx.neighbors(probe, 60.0).unwrap()), before_neighbors);
    assert_eq!(ctx.state().pheromone.read(), &before_pheromone[..]);
    assert_eq!(ctx.state().pheromone.generation(), 5);
    ctx.creature_grid().unwrap().check_invariants().unwrap();
    ctx.particle_grid().unwrap().check_invariants().unwrap();
}

#[test]
fn restart_with_new_bounds_reindexes_persisted_positions() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = SimContext::initialize(config(&dir)).unwrap();
    let id = ctx
        .spawn_creature(
            Vec2::new(300.0, 20.0),
            Vec2::ZERO,
            Species::Predator {
                target: None,
                hunger: 0.2,
            },
        )
        .unwrap()
        .unwrap();
    ctx.finalize(&mut NullHost, true).unwrap();

    let mut cfg = config(&dir);
    cfg.world_max = [200.0, 200.0, 100.0];
    let ctx = SimContext::initialize(cfg).unwrap();
    // Wrapped into the smaller world: 300 mod 200.
    assert_eq!(ctx.creature(id).unwrap().position, [100.0, 20.0]);
    assert_eq!(ctx.neighbors(Vec2::new(101.0, 20.0), 2.0).unwrap(), vec![id]);
    assert_eq!(ctx.state().params.world_max, [200.0, 200.0, 100.0]);
}

#[test]
fn foreign_file_of_the_right_size_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(&dir);
    {
        let ctx = SimContext::initialize(cfg.clone()).unwrap();
        assert!(!ctx.state().is_blank());
        ctx.finalize(&mut NullHost, true).unwrap();
    }
    let mut bytes = std::fs::read(&cfg.arena.path).unwrap();
    bytes[..4].copy_from_slice(b"NOPE");
    std::fs::write(&cfg.arena.path, &bytes).unwrap();

    match SimContext::initialize(cfg) {
        Err(SimError::LayoutMismatch { magic, .. }) => {
            assert_eq!(magic, u32::from_le_bytes(*b"NOPE"));
        }
        other => panic!("expected LayoutMismatch, got {other:?}"),
    }
}

#[test]
fn truncated_file_starts_over() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(&dir);
    std::fs::write(&cfg.arena.path, b"short").unwrap();
    let ctx = SimContext::initialize(cfg).unwrap();
    assert_eq!(ctx.origin(), ArenaOrigin::Resized { previous_len: 5 });
    assert_eq!(ctx.tick(), 0);
    assert_eq!(ctx.creature_count(), 0);
}

#[test]
fn unflushed_zeroed_image_is_initialized_on_open() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(&dir);
    cfg.arena.initialize_if_absent = false;
    let mut ctx = SimContext::initialize(cfg).unwrap();
    assert!(ctx
        .spawn_creature(Vec2::new(1.0, 1.0), Vec2::ZERO, Species::Fungus {
            spore_timer: 0,
            energy: 0.0
        })
        .unwrap()
        .is_some());
}
