//! Criterion benchmark for a full simulation tick against a mapped state file.

use criterion::{criterion_group, criterion_main, Criterion};
use vivarium_bench::populated_context;
use vivarium_sim::NullHost;

/// Benchmark: advance a world of 1K creatures and 2K particles by one tick.
fn bench_advance_reference(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = populated_context(&dir.path().join("bench.state"), 42, 1000, 2000).unwrap();

    c.bench_function("advance_1k_creatures_2k_particles", |b| {
        b.iter(|| ctx.advance(&mut NullHost).unwrap());
    });

    ctx.finalize(&mut NullHost, false).unwrap();
}

criterion_group!(benches, bench_advance_reference);
criterion_main!(benches);
