//! Criterion micro-benchmarks for qubit allocation, release and area churn.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use qalloc_bench::{bench_config, replay, Workload};
use qalloc_manager::{CapacityGrowth, QubitManager};

/// Allocate then release 1K ids one at a time on a pre-sized manager.
fn bench_allocate_release_1k(c: &mut Criterion) {
    c.bench_function("allocate_release_1k", |b| {
        let mut qm = QubitManager::new(1024, false, true);
        let mut ids = Vec::with_capacity(1024);
        b.iter(|| {
            for _ in 0..1024 {
                ids.push(qm.allocate().unwrap());
            }
            for id in ids.drain(..) {
                qm.release(&id).unwrap();
            }
            black_box(qm.free_qubit_count());
        });
    });
}

/// One 1K all-or-nothing batch, including the feasibility walk.
fn bench_allocate_many_1k(c: &mut Criterion) {
    c.bench_function("allocate_many_1k", |b| {
        let mut qm = QubitManager::new(1024, false, true);
        b.iter(|| {
            let ids = qm.allocate_many(1024).unwrap();
            qm.release_many(black_box(&ids)).unwrap();
        });
    });
}

/// Grow from a single slot to 4K ids under each growth policy.
fn bench_growth(c: &mut Criterion) {
    for (name, growth) in [
        ("growth_incremental_4k", CapacityGrowth::Incremental),
        ("growth_doubling_4k", CapacityGrowth::Doubling),
    ] {
        c.bench_function(name, |b| {
            b.iter_batched(
                || QubitManager::with_config(bench_config(1, growth)),
                |mut qm| {
                    for _ in 0..4096 {
                        black_box(qm.allocate().unwrap());
                    }
                    qm
                },
                BatchSize::SmallInput,
            );
        });
    }
}

/// Nested areas 32 deep, each releasing one id, then unwinding.
fn bench_area_churn(c: &mut Criterion) {
    c.bench_function("area_churn_depth_32", |b| {
        let mut qm = QubitManager::new(64, false, true);
        b.iter(|| {
            for _ in 0..32 {
                let id = qm.allocate().unwrap();
                qm.start_restricted_reuse_area();
                qm.release(&id).unwrap();
            }
            for _ in 0..32 {
                qm.end_restricted_reuse_area().unwrap();
            }
            black_box(qm.area_depth());
        });
    });
}

/// Replay a seeded 10K-step mixed workload.
fn bench_mixed_workload(c: &mut Criterion) {
    let workload = Workload::generate(10_000, 42);
    c.bench_function("mixed_workload_10k", |b| {
        b.iter_batched(
            || QubitManager::with_config(bench_config(64, CapacityGrowth::Doubling)),
            |mut qm| black_box(replay(&mut qm, &workload)),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_allocate_release_1k,
    bench_allocate_many_1k,
    bench_growth,
    bench_area_churn,
    bench_mixed_workload,
);
criterion_main!(benches);
