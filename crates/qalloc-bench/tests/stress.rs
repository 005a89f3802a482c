//! Long seeded workloads checked against the structural audit.

use qalloc_bench::{bench_config, replay, Workload};
use qalloc_manager::{CapacityGrowth, QubitManager};
use qalloc_test_utils::audit;
use qalloc_test_utils::fixtures::init_tracing;

#[test]
fn long_workloads_keep_lists_consistent() {
    init_tracing();
    for seed in 0..8 {
        let workload = Workload::generate(5_000, seed);
        for growth in [CapacityGrowth::Incremental, CapacityGrowth::Doubling] {
            let mut qm = QubitManager::with_config(bench_config(8, growth));
            let (live, outcome) = replay(&mut qm, &workload);
            assert_eq!(outcome.rejected, 0, "seed {seed}");
            let report = audit(&qm).unwrap_or_else(|e| panic!("seed {seed}: {e}"));
            assert_eq!(report.allocated as usize, live.len());
        }
    }
}

#[test]
fn fixed_capacity_rejections_leave_manager_consistent() {
    init_tracing();
    let workload = Workload::generate(5_000, 99);
    let mut qm = QubitManager::new(16, false, false);
    let (live, _) = replay(&mut qm, &workload);
    assert_eq!(qm.capacity(), 16);
    let report = audit(&qm).unwrap();
    assert_eq!(report.allocated as usize, live.len());
    assert_eq!(
        qm.allocated_qubit_count() + qm.free_qubit_count() + qm.disabled_qubit_count(),
        16
    );
}
