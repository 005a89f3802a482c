//! Workload generators for benchmarking the qubit manager.
//!
//! - [`Workload::generate`]: seeded mix of allocations, releases and area
//!   operations shaped like a compiled quantum program
//! - [`replay`]: drive a [`QubitManager`] through a workload
//! - [`bench_config`]: the manager configuration used by the benches

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use qalloc_core::QubitId;
use qalloc_manager::{CapacityGrowth, ManagerConfig, QubitManager};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// One step of a generated workload.
///
/// Release and disable steps carry an index into the live set, taken
/// modulo its length at replay time, so a workload stays valid whatever
/// ids the manager happens to hand out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Allocate one id.
    Allocate,
    /// Allocate a batch.
    AllocateMany(usize),
    /// Release a live id.
    Release(usize),
    /// Disable a live id.
    Disable(usize),
    /// Open a restricted reuse area.
    StartArea,
    /// Freeze the innermost area's free ids.
    NextSegment,
    /// Close the innermost area.
    EndArea,
}

/// A deterministic sequence of manager operations.
#[derive(Clone, Debug)]
pub struct Workload {
    /// Steps in replay order.
    pub steps: Vec<Step>,
}

impl Workload {
    /// Generate `len` steps from `seed`.
    ///
    /// Areas are kept balanced: every `StartArea` is closed before the
    /// workload ends, and `NextSegment`/`EndArea` only appear while an
    /// area is open. Disables are rare, as on real hardware.
    pub fn generate(len: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut steps = Vec::with_capacity(len + 8);
        let mut depth = 0usize;
        for _ in 0..len {
            let step = match rng.random_range(0..100u32) {
                0..35 => Step::Allocate,
                35..42 => Step::AllocateMany(rng.random_range(2..8)),
                42..80 => Step::Release(rng.random_range(0..usize::MAX)),
                80..82 => Step::Disable(rng.random_range(0..usize::MAX)),
                82..90 => {
                    depth += 1;
                    Step::StartArea
                }
                90..94 if depth > 0 => Step::NextSegment,
                94..100 if depth > 0 => {
                    depth -= 1;
                    Step::EndArea
                }
                _ => Step::Allocate,
            };
            steps.push(step);
        }
        steps.extend(std::iter::repeat_n(Step::EndArea, depth));
        Self { steps }
    }
}

/// Manager configuration used by the benches: growable, reuse encouraged.
pub fn bench_config(initial_capacity: i32, growth: CapacityGrowth) -> ManagerConfig {
    ManagerConfig::new(initial_capacity)
        .with_may_extend_capacity(true)
        .with_encourage_reuse(true)
        .with_growth(growth)
}

/// Totals gathered while replaying a workload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplayOutcome {
    /// Ids handed out across the whole run.
    pub allocated: u64,
    /// Ids released back.
    pub released: u64,
    /// Operations the manager rejected.
    pub rejected: u64,
}

/// Drive `manager` through `workload`, returning the ids still live.
///
/// Rejected operations are counted, not treated as failures: an
/// all-or-nothing batch may legitimately fail on a fixed-capacity
/// manager.
pub fn replay(
    manager: &mut QubitManager,
    workload: &Workload,
) -> (Vec<QubitId>, ReplayOutcome) {
    let mut live: Vec<QubitId> = Vec::new();
    let mut outcome = ReplayOutcome::default();
    for step in &workload.steps {
        match *step {
            Step::Allocate => match manager.allocate() {
                Ok(id) => {
                    live.push(id);
                    outcome.allocated += 1;
                }
                Err(_) => outcome.rejected += 1,
            },
            Step::AllocateMany(n) => match manager.allocate_many(n) {
                Ok(ids) => {
                    outcome.allocated += ids.len() as u64;
                    live.extend(ids);
                }
                Err(_) => outcome.rejected += 1,
            },
            Step::Release(i) if !live.is_empty() => {
                let id = live.swap_remove(i % live.len());
                match manager.release(&id) {
                    Ok(()) => outcome.released += 1,
                    Err(_) => outcome.rejected += 1,
                }
            }
            Step::Disable(i) if !live.is_empty() => {
                let id = live.swap_remove(i % live.len());
                if manager.disable(&id).is_err() {
                    outcome.rejected += 1;
                }
            }
            Step::Release(_) | Step::Disable(_) => {}
            Step::StartArea => manager.start_restricted_reuse_area(),
            Step::NextSegment => manager.next_restricted_reuse_segment(),
            Step::EndArea => {
                if manager.end_restricted_reuse_area().is_err() {
                    outcome.rejected += 1;
                }
            }
        }
    }
    (live, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_is_deterministic() {
        let a = Workload::generate(500, 42);
        let b = Workload::generate(500, 42);
        assert_eq!(a.steps, b.steps);
        assert_ne!(a.steps, Workload::generate(500, 43).steps);
    }

    #[test]
    fn areas_are_balanced() {
        for seed in 0..20 {
            let w = Workload::generate(300, seed);
            let mut depth = 0i64;
            for step in &w.steps {
                match step {
                    Step::StartArea => depth += 1,
                    Step::EndArea => depth -= 1,
                    Step::NextSegment => assert!(depth > 0),
                    _ => {}
                }
                assert!(depth >= 0);
            }
            assert_eq!(depth, 0);
        }
    }

    #[test]
    fn growable_replay_never_rejects() {
        let workload = Workload::generate(2_000, 7);
        let mut qm = QubitManager::with_config(bench_config(4, CapacityGrowth::Doubling));
        let (live, outcome) = replay(&mut qm, &workload);
        assert_eq!(outcome.rejected, 0);
        assert_eq!(qm.allocated_qubit_count() as usize, live.len());
        assert_eq!(qm.area_depth(), 1);
    }
}
