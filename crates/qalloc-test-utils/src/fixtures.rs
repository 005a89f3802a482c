//! Common manager setups and test logging.

use std::sync::Once;

use qalloc_core::QubitId;
use qalloc_manager::{CapacityGrowth, ManagerConfig, QubitManager};
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Install a test-friendly `tracing` subscriber once per process.
///
/// Honours `RUST_LOG`; silent by default.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Fixed-capacity manager that encourages reuse.
pub fn fixed_manager(capacity: i32) -> QubitManager {
    QubitManager::new(capacity, false, true)
}

/// Manager that grows one slot at a time.
pub fn growable_manager(capacity: i32) -> QubitManager {
    QubitManager::new(capacity, true, true)
}

/// Manager that doubles its capacity on demand.
pub fn doubling_manager(capacity: i32) -> QubitManager {
    QubitManager::with_config(
        ManagerConfig::new(capacity)
            .with_may_extend_capacity(true)
            .with_growth(CapacityGrowth::Doubling),
    )
}

/// Open `depth` nested areas, allocating and releasing one id in each.
///
/// Returns the released ids, outermost area first.
pub fn release_one_per_area(qm: &mut QubitManager, depth: usize) -> Vec<QubitId> {
    (0..depth)
        .map(|_| {
            qm.start_restricted_reuse_area();
            let id = qm.allocate().expect("fixture manager has room");
            qm.release(&id).expect("id was just allocated");
            // Keep the id out of the next area's reach.
            qm.next_restricted_reuse_segment();
            id
        })
        .collect()
}
