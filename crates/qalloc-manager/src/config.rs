//! Qubit manager configuration parameters.

use qalloc_core::{FALLBACK_CAPACITY, MAX_CAPACITY};

/// How much allocation-driven growth extends the status table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CapacityGrowth {
    /// Add exactly the one slot the allocation needs.
    #[default]
    Incremental,
    /// Double the capacity. Surplus slots become free ids in the base area.
    Doubling,
}

impl CapacityGrowth {
    /// Capacity after one growth step from `current`, clamped to `ceiling`.
    ///
    /// Returns `None` when `current` has already reached `ceiling`.
    pub fn next_capacity(self, current: u32, ceiling: u32) -> Option<u32> {
        if current >= ceiling {
            return None;
        }
        let next = match self {
            Self::Incremental => current + 1,
            Self::Doubling => current.saturating_mul(2).max(current + 1),
        };
        Some(next.min(ceiling))
    }
}

/// Configuration for a [`QubitManager`](crate::QubitManager).
///
/// Plain data; all values are fixed once the manager is constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Number of ids created up front.
    ///
    /// Non-positive values are replaced by [`FALLBACK_CAPACITY`] instead
    /// of failing.
    pub initial_capacity: i32,

    /// Whether allocation may grow the table once every reusable id is
    /// taken.
    pub may_extend_capacity: bool,

    /// Search order for reusable ids.
    ///
    /// When true, the innermost area is searched first and released ids
    /// go to the front of their list, so the most recently released id is
    /// reused first. When false, the base area (where never-used ids
    /// live) is searched first and released ids queue at the back.
    pub encourage_reuse: bool,

    /// Growth step used when allocation extends the table.
    pub growth: CapacityGrowth,

    /// Upper bound on capacity, clamped to [`MAX_CAPACITY`].
    ///
    /// Never effective below the initial capacity.
    pub max_capacity: u32,
}

impl ManagerConfig {
    /// Default number of ids created at construction.
    pub const DEFAULT_INITIAL_CAPACITY: i32 = 64;

    /// Create a config with the given initial capacity and defaults for
    /// everything else: fixed capacity, reuse encouraged.
    pub fn new(initial_capacity: i32) -> Self {
        Self {
            initial_capacity,
            may_extend_capacity: false,
            encourage_reuse: true,
            growth: CapacityGrowth::default(),
            max_capacity: MAX_CAPACITY,
        }
    }

    /// Set [`may_extend_capacity`](Self::may_extend_capacity).
    pub fn with_may_extend_capacity(mut self, may_extend_capacity: bool) -> Self {
        self.may_extend_capacity = may_extend_capacity;
        self
    }

    /// Set [`encourage_reuse`](Self::encourage_reuse).
    pub fn with_encourage_reuse(mut self, encourage_reuse: bool) -> Self {
        self.encourage_reuse = encourage_reuse;
        self
    }

    /// Set [`growth`](Self::growth).
    pub fn with_growth(mut self, growth: CapacityGrowth) -> Self {
        self.growth = growth;
        self
    }

    /// Set [`max_capacity`](Self::max_capacity).
    pub fn with_max_capacity(mut self, max_capacity: u32) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    /// The capacity the manager actually starts with.
    pub fn effective_initial_capacity(&self) -> u32 {
        if self.initial_capacity <= 0 {
            FALLBACK_CAPACITY
        } else {
            // Positive i32 always fits MAX_CAPACITY.
            self.initial_capacity as u32
        }
    }

    /// The largest capacity growth may reach.
    pub fn capacity_ceiling(&self) -> u32 {
        self.max_capacity
            .min(MAX_CAPACITY)
            .max(self.effective_initial_capacity())
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INITIAL_CAPACITY)
    }
}
