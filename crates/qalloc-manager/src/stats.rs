//! Point-in-time counters for a qubit manager.

use std::fmt;

/// Snapshot of a manager's counters, taken by
/// [`QubitManager::stats`](crate::QubitManager::stats).
///
/// `allocated + free + disabled == capacity` and
/// `reusable + prohibited == free` always hold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ManagerStats {
    /// Total number of slots.
    pub capacity: u32,
    /// Ids currently handed out.
    pub allocated: u32,
    /// Ids in any free list.
    pub free: u32,
    /// Ids retired forever.
    pub disabled: u32,
    /// Free ids in reuse-allowed lists.
    pub reusable: u32,
    /// Free ids frozen in reuse-prohibited lists.
    pub prohibited: u32,
    /// Open areas, including the base.
    pub area_depth: usize,
}

impl fmt::Display for ManagerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "capacity={} allocated={} free={} (reusable={} prohibited={}) disabled={} depth={}",
            self.capacity,
            self.allocated,
            self.free,
            self.reusable,
            self.prohibited,
            self.disabled,
            self.area_depth
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_every_counter() {
        let stats = ManagerStats {
            capacity: 8,
            allocated: 3,
            free: 4,
            disabled: 1,
            reusable: 2,
            prohibited: 2,
            area_depth: 2,
        };
        assert_eq!(
            stats.to_string(),
            "capacity=8 allocated=3 free=4 (reusable=2 prohibited=2) disabled=1 depth=2"
        );
    }
}
