//! The [`QubitId`] identifier and the capacity limits it lives within.

use std::fmt;

/// Largest number of slots a status table may ever hold.
///
/// Ids range over `0..MAX_CAPACITY`, so every id fits a non-negative
/// C `int32_t` and stays clear of the reserved slot sentinels, which all
/// sit at the top of the `u32` range.
pub const MAX_CAPACITY: u32 = i32::MAX as u32;

/// Capacity substituted when a manager is requested with a non-positive
/// initial capacity.
pub const FALLBACK_CAPACITY: u32 = 8;

/// Identifies one slot of a qubit manager's status table.
///
/// Ids are dense: a manager with capacity `n` owns exactly the ids
/// `QubitId(0)..QubitId(n)`. Capacity growth only appends, so an id keeps
/// its meaning for the lifetime of the manager that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QubitId(pub u32);

impl QubitId {
    /// The id as a table index.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Whether this id can exist in some table (`< MAX_CAPACITY`).
    pub fn is_representable(self) -> bool {
        self.0 < MAX_CAPACITY
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl From<QubitId> for u32 {
    fn from(id: QubitId) -> Self {
        id.0
    }
}
