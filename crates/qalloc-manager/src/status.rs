//! The status table: one slot per qubit id.
//!
//! A slot holds either a sentinel (allocated / disabled) or, for a free
//! id, the raw index of the next id in whichever free list owns it.
//! Free lists therefore cost no memory beyond their head/tail pair (see
//! [`FreeList`](crate::list::FreeList)).

use std::ops::Range;

use qalloc_core::QubitId;

/// Link value marking the end of a free list.
pub(crate) const TERMINATOR: u32 = u32::MAX;

/// Slot value of an allocated id.
///
/// Kept distinct from [`TERMINATOR`] so that the tail of a free list can
/// never be mistaken for an allocated id.
pub(crate) const ALLOCATED: u32 = u32::MAX - 1;

/// Slot value of a permanently disabled id.
pub(crate) const DISABLED: u32 = u32::MAX - 2;

/// Decoded state of one status table slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState {
    /// Handed out to a caller.
    Allocated,
    /// Retired forever.
    Disabled,
    /// Member of a free list.
    Free {
        /// The following id in the same list, or `None` at the tail.
        next: Option<QubitId>,
    },
}

impl SlotState {
    fn decode(raw: u32) -> Self {
        match raw {
            ALLOCATED => Self::Allocated,
            DISABLED => Self::Disabled,
            TERMINATOR => Self::Free { next: None },
            next => Self::Free {
                next: Some(QubitId(next)),
            },
        }
    }

    /// Whether the slot is part of a free list.
    pub fn is_free(self) -> bool {
        matches!(self, Self::Free { .. })
    }
}

/// Growable array of slots, indexed by qubit id.
///
/// Growth only appends: an index never moves and never changes meaning,
/// so list links stored in the table survive reallocation of the backing
/// `Vec`.
#[derive(Clone, Debug, Default)]
pub struct StatusTable {
    slots: Vec<u32>,
}

impl StatusTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Number of slots, which is the manager's capacity.
    pub fn capacity(&self) -> u32 {
        // Never exceeds MAX_CAPACITY, which fits u32.
        self.slots.len() as u32
    }

    /// Decoded state of `id`, or `None` if it is out of range.
    pub fn state(&self, id: QubitId) -> Option<SlotState> {
        self.slots.get(id.index()).map(|&raw| SlotState::decode(raw))
    }

    /// Whether `id` names an existing slot.
    pub fn contains(&self, id: QubitId) -> bool {
        id.index() < self.slots.len()
    }

    /// Append slots up to `new_capacity`, returning the new id range.
    ///
    /// New slots are terminators; the caller links them into a list.
    /// A `new_capacity` at or below the current capacity is a no-op.
    pub(crate) fn grow_to(&mut self, new_capacity: u32) -> Range<u32> {
        let old = self.capacity();
        if new_capacity > old {
            self.slots.resize(new_capacity as usize, TERMINATOR);
        }
        old..self.capacity()
    }

    pub(crate) fn link(&self, index: u32) -> u32 {
        self.slots[index as usize]
    }

    pub(crate) fn set_link(&mut self, index: u32, value: u32) {
        self.slots[index as usize] = value;
    }

    pub(crate) fn mark_allocated(&mut self, id: QubitId) {
        self.slots[id.index()] = ALLOCATED;
    }

    pub(crate) fn mark_disabled(&mut self, id: QubitId) {
        self.slots[id.index()] = DISABLED;
    }
}
