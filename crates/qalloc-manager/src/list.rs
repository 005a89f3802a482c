//! Singly linked lists threaded through the status table.
//!
//! A [`FreeList`] stores only its head and tail index. Each member's
//! "next" link lives in that member's own status table slot, so pushing,
//! popping and splicing whole lists are all O(1) and touch at most two
//! slots. No mutating operation walks a list.

use std::ops::Range;

use qalloc_core::QubitId;

use crate::status::{StatusTable, TERMINATOR};

/// A list of free qubit ids whose links live in a shared [`StatusTable`].
///
/// The table is passed to every operation rather than stored, because it
/// is shared by all lists of a manager and may reallocate on growth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FreeList {
    head: u32,
    tail: u32,
}

impl FreeList {
    /// An empty list.
    pub const fn new() -> Self {
        Self {
            head: TERMINATOR,
            tail: TERMINATOR,
        }
    }

    /// Link the ids of `range` into a new list in ascending order.
    pub(crate) fn from_range(range: Range<u32>, table: &mut StatusTable) -> Self {
        if range.is_empty() {
            return Self::new();
        }
        let last = range.end - 1;
        for index in range.start..last {
            table.set_link(index, index + 1);
        }
        table.set_link(last, TERMINATOR);
        Self {
            head: range.start,
            tail: last,
        }
    }

    /// Whether the list has no members.
    pub fn is_empty(&self) -> bool {
        self.head == TERMINATOR
    }

    /// First member, if any.
    pub fn head(&self) -> Option<QubitId> {
        (!self.is_empty()).then_some(QubitId(self.head))
    }

    /// Last member, if any.
    pub fn tail(&self) -> Option<QubitId> {
        (!self.is_empty()).then_some(QubitId(self.tail))
    }

    /// Link `id` in at the front or the back.
    ///
    /// `id` must not currently belong to any list.
    pub(crate) fn push(&mut self, id: QubitId, to_front: bool, table: &mut StatusTable) {
        if self.is_empty() {
            table.set_link(id.0, TERMINATOR);
            self.head = id.0;
            self.tail = id.0;
        } else if to_front {
            table.set_link(id.0, self.head);
            self.head = id.0;
        } else {
            table.set_link(id.0, TERMINATOR);
            table.set_link(self.tail, id.0);
            self.tail = id.0;
        }
    }

    /// Unlink and return the head.
    ///
    /// The popped slot keeps its stale link; the caller overwrites it with
    /// the id's new state.
    pub(crate) fn pop_front(&mut self, table: &StatusTable) -> Option<QubitId> {
        if self.is_empty() {
            return None;
        }
        let id = self.head;
        let next = table.link(id);
        self.head = next;
        if next == TERMINATOR {
            self.tail = TERMINATOR;
        }
        Some(QubitId(id))
    }

    /// Move every member of `other` to the back of this list, leaving
    /// `other` empty.
    pub(crate) fn splice_all_from(&mut self, other: &mut FreeList, table: &mut StatusTable) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = *other;
        } else {
            table.set_link(self.tail, other.head);
            self.tail = other.tail;
        }
        *other = Self::new();
    }

    /// Walk the members front to back.
    ///
    /// Traversal stops at the first link that is not a valid index, so a
    /// corrupted list terminates instead of reading garbage. Callers that
    /// need cycle detection bound the walk with `take`.
    pub fn iter<'a>(&self, table: &'a StatusTable) -> Iter<'a> {
        Iter {
            next: self.head,
            table,
        }
    }
}

impl Default for FreeList {
    fn default() -> Self {
        Self::new()
    }
}

/// Front-to-back iterator over a [`FreeList`].
pub struct Iter<'a> {
    next: u32,
    table: &'a StatusTable,
}

impl Iterator for Iter<'_> {
    type Item = QubitId;

    fn next(&mut self) -> Option<QubitId> {
        if self.next >= self.table.capacity() {
            return None;
        }
        let id = self.next;
        self.next = self.table.link(id);
        Some(QubitId(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(capacity: u32) -> StatusTable {
        let mut table = StatusTable::new();
        table.grow_to(capacity);
        table
    }

    fn ids(list: &FreeList, table: &StatusTable) -> Vec<u32> {
        list.iter(table).map(|id| id.0).collect()
    }

    #[test]
    fn from_range_links_ascending() {
        let mut t = table(6);
        let list = FreeList::from_range(2..6, &mut t);
        assert_eq!(ids(&list, &t), vec![2, 3, 4, 5]);
        assert_eq!(list.head(), Some(QubitId(2)));
        assert_eq!(list.tail(), Some(QubitId(5)));
    }

    #[test]
    fn empty_range_gives_empty_list() {
        let mut t = table(3);
        let list = FreeList::from_range(3..3, &mut t);
        assert!(list.is_empty());
        assert_eq!(list.head(), None);
        assert_eq!(list.tail(), None);
    }

    #[test]
    fn push_front_and_back() {
        let mut t = table(4);
        let mut list = FreeList::new();
        list.push(QubitId(1), true, &mut t);
        list.push(QubitId(2), false, &mut t);
        list.push(QubitId(0), true, &mut t);
        list.push(QubitId(3), false, &mut t);
        assert_eq!(ids(&list, &t), vec![0, 1, 2, 3]);
        assert_eq!(list.tail(), Some(QubitId(3)));
    }

    #[test]
    fn pop_front_drains_in_order() {
        let mut t = table(3);
        let mut list = FreeList::from_range(0..3, &mut t);
        assert_eq!(list.pop_front(&t), Some(QubitId(0)));
        assert_eq!(list.pop_front(&t), Some(QubitId(1)));
        assert_eq!(list.pop_front(&t), Some(QubitId(2)));
        assert_eq!(list.pop_front(&t), None);
        assert!(list.is_empty());
        assert_eq!(list.tail(), None);
    }

    #[test]
    fn push_after_drain_resets_tail() {
        let mut t = table(2);
        let mut list = FreeList::from_range(0..1, &mut t);
        list.pop_front(&t);
        list.push(QubitId(1), false, &mut t);
        assert_eq!(ids(&list, &t), vec![1]);
        assert_eq!(list.head(), list.tail());
    }

    #[test]
    fn splice_appends_and_clears_source() {
        let mut t = table(6);
        let mut a = FreeList::from_range(0..3, &mut t);
        let mut b = FreeList::from_range(3..6, &mut t);
        a.splice_all_from(&mut b, &mut t);
        assert_eq!(ids(&a, &t), vec![0, 1, 2, 3, 4, 5]);
        assert!(b.is_empty());
        assert_eq!(a.tail(), Some(QubitId(5)));
    }

    #[test]
    fn splice_into_empty_adopts_source() {
        let mut t = table(3);
        let mut a = FreeList::new();
        let mut b = FreeList::from_range(0..3, &mut t);
        a.splice_all_from(&mut b, &mut t);
        assert_eq!(ids(&a, &t), vec![0, 1, 2]);
        assert!(b.is_empty());
    }

    #[test]
    fn splice_from_empty_is_noop() {
        let mut t = table(2);
        let mut a = FreeList::from_range(0..2, &mut t);
        let mut b = FreeList::new();
        a.splice_all_from(&mut b, &mut t);
        assert_eq!(ids(&a, &t), vec![0, 1]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::VecDeque;

        proptest! {
            #[test]
            fn pushes_match_deque(fronts in proptest::collection::vec(any::<bool>(), 1..32)) {
                let mut t = table(fronts.len() as u32);
                let mut list = FreeList::new();
                let mut model = VecDeque::new();
                for (i, &front) in fronts.iter().enumerate() {
                    list.push(QubitId(i as u32), front, &mut t);
                    if front {
                        model.push_front(i as u32);
                    } else {
                        model.push_back(i as u32);
                    }
                }
                prop_assert_eq!(ids(&list, &t), model.iter().copied().collect::<Vec<_>>());
                prop_assert_eq!(list.tail().map(|id| id.0), model.back().copied());
            }
        }
    }
}
