//! Generation-checked handle table for manager lifetimes across the C
//! boundary.
//!
//! Destroyed handles carry a stale generation and resolve to `None`
//! instead of reaching freed state; destroying twice is a safe no-op.
//! Vacant entries are chained into an intrusive free list, the same
//! trick the status table uses for qubit ids.

/// Handle encoding: upper 32 bits = entry index, lower 32 bits = generation.
fn encode(index: u32, generation: u32) -> u64 {
    ((index as u64) << 32) | generation as u64
}

fn decode(handle: u64) -> (usize, u32) {
    ((handle >> 32) as usize, handle as u32)
}

enum Entry<T> {
    Occupied { generation: u32, value: T },
    Vacant { generation: u32, next_free: Option<u32> },
    /// Generation exhausted; never reused.
    Retired,
}

/// Maps `u64` handles to owned values.
pub(crate) struct HandleTable<T> {
    entries: Vec<Entry<T>>,
    free_head: Option<u32>,
    len: usize,
}

impl<T> HandleTable<T> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            free_head: None,
            len: 0,
        }
    }

    /// Store `value` and return its handle.
    pub fn insert(&mut self, value: T) -> u64 {
        self.len += 1;
        if let Some(index) = self.free_head {
            let entry = &mut self.entries[index as usize];
            if let Entry::Vacant {
                generation,
                next_free,
            } = *entry
            {
                self.free_head = next_free;
                *entry = Entry::Occupied { generation, value };
                return encode(index, generation);
            }
        }
        let index = self.entries.len() as u32;
        self.entries.push(Entry::Occupied {
            generation: 0,
            value,
        });
        encode(index, 0)
    }

    /// The value behind `handle`, if it is live.
    pub fn get(&self, handle: u64) -> Option<&T> {
        let (index, want) = decode(handle);
        match self.entries.get(index)? {
            Entry::Occupied { generation, value } if *generation == want => Some(value),
            _ => None,
        }
    }

    /// Remove and return the value behind `handle`.
    ///
    /// Bumps the entry's generation so the old handle goes stale. An
    /// entry whose generation would wrap is retired rather than reused.
    pub fn remove(&mut self, handle: u64) -> Option<T> {
        let (index, want) = decode(handle);
        let entry = self.entries.get_mut(index)?;
        match &*entry {
            Entry::Occupied { generation, .. } if *generation == want => {}
            _ => return None,
        }
        let replacement = match want.checked_add(1) {
            Some(generation) => Entry::Vacant {
                generation,
                next_free: self.free_head,
            },
            None => Entry::Retired,
        };
        let old = std::mem::replace(entry, replacement);
        if !matches!(self.entries[index], Entry::Retired) {
            self.free_head = Some(index as u32);
        }
        self.len -= 1;
        match old {
            Entry::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Number of live handles.
    pub fn len(&self) -> usize {
        self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_round_trip() {
        let mut table = HandleTable::new();
        let h = table.insert("a");
        assert_eq!(table.get(h), Some(&"a"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn removed_handle_goes_stale() {
        let mut table = HandleTable::new();
        let h = table.insert(1u8);
        assert_eq!(table.remove(h), Some(1));
        assert_eq!(table.get(h), None);
        assert_eq!(table.remove(h), None);
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn vacant_entries_are_reused_with_new_generation() {
        let mut table = HandleTable::new();
        let a = table.insert(1u8);
        table.remove(a);
        let b = table.insert(2u8);
        assert_ne!(a, b);
        assert_eq!(decode(a).0, decode(b).0);
        assert_eq!(table.get(a), None);
        assert_eq!(table.get(b), Some(&2));
    }

    #[test]
    fn free_entries_chain_lifo() {
        let mut table = HandleTable::new();
        let handles: Vec<u64> = (0..3u8).map(|v| table.insert(v)).collect();
        table.remove(handles[0]);
        table.remove(handles[2]);
        assert_eq!(decode(table.insert(9)).0, 2);
        assert_eq!(decode(table.insert(9)).0, 0);
        assert_eq!(decode(table.insert(9)).0, 3);
    }

    #[test]
    fn garbage_handles_resolve_to_none() {
        let table: HandleTable<u8> = HandleTable::new();
        assert_eq!(table.get(u64::MAX), None);
        assert_eq!(table.get(0), None);
    }

    #[test]
    fn exhausted_generation_retires_entry() {
        let mut table = HandleTable::new();
        table.entries.push(Entry::Occupied {
            generation: u32::MAX,
            value: 5u8,
        });
        table.len = 1;
        let h = encode(0, u32::MAX);
        assert_eq!(table.remove(h), Some(5));
        assert!(matches!(table.entries[0], Entry::Retired));
        assert_eq!(decode(table.insert(6)).0, 1);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::HashMap;

        #[derive(Clone, Debug)]
        enum Op {
            Insert(u32),
            Remove(usize),
            RemoveStale(usize),
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                3 => any::<u32>().prop_map(Op::Insert),
                2 => any::<usize>().prop_map(Op::Remove),
                1 => any::<usize>().prop_map(Op::RemoveStale),
            ]
        }

        proptest! {
            #[test]
            fn table_matches_map_model(ops in prop::collection::vec(op_strategy(), 0..200)) {
                let mut table = HandleTable::new();
                let mut live: HashMap<u64, u32> = HashMap::new();
                let mut order: Vec<u64> = Vec::new();
                let mut stale: Vec<u64> = Vec::new();
                for op in ops {
                    match op {
                        Op::Insert(v) => {
                            let h = table.insert(v);
                            prop_assert!(!live.contains_key(&h));
                            prop_assert!(!stale.contains(&h));
                            live.insert(h, v);
                            order.push(h);
                        }
                        Op::Remove(i) if !order.is_empty() => {
                            let h = order.swap_remove(i % order.len());
                            prop_assert_eq!(table.remove(h), live.remove(&h));
                            stale.push(h);
                        }
                        Op::RemoveStale(i) if !stale.is_empty() => {
                            let h = stale[i % stale.len()];
                            prop_assert_eq!(table.remove(h), None);
                            prop_assert_eq!(table.get(h), None);
                        }
                        _ => {}
                    }
                    prop_assert_eq!(table.len(), live.len());
                    for (h, v) in &live {
                        prop_assert_eq!(table.get(*h), Some(v));
                    }
                }
            }
        }
    }
}
