//! Qubit id allocation with restricted reuse areas.
//!
//! A [`QubitManager`] hands out small integer ids, tracks which are free,
//! allocated or disabled, and decides which released ids may be handed
//! out again.
//!
//! # Architecture
//!
//! ```text
//! QubitManager (sole mutator)
//! ├── StatusTable: Vec<u32>, one slot per id
//! │   └── free slots hold the next id of their list
//! ├── AreaStack: SmallVec<[RestrictedReuseArea; 4]>, base at index 0
//! │   └── RestrictedReuseArea
//! │       ├── reuse_allowed: FreeList (head, tail)
//! │       └── reuse_prohibited: FreeList (head, tail)
//! └── allocated / free / disabled counters
//! ```
//!
//! # Restricted reuse
//!
//! Ids released inside an area can be reused within the same segment of
//! that area. Advancing to the next segment freezes them; ending the area
//! hands them to the enclosing area, where they are reusable again.
//!
//! ```rust
//! use qalloc_manager::QubitManager;
//!
//! let mut qm = QubitManager::new(4, false, true);
//! qm.start_restricted_reuse_area();
//! let x = qm.allocate().unwrap();
//! qm.release(&x).unwrap();
//! qm.next_restricted_reuse_segment();
//! assert_ne!(qm.allocate().unwrap(), x);
//! qm.end_restricted_reuse_area().unwrap();
//! assert_eq!(qm.allocate_many(3).unwrap().last(), Some(&x));
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod area;
pub mod config;
pub mod list;
pub mod manager;
pub mod stats;
pub mod status;

pub use area::{AreaStack, RestrictedReuseArea};
pub use config::{CapacityGrowth, ManagerConfig};
pub use list::FreeList;
pub use manager::QubitManager;
pub use stats::ManagerStats;
pub use status::{SlotState, StatusTable};
