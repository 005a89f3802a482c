//! qalloc: qubit id allocation for quantum program runtimes.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the qalloc sub-crates. For most users, adding `qalloc` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use qalloc::prelude::*;
//!
//! // Two ids, fixed capacity, freed ids reused first.
//! let mut qm = QubitManager::new(2, false, true);
//! let a = qm.allocate().unwrap();
//! qm.release(&a).unwrap();
//!
//! // Ids freed inside a segment are frozen once the next segment starts.
//! qm.start_restricted_reuse_area();
//! let b = qm.allocate().unwrap();
//! assert_eq!(a, b);
//! qm.release(&b).unwrap();
//! qm.next_restricted_reuse_segment();
//! let c = qm.allocate().unwrap();
//! assert_ne!(b, c);
//!
//! // Closing the area hands its frozen ids back to the enclosing one.
//! qm.end_restricted_reuse_area().unwrap();
//! assert!(qm.is_free(&b));
//! assert_eq!(qm.allocate().unwrap(), b);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `qalloc-core` | Qubit ids, errors, the handle mapping trait |
//! | [`manager`] | `qalloc-manager` | Status table, free lists, areas, the manager |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and traits (`qalloc-core`).
///
/// Contains [`types::QubitId`], the [`types::QubitError`] taxonomy and the
/// [`types::QubitMapper`] extension point.
pub use qalloc_core as types;

/// The allocator itself (`qalloc-manager`).
///
/// [`manager::QubitManager`] plus the building blocks it is made of:
/// [`manager::StatusTable`], [`manager::FreeList`] and
/// [`manager::AreaStack`].
pub use qalloc_manager as manager;

/// Common imports for typical qalloc usage.
///
/// ```rust
/// use qalloc::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use qalloc_core::{ErrorKind, IdentityMapper, QubitError, QubitId, QubitMapper};

    // Manager
    pub use qalloc_manager::{CapacityGrowth, ManagerConfig, ManagerStats, QubitManager};
}
