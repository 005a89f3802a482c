//! Test utilities and mock types for qalloc development.
//!
//! Provides an invariant [`audit`] that re-derives a manager's state from
//! its status table, a [`ReferenceModel`] with the same observable
//! behaviour built from plain deques, handle mappers richer than the
//! identity mapping ([`RegistryMapper`], [`TaggedMapper`]), and
//! [`fixtures`] for common manager setups.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod audit;
pub mod fixtures;
pub mod model;

pub use audit::{audit, AuditError, AuditReport};
pub use model::{ModelOp, ReferenceModel};

use indexmap::IndexMap;
use qalloc_core::{QubitId, QubitMapper};

/// Opaque handle issued by [`RegistryMapper`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OpaqueHandle(pub u64);

/// Mapper that issues never-repeating opaque handles.
///
/// Keeps a registry of live handles in issue order. Released handles are
/// retired, so using one again is reported as an unknown handle even
/// after its id has been reallocated under a new handle.
#[derive(Debug, Default)]
pub struct RegistryMapper {
    live: IndexMap<OpaqueHandle, QubitId>,
    next: u64,
}

impl RegistryMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles currently live.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Live handles, oldest first.
    pub fn live_handles(&self) -> impl Iterator<Item = (&OpaqueHandle, &QubitId)> {
        self.live.iter()
    }
}

impl QubitMapper for RegistryMapper {
    type Handle = OpaqueHandle;

    fn create_handle(&mut self, id: QubitId) -> OpaqueHandle {
        let handle = OpaqueHandle(self.next);
        self.next += 1;
        self.live.insert(handle, id);
        handle
    }

    fn handle_to_id(&self, handle: &OpaqueHandle) -> Option<QubitId> {
        self.live.get(handle).copied()
    }

    fn retire_handle(&mut self, handle: &OpaqueHandle) {
        self.live.shift_remove(handle);
    }
}

/// Handle carrying the id plus the tag of the mapper that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaggedQubit {
    pub id: QubitId,
    pub tag: u32,
}

/// Stateless mapper whose handles only translate back under the same tag.
///
/// Models an embedding runtime that runs several managers and must reject
/// handles that belong to a different one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaggedMapper {
    pub tag: u32,
}

impl TaggedMapper {
    pub fn new(tag: u32) -> Self {
        Self { tag }
    }
}

impl QubitMapper for TaggedMapper {
    type Handle = TaggedQubit;

    fn create_handle(&mut self, id: QubitId) -> TaggedQubit {
        TaggedQubit { id, tag: self.tag }
    }

    fn handle_to_id(&self, handle: &TaggedQubit) -> Option<QubitId> {
        (handle.tag == self.tag).then_some(handle.id)
    }
}
