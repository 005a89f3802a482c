//! Restricted reuse areas and the stack of currently open areas.
//!
//! An area splits its lifetime into segments. Ids released during the
//! current segment sit in `reuse_allowed`; advancing to the next segment
//! moves them into `reuse_prohibited`, where they stay until the area
//! ends and its contents are handed to the enclosing area.

use qalloc_core::QubitError;
use smallvec::SmallVec;

use crate::list::FreeList;

/// The pair of free lists owned by one open area.
///
/// Holds no logic of its own; transitions are driven by the manager.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RestrictedReuseArea {
    pub(crate) reuse_allowed: FreeList,
    pub(crate) reuse_prohibited: FreeList,
}

impl RestrictedReuseArea {
    /// An area with both lists empty.
    pub const fn new() -> Self {
        Self {
            reuse_allowed: FreeList::new(),
            reuse_prohibited: FreeList::new(),
        }
    }

    /// An area whose reuse-allowed list starts as `free`.
    pub fn with_free(free: FreeList) -> Self {
        Self {
            reuse_allowed: free,
            reuse_prohibited: FreeList::new(),
        }
    }

    /// Ids released in the current segment, reusable now.
    pub fn reuse_allowed(&self) -> &FreeList {
        &self.reuse_allowed
    }

    /// Ids released in earlier segments, frozen until the area ends.
    pub fn reuse_prohibited(&self) -> &FreeList {
        &self.reuse_prohibited
    }
}

/// Stack of open areas; index 0 is the base area and is never removed.
///
/// Areas are pushed and popped only at the back, but the manager walks
/// the whole stack when searching for a reusable id, so iteration in both
/// directions is exposed.
#[derive(Clone, Debug)]
pub struct AreaStack {
    areas: SmallVec<[RestrictedReuseArea; 4]>,
}

impl AreaStack {
    /// Create a stack holding only `base`.
    pub fn new(base: RestrictedReuseArea) -> Self {
        let mut areas = SmallVec::new();
        areas.push(base);
        Self { areas }
    }

    /// Open a nested area.
    pub fn push_back(&mut self, area: RestrictedReuseArea) {
        self.areas.push(area);
    }

    /// Remove the innermost area.
    ///
    /// Returns `Err(QubitError::EmptyAreaStack)` if only the base remains.
    pub fn pop_back(&mut self) -> Result<RestrictedReuseArea, QubitError> {
        if self.areas.len() <= 1 {
            return Err(QubitError::EmptyAreaStack);
        }
        self.areas.pop().ok_or(QubitError::EmptyAreaStack)
    }

    /// The innermost area.
    pub fn peek_back(&mut self) -> &mut RestrictedReuseArea {
        self.areas
            .last_mut()
            .expect("area stack always holds the base area")
    }

    /// The base area, which owns freshly created ids.
    pub fn base_mut(&mut self) -> &mut RestrictedReuseArea {
        &mut self.areas[0]
    }

    /// Number of open areas, including the base.
    pub fn count(&self) -> usize {
        self.areas.len()
    }

    /// Areas from the base (outermost) to the innermost.
    pub fn iter(&self) -> std::slice::Iter<'_, RestrictedReuseArea> {
        self.areas.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, RestrictedReuseArea> {
        self.areas.iter_mut()
    }
}
