//! The handle translation extension point.

use crate::id::QubitId;

/// Translates between allocator ids and caller-visible handles.
///
/// Both directions live on one trait so they are always supplied
/// together: every handle produced by [`create_handle`] must translate
/// back to the id it was created for through [`handle_to_id`] for as long
/// as the handle is live.
///
/// [`create_handle`]: QubitMapper::create_handle
/// [`handle_to_id`]: QubitMapper::handle_to_id
pub trait QubitMapper {
    /// The opaque value returned to callers.
    type Handle;

    /// Produce the handle for a freshly allocated id.
    fn create_handle(&mut self, id: QubitId) -> Self::Handle;

    /// Recover the id a handle was created for.
    ///
    /// Returns `None` if the handle was not produced by this mapper or
    /// has been retired.
    fn handle_to_id(&self, handle: &Self::Handle) -> Option<QubitId>;

    /// Called after the id behind `handle` was released.
    ///
    /// Mappers that keep per-handle state drop it here. The default does
    /// nothing.
    fn retire_handle(&mut self, handle: &Self::Handle) {
        let _ = handle;
    }
}

/// The default mapper: the handle is the id itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IdentityMapper;

impl QubitMapper for IdentityMapper {
    type Handle = QubitId;

    fn create_handle(&mut self, id: QubitId) -> QubitId {
        id
    }

    fn handle_to_id(&self, handle: &QubitId) -> Option<QubitId> {
        Some(*handle)
    }
}
