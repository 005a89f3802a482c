//! The qubit manager: allocation, release, disabling and area control.
//!
//! [`QubitManager`] is the only mutator of its [`StatusTable`] and
//! [`AreaStack`]. Every free id lives in exactly one list of exactly one
//! open area; allocated and disabled ids live in none. The three counters
//! are maintained incrementally so that
//! `allocated + free + disabled == capacity` holds after every operation,
//! including failed ones.

use qalloc_core::{IdentityMapper, QubitError, QubitId, QubitMapper};
use tracing::{debug, trace, warn};

use crate::area::{AreaStack, RestrictedReuseArea};
use crate::config::ManagerConfig;
use crate::list::FreeList;
use crate::stats::ManagerStats;
use crate::status::{SlotState, StatusTable};

/// Hands out qubit ids and reuses released ones under restricted reuse
/// areas.
///
/// Generic over the [`QubitMapper`] that turns ids into caller-visible
/// handles; the default hands out the ids themselves.
#[derive(Debug)]
pub struct QubitManager<M: QubitMapper = IdentityMapper> {
    config: ManagerConfig,
    table: StatusTable,
    areas: AreaStack,
    ceiling: u32,
    allocated: u32,
    free: u32,
    disabled: u32,
    mapper: M,
}

impl QubitManager<IdentityMapper> {
    /// Create a manager with `initial_capacity` ids.
    ///
    /// A non-positive capacity is replaced by
    /// [`FALLBACK_CAPACITY`](qalloc_core::FALLBACK_CAPACITY).
    pub fn new(initial_capacity: i32, may_extend_capacity: bool, encourage_reuse: bool) -> Self {
        Self::with_config(
            ManagerConfig::new(initial_capacity)
                .with_may_extend_capacity(may_extend_capacity)
                .with_encourage_reuse(encourage_reuse),
        )
    }

    /// Create a manager from a full configuration.
    pub fn with_config(config: ManagerConfig) -> Self {
        Self::with_mapper(config, IdentityMapper)
    }
}

impl<M: QubitMapper> QubitManager<M> {
    /// Create a manager that issues handles through `mapper`.
    pub fn with_mapper(config: ManagerConfig, mapper: M) -> Self {
        let capacity = config.effective_initial_capacity();
        if config.initial_capacity <= 0 {
            warn!(
                requested = config.initial_capacity,
                fallback = capacity,
                "non-positive initial qubit capacity, using fallback"
            );
        }

        let mut table = StatusTable::new();
        let fresh = table.grow_to(capacity);
        let base = RestrictedReuseArea::with_free(FreeList::from_range(fresh, &mut table));

        Self {
            ceiling: config.capacity_ceiling(),
            config,
            table,
            areas: AreaStack::new(base),
            allocated: 0,
            free: capacity,
            disabled: 0,
            mapper,
        }
    }

    // ── Restricted reuse areas ─────────────────────────────────────

    /// Open a nested restricted reuse area.
    ///
    /// Moves no ids; ids released from now on go to the new area.
    pub fn start_restricted_reuse_area(&mut self) {
        self.areas.push_back(RestrictedReuseArea::new());
        debug!(depth = self.areas.count(), "started restricted reuse area");
    }

    /// Close the current segment of the innermost area.
    ///
    /// Every id released in the area so far becomes unreusable until the
    /// area ends.
    pub fn next_restricted_reuse_segment(&mut self) {
        let area = self.areas.peek_back();
        area.reuse_prohibited
            .splice_all_from(&mut area.reuse_allowed, &mut self.table);
        debug!(depth = self.areas.count(), "advanced restricted reuse segment");
    }

    /// Close the innermost area and hand everything it freed to its parent.
    ///
    /// Returns `Err(QubitError::EmptyAreaStack)` if only the base area is
    /// open; nothing changes in that case.
    pub fn end_restricted_reuse_area(&mut self) -> Result<(), QubitError> {
        let mut ended = self.areas.pop_back().inspect_err(|_| {
            warn!("end_restricted_reuse_area called without a matching start");
        })?;
        ended
            .reuse_allowed
            .splice_all_from(&mut ended.reuse_prohibited, &mut self.table);
        self.areas
            .peek_back()
            .reuse_allowed
            .splice_all_from(&mut ended.reuse_allowed, &mut self.table);
        debug!(depth = self.areas.count(), "ended restricted reuse area");
        Ok(())
    }

    // ── Allocation ─────────────────────────────────────────────────

    /// Allocate one qubit, growing capacity if needed and permitted.
    ///
    /// Cost is proportional to the number of open areas.
    pub fn allocate(&mut self) -> Result<M::Handle, QubitError> {
        let id = self.allocate_qubit_id()?;
        Ok(self.mapper.create_handle(id))
    }

    /// Allocate `count` qubits, or none at all.
    ///
    /// Feasibility is established before anything is mutated, so on
    /// `Err(QubitError::CapacityExhausted)` the manager is untouched.
    pub fn allocate_many(&mut self, count: usize) -> Result<Vec<M::Handle>, QubitError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let available = self.available_up_to(count);
        if available < count {
            let err = QubitError::CapacityExhausted {
                requested: u32::try_from(count).unwrap_or(u32::MAX),
                available: available as u32,
            };
            warn!(%err, "batch allocation refused");
            return Err(err);
        }

        let mut handles = Vec::with_capacity(count);
        for _ in 0..count {
            let id = self.allocate_qubit_id()?;
            handles.push(self.mapper.create_handle(id));
        }
        Ok(handles)
    }

    /// Alias for [`allocate`](Self::allocate); borrowing is not refcounted.
    pub fn borrow(&mut self) -> Result<M::Handle, QubitError> {
        self.allocate()
    }

    /// Alias for [`allocate_many`](Self::allocate_many).
    pub fn borrow_many(&mut self, count: usize) -> Result<Vec<M::Handle>, QubitError> {
        self.allocate_many(count)
    }

    /// Grow the status table to at least `requested_capacity` slots.
    ///
    /// Fails with `CapacityExhausted` if growth is not permitted or would
    /// pass the capacity ceiling; nothing is mutated in that case.
    pub fn ensure_capacity(&mut self, requested_capacity: u32) -> Result<(), QubitError> {
        let capacity = self.capacity();
        if requested_capacity <= capacity {
            return Ok(());
        }
        if !self.config.may_extend_capacity || requested_capacity > self.ceiling {
            let err = QubitError::CapacityExhausted {
                requested: requested_capacity - capacity,
                available: self.headroom(),
            };
            warn!(capacity, requested_capacity, %err, "capacity extension refused");
            return Err(err);
        }
        self.grow_to(requested_capacity);
        Ok(())
    }

    fn allocate_qubit_id(&mut self) -> Result<QubitId, QubitError> {
        let id = match self.take_reusable() {
            Some(id) => id,
            None => self.take_fresh()?,
        };
        self.table.mark_allocated(id);
        self.free -= 1;
        self.allocated += 1;
        trace!(%id, "allocated qubit");
        Ok(id)
    }

    /// Pop from the first non-empty reuse-allowed list, innermost first
    /// when reuse is encouraged and outermost first otherwise.
    ///
    /// Reuse-prohibited lists are never consulted.
    fn take_reusable(&mut self) -> Option<QubitId> {
        let table = &self.table;
        if self.config.encourage_reuse {
            self.areas
                .iter_mut()
                .rev()
                .find_map(|area| area.reuse_allowed.pop_front(table))
        } else {
            self.areas
                .iter_mut()
                .find_map(|area| area.reuse_allowed.pop_front(table))
        }
    }

    /// Grow by one policy step and pop a newly created id.
    fn take_fresh(&mut self) -> Result<QubitId, QubitError> {
        let next = if self.config.may_extend_capacity {
            self.config.growth.next_capacity(self.capacity(), self.ceiling)
        } else {
            None
        };
        let Some(next) = next else {
            let err = QubitError::CapacityExhausted {
                requested: 1,
                available: 0,
            };
            warn!(capacity = self.capacity(), %err, "qubit allocation failed");
            return Err(err);
        };
        self.grow_to(next);
        // Every other list was empty, so the base list now holds only the
        // ids just created.
        self.areas
            .base_mut()
            .reuse_allowed
            .pop_front(&self.table)
            .ok_or(QubitError::CapacityExhausted {
                requested: 1,
                available: 0,
            })
    }

    fn grow_to(&mut self, new_capacity: u32) {
        let old_capacity = self.capacity();
        let created = self.table.grow_to(new_capacity);
        let added = created.len() as u32;
        let mut fresh = FreeList::from_range(created, &mut self.table);
        self.areas
            .base_mut()
            .reuse_allowed
            .splice_all_from(&mut fresh, &mut self.table);
        self.free += added;
        debug!(old_capacity, new_capacity, "extended qubit capacity");
    }

    /// Ids obtainable right now, counted up to `limit`.
    ///
    /// Walks reuse-allowed lists only as far as needed, so the cost is
    /// bounded by `limit` plus the number of open areas.
    fn available_up_to(&self, limit: usize) -> usize {
        let reusable = self
            .areas
            .iter()
            .flat_map(|area| area.reuse_allowed.iter(&self.table))
            .take(limit)
            .count();
        reusable.saturating_add(self.headroom() as usize)
    }

    fn headroom(&self) -> u32 {
        if self.config.may_extend_capacity {
            self.ceiling - self.capacity()
        } else {
            0
        }
    }

    // ── Release ────────────────────────────────────────────────────

    /// Release an allocated qubit into the innermost area.
    ///
    /// Fails with an invalid-operation error if the handle is unknown,
    /// or the id is out of range, disabled, or not allocated.
    pub fn release(&mut self, handle: &M::Handle) -> Result<(), QubitError> {
        let id = self.resolve(handle)?;
        self.release_qubit_id(id)?;
        self.mapper.retire_handle(handle);
        Ok(())
    }

    /// Release each handle in order, stopping at the first failure.
    ///
    /// Handles before the failing one stay released.
    pub fn release_many(&mut self, handles: &[M::Handle]) -> Result<(), QubitError> {
        handles.iter().try_for_each(|handle| self.release(handle))
    }

    /// Alias for [`release`](Self::release).
    pub fn return_qubit(&mut self, handle: &M::Handle) -> Result<(), QubitError> {
        self.release(handle)
    }

    /// Alias for [`release_many`](Self::release_many).
    pub fn return_many(&mut self, handles: &[M::Handle]) -> Result<(), QubitError> {
        self.release_many(handles)
    }

    fn release_qubit_id(&mut self, id: QubitId) -> Result<(), QubitError> {
        self.expect_allocated(id)?;
        let to_front = self.config.encourage_reuse;
        self.areas
            .peek_back()
            .reuse_allowed
            .push(id, to_front, &mut self.table);
        self.allocated -= 1;
        self.free += 1;
        trace!(%id, "released qubit");
        Ok(())
    }

    // ── Disabling ──────────────────────────────────────────────────

    /// Permanently retire an allocated qubit.
    ///
    /// Only allocated ids can be disabled: a free id's slot carries a
    /// list link, and overwriting it would cut the list. Disabled ids are
    /// never handed out again.
    pub fn disable(&mut self, handle: &M::Handle) -> Result<(), QubitError> {
        let id = self.resolve(handle)?;
        self.expect_allocated(id)?;
        self.table.mark_disabled(id);
        self.allocated -= 1;
        self.disabled += 1;
        debug!(%id, "disabled qubit");
        Ok(())
    }

    /// Disable each handle in order, stopping at the first failure.
    pub fn disable_many(&mut self, handles: &[M::Handle]) -> Result<(), QubitError> {
        handles.iter().try_for_each(|handle| self.disable(handle))
    }

    fn expect_allocated(&self, id: QubitId) -> Result<(), QubitError> {
        if !self.table.contains(id) {
            return Err(QubitError::OutOfRange {
                id,
                capacity: self.capacity(),
            });
        }
        match self.table.state(id) {
            Some(SlotState::Allocated) => Ok(()),
            Some(SlotState::Disabled) => Err(QubitError::AlreadyDisabled { id }),
            _ => Err(QubitError::NotAllocated { id }),
        }
    }

    fn resolve(&self, handle: &M::Handle) -> Result<QubitId, QubitError> {
        self.mapper
            .handle_to_id(handle)
            .ok_or(QubitError::UnknownHandle)
    }

    // ── Queries ────────────────────────────────────────────────────

    /// Whether the handle names an in-range, non-disabled id.
    pub fn is_valid(&self, handle: &M::Handle) -> bool {
        self.handle_state(handle)
            .is_some_and(|state| state != SlotState::Disabled)
    }

    /// Whether the handle names a disabled id.
    pub fn is_disabled(&self, handle: &M::Handle) -> bool {
        self.handle_state(handle) == Some(SlotState::Disabled)
    }

    /// Whether the handle names a free id (reusable or not).
    pub fn is_free(&self, handle: &M::Handle) -> bool {
        self.handle_state(handle).is_some_and(SlotState::is_free)
    }

    fn handle_state(&self, handle: &M::Handle) -> Option<SlotState> {
        let id = self.mapper.handle_to_id(handle)?;
        self.table.state(id)
    }

    /// Decoded state of a raw id, or `None` if out of range.
    pub fn status(&self, id: QubitId) -> Option<SlotState> {
        self.table.state(id)
    }

    /// Number of disabled ids.
    pub fn disabled_qubit_count(&self) -> u32 {
        self.disabled
    }

    /// Number of allocated ids.
    pub fn allocated_qubit_count(&self) -> u32 {
        self.allocated
    }

    /// Number of free ids, including those frozen in reuse-prohibited
    /// lists.
    pub fn free_qubit_count(&self) -> u32 {
        self.free
    }

    /// Number of free ids allocation may hand out without growing.
    ///
    /// Walks every reuse-allowed list.
    pub fn reusable_qubit_count(&self) -> u32 {
        self.areas
            .iter()
            .map(|area| area.reuse_allowed.iter(&self.table).count() as u32)
            .sum()
    }

    /// Current number of slots.
    pub fn capacity(&self) -> u32 {
        self.table.capacity()
    }

    /// Number of open areas, including the base.
    pub fn area_depth(&self) -> usize {
        self.areas.count()
    }

    /// Whether allocation may grow the table.
    pub fn may_extend_capacity(&self) -> bool {
        self.config.may_extend_capacity
    }

    /// Whether the most recently released ids are preferred.
    pub fn encourage_reuse(&self) -> bool {
        self.config.encourage_reuse
    }

    /// Point-in-time counters.
    ///
    /// Splitting free ids into reusable and prohibited walks every
    /// reuse-allowed list, so this costs O(free ids), unlike the O(1)
    /// counter getters.
    pub fn stats(&self) -> ManagerStats {
        let reusable = self.reusable_qubit_count();
        ManagerStats {
            capacity: self.capacity(),
            allocated: self.allocated,
            free: self.free,
            disabled: self.disabled,
            reusable,
            prohibited: self.free - reusable,
            area_depth: self.areas.count(),
        }
    }

    /// The configuration the manager was built with.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// The handle mapper.
    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    /// Read-only view of the status table.
    pub fn status_table(&self) -> &StatusTable {
        &self.table
    }

    /// Read-only view of the open areas, base first.
    pub fn areas(&self) -> &AreaStack {
        &self.areas
    }
}
