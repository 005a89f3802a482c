//! Manager lifecycle and qubit operations over the C boundary.
//!
//! Each manager sits behind its own `Arc<Mutex<_>>` so the global table
//! lock is only held for handle lookup. Qubit ids cross the boundary as
//! `int32_t`; a negative id is rejected as an invalid operation.

use std::sync::{Arc, Mutex};

use qalloc_core::QubitId;
use qalloc_manager::QubitManager;

use crate::handle::HandleTable;
use crate::status::QallocStatus;

type ManagerArc = Arc<Mutex<QubitManager>>;

static MANAGERS: Mutex<HandleTable<ManagerArc>> = Mutex::new(HandleTable::new());

/// Occupancy counters for one manager.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QallocCounts {
    /// Number of ids the status table currently tracks.
    pub capacity: u32,
    /// Ids currently handed out.
    pub allocated: u32,
    /// Ids on any free list, reusable or not.
    pub free: u32,
    /// Ids retired permanently.
    pub disabled: u32,
    /// Depth of the restricted reuse area stack, base included.
    pub area_depth: u32,
}

/// Clone the Arc for a manager handle, briefly locking the global table.
fn get_manager(handle: u64) -> Option<ManagerArc> {
    MANAGERS.lock().ok()?.get(handle).cloned()
}

fn to_qubit_id(raw: i32) -> Option<QubitId> {
    u32::try_from(raw)
        .ok()
        .map(QubitId)
        .filter(|id| id.is_representable())
}

fn to_raw(id: QubitId) -> i32 {
    // Capacity never exceeds i32::MAX, so every handed-out id fits.
    id.0 as i32
}

/// Read `count` ids from a caller buffer, rejecting negative entries.
#[allow(unsafe_code)]
fn read_ids(ids: *const i32, count: usize) -> Result<Vec<QubitId>, QallocStatus> {
    if count == 0 {
        return Ok(Vec::new());
    }
    if ids.is_null() {
        return Err(QallocStatus::InvalidArgument);
    }
    // SAFETY: ids points to count valid i32 values per caller contract.
    let raw = unsafe { std::slice::from_raw_parts(ids, count) };
    raw.iter()
        .map(|&r| to_qubit_id(r).ok_or(QallocStatus::InvalidOperation))
        .collect()
}

/// Create a qubit manager.
///
/// A non-positive `initial_capacity` falls back to a small default. On
/// success, writes the manager handle to `manager_out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn qalloc_manager_create(
    initial_capacity: i32,
    may_extend_capacity: bool,
    encourage_reuse: bool,
    manager_out: *mut u64,
) -> i32 {
    ffi_guard!({
        if manager_out.is_null() {
            return QallocStatus::InvalidArgument as i32;
        }
        let manager = QubitManager::new(initial_capacity, may_extend_capacity, encourage_reuse);
        let handle = ffi_lock!(MANAGERS).insert(Arc::new(Mutex::new(manager)));
        // SAFETY: manager_out is valid per caller contract.
        unsafe { *manager_out = handle };
        QallocStatus::Ok as i32
    })
}

/// Destroy a manager. Destroying a stale handle returns `InvalidHandle`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn qalloc_manager_destroy(manager: u64) -> i32 {
    ffi_guard!({
        match ffi_lock!(MANAGERS).remove(manager) {
            Some(_) => QallocStatus::Ok as i32,
            None => QallocStatus::InvalidHandle as i32,
        }
    })
}

/// Number of live manager handles.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn qalloc_manager_live_count(count_out: *mut usize) -> i32 {
    ffi_guard!({
        if count_out.is_null() {
            return QallocStatus::InvalidArgument as i32;
        }
        let live = ffi_lock!(MANAGERS).len();
        // SAFETY: count_out is valid per caller contract.
        unsafe { *count_out = live };
        QallocStatus::Ok as i32
    })
}

/// Open a new restricted reuse area.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn qalloc_start_area(manager: u64) -> i32 {
    ffi_guard!({
        let Some(arc) = get_manager(manager) else {
            return QallocStatus::InvalidHandle as i32;
        };
        ffi_lock!(arc).start_restricted_reuse_area();
        QallocStatus::Ok as i32
    })
}

/// Freeze the innermost area's free ids and start a new segment.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn qalloc_next_segment(manager: u64) -> i32 {
    ffi_guard!({
        let Some(arc) = get_manager(manager) else {
            return QallocStatus::InvalidHandle as i32;
        };
        ffi_lock!(arc).next_restricted_reuse_segment();
        QallocStatus::Ok as i32
    })
}

/// Close the innermost area, handing its free ids to the enclosing one.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn qalloc_end_area(manager: u64) -> i32 {
    ffi_guard!({
        let Some(arc) = get_manager(manager) else {
            return QallocStatus::InvalidHandle as i32;
        };
        let result = ffi_lock!(arc).end_restricted_reuse_area();
        QallocStatus::from(result) as i32
    })
}

/// Allocate one qubit id and write it to `id_out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn qalloc_allocate(manager: u64, id_out: *mut i32) -> i32 {
    ffi_guard!({
        if id_out.is_null() {
            return QallocStatus::InvalidArgument as i32;
        }
        let Some(arc) = get_manager(manager) else {
            return QallocStatus::InvalidHandle as i32;
        };
        let code = match ffi_lock!(arc).allocate() {
            Ok(id) => {
                // SAFETY: id_out is valid per caller contract.
                unsafe { *id_out = to_raw(id) };
                QallocStatus::Ok as i32
            }
            Err(e) => QallocStatus::from(&e) as i32,
        };
        code
    })
}

/// Allocate `count` ids into `ids_out`, all or nothing.
///
/// `ids_out` must hold at least `count` entries. On failure nothing is
/// written and the manager is unchanged.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn qalloc_allocate_many(manager: u64, ids_out: *mut i32, count: usize) -> i32 {
    ffi_guard!({
        if count > 0 && ids_out.is_null() {
            return QallocStatus::InvalidArgument as i32;
        }
        let Some(arc) = get_manager(manager) else {
            return QallocStatus::InvalidHandle as i32;
        };
        let ids = match ffi_lock!(arc).allocate_many(count) {
            Ok(ids) => ids,
            Err(e) => return QallocStatus::from(&e) as i32,
        };
        for (i, id) in ids.into_iter().enumerate() {
            // SAFETY: ids_out points to at least count writable i32 values.
            unsafe { *ids_out.add(i) = to_raw(id) };
        }
        QallocStatus::Ok as i32
    })
}

/// Release one allocated id into the innermost area.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn qalloc_release(manager: u64, id: i32) -> i32 {
    ffi_guard!({
        let Some(id) = to_qubit_id(id) else {
            return QallocStatus::InvalidOperation as i32;
        };
        let Some(arc) = get_manager(manager) else {
            return QallocStatus::InvalidHandle as i32;
        };
        let result = ffi_lock!(arc).release(&id);
        QallocStatus::from(result) as i32
    })
}

/// Release `count` ids in order, stopping at the first failure.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn qalloc_release_many(manager: u64, ids: *const i32, count: usize) -> i32 {
    ffi_guard!({
        let ids = match read_ids(ids, count) {
            Ok(ids) => ids,
            Err(status) => return status as i32,
        };
        let Some(arc) = get_manager(manager) else {
            return QallocStatus::InvalidHandle as i32;
        };
        let result = ffi_lock!(arc).release_many(&ids);
        QallocStatus::from(result) as i32
    })
}

/// Permanently retire one allocated id.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn qalloc_disable(manager: u64, id: i32) -> i32 {
    ffi_guard!({
        let Some(id) = to_qubit_id(id) else {
            return QallocStatus::InvalidOperation as i32;
        };
        let Some(arc) = get_manager(manager) else {
            return QallocStatus::InvalidHandle as i32;
        };
        let result = ffi_lock!(arc).disable(&id);
        QallocStatus::from(result) as i32
    })
}

/// Disable `count` ids in order, stopping at the first failure.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn qalloc_disable_many(manager: u64, ids: *const i32, count: usize) -> i32 {
    ffi_guard!({
        let ids = match read_ids(ids, count) {
            Ok(ids) => ids,
            Err(status) => return status as i32,
        };
        let Some(arc) = get_manager(manager) else {
            return QallocStatus::InvalidHandle as i32;
        };
        let result = ffi_lock!(arc).disable_many(&ids);
        QallocStatus::from(result) as i32
    })
}

/// Shared body of the boolean queries.
#[allow(unsafe_code)]
fn query(manager: u64, id: i32, out: *mut bool, f: fn(&QubitManager, &QubitId) -> bool) -> i32 {
    if out.is_null() {
        return QallocStatus::InvalidArgument as i32;
    }
    let Some(arc) = get_manager(manager) else {
        return QallocStatus::InvalidHandle as i32;
    };
    let answer = match to_qubit_id(id) {
        Some(id) => {
            let manager = ffi_lock!(arc);
            f(&manager, &id)
        }
        None => false,
    };
    // SAFETY: out is valid per caller contract.
    unsafe { *out = answer };
    QallocStatus::Ok as i32
}

/// Whether `id` is in range and not disabled.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn qalloc_is_valid(manager: u64, id: i32, valid_out: *mut bool) -> i32 {
    ffi_guard!({ query(manager, id, valid_out, QubitManager::is_valid) })
}

/// Whether `id` is disabled.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn qalloc_is_disabled(manager: u64, id: i32, disabled_out: *mut bool) -> i32 {
    ffi_guard!({ query(manager, id, disabled_out, QubitManager::is_disabled) })
}

/// Whether `id` sits on a free list.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn qalloc_is_free(manager: u64, id: i32, free_out: *mut bool) -> i32 {
    ffi_guard!({ query(manager, id, free_out, QubitManager::is_free) })
}

/// Write the manager's occupancy counters to `counts_out`.
///
/// Costs O(free ids): the reusable/prohibited split behind the counters
/// walks every reuse-allowed list.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn qalloc_counts(manager: u64, counts_out: *mut QallocCounts) -> i32 {
    ffi_guard!({
        if counts_out.is_null() {
            return QallocStatus::InvalidArgument as i32;
        }
        let Some(arc) = get_manager(manager) else {
            return QallocStatus::InvalidHandle as i32;
        };
        let stats = ffi_lock!(arc).stats();
        let counts = QallocCounts {
            capacity: stats.capacity,
            allocated: stats.allocated,
            free: stats.free,
            disabled: stats.disabled,
            area_depth: u32::try_from(stats.area_depth).unwrap_or(u32::MAX),
        };
        // SAFETY: counts_out is valid per caller contract.
        unsafe { *counts_out = counts };
        QallocStatus::Ok as i32
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const OK: i32 = QallocStatus::Ok as i32;

    fn create(capacity: i32, extend: bool, reuse: bool) -> u64 {
        let mut h = 0u64;
        assert_eq!(qalloc_manager_create(capacity, extend, reuse, &mut h), OK);
        h
    }

    fn counts(h: u64) -> QallocCounts {
        let mut c = QallocCounts::default();
        assert_eq!(qalloc_counts(h, &mut c), OK);
        c
    }

    #[test]
    fn create_allocate_release_destroy() {
        let h = create(4, false, true);
        let mut id = -1;
        assert_eq!(qalloc_allocate(h, &mut id), OK);
        assert_eq!(id, 0);
        assert_eq!(counts(h).allocated, 1);
        assert_eq!(qalloc_release(h, id), OK);
        assert_eq!(counts(h).free, 4);
        assert_eq!(qalloc_manager_destroy(h), OK);
        assert_eq!(
            qalloc_manager_destroy(h),
            QallocStatus::InvalidHandle as i32
        );
        assert_eq!(
            qalloc_allocate(h, &mut id),
            QallocStatus::InvalidHandle as i32
        );
    }

    #[test]
    fn null_out_pointers_are_rejected() {
        assert_eq!(
            qalloc_manager_create(4, false, true, std::ptr::null_mut()),
            QallocStatus::InvalidArgument as i32
        );
        let h = create(4, false, true);
        assert_eq!(
            qalloc_allocate(h, std::ptr::null_mut()),
            QallocStatus::InvalidArgument as i32
        );
        assert_eq!(
            qalloc_counts(h, std::ptr::null_mut()),
            QallocStatus::InvalidArgument as i32
        );
        assert_eq!(
            qalloc_manager_live_count(std::ptr::null_mut()),
            QallocStatus::InvalidArgument as i32
        );
        qalloc_manager_destroy(h);
    }

    #[test]
    fn live_count_tracks_create_and_destroy() {
        let h = create(1, false, true);
        let mut live = 0usize;
        assert_eq!(qalloc_manager_live_count(&mut live), OK);
        assert!(live >= 1);
        qalloc_manager_destroy(h);
    }

    #[test]
    fn exhausted_capacity_reports_status() {
        let h = create(1, false, true);
        let mut id = -1;
        assert_eq!(qalloc_allocate(h, &mut id), OK);
        assert_eq!(
            qalloc_allocate(h, &mut id),
            QallocStatus::CapacityExhausted as i32
        );
        qalloc_manager_destroy(h);
    }

    #[test]
    fn allocate_many_is_all_or_nothing() {
        let h = create(3, false, true);
        let mut ids = [-1i32; 4];
        assert_eq!(
            qalloc_allocate_many(h, ids.as_mut_ptr(), 4),
            QallocStatus::CapacityExhausted as i32
        );
        assert_eq!(ids, [-1; 4]);
        assert_eq!(counts(h).allocated, 0);
        assert_eq!(qalloc_allocate_many(h, ids.as_mut_ptr(), 3), OK);
        assert_eq!(&ids[..3], &[0, 1, 2]);
        assert_eq!(qalloc_release_many(h, ids.as_ptr(), 3), OK);
        assert_eq!(counts(h).allocated, 0);
        qalloc_manager_destroy(h);
    }

    #[test]
    fn negative_ids_are_invalid_operations() {
        let h = create(2, false, true);
        assert_eq!(qalloc_release(h, -1), QallocStatus::InvalidOperation as i32);
        assert_eq!(qalloc_disable(h, -7), QallocStatus::InvalidOperation as i32);
        let ids = [0i32, -1];
        assert_eq!(
            qalloc_release_many(h, ids.as_ptr(), 2),
            QallocStatus::InvalidOperation as i32
        );
        let mut valid = true;
        assert_eq!(qalloc_is_valid(h, -1, &mut valid), OK);
        assert!(!valid);
        qalloc_manager_destroy(h);
    }

    #[test]
    fn ids_past_the_capacity_limit_are_rejected() {
        let h = create(2, true, true);
        assert_eq!(
            qalloc_release(h, i32::MAX),
            QallocStatus::InvalidOperation as i32
        );
        assert_eq!(
            qalloc_disable(h, i32::MAX),
            QallocStatus::InvalidOperation as i32
        );
        let mut free = true;
        assert_eq!(qalloc_is_free(h, i32::MAX, &mut free), OK);
        assert!(!free);
        qalloc_manager_destroy(h);
    }

    #[test]
    fn double_release_is_rejected() {
        let h = create(2, false, true);
        let mut id = -1;
        qalloc_allocate(h, &mut id);
        assert_eq!(qalloc_release(h, id), OK);
        assert_eq!(qalloc_release(h, id), QallocStatus::InvalidOperation as i32);
        qalloc_manager_destroy(h);
    }

    #[test]
    fn disable_and_queries() {
        let h = create(2, false, true);
        let mut id = -1;
        qalloc_allocate(h, &mut id);
        assert_eq!(qalloc_disable(h, id), OK);
        let (mut valid, mut disabled, mut free) = (true, false, true);
        assert_eq!(qalloc_is_valid(h, id, &mut valid), OK);
        assert_eq!(qalloc_is_disabled(h, id, &mut disabled), OK);
        assert_eq!(qalloc_is_free(h, id, &mut free), OK);
        assert!(!valid && disabled && !free);
        assert_eq!(qalloc_disable(h, id), QallocStatus::InvalidOperation as i32);
        assert_eq!(counts(h).disabled, 1);
        qalloc_manager_destroy(h);
    }

    #[test]
    fn area_lifecycle_over_ffi() {
        let h = create(2, false, true);
        assert_eq!(qalloc_end_area(h), QallocStatus::EmptyStack as i32);
        let mut id = -1;
        qalloc_allocate(h, &mut id);
        assert_eq!(qalloc_start_area(h), OK);
        assert_eq!(counts(h).area_depth, 2);
        assert_eq!(qalloc_release(h, id), OK);
        assert_eq!(qalloc_next_segment(h), OK);
        let mut next = -1;
        assert_eq!(qalloc_allocate(h, &mut next), OK);
        assert_ne!(next, id);
        assert_eq!(qalloc_end_area(h), OK);
        assert_eq!(counts(h).area_depth, 1);
        qalloc_manager_destroy(h);
    }

    #[test]
    fn empty_batches_accept_null_buffers() {
        let h = create(1, false, true);
        assert_eq!(qalloc_allocate_many(h, std::ptr::null_mut(), 0), OK);
        assert_eq!(qalloc_release_many(h, std::ptr::null(), 0), OK);
        assert_eq!(
            qalloc_disable_many(h, std::ptr::null(), 1),
            QallocStatus::InvalidArgument as i32
        );
        qalloc_manager_destroy(h);
    }
}
