//! Structural invariant checks for a [`QubitManager`].
//!
//! [`audit`] walks every list of every open area and re-derives the
//! manager's counters from the status table alone, so a test can assert
//! that the incremental bookkeeping never drifted.

use std::fmt;

use qalloc_core::{QubitId, QubitMapper};
use qalloc_manager::{FreeList, QubitManager, SlotState};

/// Counters re-derived by [`audit`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AuditReport {
    pub allocated: u32,
    pub free: u32,
    pub disabled: u32,
    pub reusable: u32,
    pub prohibited: u32,
}

/// A broken manager invariant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuditError {
    /// A list links to an id whose slot is not free.
    NonFreeMember { id: QubitId },
    /// An id is reachable from two lists, or twice from one.
    Duplicate { id: QubitId },
    /// A list walk did not end at the recorded tail.
    TailMismatch {
        expected: Option<QubitId>,
        found: Option<QubitId>,
    },
    /// A slot is marked free but no list reaches it.
    Unreachable { id: QubitId },
    /// An incremental counter disagrees with the table.
    Counter {
        name: &'static str,
        recorded: u32,
        derived: u32,
    },
}

impl fmt::Display for AuditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFreeMember { id } => write!(f, "list reaches non-free id {id}"),
            Self::Duplicate { id } => write!(f, "id {id} reachable more than once"),
            Self::TailMismatch { expected, found } => {
                write!(f, "list tail is {expected:?} but walk ended at {found:?}")
            }
            Self::Unreachable { id } => write!(f, "free id {id} is in no list"),
            Self::Counter {
                name,
                recorded,
                derived,
            } => write!(f, "{name} counter is {recorded}, table says {derived}"),
        }
    }
}

impl std::error::Error for AuditError {}

/// Check every structural invariant of `manager`.
pub fn audit<M: QubitMapper>(manager: &QubitManager<M>) -> Result<AuditReport, AuditError> {
    let table = manager.status_table();
    let capacity = table.capacity();
    let mut seen = vec![false; capacity as usize];
    let mut report = AuditReport::default();

    for area in manager.areas().iter() {
        report.reusable += walk(area.reuse_allowed(), manager, &mut seen)?;
        report.prohibited += walk(area.reuse_prohibited(), manager, &mut seen)?;
    }

    for raw in 0..capacity {
        let id = QubitId(raw);
        match table.state(id) {
            Some(SlotState::Allocated) => report.allocated += 1,
            Some(SlotState::Disabled) => report.disabled += 1,
            Some(SlotState::Free { .. }) => {
                report.free += 1;
                if !seen[raw as usize] {
                    return Err(AuditError::Unreachable { id });
                }
            }
            None => unreachable!("id below capacity is always in range"),
        }
    }

    check("allocated", manager.allocated_qubit_count(), report.allocated)?;
    check("free", manager.free_qubit_count(), report.free)?;
    check("disabled", manager.disabled_qubit_count(), report.disabled)?;
    check("free", report.free, report.reusable + report.prohibited)?;
    Ok(report)
}

fn walk<M: QubitMapper>(
    list: &FreeList,
    manager: &QubitManager<M>,
    seen: &mut [bool],
) -> Result<u32, AuditError> {
    let table = manager.status_table();
    let mut last = None;
    let mut len = 0;
    // A cycle revisits some id, which the duplicate check catches before
    // the walk can run past capacity.
    for id in list.iter(table) {
        if !table.state(id).is_some_and(SlotState::is_free) {
            return Err(AuditError::NonFreeMember { id });
        }
        if std::mem::replace(&mut seen[id.index()], true) {
            return Err(AuditError::Duplicate { id });
        }
        last = Some(id);
        len += 1;
    }
    if last != list.tail() {
        return Err(AuditError::TailMismatch {
            expected: list.tail(),
            found: last,
        });
    }
    Ok(len)
}

fn check(name: &'static str, recorded: u32, derived: u32) -> Result<(), AuditError> {
    if recorded == derived {
        Ok(())
    } else {
        Err(AuditError::Counter {
            name,
            recorded,
            derived,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_manager_passes() {
        let qm = QubitManager::new(5, false, true);
        let report = audit(&qm).unwrap();
        assert_eq!(report.free, 5);
        assert_eq!(report.reusable, 5);
        assert_eq!(report.prohibited, 0);
    }

    #[test]
    fn counts_frozen_ids_as_prohibited() {
        let mut qm = QubitManager::new(4, false, true);
        qm.start_restricted_reuse_area();
        let ids = qm.allocate_many(2).unwrap();
        qm.release_many(&ids).unwrap();
        qm.next_restricted_reuse_segment();
        let report = audit(&qm).unwrap();
        assert_eq!(report.prohibited, 2);
        assert_eq!(report.reusable, 2);
        assert_eq!(report.allocated, 0);
    }

    #[test]
    fn disabled_ids_are_counted() {
        let mut qm = QubitManager::new(3, false, true);
        let a = qm.allocate().unwrap();
        qm.disable(&a).unwrap();
        let report = audit(&qm).unwrap();
        assert_eq!(report.disabled, 1);
        assert_eq!(report.free, 2);
    }
}
