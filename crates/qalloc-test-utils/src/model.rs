//! A reference model of qubit manager behaviour.
//!
//! [`ReferenceModel`] keeps each area's lists as plain `VecDeque`s and
//! slot states as an enum vector. It is deliberately naive: every list
//! operation is an obvious deque operation, so it serves as the oracle
//! for lockstep comparison with the real manager in [`run_lockstep`].

use std::collections::VecDeque;

use qalloc_core::QubitId;
use qalloc_manager::{ManagerConfig, QubitManager};

use crate::audit::audit;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Free,
    Allocated,
    Disabled,
}

#[derive(Clone, Debug, Default)]
struct Area {
    allowed: VecDeque<u32>,
    prohibited: VecDeque<u32>,
}

/// Naive executable description of manager semantics.
#[derive(Clone, Debug)]
pub struct ReferenceModel {
    config: ManagerConfig,
    ceiling: u32,
    slots: Vec<Slot>,
    areas: Vec<Area>,
}

impl ReferenceModel {
    pub fn new(config: &ManagerConfig) -> Self {
        let capacity = config.effective_initial_capacity();
        let base = Area {
            allowed: (0..capacity).collect(),
            prohibited: VecDeque::new(),
        };
        Self {
            config: config.clone(),
            ceiling: config.capacity_ceiling(),
            slots: vec![Slot::Free; capacity as usize],
            areas: vec![base],
        }
    }

    pub fn capacity(&self) -> u32 {
        self.slots.len() as u32
    }

    /// `(allocated, free, disabled)`.
    pub fn counts(&self) -> (u32, u32, u32) {
        let count = |want| self.slots.iter().filter(|&&s| s == want).count() as u32;
        (
            count(Slot::Allocated),
            count(Slot::Free),
            count(Slot::Disabled),
        )
    }

    /// Allocated ids in ascending order.
    pub fn allocated_ids(&self) -> Vec<QubitId> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, &s)| s == Slot::Allocated)
            .map(|(i, _)| QubitId(i as u32))
            .collect()
    }

    pub fn depth(&self) -> usize {
        self.areas.len()
    }

    pub fn allocate(&mut self) -> Option<QubitId> {
        let found = if self.config.encourage_reuse {
            self.areas.iter_mut().rev().find_map(|a| a.allowed.pop_front())
        } else {
            self.areas.iter_mut().find_map(|a| a.allowed.pop_front())
        };
        let id = match found {
            Some(id) => id,
            None => {
                if !self.config.may_extend_capacity {
                    return None;
                }
                let next = self
                    .config
                    .growth
                    .next_capacity(self.capacity(), self.ceiling)?;
                let old = self.capacity();
                self.slots.resize(next as usize, Slot::Free);
                self.areas[0].allowed.extend(old..next);
                self.areas[0].allowed.pop_front()?
            }
        };
        self.slots[id as usize] = Slot::Allocated;
        Some(QubitId(id))
    }

    pub fn allocate_many(&mut self, count: usize) -> Option<Vec<QubitId>> {
        let reusable: usize = self.areas.iter().map(|a| a.allowed.len()).sum();
        let headroom = if self.config.may_extend_capacity {
            (self.ceiling - self.capacity()) as usize
        } else {
            0
        };
        if reusable + headroom < count {
            return None;
        }
        (0..count).map(|_| self.allocate()).collect()
    }

    pub fn release(&mut self, id: QubitId) -> bool {
        if self.slots.get(id.index()) != Some(&Slot::Allocated) {
            return false;
        }
        self.slots[id.index()] = Slot::Free;
        let encourage = self.config.encourage_reuse;
        let top = self.areas.last_mut().expect("base area");
        if encourage {
            top.allowed.push_front(id.0);
        } else {
            top.allowed.push_back(id.0);
        }
        true
    }

    pub fn disable(&mut self, id: QubitId) -> bool {
        if self.slots.get(id.index()) != Some(&Slot::Allocated) {
            return false;
        }
        self.slots[id.index()] = Slot::Disabled;
        true
    }

    pub fn start_area(&mut self) {
        self.areas.push(Area::default());
    }

    pub fn next_segment(&mut self) {
        let top = self.areas.last_mut().expect("base area");
        let allowed: Vec<u32> = top.allowed.drain(..).collect();
        top.prohibited.extend(allowed);
    }

    pub fn end_area(&mut self) -> bool {
        if self.areas.len() <= 1 {
            return false;
        }
        let ended = self.areas.pop().expect("checked depth");
        let top = self.areas.last_mut().expect("base area");
        top.allowed.extend(ended.allowed);
        top.allowed.extend(ended.prohibited);
        true
    }
}

/// One step of a lockstep scenario.
///
/// Indexed variants pick among the currently allocated ids (modulo their
/// count); raw variants name an arbitrary id, which may be free,
/// disabled or out of range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelOp {
    Allocate,
    AllocateMany(usize),
    Release(usize),
    ReleaseRaw(u32),
    Disable(usize),
    DisableRaw(u32),
    StartArea,
    NextSegment,
    EndArea,
}

/// Drive a manager and a [`ReferenceModel`] through `ops` side by side.
///
/// After every step the two must agree on the outcome, the counters and
/// the capacity, and the manager must pass [`audit`]. Returns a
/// description of the first divergence.
pub fn run_lockstep(config: &ManagerConfig, ops: &[ModelOp]) -> Result<(), String> {
    let mut qm = QubitManager::with_config(config.clone());
    let mut model = ReferenceModel::new(config);

    for (step, &op) in ops.iter().enumerate() {
        let live = model.allocated_ids();
        let pick = |i: usize| live.get(i % live.len().max(1)).copied();
        let agree = match op {
            ModelOp::Allocate => qm.allocate().ok() == model.allocate(),
            ModelOp::AllocateMany(n) => qm.allocate_many(n).ok() == model.allocate_many(n),
            ModelOp::Release(i) => match pick(i) {
                Some(id) => qm.release(&id).is_ok() == model.release(id),
                None => true,
            },
            ModelOp::ReleaseRaw(raw) => {
                qm.release(&QubitId(raw)).is_ok() == model.release(QubitId(raw))
            }
            ModelOp::Disable(i) => match pick(i) {
                Some(id) => qm.disable(&id).is_ok() == model.disable(id),
                None => true,
            },
            ModelOp::DisableRaw(raw) => {
                qm.disable(&QubitId(raw)).is_ok() == model.disable(QubitId(raw))
            }
            ModelOp::StartArea => {
                qm.start_restricted_reuse_area();
                model.start_area();
                true
            }
            ModelOp::NextSegment => {
                qm.next_restricted_reuse_segment();
                model.next_segment();
                true
            }
            ModelOp::EndArea => qm.end_restricted_reuse_area().is_ok() == model.end_area(),
        };
        if !agree {
            return Err(format!("step {step}: {op:?} diverged from model"));
        }

        let counts = (
            qm.allocated_qubit_count(),
            qm.free_qubit_count(),
            qm.disabled_qubit_count(),
        );
        if counts != model.counts() {
            return Err(format!(
                "step {step}: {op:?} counts {counts:?}, model {:?}",
                model.counts()
            ));
        }
        if qm.capacity() != model.capacity() || qm.area_depth() != model.depth() {
            return Err(format!("step {step}: {op:?} capacity or depth diverged"));
        }
        audit(&qm).map_err(|e| format!("step {step}: {op:?} audit failed: {e}"))?;
    }
    Ok(())
}
