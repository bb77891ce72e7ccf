use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use types::{Assignment, Slot, SubjectName, TeacherId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlacementConflict {
    #[error("day {day} block {block} is outside the week grid")]
    OutOfRange { day: u8, block: u8 },
    #[error("slot {slot} is already taken by {subject} ({teacher})")]
    SlotTaken {
        slot: Slot,
        subject: SubjectName,
        teacher: TeacherId,
    },
    #[error("teacher {teacher} already teaches at {slot}")]
    TeacherBusy { teacher: TeacherId, slot: Slot },
}

/// The stored week. A generation run replaces it wholesale; manual edits go
/// through [`ScheduleStore::place`] and [`ScheduleStore::remove`].
#[derive(Clone, Default)]
pub struct ScheduleStore {
    inner: Arc<RwLock<BTreeMap<Slot, Assignment>>>,
}

impl ScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&self, assignments: Vec<Assignment>) {
        let next: BTreeMap<Slot, Assignment> =
            assignments.into_iter().map(|a| (a.slot(), a)).collect();
        let mut w = self.inner.write();
        info!(previous = w.len(), stored = next.len(), "schedule replaced");
        *w = next;
    }

    /// Stored assignments, day-major.
    pub fn current(&self) -> Vec<Assignment> {
        self.inner.read().values().cloned().collect()
    }

    pub fn place(&self, assignment: Assignment) -> Result<(), PlacementConflict> {
        let slot = assignment.slot();
        if !slot.is_in_range() {
            return Err(PlacementConflict::OutOfRange {
                day: slot.day,
                block: slot.block,
            });
        }
        // one slot holds one class, so the teacher check only looks at the same cell
        let mut w = self.inner.write();
        if let Some(existing) = w.get(&slot) {
            if existing.teacher == assignment.teacher {
                return Err(PlacementConflict::TeacherBusy {
                    teacher: assignment.teacher,
                    slot,
                });
            }
            return Err(PlacementConflict::SlotTaken {
                slot,
                subject: existing.subject.clone(),
                teacher: existing.teacher.clone(),
            });
        }
        w.insert(slot, assignment);
        Ok(())
    }

    pub fn remove(&self, slot: Slot) -> Option<Assignment> {
        self.inner.write().remove(&slot)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}
