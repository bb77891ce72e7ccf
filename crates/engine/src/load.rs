use std::collections::{BTreeSet, HashSet};
use types::{Slot, Teacher, DAYS_PER_WEEK};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TeacherLoad {
    pub total: u32,
    pub per_day: [u32; DAYS_PER_WEEK],
    /// Subject indices taught so far.
    pub subjects: BTreeSet<usize>,
    busy: HashSet<Slot>,
}

/// Forward-only per-teacher counters, indexed like the teacher roster.
#[derive(Clone, Debug)]
pub struct TeacherLoadTracker {
    caps: Vec<u32>,
    loads: Vec<TeacherLoad>,
}

impl TeacherLoadTracker {
    pub fn new(teachers: &[Teacher]) -> Self {
        Self {
            caps: teachers.iter().map(|t| t.weekly_cap).collect(),
            loads: vec![TeacherLoad::default(); teachers.len()],
        }
    }

    pub fn record_assignment(&mut self, teacher: usize, subject: usize, slot: Slot) {
        let load = &mut self.loads[teacher];
        load.total += 1;
        load.per_day[slot.day as usize] += 1;
        load.subjects.insert(subject);
        load.busy.insert(slot);
    }

    pub fn can_accept_more(&self, teacher: usize) -> bool {
        self.loads[teacher].total < self.caps[teacher]
    }

    pub fn weekly_cap(&self, teacher: usize) -> u32 {
        self.caps[teacher]
    }

    pub fn total(&self, teacher: usize) -> u32 {
        self.loads[teacher].total
    }

    pub fn daily_load(&self, teacher: usize, day: u8) -> u32 {
        self.loads[teacher].per_day[day as usize]
    }

    pub fn is_busy(&self, teacher: usize, slot: Slot) -> bool {
        self.loads[teacher].busy.contains(&slot)
    }

    pub fn load(&self, teacher: usize) -> &TeacherLoad {
        &self.loads[teacher]
    }
}
