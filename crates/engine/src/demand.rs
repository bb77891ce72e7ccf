use std::cmp::Reverse;
use types::Subject;

/// Remaining weekly blocks per subject, indexed like the subject roster.
#[derive(Clone, Debug)]
pub struct SubjectDemand {
    targets: Vec<u32>,
    remaining: Vec<u32>,
    priority: Vec<usize>,
}

impl SubjectDemand {
    pub fn new(subjects: &[Subject]) -> Self {
        let targets: Vec<u32> = subjects.iter().map(|s| s.weekly_target).collect();
        let mut priority: Vec<usize> = (0..subjects.len()).collect();
        // stable: equal targets keep roster order
        priority.sort_by_key(|&i| Reverse(targets[i]));
        Self {
            remaining: targets.clone(),
            targets,
            priority,
        }
    }

    pub fn decrement(&mut self, subject: usize, by: u32) {
        let r = &mut self.remaining[subject];
        *r = r.saturating_sub(by);
    }

    pub fn is_satisfied(&self, subject: usize) -> bool {
        self.remaining[subject] == 0
    }

    pub fn remaining(&self, subject: usize) -> u32 {
        self.remaining[subject]
    }

    pub fn target(&self, subject: usize) -> u32 {
        self.targets[subject]
    }

    pub fn assigned(&self, subject: usize) -> u32 {
        self.targets[subject] - self.remaining[subject]
    }

    /// Subjects still short of their target: descending target, roster order on ties.
    pub fn pending_subjects(&self) -> Vec<usize> {
        self.priority
            .iter()
            .copied()
            .filter(|&s| !self.is_satisfied(s))
            .collect()
    }

    pub fn total_remaining(&self) -> u32 {
        self.remaining.iter().fold(0u32, |acc, &r| acc.saturating_add(r))
    }
}
