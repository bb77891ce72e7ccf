//! Post-hoc checks over a finished assignment list.
//!
//! The validator never repairs anything. It reports each broken rule as a
//! `[kind] description` string so callers can decide whether to keep, regenerate
//! or hand-fix the schedule.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use types::{
    Assignment, GenerateRequest, Slot, SubjectName, Teacher, TeacherId, ValidationReport, Weekday,
    DAYS_PER_WEEK,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    SlotOutOfRange,
    SlotDoubleBooked,
    TeacherDoubleBooked,
    UnknownTeacher,
    UnknownSubject,
    TeacherNotQualified,
    TeacherUnavailable,
    TeacherWeeklyCap,
    TeacherDailyCap,
    SubjectDailyCap,
    SubjectAdjacentBlocks,
    SubjectWeeklyCeiling,
    SubjectOverTarget,
    SpreadAdjacentDays,
}

impl ViolationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ViolationKind::SlotOutOfRange => "slot_out_of_range",
            ViolationKind::SlotDoubleBooked => "slot_double_booked",
            ViolationKind::TeacherDoubleBooked => "teacher_double_booked",
            ViolationKind::UnknownTeacher => "unknown_teacher",
            ViolationKind::UnknownSubject => "unknown_subject",
            ViolationKind::TeacherNotQualified => "teacher_not_qualified",
            ViolationKind::TeacherUnavailable => "teacher_unavailable",
            ViolationKind::TeacherWeeklyCap => "teacher_weekly_cap",
            ViolationKind::TeacherDailyCap => "teacher_daily_cap",
            ViolationKind::SubjectDailyCap => "subject_daily_cap",
            ViolationKind::SubjectAdjacentBlocks => "subject_adjacent_blocks",
            ViolationKind::SubjectWeeklyCeiling => "subject_weekly_ceiling",
            ViolationKind::SubjectOverTarget => "subject_over_target",
            ViolationKind::SpreadAdjacentDays => "spread_adjacent_days",
        }
    }

    /// Prefix used in report strings, e.g. `[slot_double_booked]`.
    pub fn tag(self) -> String {
        format!("[{}]", self.as_str())
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct Report(Vec<String>);

impl Report {
    fn push(&mut self, kind: ViolationKind, details: String) {
        self.0.push(format!("{} {details}", kind.tag()));
    }
}

fn day_label(day: u8) -> String {
    Weekday::from_index(day)
        .map(|d| d.to_string())
        .unwrap_or_else(|| format!("day{day}"))
}

/// Validates `assignments` against the request it was generated from.
pub fn validate_timetable(req: &GenerateRequest, assignments: &[Assignment]) -> ValidationReport {
    let c = &req.constraints;
    let mut report = Report(Vec::new());

    let teacher_by_id: HashMap<&TeacherId, &Teacher> =
        req.teachers.iter().map(|t| (&t.id, t)).collect();
    let target_by_subject: HashMap<&SubjectName, u32> = req
        .subjects
        .iter()
        .map(|s| (&s.name, s.weekly_target))
        .collect();

    let mut cells: HashSet<Slot> = HashSet::new();
    let mut teacher_cells: HashSet<(&TeacherId, Slot)> = HashSet::new();
    let mut teacher_total: BTreeMap<&TeacherId, u32> = BTreeMap::new();
    let mut teacher_day: BTreeMap<(&TeacherId, u8), u32> = BTreeMap::new();
    let mut subject_blocks: BTreeMap<(&SubjectName, u8), Vec<u8>> = BTreeMap::new();
    let mut subject_total: BTreeMap<&SubjectName, u32> = BTreeMap::new();

    for a in assignments {
        let slot = a.slot();
        if !slot.is_in_range() {
            report.push(
                ViolationKind::SlotOutOfRange,
                format!("{} / {} placed at day {} block {}", a.subject, a.teacher, a.day, a.block),
            );
            continue;
        }
        if !cells.insert(slot) {
            report.push(
                ViolationKind::SlotDoubleBooked,
                format!("slot {slot} holds more than one assignment"),
            );
        }
        if !teacher_cells.insert((&a.teacher, slot)) {
            report.push(
                ViolationKind::TeacherDoubleBooked,
                format!("teacher {} is booked twice at {slot}", a.teacher),
            );
        }

        match teacher_by_id.get(&a.teacher) {
            None => report.push(
                ViolationKind::UnknownTeacher,
                format!("teacher {} at {slot} is not in the roster", a.teacher),
            ),
            Some(t) => {
                if !t.can_teach(&a.subject) {
                    report.push(
                        ViolationKind::TeacherNotQualified,
                        format!("teacher {} cannot teach {} (at {slot})", a.teacher, a.subject),
                    );
                }
                if !t.availability_map()[a.day as usize][a.block as usize] {
                    report.push(
                        ViolationKind::TeacherUnavailable,
                        format!("teacher {} is unavailable at {slot}", a.teacher),
                    );
                }
            }
        }
        if !target_by_subject.contains_key(&a.subject) {
            report.push(
                ViolationKind::UnknownSubject,
                format!("subject {} at {slot} is not in the roster", a.subject),
            );
        }

        *teacher_total.entry(&a.teacher).or_default() += 1;
        *teacher_day.entry((&a.teacher, a.day)).or_default() += 1;
        subject_blocks
            .entry((&a.subject, a.day))
            .or_default()
            .push(a.block);
        *subject_total.entry(&a.subject).or_default() += 1;
    }

    for (tid, total) in &teacher_total {
        if let Some(t) = teacher_by_id.get(tid) {
            if *total > t.weekly_cap {
                report.push(
                    ViolationKind::TeacherWeeklyCap,
                    format!("teacher {tid} has {total} blocks, cap is {}", t.weekly_cap),
                );
            }
        }
    }
    if let Some(cap) = c.per_teacher_daily_cap {
        for ((tid, day), n) in &teacher_day {
            if *n > cap {
                report.push(
                    ViolationKind::TeacherDailyCap,
                    format!("teacher {tid} has {n} blocks on {}, cap is {cap}", day_label(*day)),
                );
            }
        }
    }

    let mut spread_days: BTreeMap<&SubjectName, BTreeSet<u8>> = BTreeMap::new();
    for ((subject, day), blocks) in subject_blocks.iter_mut() {
        let cap = c.daily_cap_for(subject);
        let n = blocks.len() as u32;
        if n > cap {
            report.push(
                ViolationKind::SubjectDailyCap,
                format!("{subject} has {n} blocks on {}, cap is {cap}", day_label(*day)),
            );
        }

        blocks.sort_unstable();
        let pairs = blocks.windows(2).filter(|w| w[1] == w[0] + 1).count();
        let allowed = usize::from(c.enable_double_block && !c.is_spread(subject));
        if pairs > allowed {
            report.push(
                ViolationKind::SubjectAdjacentBlocks,
                format!(
                    "{subject} has {pairs} adjacent block pair(s) on {}, {allowed} allowed",
                    day_label(*day)
                ),
            );
        }

        if c.is_spread(subject) {
            spread_days.entry(*subject).or_default().insert(*day);
        }
    }

    for (subject, total) in &subject_total {
        let ceiling = c.weekly_ceiling_for(subject);
        if *total > ceiling {
            report.push(
                ViolationKind::SubjectWeeklyCeiling,
                format!("{subject} has {total} blocks, weekly ceiling is {ceiling}"),
            );
        }
        if let Some(target) = target_by_subject.get(subject) {
            if total > target {
                report.push(
                    ViolationKind::SubjectOverTarget,
                    format!("{subject} has {total} blocks, target is {target}"),
                );
            }
        }
    }

    for (subject, days) in &spread_days {
        for d in days.iter().copied() {
            if (d as usize) + 1 < DAYS_PER_WEEK && days.contains(&(d + 1)) {
                report.push(
                    ViolationKind::SpreadAdjacentDays,
                    format!(
                        "{subject} is scheduled on consecutive days {} and {}",
                        day_label(d),
                        day_label(d + 1)
                    ),
                );
            }
        }
    }

    ValidationReport::from_violations(report.0)
}
