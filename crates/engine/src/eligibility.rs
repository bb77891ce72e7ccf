//! Placement legality.
//!
//! `EligibilityChecker` is a read-only view over the grid and the load tracker.
//! It answers one question: may teacher `t` teach subject `s` at `(day, block)`
//! right now? Rejections carry an [`Ineligible`] reason so the engine can trace
//! why a candidate was skipped.

use crate::grid::SlotGrid;
use crate::load::TeacherLoadTracker;
use types::{GenerateRequest, Slot, BLOCKS_PER_DAY, DAYS_PER_WEEK};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ineligible {
    NotQualified,
    Unavailable,
    SlotTaken,
    TeacherBusy,
    WeeklyCapReached,
    DailyCapReached,
    SubjectDailyCapReached,
    AdjacentToOwnBlock,
    AdjacentSameSubject,
}

/// First block of a double-block pair: chosen but not yet placed.
///
/// While the second block is checked it counts as placed for load and per-day
/// totals, and it is exempt from the adjacency rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tentative {
    pub teacher: usize,
    pub slot: Slot,
}

/// Request data flattened into roster-indexed tables.
#[derive(Clone, Debug)]
pub struct Rules {
    capable: Vec<Vec<bool>>,
    availability: Vec<[[bool; BLOCKS_PER_DAY]; DAYS_PER_WEEK]>,
    subject_daily_cap: Vec<u32>,
    spread: Vec<bool>,
    teacher_daily_cap: Option<u32>,
    avoid_adjacent: bool,
}

impl Rules {
    pub fn new(req: &GenerateRequest) -> Self {
        let c = &req.constraints;
        Self {
            capable: req
                .teachers
                .iter()
                .map(|t| req.subjects.iter().map(|s| t.can_teach(&s.name)).collect())
                .collect(),
            availability: req.teachers.iter().map(|t| t.availability_map()).collect(),
            subject_daily_cap: req.subjects.iter().map(|s| c.daily_cap_for(&s.name)).collect(),
            spread: req.subjects.iter().map(|s| c.is_spread(&s.name)).collect(),
            teacher_daily_cap: c.per_teacher_daily_cap,
            avoid_adjacent: c.avoid_adjacent,
        }
    }

    pub fn is_spread(&self, subject: usize) -> bool {
        self.spread[subject]
    }

    pub fn subject_daily_cap(&self, subject: usize) -> u32 {
        self.subject_daily_cap[subject]
    }
}

pub struct EligibilityChecker<'a> {
    rules: &'a Rules,
    grid: &'a SlotGrid,
    load: &'a TeacherLoadTracker,
}

impl<'a> EligibilityChecker<'a> {
    pub fn new(rules: &'a Rules, grid: &'a SlotGrid, load: &'a TeacherLoadTracker) -> Self {
        Self { rules, grid, load }
    }

    pub fn is_eligible(&self, teacher: usize, subject: usize, slot: Slot) -> bool {
        self.check(teacher, subject, slot, None).is_ok()
    }

    pub fn check(
        &self,
        teacher: usize,
        subject: usize,
        slot: Slot,
        partner: Option<Tentative>,
    ) -> Result<(), Ineligible> {
        if !self.rules.capable[teacher][subject] {
            return Err(Ineligible::NotQualified);
        }
        if !slot.is_in_range() || !self.rules.availability[teacher][slot.day as usize][slot.block as usize] {
            return Err(Ineligible::Unavailable);
        }
        if !self.grid.is_free(slot) || partner.is_some_and(|p| p.slot == slot) {
            return Err(Ineligible::SlotTaken);
        }
        if self.load.is_busy(teacher, slot) {
            return Err(Ineligible::TeacherBusy);
        }
        if !self.load.can_accept_more(teacher)
            || self.total_with(teacher, partner) >= self.load.weekly_cap(teacher)
        {
            return Err(Ineligible::WeeklyCapReached);
        }
        if let Some(cap) = self.rules.teacher_daily_cap {
            if self.daily_with(teacher, slot.day, partner) >= cap {
                return Err(Ineligible::DailyCapReached);
            }
        }
        let partner_same_day = partner.is_some_and(|p| p.slot.day == slot.day);
        let subject_today = self.grid.subject_count_on(slot.day, subject) + u32::from(partner_same_day);
        if subject_today >= self.rules.subject_daily_cap(subject) {
            return Err(Ineligible::SubjectDailyCapReached);
        }
        if self.rules.avoid_adjacent {
            for n in neighbours(slot) {
                if partner.is_some_and(|p| p.slot == n) {
                    continue;
                }
                if self.load.is_busy(teacher, n) {
                    return Err(Ineligible::AdjacentToOwnBlock);
                }
                if self.grid.subject_on(n, subject) {
                    return Err(Ineligible::AdjacentSameSubject);
                }
            }
        }
        Ok(())
    }

    /// A spread subject may not use a day that is taken, or next to one that is.
    pub fn spread_day_open(&self, subject: usize, day: u8) -> bool {
        let lo = day.saturating_sub(1);
        let hi = (day + 1).min(DAYS_PER_WEEK as u8 - 1);
        (lo..=hi).all(|d| !self.grid.is_day_used_by(d, subject))
    }

    /// Weekly total counting a tentative partner block.
    pub fn total_with(&self, teacher: usize, partner: Option<Tentative>) -> u32 {
        let extra = partner.is_some_and(|p| p.teacher == teacher);
        self.load.total(teacher) + u32::from(extra)
    }

    pub fn daily_with(&self, teacher: usize, day: u8, partner: Option<Tentative>) -> u32 {
        let extra = partner.is_some_and(|p| p.teacher == teacher && p.slot.day == day);
        self.load.daily_load(teacher, day) + u32::from(extra)
    }
}

fn neighbours(slot: Slot) -> impl Iterator<Item = Slot> {
    let prev = slot.block.checked_sub(1).map(|b| Slot::new(slot.day, b));
    let next = Some(Slot::new(slot.day, slot.block + 1)).filter(|s| s.is_in_range());
    prev.into_iter().chain(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{Constraints, SlotAvailability, Subject, Teacher};

    const MATH: usize = 0;
    const ART: usize = 1;
    const PE: usize = 2;
    const ANA: usize = 0;
    const BOB: usize = 1;

    fn request() -> GenerateRequest {
        let mut bob = Teacher::new("bob", &["Math", "Art"], 3);
        bob.availability.push(SlotAvailability {
            day: 4,
            block: 7,
            available: false,
        });
        GenerateRequest {
            teachers: vec![Teacher::new("ana", &["Math", "PE"], 10), bob],
            subjects: vec![
                Subject::new("Math", 6),
                Subject::new("Art", 2),
                Subject::new("PE", 3),
            ],
            constraints: Constraints {
                spread_subjects: vec!["PE".into()],
                per_teacher_daily_cap: Some(3),
                ..Constraints::default()
            },
        }
    }

    struct Fixture {
        rules: Rules,
        grid: SlotGrid,
        load: TeacherLoadTracker,
    }

    impl Fixture {
        fn new(req: &GenerateRequest) -> Self {
            Self {
                rules: Rules::new(req),
                grid: SlotGrid::new(),
                load: TeacherLoadTracker::new(&req.teachers),
            }
        }

        fn place(&mut self, teacher: usize, subject: usize, slot: Slot) {
            self.grid.occupy(slot, subject, teacher).unwrap();
            self.load.record_assignment(teacher, subject, slot);
        }

        fn checker(&self) -> EligibilityChecker<'_> {
            EligibilityChecker::new(&self.rules, &self.grid, &self.load)
        }
    }

    #[test]
    fn capability_and_availability() {
        let f = Fixture::new(&request());
        let c = f.checker();
        assert_eq!(c.check(ANA, ART, Slot::new(0, 0), None), Err(Ineligible::NotQualified));
        assert_eq!(c.check(BOB, ART, Slot::new(4, 7), None), Err(Ineligible::Unavailable));
        assert!(c.is_eligible(BOB, ART, Slot::new(4, 6)));
    }

    #[test]
    fn occupied_slot_is_taken() {
        let mut f = Fixture::new(&request());
        f.place(ANA, MATH, Slot::new(1, 1));
        assert_eq!(
            f.checker().check(BOB, MATH, Slot::new(1, 1), None),
            Err(Ineligible::SlotTaken)
        );
    }

    #[test]
    fn weekly_and_daily_caps() {
        let mut f = Fixture::new(&request());
        f.place(BOB, MATH, Slot::new(0, 0));
        f.place(BOB, ART, Slot::new(1, 0));
        f.place(BOB, ART, Slot::new(2, 0));
        assert_eq!(
            f.checker().check(BOB, MATH, Slot::new(3, 0), None),
            Err(Ineligible::WeeklyCapReached)
        );

        let mut f = Fixture::new(&request());
        f.place(ANA, MATH, Slot::new(0, 0));
        f.place(ANA, PE, Slot::new(0, 2));
        f.place(ANA, MATH, Slot::new(0, 4));
        assert_eq!(
            f.checker().check(ANA, MATH, Slot::new(0, 6), None),
            Err(Ineligible::DailyCapReached)
        );
        assert!(f.checker().is_eligible(ANA, MATH, Slot::new(1, 6)));
    }

    #[test]
    fn subject_daily_cap_counts_grid_and_partner() {
        let mut f = Fixture::new(&request());
        f.place(ANA, MATH, Slot::new(2, 0));
        let partner = Tentative {
            teacher: ANA,
            slot: Slot::new(2, 3),
        };
        assert_eq!(
            f.checker().check(BOB, MATH, Slot::new(2, 4), Some(partner)),
            Err(Ineligible::SubjectDailyCapReached)
        );
        assert!(f.checker().is_eligible(BOB, MATH, Slot::new(2, 4)));
    }

    #[test]
    fn spread_subject_gets_one_block_a_day() {
        let mut f = Fixture::new(&request());
        f.place(ANA, PE, Slot::new(0, 0));
        assert_eq!(
            f.checker().check(ANA, PE, Slot::new(0, 5), None),
            Err(Ineligible::SubjectDailyCapReached)
        );
    }

    #[test]
    fn adjacency_rules() {
        let mut f = Fixture::new(&request());
        f.place(ANA, PE, Slot::new(3, 3));
        assert_eq!(
            f.checker().check(ANA, MATH, Slot::new(3, 4), None),
            Err(Ineligible::AdjacentToOwnBlock)
        );
        assert!(f.checker().is_eligible(BOB, MATH, Slot::new(3, 4)));

        f.place(BOB, MATH, Slot::new(3, 6));
        assert_eq!(
            f.checker().check(ANA, MATH, Slot::new(3, 7), None),
            Err(Ineligible::AdjacentSameSubject)
        );
    }

    #[test]
    fn partner_block_is_exempt_from_adjacency() {
        let f = Fixture::new(&request());
        let partner = Tentative {
            teacher: ANA,
            slot: Slot::new(1, 2),
        };
        assert_eq!(f.checker().check(ANA, MATH, Slot::new(1, 3), Some(partner)), Ok(()));
        assert_eq!(f.checker().total_with(ANA, Some(partner)), 1);
        assert_eq!(f.checker().daily_with(ANA, 0, Some(partner)), 0);
    }

    #[test]
    fn partner_counts_against_weekly_cap() {
        let mut req = request();
        req.teachers[BOB].weekly_cap = 1;
        let f = Fixture::new(&req);
        let partner = Tentative {
            teacher: BOB,
            slot: Slot::new(0, 0),
        };
        assert_eq!(
            f.checker().check(BOB, ART, Slot::new(0, 1), Some(partner)),
            Err(Ineligible::WeeklyCapReached)
        );
    }

    #[test]
    fn adjacency_can_be_disabled() {
        let mut req = request();
        req.constraints.avoid_adjacent = false;
        let mut f = Fixture::new(&req);
        f.place(ANA, PE, Slot::new(3, 3));
        assert!(f.checker().is_eligible(ANA, MATH, Slot::new(3, 4)));
    }

    #[test]
    fn spread_days_must_not_touch() {
        let mut f = Fixture::new(&request());
        f.place(ANA, PE, Slot::new(2, 0));
        let c = f.checker();
        assert!(c.spread_day_open(PE, 0));
        assert!(!c.spread_day_open(PE, 1));
        assert!(!c.spread_day_open(PE, 2));
        assert!(!c.spread_day_open(PE, 3));
        assert!(c.spread_day_open(PE, 4));
        assert!(c.spread_day_open(MATH, 2));
    }
}
