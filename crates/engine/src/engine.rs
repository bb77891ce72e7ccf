use std::collections::BTreeMap;

use timetable_core::validate_request;
use timetable_core::validator::validate_timetable;
use tracing::{debug, info, trace, warn};
use types::{
    Assignment, GenerateRequest, GenerationStatus, Slot, StopReason, Timetable, TimetableStats,
    BLOCKS_PER_DAY, DAYS_PER_WEEK,
};

use crate::demand::SubjectDemand;
use crate::eligibility::{EligibilityChecker, Rules, Tentative};
use crate::grid::{GridError, SlotGrid};
use crate::load::TeacherLoadTracker;
use crate::EngineError;

/// New blocks a day may take in one round, across all non-spread subjects.
pub const DAILY_PACE: u32 = 2;

/// Round-based greedy placement over one request.
///
/// All state is owned by the engine and dropped once [`PlacementEngine::run`]
/// returns, so independent requests never share anything.
pub struct PlacementEngine<'a> {
    req: &'a GenerateRequest,
    rules: Rules,
    grid: SlotGrid,
    load: TeacherLoadTracker,
    demand: SubjectDemand,
}

impl<'a> PlacementEngine<'a> {
    pub fn new(req: &'a GenerateRequest) -> Result<Self, EngineError> {
        for w in validate_request(req)? {
            warn!(warning = %w, "constraint configuration");
        }
        Ok(Self {
            req,
            rules: Rules::new(req),
            grid: SlotGrid::new(),
            load: TeacherLoadTracker::new(&req.teachers),
            demand: SubjectDemand::new(&req.subjects),
        })
    }

    pub fn run(mut self) -> Result<Timetable, EngineError> {
        info!(
            teachers = self.req.teachers.len(),
            subjects = self.req.subjects.len(),
            demand = self.demand.total_remaining(),
            "generating timetable"
        );

        let limit = self.req.constraints.round_limit;
        let mut rounds = 0u32;
        let mut stop = StopReason::RoundLimit;
        while rounds < limit {
            let pending = self.demand.pending_subjects();
            if pending.is_empty() {
                stop = StopReason::DemandMet;
                break;
            }
            let placed = self.run_round(&pending)?;
            rounds += 1;
            debug!(round = rounds, placed, pending = pending.len(), "round finished");
            if placed == 0 {
                stop = StopReason::NoProgress;
                break;
            }
        }
        if self.demand.total_remaining() == 0 {
            stop = StopReason::DemandMet;
        }

        Ok(self.finish(rounds, stop))
    }

    fn checker(&self) -> EligibilityChecker<'_> {
        EligibilityChecker::new(&self.rules, &self.grid, &self.load)
    }

    fn run_round(&mut self, pending: &[usize]) -> Result<u32, GridError> {
        let mut placed = 0;
        for day in 0..DAYS_PER_WEEK as u8 {
            // shared by every subject visiting this day in this round
            let mut placed_today = 0;
            for &subject in pending {
                if self.demand.is_satisfied(subject) {
                    continue;
                }
                placed_today += self.visit(subject, day, placed_today)?;
            }
            placed += placed_today;
        }
        Ok(placed)
    }

    /// One subject on one day of a round: a pair or a single block, never both.
    ///
    /// A pair needs a day untouched in this round, a single needs the day to be
    /// under [`DAILY_PACE`]. Spread subjects are only bound by their own day rule.
    fn visit(&mut self, subject: usize, day: u8, placed_today: u32) -> Result<u32, GridError> {
        if self.rules.is_spread(subject) {
            if !self.checker().spread_day_open(subject, day) {
                return Ok(0);
            }
            return self.place_single(subject, day);
        }

        let wants_pair = self.req.constraints.enable_double_block
            && self.demand.remaining(subject) >= 2
            && placed_today == 0
            && !self.grid.is_day_used_by(day, subject);
        if wants_pair {
            let placed = self.place_pair(subject, day)?;
            if placed > 0 {
                return Ok(placed);
            }
        }
        if placed_today >= DAILY_PACE {
            trace!(subject = %self.req.subjects[subject].name, day, "day is paced out this round");
            return Ok(0);
        }
        self.place_single(subject, day)
    }

    fn place_pair(&mut self, subject: usize, day: u8) -> Result<u32, GridError> {
        for block in 0..(BLOCKS_PER_DAY - 1) as u8 {
            let first = Slot::new(day, block);
            let second = Slot::new(day, block + 1);
            if !self.grid.is_free(first) || !self.grid.is_free(second) {
                continue;
            }
            let Some(t1) = self.select_teacher(subject, first, None) else {
                continue;
            };
            let partner = Tentative {
                teacher: t1,
                slot: first,
            };
            let Some(t2) = self.select_teacher(subject, second, Some(partner)) else {
                continue;
            };
            self.commit(subject, t1, first)?;
            self.commit(subject, t2, second)?;
            return Ok(2);
        }
        Ok(0)
    }

    fn place_single(&mut self, subject: usize, day: u8) -> Result<u32, GridError> {
        for block in 0..BLOCKS_PER_DAY as u8 {
            let slot = Slot::new(day, block);
            if !self.grid.is_free(slot) {
                continue;
            }
            if let Some(teacher) = self.select_teacher(subject, slot, None) {
                self.commit(subject, teacher, slot)?;
                return Ok(1);
            }
        }
        Ok(0)
    }

    /// Least loaded eligible teacher: lowest weekly total, then lowest load that
    /// day, then roster order.
    fn select_teacher(&self, subject: usize, slot: Slot, partner: Option<Tentative>) -> Option<usize> {
        let checker = self.checker();
        (0..self.req.teachers.len())
            .filter(|&t| match checker.check(t, subject, slot, partner) {
                Ok(()) => true,
                Err(reason) => {
                    trace!(teacher = %self.req.teachers[t].id, %slot, ?reason, "candidate rejected");
                    false
                }
            })
            .min_by_key(|&t| {
                (
                    checker.total_with(t, partner),
                    checker.daily_with(t, slot.day, partner),
                )
            })
    }

    fn commit(&mut self, subject: usize, teacher: usize, slot: Slot) -> Result<(), GridError> {
        self.grid.occupy(slot, subject, teacher)?;
        self.load.record_assignment(teacher, subject, slot);
        self.demand.decrement(subject, 1);
        trace!(
            subject = %self.req.subjects[subject].name,
            teacher = %self.req.teachers[teacher].id,
            %slot,
            "placed"
        );
        Ok(())
    }

    fn assignments(&self) -> Vec<Assignment> {
        self.grid
            .iter()
            .map(|(slot, cell)| Assignment {
                subject: self.req.subjects[cell.subject].name.clone(),
                teacher: self.req.teachers[cell.teacher].id.clone(),
                day: slot.day,
                block: slot.block,
            })
            .collect()
    }

    fn stats(&self, rounds: u32, stop_reason: StopReason) -> TimetableStats {
        let mut per_subject_assigned = BTreeMap::new();
        let mut per_subject_target = BTreeMap::new();
        let mut per_subject_unmet = BTreeMap::new();
        for (i, s) in self.req.subjects.iter().enumerate() {
            per_subject_assigned.insert(s.name.clone(), self.demand.assigned(i));
            per_subject_target.insert(s.name.clone(), self.demand.target(i));
            if !self.demand.is_satisfied(i) {
                per_subject_unmet.insert(s.name.clone(), self.demand.remaining(i));
            }
        }

        let mut per_teacher_totals = BTreeMap::new();
        let mut per_teacher_per_day = BTreeMap::new();
        let mut per_teacher_subjects = BTreeMap::new();
        for (i, t) in self.req.teachers.iter().enumerate() {
            let load = self.load.load(i);
            per_teacher_totals.insert(t.id.clone(), load.total);
            per_teacher_per_day.insert(t.id.clone(), load.per_day.to_vec());
            per_teacher_subjects.insert(
                t.id.clone(),
                load.subjects
                    .iter()
                    .map(|&s| self.req.subjects[s].name.clone())
                    .collect(),
            );
        }

        let teachers_below_minimum = match self.req.constraints.min_blocks_per_teacher {
            Some(min) => self
                .req
                .teachers
                .iter()
                .enumerate()
                .filter(|&(i, _)| self.load.total(i) < min)
                .map(|(_, t)| t.id.clone())
                .collect(),
            None => Vec::new(),
        };

        TimetableStats {
            total_assigned: self.grid.len() as u32,
            rounds,
            stop_reason,
            per_subject_assigned,
            per_subject_target,
            per_subject_unmet,
            per_teacher_totals,
            per_teacher_per_day,
            per_teacher_subjects,
            teachers_below_minimum,
        }
    }

    fn finish(self, rounds: u32, stop: StopReason) -> Timetable {
        let assignments = self.assignments();
        let stats = self.stats(rounds, stop);

        let status = if self.demand.total_remaining() == 0 {
            GenerationStatus::Complete
        } else if assignments.is_empty() {
            GenerationStatus::Empty
        } else {
            GenerationStatus::Partial
        };

        let validation = validate_timetable(self.req, &assignments);
        if !validation.ok {
            warn!(violations = validation.violations.len(), "generated timetable failed validation");
        }
        for (subject, missing) in &stats.per_subject_unmet {
            debug!(%subject, missing, "demand left unmet");
        }
        info!(
            assigned = stats.total_assigned,
            rounds,
            ?stop,
            ?status,
            "timetable generated"
        );

        Timetable {
            status,
            assignments,
            stats,
            validation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{Constraints, Subject, SubjectName, Teacher, TeacherId};

    fn request(teachers: Vec<Teacher>, subjects: Vec<Subject>) -> GenerateRequest {
        GenerateRequest {
            teachers,
            subjects,
            constraints: Constraints::default(),
        }
    }

    fn slots_of(t: &Timetable, subject: &str) -> Vec<(u8, u8, String)> {
        t.assignments
            .iter()
            .filter(|a| a.subject.0 == subject)
            .map(|a| (a.day, a.block, a.teacher.0.clone()))
            .collect()
    }

    #[test]
    fn pair_spreads_over_two_teachers() {
        let req = request(
            vec![Teacher::new("ana", &["Math"], 10), Teacher::new("bob", &["Math"], 10)],
            vec![Subject::new("Math", 4)],
        );
        let t = PlacementEngine::new(&req).unwrap().run().unwrap();
        assert_eq!(
            slots_of(&t, "Math"),
            vec![
                (0, 0, "ana".to_string()),
                (0, 1, "bob".to_string()),
                (1, 0, "ana".to_string()),
                (1, 1, "bob".to_string()),
            ]
        );
        assert_eq!(t.status, GenerationStatus::Complete);
        assert_eq!(t.stats.stop_reason, StopReason::DemandMet);
        assert_eq!(t.stats.rounds, 1);
    }

    #[test]
    fn higher_target_is_served_first() {
        // the Math pair uses up day 0 for this round, so Art moves to day 1
        let req = request(
            vec![Teacher::new("ana", &["Art", "Math"], 20)],
            vec![Subject::new("Art", 1), Subject::new("Math", 2)],
        );
        let t = PlacementEngine::new(&req).unwrap().run().unwrap();
        assert_eq!(
            t.assignments
                .iter()
                .map(|a| (a.subject.0.as_str(), a.day, a.block))
                .collect::<Vec<_>>(),
            vec![("Math", 0, 0), ("Math", 0, 1), ("Art", 1, 0)]
        );
    }

    #[test]
    fn double_block_can_be_disabled() {
        let mut req = request(
            vec![Teacher::new("ana", &["Math"], 10), Teacher::new("bob", &["Math"], 10)],
            vec![Subject::new("Math", 4)],
        );
        req.constraints.enable_double_block = false;
        let t = PlacementEngine::new(&req).unwrap().run().unwrap();
        let math = slots_of(&t, "Math");
        assert_eq!(math.len(), 4);
        for w in math.windows(2) {
            assert!(!(w[0].0 == w[1].0 && w[1].1 == w[0].1 + 1), "adjacent pair in {math:?}");
        }
        assert!(t.validation.ok, "{:?}", t.validation.violations);
    }

    #[test]
    fn stalls_when_no_teacher_is_left() {
        let req = request(
            vec![Teacher::new("ana", &["Math"], 3)],
            vec![Subject::new("Math", 6)],
        );
        let t = PlacementEngine::new(&req).unwrap().run().unwrap();
        assert_eq!(t.stats.total_assigned, 3);
        assert_eq!(t.stats.stop_reason, StopReason::NoProgress);
        assert_eq!(t.stats.per_subject_unmet.get(&SubjectName::from("Math")), Some(&3));
        assert_eq!(t.status, GenerationStatus::Partial);
    }

    #[test]
    fn round_limit_bounds_the_run() {
        let mut req = request(
            vec![Teacher::new("ana", &["Math"], 40)],
            vec![Subject::new("Math", 12)],
        );
        req.constraints.max_subject_per_day = 3;
        req.constraints.round_limit = 1;
        let t = PlacementEngine::new(&req).unwrap().run().unwrap();
        assert_eq!(t.stats.rounds, 1);
        assert_eq!(t.stats.stop_reason, StopReason::RoundLimit);
        // one pair per day in the first round
        assert_eq!(t.stats.total_assigned, 10);

        req.constraints.round_limit = 50;
        let t = PlacementEngine::new(&req).unwrap().run().unwrap();
        assert_eq!(t.stats.total_assigned, 12);
        assert_eq!(t.stats.stop_reason, StopReason::DemandMet);
    }

    #[test]
    fn nothing_placeable_is_the_empty_result() {
        let req = request(
            vec![Teacher::new("ana", &["Music"], 5)],
            vec![Subject::new("Math", 2)],
        );
        let t = PlacementEngine::new(&req).unwrap().run().unwrap();
        assert!(t.is_empty());
        assert_eq!(t.status, GenerationStatus::Empty);
        assert_eq!(t.stats.rounds, 1);
    }

    #[test]
    fn per_teacher_stats_are_reported() {
        let req = request(
            vec![Teacher::new("ana", &["Math", "Art"], 10), Teacher::new("bob", &["Art"], 10)],
            vec![Subject::new("Math", 2), Subject::new("Art", 1)],
        );
        let t = PlacementEngine::new(&req).unwrap().run().unwrap();
        let ana = TeacherId::from("ana");
        assert_eq!(t.stats.per_teacher_totals.values().sum::<u32>(), 3);
        assert_eq!(t.stats.per_teacher_per_day[&ana].len(), DAYS_PER_WEEK);
        assert!(t.stats.per_teacher_subjects[&ana].contains(&"Math".into()));
        assert_eq!(t.stats.per_subject_target[&SubjectName::from("Math")], 2);
        assert_eq!(t.stats.per_teacher_totals[&TeacherId::from("bob")], 1);
        assert!(t.stats.teachers_below_minimum.is_empty());
    }

    #[test]
    fn teachers_short_of_the_minimum_are_listed() {
        let mut req = request(
            vec![Teacher::new("ana", &["Math"], 10), Teacher::new("bob", &["Art"], 10)],
            vec![Subject::new("Math", 4), Subject::new("Art", 1)],
        );
        req.constraints.min_blocks_per_teacher = Some(2);
        let t = PlacementEngine::new(&req).unwrap().run().unwrap();
        assert_eq!(t.status, GenerationStatus::Complete);
        assert_eq!(t.stats.teachers_below_minimum, vec![TeacherId::from("bob")]);
    }

    #[test]
    fn day_pace_is_shared_between_subjects() {
        let req = request(
            vec![Teacher::new("ana", &["Math"], 10), Teacher::new("bob", &["Art"], 10)],
            vec![Subject::new("Math", 3), Subject::new("Art", 2)],
        );
        let t = PlacementEngine::new(&req).unwrap().run().unwrap();
        // the Math pair fills day 0; on day 1 Math takes one block and Art the other
        assert_eq!(
            slots_of(&t, "Math"),
            vec![(0, 0, "ana".to_string()), (0, 1, "ana".to_string()), (1, 0, "ana".to_string())]
        );
        assert_eq!(
            slots_of(&t, "Art"),
            vec![(1, 1, "bob".to_string()), (2, 0, "bob".to_string())]
        );
        assert_eq!(t.stats.rounds, 1);
        assert!(t.validation.ok, "{:?}", t.validation.violations);
    }
}
