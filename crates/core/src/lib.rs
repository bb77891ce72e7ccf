pub mod validator;

use async_trait::async_trait;
use std::collections::HashSet;
use thiserror::Error;

pub use types::{
    Assignment, Constraints, GenerateRequest, Subject, SubjectName, Teacher, TeacherId, Timetable,
    ValidationReport, BLOCKS_PER_DAY, DAYS_PER_WEEK,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("invalid configuration: {}", .problems.join("; "))]
    Invalid { problems: Vec<String> },
}

impl ConfigurationError {
    pub fn problems(&self) -> &[String] {
        match self {
            ConfigurationError::Invalid { problems } => problems,
        }
    }
}

/// Checks a generation request before any placement happens.
///
/// Every problem is collected; the request is rejected if there is at least one.
/// Also returns the non-fatal warnings (names in the constraint tables that match no subject).
pub fn validate_request(req: &GenerateRequest) -> Result<Vec<String>, ConfigurationError> {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    if req.teachers.is_empty() {
        errors.push("teacher roster is empty".into());
    }
    if req.subjects.is_empty() {
        errors.push("subject roster is empty".into());
    }

    fn chk_unique<'a>(name: &str, ids: impl Iterator<Item = &'a str>, errors: &mut Vec<String>) {
        let mut seen = HashSet::new();
        for id in ids {
            if !seen.insert(id) {
                errors.push(format!("duplicate {name}: {id}"));
            }
        }
    }
    chk_unique(
        "teacher id",
        req.teachers.iter().map(|t| t.id.0.as_str()),
        &mut errors,
    );
    chk_unique(
        "subject name",
        req.subjects.iter().map(|s| s.name.0.as_str()),
        &mut errors,
    );

    for t in &req.teachers {
        if t.subjects.is_empty() {
            errors.push(format!("teacher {} has an empty capability set", t.id));
        }
        if t.weekly_cap == 0 {
            errors.push(format!("teacher {} has weeklyCap=0", t.id));
        }
        for a in &t.availability {
            if (a.day as usize) >= DAYS_PER_WEEK || (a.block as usize) >= BLOCKS_PER_DAY {
                errors.push(format!(
                    "teacher {} has availability outside the week grid: day {} block {}",
                    t.id, a.day, a.block
                ));
            }
        }
    }

    let c = &req.constraints;
    if c.round_limit == 0 {
        errors.push("roundLimit must be at least 1".into());
    }
    if c.max_subject_per_day == 0 {
        errors.push("maxSubjectPerDay must be at least 1".into());
    }

    let known: HashSet<&SubjectName> = req.subjects.iter().map(|s| &s.name).collect();
    for s in &c.spread_subjects {
        if !known.contains(s) {
            warnings.push(format!("spread subject {s} is not in the subject roster"));
        }
    }
    for s in c.per_subject_daily_cap.keys() {
        if !known.contains(s) {
            warnings.push(format!("daily cap given for unknown subject {s}"));
        }
    }

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(ConfigurationError::Invalid { problems: errors })
    }
}

/// Seam between the timetable engine and whatever drives it (jobs, HTTP).
#[async_trait]
pub trait Generator: Send + Sync + 'static {
    async fn generate(&self, req: GenerateRequest) -> anyhow::Result<Timetable>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{SlotAvailability, Subject, Teacher};

    fn request() -> GenerateRequest {
        GenerateRequest {
            teachers: vec![Teacher::new("ana", &["Math"], 10)],
            subjects: vec![Subject::new("Math", 4)],
            constraints: Constraints::default(),
        }
    }

    #[test]
    fn accepts_minimal_request() {
        assert_eq!(validate_request(&request()), Ok(vec![]));
    }

    #[test]
    fn rejects_empty_rosters() {
        let req = GenerateRequest {
            teachers: vec![],
            subjects: vec![],
            constraints: Constraints::default(),
        };
        let err = validate_request(&req).unwrap_err();
        assert_eq!(
            err.problems(),
            &[
                "teacher roster is empty".to_string(),
                "subject roster is empty".to_string()
            ]
        );
    }

    #[test]
    fn collects_every_teacher_problem() {
        let mut req = request();
        let mut bad = Teacher::new("bob", &[], 0);
        bad.availability.push(SlotAvailability {
            day: 5,
            block: 0,
            available: false,
        });
        req.teachers.push(bad);
        req.teachers.push(Teacher::new("ana", &["Math"], 3));

        let err = validate_request(&req).unwrap_err();
        let problems = err.problems();
        assert_eq!(problems.len(), 4);
        assert!(problems.iter().any(|p| p == "duplicate teacher id: ana"));
        assert!(problems.iter().any(|p| p.contains("empty capability set")));
        assert!(problems.iter().any(|p| p.contains("weeklyCap=0")));
        assert!(problems.iter().any(|p| p.contains("outside the week grid")));
    }

    #[test]
    fn zero_target_is_accepted() {
        let mut req = request();
        req.subjects.push(Subject::new("Art", 0));
        assert!(validate_request(&req).is_ok());
    }

    #[test]
    fn unknown_names_in_constraints_are_warnings() {
        let mut req = request();
        req.constraints.spread_subjects.push("PE".into());
        req.constraints.per_subject_daily_cap.insert("Music".into(), 1);
        let warnings = validate_request(&req).unwrap();
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn rejects_zero_round_limit() {
        let mut req = request();
        req.constraints.round_limit = 0;
        let err = validate_request(&req).unwrap_err();
        assert_eq!(err.to_string(), "invalid configuration: roundLimit must be at least 1");
    }
}
