use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use utoipa::ToSchema;

pub const DAYS_PER_WEEK: usize = 5;
pub const BLOCKS_PER_DAY: usize = 8;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Clone,
            Debug,
            Serialize,
            Deserialize,
            ToSchema,
            JsonSchema,
            Eq,
            PartialEq,
            Hash,
            PartialOrd,
            Ord,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}
id_newtype!(TeacherId);
id_newtype!(SubjectName);

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
}

impl Weekday {
    pub const ALL: [Weekday; DAYS_PER_WEEK] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ];

    pub fn from_index(day: u8) -> Option<Self> {
        Self::ALL.get(day as usize).copied()
    }

    pub fn index(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Weekday::Mon => "mon",
            Weekday::Tue => "tue",
            Weekday::Wed => "wed",
            Weekday::Thu => "thu",
            Weekday::Fri => "fri",
        };
        f.write_str(s)
    }
}

/// A (day, block) coordinate in the weekly grid.
#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash, PartialOrd, Ord,
)]
pub struct Slot {
    pub day: u8,
    pub block: u8,
}

impl Slot {
    pub fn new(day: u8, block: u8) -> Self {
        Self { day, block }
    }

    pub fn is_in_range(&self) -> bool {
        (self.day as usize) < DAYS_PER_WEEK && (self.block as usize) < BLOCKS_PER_DAY
    }

    /// Every slot of the week, day-major.
    pub fn all() -> impl Iterator<Item = Slot> {
        (0..DAYS_PER_WEEK as u8)
            .flat_map(|day| (0..BLOCKS_PER_DAY as u8).map(move |block| Slot { day, block }))
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Weekday::from_index(self.day) {
            Some(d) => write!(f, "{d}.{}", self.block),
            None => write!(f, "day{}.{}", self.day, self.block),
        }
    }
}

/// Override of a teacher's default (fully available) week.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
pub struct SlotAvailability {
    pub day: u8,
    pub block: u8,
    #[serde(default = "default_true")]
    pub available: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: TeacherId,
    #[serde(default)]
    pub name: String,
    pub subjects: Vec<SubjectName>,
    pub weekly_cap: u32,
    #[serde(default)]
    pub availability: Vec<SlotAvailability>,
}

impl Teacher {
    pub fn new(id: &str, subjects: &[&str], weekly_cap: u32) -> Self {
        Self {
            id: TeacherId::from(id),
            name: id.to_owned(),
            subjects: subjects.iter().map(|s| SubjectName::from(*s)).collect(),
            weekly_cap,
            availability: Vec::new(),
        }
    }

    pub fn can_teach(&self, subject: &SubjectName) -> bool {
        self.subjects.contains(subject)
    }

    /// Expands the sparse overrides into the full 5x8 map. Out-of-range entries are ignored.
    pub fn availability_map(&self) -> [[bool; BLOCKS_PER_DAY]; DAYS_PER_WEEK] {
        let mut map = [[true; BLOCKS_PER_DAY]; DAYS_PER_WEEK];
        for a in &self.availability {
            if let Some(row) = map.get_mut(a.day as usize) {
                if let Some(cell) = row.get_mut(a.block as usize) {
                    *cell = a.available;
                }
            }
        }
        map
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub name: SubjectName,
    pub weekly_target: u32,
}

impl Subject {
    pub fn new(name: &str, weekly_target: u32) -> Self {
        Self {
            name: SubjectName::from(name),
            weekly_target,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_subject_per_day() -> u32 {
    2
}

fn default_round_limit() -> u32 {
    50
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    #[serde(default = "default_max_subject_per_day")]
    pub max_subject_per_day: u32,
    /// Never enforced; teachers left under it are listed in
    /// `TimetableStats::teachers_below_minimum`.
    #[serde(default)]
    pub min_blocks_per_teacher: Option<u32>,
    #[serde(default)]
    pub per_subject_daily_cap: BTreeMap<SubjectName, u32>,
    #[serde(default = "default_true")]
    pub enable_double_block: bool,
    #[serde(default = "default_true")]
    pub avoid_adjacent: bool,
    #[serde(default = "default_round_limit")]
    pub round_limit: u32,
    #[serde(default)]
    pub spread_subjects: Vec<SubjectName>,
    /// `None` means no per-day limit for teachers.
    #[serde(default)]
    pub per_teacher_daily_cap: Option<u32>,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            max_subject_per_day: default_max_subject_per_day(),
            min_blocks_per_teacher: None,
            per_subject_daily_cap: BTreeMap::new(),
            enable_double_block: true,
            avoid_adjacent: true,
            round_limit: default_round_limit(),
            spread_subjects: Vec::new(),
            per_teacher_daily_cap: None,
        }
    }
}

impl Constraints {
    pub fn is_spread(&self, subject: &SubjectName) -> bool {
        self.spread_subjects.contains(subject)
    }

    /// Per-day cap for a subject. Spread subjects never exceed one block a day.
    pub fn daily_cap_for(&self, subject: &SubjectName) -> u32 {
        let cap = self
            .per_subject_daily_cap
            .get(subject)
            .copied()
            .unwrap_or(self.max_subject_per_day);
        if self.is_spread(subject) {
            cap.min(1)
        } else {
            cap
        }
    }

    pub fn weekly_ceiling_for(&self, subject: &SubjectName) -> u32 {
        self.daily_cap_for(subject)
            .saturating_mul(DAYS_PER_WEEK as u32)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub teachers: Vec<Teacher>,
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub constraints: Constraints,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq, Hash)]
pub struct Assignment {
    pub subject: SubjectName,
    pub teacher: TeacherId,
    pub day: u8,
    pub block: u8,
}

impl Assignment {
    pub fn slot(&self) -> Slot {
        Slot::new(self.day, self.block)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum GenerationStatus {
    /// Every subject reached its weekly target.
    Complete,
    /// Some blocks were placed, some demand is left unmet.
    Partial,
    /// Demand existed but nothing could be placed.
    Empty,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum StopReason {
    DemandMet,
    NoProgress,
    RoundLimit,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimetableStats {
    pub total_assigned: u32,
    pub rounds: u32,
    pub stop_reason: StopReason,
    pub per_subject_assigned: BTreeMap<SubjectName, u32>,
    pub per_subject_target: BTreeMap<SubjectName, u32>,
    /// Only subjects that ended the run with demand left.
    pub per_subject_unmet: BTreeMap<SubjectName, u32>,
    pub per_teacher_totals: BTreeMap<TeacherId, u32>,
    pub per_teacher_per_day: BTreeMap<TeacherId, Vec<u32>>,
    pub per_teacher_subjects: BTreeMap<TeacherId, Vec<SubjectName>>,
    /// Teachers whose total is under `minBlocksPerTeacher`, roster order.
    #[serde(default)]
    pub teachers_below_minimum: Vec<TeacherId>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
pub struct ValidationReport {
    pub ok: bool,
    pub violations: Vec<String>,
}

impl ValidationReport {
    pub fn from_violations(violations: Vec<String>) -> Self {
        Self {
            ok: violations.is_empty(),
            violations,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Timetable {
    pub status: GenerationStatus,
    pub assignments: Vec<Assignment>,
    pub stats: TimetableStats,
    pub validation: ValidationReport,
}

impl Timetable {
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}
