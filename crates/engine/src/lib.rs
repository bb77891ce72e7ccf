//! Greedy weekly timetable generation.
//!
//! [`generate`] validates a [`GenerateRequest`], runs the round-based
//! [`PlacementEngine`] over a fresh 5x8 [`SlotGrid`] and returns the
//! [`Timetable`] with statistics and a validation report. Infeasible demand is
//! never an error: it shows up as `stats.per_subject_unmet`.

pub mod demand;
pub mod eligibility;
pub mod engine;
pub mod grid;
pub mod load;

use async_trait::async_trait;
use thiserror::Error;
use timetable_core::{ConfigurationError, Generator};
use types::{GenerateRequest, Timetable};

pub use demand::SubjectDemand;
pub use eligibility::{EligibilityChecker, Ineligible, Rules, Tentative};
pub use engine::PlacementEngine;
pub use grid::{GridError, SlotGrid};
pub use load::TeacherLoadTracker;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("grid invariant broken: {0}")]
    Grid(#[from] GridError),
}

pub fn generate(req: &GenerateRequest) -> Result<Timetable, EngineError> {
    PlacementEngine::new(req)?.run()
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GreedyGenerator;

impl GreedyGenerator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Generator for GreedyGenerator {
    async fn generate(&self, req: GenerateRequest) -> anyhow::Result<Timetable> {
        generate(&req).map_err(|e| match e {
            // keep the typed error reachable through `downcast_ref`
            EngineError::Configuration(c) => anyhow::Error::new(c),
            other => anyhow::Error::new(other),
        })
    }
}
