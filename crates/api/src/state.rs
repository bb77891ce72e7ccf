use jobs::{InMemJobs, ScheduleStore};
use std::sync::Arc;
use timetable_engine::GreedyGenerator;

#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<InMemJobs<GreedyGenerator>>,
    pub generator: Arc<GreedyGenerator>,
    pub store: ScheduleStore,
}

impl AppState {
    pub fn new_default() -> Self {
        let store = ScheduleStore::new();
        let jobs = InMemJobs::new(GreedyGenerator::new(), store.clone());
        Self {
            jobs: Arc::new(jobs),
            generator: Arc::new(GreedyGenerator::new()),
            store,
        }
    }
}
