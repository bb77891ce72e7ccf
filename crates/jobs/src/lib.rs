pub mod store;

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use timetable_core::{ConfigurationError, Generator};
use tracing::{error, info};
use types::{GenerateRequest, Timetable};
use utoipa::ToSchema;
use uuid::Uuid;

pub use store::{PlacementConflict, ScheduleStore};

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema, PartialEq, Eq, Hash)]
pub struct JobId(pub String);

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Generated { timetable: Timetable },
    /// The request failed configuration checks; nothing was generated.
    Rejected { problems: Vec<String> },
    Failed { message: String },
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, JobStatus::Queued | JobStatus::Running)
    }
}

#[derive(Clone)]
pub struct InMemJobs<G: Generator> {
    inner: Arc<RwLock<HashMap<String, JobStatus>>>,
    generator: Arc<G>,
    store: ScheduleStore,
}

impl<G: Generator> InMemJobs<G> {
    pub fn new(generator: G, store: ScheduleStore) -> Self {
        Self {
            inner: Default::default(),
            generator: Arc::new(generator),
            store,
        }
    }

    pub fn enqueue(&self, req: GenerateRequest) -> JobId {
        let id = Uuid::new_v4().to_string();
        self.inner.write().insert(id.clone(), JobStatus::Queued);

        let map = self.inner.clone();
        let generator = self.generator.clone();
        let store = self.store.clone();
        let id_for_task = id.clone();

        tokio::spawn(async move {
            map.write().insert(id_for_task.clone(), JobStatus::Running);
            let status = match generator.generate(req).await {
                Ok(timetable) => {
                    store.replace(timetable.assignments.clone());
                    info!(job = %id_for_task, assigned = timetable.stats.total_assigned, "job generated");
                    JobStatus::Generated { timetable }
                }
                Err(e) => match e.downcast_ref::<ConfigurationError>() {
                    Some(cfg) => {
                        info!(job = %id_for_task, %cfg, "job rejected");
                        JobStatus::Rejected {
                            problems: cfg.problems().to_vec(),
                        }
                    }
                    None => {
                        error!(job = %id_for_task, ?e, "job failed");
                        JobStatus::Failed {
                            message: e.to_string(),
                        }
                    }
                },
            };
            map.write().insert(id_for_task, status);
        });

        JobId(id)
    }

    pub fn get(&self, id: &str) -> Option<JobStatus> {
        self.inner.read().get(id).cloned()
    }

    pub fn store(&self) -> &ScheduleStore {
        &self.store
    }
}
