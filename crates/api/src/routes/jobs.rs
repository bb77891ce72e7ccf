use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use jobs::JobStatus;
use serde::Serialize;
use timetable_core::ConfigurationError;
use types::{GenerateRequest, Timetable};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobCreated {
    pub job_id: String,
    pub status: &'static str,
}

#[utoipa::path(
    post,
    path = "/v1/jobs",
    tag = "timetable",
    request_body = GenerateRequest,
    responses((status = 202, description = "Generation job enqueued", body = JobCreated))
)]
pub async fn enqueue(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> (StatusCode, Json<JobCreated>) {
    let id = state.jobs.enqueue(req);
    (
        StatusCode::ACCEPTED,
        Json(JobCreated {
            job_id: id.0,
            status: "queued",
        }),
    )
}

#[utoipa::path(
    get,
    path = "/v1/jobs/{id}",
    tag = "timetable",
    params(("id" = String, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job status", body = JobStatus),
        (status = 404, description = "Unknown job")
    )
)]
pub async fn status(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.jobs.get(&id) {
        Some(s) => Json(s).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"status": "not_found"})),
        )
            .into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/v1/jobs/{id}/result",
    tag = "timetable",
    params(("id" = String, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Generated timetable", body = Timetable),
        (status = 202, description = "Job still queued or running", body = JobStatus),
        (status = 400, description = "Job was rejected"),
        (status = 404, description = "Unknown job")
    )
)]
pub async fn result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    match state.jobs.get(&id) {
        None => Err(ApiError::NotFound(format!("job {id}"))),
        Some(JobStatus::Generated { timetable }) => Ok(Json(timetable).into_response()),
        Some(JobStatus::Rejected { problems }) => {
            Err(ApiError::Rejected(ConfigurationError::Invalid { problems }))
        }
        Some(s @ JobStatus::Failed { .. }) => {
            Ok((StatusCode::INTERNAL_SERVER_ERROR, Json(s)).into_response())
        }
        Some(s) => Ok((StatusCode::ACCEPTED, Json(s)).into_response()),
    }
}
