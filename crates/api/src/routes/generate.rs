use axum::{extract::State, Json};
use timetable_core::Generator;
use types::{GenerateRequest, Timetable};

use crate::error::{ApiError, ErrorBody};
use crate::state::AppState;

/// Runs the engine inline and stores the result as the current week.
#[utoipa::path(
    post,
    path = "/v1/generate",
    tag = "timetable",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Generated timetable; unmet demand is listed in stats.perSubjectUnmet", body = Timetable),
        (status = 400, description = "Invalid configuration", body = ErrorBody)
    )
)]
pub async fn generate(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<Timetable>, ApiError> {
    let timetable = state.generator.generate(req).await?;
    state.store.replace(timetable.assignments.clone());
    Ok(Json(timetable))
}
