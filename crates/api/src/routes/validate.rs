use axum::Json;
use serde::{Deserialize, Serialize};
use timetable_core::{validate_request, validator::validate_timetable};
use types::{Assignment, GenerateRequest};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct ValidateIn {
    pub request: GenerateRequest,
    pub assignments: Vec<Assignment>,
}

#[derive(Serialize, ToSchema)]
pub struct ValidateOut {
    pub ok: bool,
    /// `[kind] description` entries for the assignment list.
    pub violations: Vec<String>,
    /// Problems with the request itself.
    pub problems: Vec<String>,
}

#[utoipa::path(
    post,
    path = "/v1/validate",
    tag = "timetable",
    request_body = ValidateIn,
    responses(
        (status = 200, description = "Validation result", body = ValidateOut)
    )
)]
pub async fn validate_handler(Json(input): Json<ValidateIn>) -> Json<ValidateOut> {
    let problems = match validate_request(&input.request) {
        Ok(_) => Vec::new(),
        Err(e) => e.problems().to_vec(),
    };
    let report = validate_timetable(&input.request, &input.assignments);
    Json(ValidateOut {
        ok: report.ok && problems.is_empty(),
        violations: report.violations,
        problems,
    })
}
