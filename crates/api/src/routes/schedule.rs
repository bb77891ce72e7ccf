use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use types::{Assignment, Slot};

use crate::error::{ApiError, ErrorBody};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/v1/schedule",
    tag = "schedule",
    responses((status = 200, description = "Stored week, day-major", body = [Assignment]))
)]
pub async fn current(State(state): State<AppState>) -> Json<Vec<Assignment>> {
    Json(state.store.current())
}

#[utoipa::path(
    post,
    path = "/v1/schedule/entries",
    tag = "schedule",
    request_body = Assignment,
    responses(
        (status = 201, description = "Entry stored", body = Assignment),
        (status = 409, description = "Slot or teacher already taken", body = ErrorBody)
    )
)]
pub async fn place(
    State(state): State<AppState>,
    Json(entry): Json<Assignment>,
) -> Result<(StatusCode, Json<Assignment>), ApiError> {
    state.store.place(entry.clone())?;
    tracing::info!(subject = %entry.subject, teacher = %entry.teacher, slot = %entry.slot(), "manual entry stored");
    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    delete,
    path = "/v1/schedule/entries/{day}/{block}",
    tag = "schedule",
    params(
        ("day" = u8, Path, description = "Day index, 0 = Monday"),
        ("block" = u8, Path, description = "Block index within the day")
    ),
    responses(
        (status = 200, description = "Removed entry", body = Assignment),
        (status = 404, description = "Nothing stored at that slot", body = ErrorBody)
    )
)]
pub async fn remove(
    State(state): State<AppState>,
    Path((day, block)): Path<(u8, u8)>,
) -> Result<Json<Assignment>, ApiError> {
    let slot = Slot::new(day, block);
    state
        .store
        .remove(slot)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("entry at day {day} block {block}")))
}
