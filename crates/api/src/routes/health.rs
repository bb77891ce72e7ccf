#[utoipa::path(
    get,
    path = "/v1/health",
    tag = "timetable",
    responses((status = 200, description = "Service is up", body = String))
)]
pub async fn health() -> &'static str {
    "ok"
}
