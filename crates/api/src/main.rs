mod config;
mod error;
mod state;
mod telemetry;
pub mod routes {
    pub mod generate;
    pub mod health;
    pub mod jobs;
    pub mod schedule;
    pub mod validate;
}

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health,
        routes::generate::generate,
        routes::jobs::enqueue,
        routes::jobs::status,
        routes::jobs::result,
        routes::schedule::current,
        routes::schedule::place,
        routes::schedule::remove,
        routes::validate::validate_handler,
    ),
    components(schemas(
        types::GenerateRequest, types::Teacher, types::Subject, types::Constraints,
        types::SlotAvailability, types::Slot, types::Assignment, types::Timetable,
        types::TimetableStats, types::GenerationStatus, types::StopReason,
        types::ValidationReport, types::TeacherId, types::SubjectName,
        jobs::JobId, jobs::JobStatus,
        routes::jobs::JobCreated,
        routes::validate::ValidateIn,
        routes::validate::ValidateOut,
        error::ErrorBody
    )),
    tags(
        (name = "timetable", description = "Weekly timetable generation"),
        (name = "schedule", description = "Stored week and manual edits")
    )
)]
struct ApiDoc;

fn app(state: state::AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/v1/health", get(routes::health::health))
        .route("/v1/generate", post(routes::generate::generate))
        .route("/v1/jobs", post(routes::jobs::enqueue))
        .route("/v1/jobs/:id", get(routes::jobs::status))
        .route("/v1/jobs/:id/result", get(routes::jobs::result))
        .route("/v1/schedule", get(routes::schedule::current))
        .route("/v1/schedule/entries", post(routes::schedule::place))
        .route(
            "/v1/schedule/entries/:day/:block",
            delete(routes::schedule::remove),
        )
        .route("/v1/validate", post(routes::validate::validate_handler))
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(telemetry::stack(body_limit))
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
    }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::ServerConfig::from_env()?;
    telemetry::init_tracing(cfg.log_format);

    let app = app(state::AppState::new_default(), cfg.body_limit);

    let addr = cfg.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, body_limit = cfg.body_limit, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
