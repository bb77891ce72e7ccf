use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use jobs::PlacementConflict;
use serde::Serialize;
use timetable_core::ConfigurationError;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub problems: Vec<String>,
}

#[derive(Debug)]
pub enum ApiError {
    Rejected(ConfigurationError),
    NotFound(String),
    Conflict(PlacementConflict),
    Internal(anyhow::Error),
}

impl From<ConfigurationError> for ApiError {
    fn from(e: ConfigurationError) -> Self {
        ApiError::Rejected(e)
    }
}

impl From<PlacementConflict> for ApiError {
    fn from(e: PlacementConflict) -> Self {
        ApiError::Conflict(e)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        match e.downcast::<ConfigurationError>() {
            Ok(cfg) => ApiError::Rejected(cfg),
            Err(other) => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Rejected(cfg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: cfg.to_string(),
                    problems: cfg.problems().to_vec(),
                },
            ),
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: format!("{what} not found"),
                    problems: Vec::new(),
                },
            ),
            ApiError::Conflict(c) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    error: c.to_string(),
                    problems: Vec::new(),
                },
            ),
            ApiError::Internal(e) => {
                tracing::error!(error = ?e, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "internal error".into(),
                        problems: Vec::new(),
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
