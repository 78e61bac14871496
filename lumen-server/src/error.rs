use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lumen_core::{ControllerError, ReportError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors surfaced to HTTP clients as `{"detail": "..."}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BadGateway(String),

    /// Logged server-side; clients only see a generic message.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = match self {
            ApiError::Internal(ref message) => {
                error!("{}", message);
                "Internal server error".to_string()
            }
            ref other => other.to_string(),
        };
        (self.status(), Json(json!({ "detail": detail }))).into_response()
    }
}

impl From<ControllerError> for ApiError {
    fn from(err: ControllerError) -> Self {
        match err {
            ControllerError::AlreadyRunning => ApiError::Conflict(err.to_string()),
            ControllerError::NotRunning => ApiError::Conflict(err.to_string()),
            ControllerError::InvalidRequest(_) => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::NoData => ApiError::BadRequest(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
