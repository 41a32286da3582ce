use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;
use serde::Serialize;

/// Every way a request can fail, as seen by the caller
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("You are not authenticated")]
    Unauthenticated,

    #[error("Wrong method")]
    MethodNotAllowed,

    #[error("{0}")]
    Validation(String),

    #[error("Cannot find video id")]
    VideoIdNotFound,

    #[error("Failed to create summary")]
    EmptySummary,

    /// A collaborator (captions, LLM, cache, mail, pdf) failed
    #[error("{0}")]
    Upstream(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::VideoIdNotFound => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::EmptySummary | ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<eyre::Report> for ApiError {
    fn from(report: eyre::Report) -> Self {
        ApiError::Upstream(format!("{report:#}"))
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{status}: {self}");
        }
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
