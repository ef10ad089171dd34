//! HTTP error mapping.
//!
//! Data endpoints fail fast with a status code and `{ "error": ... }`. The
//! chat endpoint only surfaces `Validation` and `Internal`; remote failures
//! are absorbed by the orchestrator's fallback ladder.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use sunbae_core::error::DatasetError;
use tracing::error;

#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed input (400).
    Validation(String),
    /// Unknown resource such as a calendar year (404).
    NotFound(String),
    /// Unexpected failure (500). The detail is logged, never returned.
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Validation(message) | Self::NotFound(message) => message,
            Self::Internal(detail) => {
                error!(error = %detail, "Request failed");
                "서버 오류가 발생했습니다.".to_string()
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<DatasetError> for ApiError {
    fn from(err: DatasetError) -> Self {
        match err {
            DatasetError::UnknownYear(_) => {
                Self::NotFound("해당 연도의 학사일정을 찾을 수 없습니다.".into())
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<sunbae_core::Error> for ApiError {
    fn from(err: sunbae_core::Error) -> Self {
        match err {
            sunbae_core::Error::Dataset(e) => e.into(),
            other => Self::Internal(other.to_string()),
        }
    }
}
