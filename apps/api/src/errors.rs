use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::curation::submission::SubmissionError;
use crate::generation::prompt::PromptError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every variant is a transient notification for the console; none of them
/// ends the panel session.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Generation is cooling down ({remaining_seconds}s left)")]
    CoolingDown { remaining_seconds: u32 },

    #[error("Busy: {0}")]
    Busy(String),

    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl From<PromptError> for AppError {
    fn from(e: PromptError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<SubmissionError> for AppError {
    fn from(e: SubmissionError) -> Self {
        match e {
            SubmissionError::NameRequired | SubmissionError::EmptySelection => {
                AppError::Validation(e.to_string())
            }
            SubmissionError::InFlight => AppError::Busy(e.to_string()),
            SubmissionError::Backend(_) => AppError::Upstream(e.operator_message()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::CoolingDown { remaining_seconds } => (
                StatusCode::TOO_MANY_REQUESTS,
                "COOLING_DOWN",
                format!("Please wait {remaining_seconds}s before generating again"),
            ),
            AppError::Busy(msg) => (StatusCode::CONFLICT, "BUSY", msg.clone()),
            AppError::Upstream(msg) => {
                tracing::warn!("Upstream error: {msg}");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg.clone())
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
