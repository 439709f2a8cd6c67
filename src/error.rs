use crate::datasource::DataSourceError;
use crate::domain::ValidationError;
use crate::submit::SubmitError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Outcome of a split operation that did not go through. None of these are
/// fatal; the session state is left as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Failed to analyze history: {0}")]
    Fetch(#[from] DataSourceError),
    #[error("Connect wallet first")]
    NotConnected,
    #[error(transparent)]
    Submission(#[from] SubmitError),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<SplitError> for AppError {
    fn from(err: SplitError) -> Self {
        let message = err.to_string();
        match err {
            SplitError::Validation(e) => e.into(),
            SplitError::NotConnected => AppError::BadRequest(message),
            SplitError::Fetch(_) | SplitError::Submission(_) => AppError::Upstream(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
