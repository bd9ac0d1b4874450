use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::annotation::error::LabelingError;
use crate::feed::FeedError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Labeling(#[from] LabelingError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Labeling(e) => {
                let (status, code) = match e {
                    LabelingError::DuplicateName(_) => (StatusCode::CONFLICT, "DUPLICATE_NAME"),
                    LabelingError::InvalidName => (StatusCode::BAD_REQUEST, "INVALID_NAME"),
                    LabelingError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                    LabelingError::NoActiveLabel => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "NO_ACTIVE_LABEL")
                    }
                    LabelingError::EmptyOperation(_) => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "EMPTY_OPERATION")
                    }
                    LabelingError::SubmissionPending(_) => {
                        (StatusCode::CONFLICT, "SUBMISSION_PENDING")
                    }
                };
                (status, code, e.to_string())
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Feed(e) => {
                tracing::error!("Feed error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "FEED_ERROR",
                    "The job-post backend could not be reached".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
