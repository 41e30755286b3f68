use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;

use crate::scoring::ScoringError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `NOT_FOUND`,
    /// `CONFLICT`, `EXERCISE_UNAVAILABLE`, `CONTEXT_MISMATCH`, `NOT_ELIGIBLE`,
    /// `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Name must be 1-100 characters")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    NotFound(String),
    Conflict(String),
    /// Exercise missing or deactivated.
    ExerciseUnavailable,
    /// Exercise is not linked to the competition named in the request.
    ContextMismatch,
    /// Actor is not registered (directly or through a team) in the competition.
    NotEligible,
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "CONFLICT",
                    message: msg,
                },
            ),
            AppError::ExerciseUnavailable => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "EXERCISE_UNAVAILABLE",
                    message: "Exercise is not available".into(),
                },
            ),
            AppError::ContextMismatch => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "CONTEXT_MISMATCH",
                    message: "Exercise is not part of this competition".into(),
                },
            ),
            AppError::NotEligible => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    code: "NOT_ELIGIBLE",
                    message: "Not eligible to submit in this competition".into(),
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<ScoringError> for AppError {
    fn from(err: ScoringError) -> Self {
        match err {
            ScoringError::ExerciseUnavailable => AppError::ExerciseUnavailable,
            ScoringError::ContextMismatch => AppError::ContextMismatch,
            ScoringError::NotEligible => AppError::NotEligible,
            ScoringError::CompetitionNotFound => {
                AppError::NotFound("Competition not found".into())
            }
            ScoringError::Db(e) => AppError::from(e),
        }
    }
}
