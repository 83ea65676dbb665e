use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::ValidationErrors;
use crate::repositories::RepositoryError;

/// Failures of the workout CRUD operations.
#[derive(Error, Debug)]
pub enum WorkoutError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationErrors),
    #[error("No such workout")]
    NotFound,
    #[error("Workout storage unavailable: {0}")]
    RepositoryUnavailable(#[from] RepositoryError),
}

impl From<JsonRejection> for WorkoutError {
    fn from(rejection: JsonRejection) -> Self {
        WorkoutError::InvalidInput(ValidationErrors::single("body", rejection.body_text()))
    }
}

/// A path segment that cannot be decoded cannot name a stored record.
impl From<PathRejection> for WorkoutError {
    fn from(_: PathRejection) -> Self {
        WorkoutError::NotFound
    }
}

impl IntoResponse for WorkoutError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            WorkoutError::InvalidInput(errors) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "Invalid input",
                    "message": self.to_string(),
                    "fields": errors.errors,
                }),
            ),
            WorkoutError::NotFound => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": "Not found",
                    "message": self.to_string(),
                }),
            ),
            WorkoutError::RepositoryUnavailable(err) => {
                tracing::error!(error = %err, "workout repository call failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({
                        "error": "Storage unavailable",
                        "message": "Workout storage is temporarily unavailable",
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            WorkoutError::InvalidInput(ValidationErrors::single("reps", "must be zero or greater"))
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(WorkoutError::NotFound.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            WorkoutError::RepositoryUnavailable(RepositoryError::Database(
                sqlx::Error::PoolTimedOut
            ))
            .into_response()
            .status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
