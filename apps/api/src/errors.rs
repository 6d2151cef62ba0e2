use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::features::FeatureError;
use crate::matching::MatchError;
use crate::models::RecordError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Feature error: {0}")]
    Feature(#[from] FeatureError),

    #[error("Match error: {0}")]
    Match(#[from] MatchError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<RecordError> for AppError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::MissingField(field) => AppError::MissingField(field),
            RecordError::Malformed(e) => AppError::Validation(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::MissingField(field) => (
                StatusCode::BAD_REQUEST,
                "MISSING_FIELD",
                format!("missing field `{field}`"),
            ),
            AppError::Feature(e) => {
                tracing::error!("Feature error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "FEATURE_ERROR",
                    "Failed to encode the talent/job pair".to_string(),
                )
            }
            AppError::Match(e) => {
                tracing::error!("Match error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "MATCH_ERROR",
                    "Failed to score the talent/job pair".to_string(),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_record_field_maps_to_bad_request() {
        let err: AppError = RecordError::MissingField("max_salary".to_string()).into();
        assert!(matches!(err, AppError::MissingField(ref f) if f == "max_salary"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_match_failure_is_server_error() {
        let err = AppError::from(MatchError::MissingScore {
            expected: 1,
            found: 0,
        });
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
