use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::engine::InitError;
use crate::session::SessionLimitReached;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// User SQL errors never appear here: they are graded and returned as data.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Challenge setup failed: {0}")]
    Setup(#[from] InitError),

    #[error(transparent)]
    SessionLimit(#[from] SessionLimitReached),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Setup(e) => {
                tracing::error!("Challenge setup error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CHALLENGE_SETUP_ERROR",
                    "The challenge database could not be prepared".to_string(),
                )
            }
            AppError::SessionLimit(e) => {
                tracing::warn!("{e}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SESSION_LIMIT",
                    "Too many active sessions, try again later".to_string(),
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
    fn test_status_codes() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (
                AppError::Setup(InitError::SchemaMismatch("x".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::SessionLimit(SessionLimitReached { capacity: 1 }),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
