use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// `NotFound` deliberately covers both "does not exist" and "not yours" for
/// owner-scoped resources, so callers cannot probe for other users' rows.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("LLM error: {0}")]
    Llm(String),

    /// Model output could not be coerced to JSON after every fallback stage.
    /// Carries the raw text for diagnostics; the raw text is logged, never
    /// returned to the client.
    #[error("Unparseable model output: {message}")]
    Parse { message: String, raw: String },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                let (code, message) = classify_db_error(e);
                (StatusCode::INTERNAL_SERVER_ERROR, code, message)
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Parse { message, raw } => {
                tracing::error!("Model output parse failure: {message}; raw output: {raw}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PARSE_ERROR",
                    "The AI response could not be processed".to_string(),
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

/// Maps Postgres constraint violations to clearer response codes.
/// 23505 = unique violation, 23503 = foreign key violation.
fn classify_db_error(e: &sqlx::Error) -> (&'static str, String) {
    if let sqlx::Error::Database(db_err) = e {
        match db_err.code().as_deref() {
            Some("23505") => {
                return (
                    "UNIQUE_VIOLATION",
                    "A record with this identifier already exists".to_string(),
                )
            }
            Some("23503") => {
                return (
                    "FOREIGN_KEY_VIOLATION",
                    "The referenced interview does not exist".to_string(),
                )
            }
            _ => {}
        }
    }
    ("DATABASE_ERROR", "A database error occurred".to_string())
}
