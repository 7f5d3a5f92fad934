use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fractal_core::error::CoreError;
use fractal_engine::EngineError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] to produce `{"ok": false, "error": <code>}`
/// bodies. Internal details are logged, never returned.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `fractal_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failure inside the render engine.
    #[error(transparent)]
    Engine(EngineError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Core(core) => AppError::Core(core),
            other => AppError::Engine(other),
        }
    }
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    not_found_code(entity),
                    Some(format!("{entity} with id {id} not found")),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", Some(msg.clone())),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
                }
            },
            AppError::Engine(err) => {
                tracing::error!(error = %err, "Render engine error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let mut body = json!({
            "ok": false,
            "error": code,
        });
        if let Some(message) = message {
            body["message"] = message.into();
        }

        (status, axum::Json(body)).into_response()
    }
}

fn not_found_code(entity: &str) -> &'static str {
    match entity {
        "Job" => "job_not_found",
        _ => "not_found",
    }
}
