//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no server needed.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use fractal_api::error::AppError;
use fractal_core::error::CoreError;
use fractal_core::kernel::RenderError;
use fractal_engine::EngineError;
use http_body_util::BodyExt;

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ---------------------------------------------------------------------------
// Test: missing job maps to 404 job_not_found
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_job_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Job",
        id: "abc123".into(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["ok"], false);
    assert_eq!(json["error"], "job_not_found");
}

// ---------------------------------------------------------------------------
// Test: validation maps to 400
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validation_error_returns_400() {
    let err = AppError::from(EngineError::Core(CoreError::Validation(
        "width must be positive".into(),
    )));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_request");
    assert_eq!(json["message"], "width must be positive");
}

// ---------------------------------------------------------------------------
// Test: internal failures hide their details
// ---------------------------------------------------------------------------

#[tokio::test]
async fn internal_errors_are_sanitized() {
    let err = AppError::Core(CoreError::Internal("disk on fire".into()));
    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "internal_error");
    assert!(json.get("message").is_none());

    let err = AppError::from(EngineError::Render(RenderError::Panicked {
        y0: 0,
        y1: 16,
        message: "boom".into(),
    }));
    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "internal_error");
}

#[tokio::test]
async fn database_error_returns_500() {
    let (status, json) = error_to_response(AppError::Database(sqlx::Error::PoolClosed)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["ok"], false);
}
