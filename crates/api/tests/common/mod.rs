#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use fractal_api::config::{LogFormat, ServerConfig};
use fractal_api::router::build_app_router;
use fractal_api::state::AppState;
use fractal_core::clock::SequentialJobIds;
use fractal_db::{DbPool, SqliteJobStore};
use fractal_engine::RenderEngine;
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults and a fixed core count.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        cors_origins: vec!["http://localhost:5055".to_string()],
        request_timeout_secs: 30,
        cpu_cores: 4,
        log_format: LogFormat::Pretty,
    }
}

/// Fresh in-memory database with migrations applied.
pub async fn test_pool() -> DbPool {
    let pool = fractal_db::create_pool("sqlite::memory:").await.unwrap();
    fractal_db::run_migrations(&pool).await.unwrap();
    pool
}

/// Build the full application router, with the production middleware
/// stack, over the given pool. Job ids are sequential (`job-000001`, ...).
pub fn build_test_app(pool: DbPool) -> Router {
    let config = test_config();
    let store = Arc::new(SqliteJobStore::new(pool.clone()));
    let engine = RenderEngine::new(store).with_id_generator(Arc::new(SequentialJobIds::default()));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        engine: Arc::new(engine),
    };
    build_app_router(state, &config)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    post_raw(app, uri, body.to_string()).await
}

pub async fn post_raw(app: Router, uri: &str, body: impl Into<Body>) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Poll `GET /api/jobs/{id}` until the job leaves `running`.
pub async fn wait_for_terminal(app: &Router, job_id: &str, query: &str) -> serde_json::Value {
    for _ in 0..500 {
        let json = body_json(get(app.clone(), &format!("/api/jobs/{job_id}{query}")).await).await;
        if json["status"] != "running" {
            return json;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    panic!("job {job_id} did not finish in time");
}
