//! Integration tests for the `/api/jobs` and `/api/history` endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post_json, post_raw, wait_for_terminal};
use serde_json::json;

/// Smallest job the clamps allow, rendered on one worker.
fn tiny_job() -> serde_json::Value {
    json!({
        "width": 160,
        "height": 100,
        "max_iter": 50,
        "samples": 1,
        "chunk_size": 25,
        "mode": "single",
    })
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_job_returns_id_and_worker_count() {
    let app = common::build_test_app(common::test_pool().await);

    let response = post_json(app.clone(), "/api/jobs", tiny_job()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["job_id"], "job-000001");
    assert_eq!(json["workers"], 1);
}

#[tokio::test]
async fn multicore_jobs_use_configured_core_count() {
    let app = common::build_test_app(common::test_pool().await);

    let mut body = tiny_job();
    body["mode"] = json!("multicore");
    let json = body_json(post_json(app, "/api/jobs", body).await).await;

    assert_eq!(json["workers"], 4);
}

#[tokio::test]
async fn out_of_range_fields_are_clamped() {
    let app = common::build_test_app(common::test_pool().await);

    let body = json!({
        "width": 10,
        "height": 1,
        "max_iter": 1,
        "samples": 0,
        "chunk_size": 1000,
        "mode": "single",
    });
    let created = body_json(post_json(app.clone(), "/api/jobs", body).await).await;
    let job_id = created["job_id"].as_str().unwrap();

    let json = body_json(get(app, &format!("/api/jobs/{job_id}")).await).await;
    assert_eq!(json["width"], 160);
    assert_eq!(json["height"], 100);
    assert_eq!(json["max_iter"], 50);
    assert_eq!(json["samples"], 1);
    assert_eq!(json["chunk_size"], 128);
}

#[tokio::test]
async fn malformed_body_uses_defaults() {
    let app = common::build_test_app(common::test_pool().await);

    let response = post_raw(app.clone(), "/api/jobs", "{not json").await;
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    assert_eq!(created["workers"], 4);

    let job_id = created["job_id"].as_str().unwrap();
    let json = body_json(get(app, &format!("/api/jobs/{job_id}")).await).await;
    assert_eq!(json["mode"], "multicore");
    assert_eq!(json["width"], 640);
    assert_eq!(json["height"], 360);
    assert_eq!(json["max_iter"], 500);
    assert_eq!(json["samples"], 2);
    assert_eq!(json["chunk_size"], 16);
}

#[tokio::test]
async fn float_width_keeps_the_other_fields() {
    let app = common::build_test_app(common::test_pool().await);

    let body = json!({"width": 800.0, "height": "120", "mode": "single"});
    let created = body_json(post_json(app.clone(), "/api/jobs", body).await).await;
    assert_eq!(created["workers"], 1);

    let job_id = created["job_id"].as_str().unwrap();
    let json = body_json(get(app, &format!("/api/jobs/{job_id}")).await).await;
    assert_eq!(json["mode"], "single");
    assert_eq!(json["width"], 800);
    assert_eq!(json["height"], 120);
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

#[tokio::test]
async fn finished_job_reports_result_only_when_requested() {
    let app = common::build_test_app(common::test_pool().await);
    let created = body_json(post_json(app.clone(), "/api/jobs", tiny_job()).await).await;
    let job_id = created["job_id"].as_str().unwrap();

    let done = wait_for_terminal(&app, job_id, "?include_result=1").await;
    assert_eq!(done["ok"], true);
    assert_eq!(done["status"], "done");
    assert_eq!(done["progress"], 1.0);
    assert!(done["duration_ms"].is_number());
    assert!(done["pixels_per_second"].is_number());
    let pixels = done["result"].as_array().unwrap();
    assert_eq!(pixels.len(), 160 * 100);
    assert!(pixels.iter().all(|p| p.as_u64().unwrap() <= 50));

    let plain = body_json(get(app, &format!("/api/jobs/{job_id}")).await).await;
    assert_eq!(plain["status"], "done");
    assert!(plain.get("result").is_none());
}

#[tokio::test]
async fn unknown_job_returns_404() {
    let app = common::build_test_app(common::test_pool().await);

    let response = get(app, "/api/jobs/does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["ok"], false);
    assert_eq!(json["error"], "job_not_found");
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[tokio::test]
async fn history_lists_persisted_jobs_newest_first() {
    let app = common::build_test_app(common::test_pool().await);

    let empty = body_json(get(app.clone(), "/api/history").await).await;
    assert_eq!(empty["ok"], true);
    assert_eq!(empty["items"], json!([]));

    for _ in 0..2 {
        let created = body_json(post_json(app.clone(), "/api/jobs", tiny_job()).await).await;
        wait_for_terminal(&app, created["job_id"].as_str().unwrap(), "").await;
    }

    // The terminal row is written just after the in-memory transition.
    let mut json = serde_json::Value::Null;
    for _ in 0..500 {
        json = body_json(get(app.clone(), "/api/history").await).await;
        if json["items"].as_array().unwrap().iter().all(|item| item["status"] == "done") {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }

    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], "job-000002");
    assert_eq!(items[1]["id"], "job-000001");
    assert!(items.iter().all(|item| item["status"] == "done"));
    assert!(items.iter().all(|item| item.get("result").is_none()));
}
