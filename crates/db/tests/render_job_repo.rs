//! Integration tests for render job persistence against in-memory SQLite.

use assert_matches::assert_matches;
use chrono::{TimeDelta, Utc};
use fractal_core::error::CoreError;
use fractal_core::job::{JobSnapshot, JobStatus, RenderMode};
use fractal_core::store::JobStore;
use fractal_db::models::render_job::RenderJobRow;
use fractal_db::repositories::render_job_repo::HISTORY_LIMIT;
use fractal_db::repositories::RenderJobRepo;
use fractal_db::{DbPool, SqliteJobStore};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn pool() -> DbPool {
    let pool = fractal_db::create_pool("sqlite::memory:").await.unwrap();
    fractal_db::run_migrations(&pool).await.unwrap();
    pool
}

fn running(id: &str, offset_secs: i64) -> JobSnapshot {
    JobSnapshot {
        id: id.to_string(),
        status: JobStatus::Running,
        progress: 0.0,
        created_at: Utc::now() + TimeDelta::seconds(offset_secs),
        mode: RenderMode::Multicore,
        width: 640,
        height: 360,
        max_iter: 500,
        samples: 2,
        workers: 8,
        chunk_size: 16,
        duration_ms: None,
        pixels_per_second: None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_passes_on_fresh_pool() {
    let pool = pool().await;
    fractal_db::health_check(&pool).await.unwrap();
}

#[tokio::test]
async fn insert_then_find_round_trips_snapshot() {
    let pool = pool().await;
    let job = running("a1b2c3d4e5f6", 0);

    RenderJobRepo::insert(&pool, &RenderJobRow::from(&job)).await.unwrap();

    let row = RenderJobRepo::find_by_id(&pool, &job.id).await.unwrap().unwrap();
    assert_eq!(row.status, "running");
    assert_eq!(row.mode, "multicore");
    let stored = row.into_snapshot().unwrap();
    assert_eq!(stored.id, job.id);
    assert_eq!(stored.width, 640);
    assert_eq!(stored.workers, 8);
    assert_eq!(stored.progress, 0.0);
    assert!(stored.duration_ms.is_none());
}

#[tokio::test]
async fn terminal_update_writes_only_outcome_columns() {
    let pool = pool().await;
    let job = running("job-1", 0);
    RenderJobRepo::insert(&pool, &RenderJobRow::from(&job)).await.unwrap();

    let done = JobSnapshot {
        status: JobStatus::Done,
        progress: 1.0,
        duration_ms: Some(1234.5),
        pixels_per_second: Some(186_661.02),
        // A different width must not overwrite the stored one.
        width: 1,
        ..job.clone()
    };
    let updated = RenderJobRepo::update_terminal(&pool, &RenderJobRow::from(&done))
        .await
        .unwrap();
    assert!(updated);

    let stored = RenderJobRepo::find_by_id(&pool, "job-1")
        .await
        .unwrap()
        .unwrap()
        .into_snapshot()
        .unwrap();
    assert_eq!(stored.status, JobStatus::Done);
    assert_eq!(stored.progress, 1.0);
    assert_eq!(stored.duration_ms, Some(1234.5));
    assert_eq!(stored.pixels_per_second, Some(186_661.02));
    assert_eq!(stored.width, 640);
}

#[tokio::test]
async fn update_of_unknown_row_reports_no_match() {
    let pool = pool().await;
    let updated = RenderJobRepo::update_terminal(&pool, &RenderJobRow::from(&running("ghost", 0)))
        .await
        .unwrap();
    assert!(!updated);
}

#[tokio::test]
async fn duplicate_insert_fails() {
    let pool = pool().await;
    let row = RenderJobRow::from(&running("dup", 0));
    RenderJobRepo::insert(&pool, &row).await.unwrap();
    assert!(RenderJobRepo::insert(&pool, &row).await.is_err());
}

#[tokio::test]
async fn list_recent_is_newest_first_and_capped() {
    let pool = pool().await;
    for i in 0..(HISTORY_LIMIT + 5) {
        let job = running(&format!("job-{i:03}"), i);
        RenderJobRepo::insert(&pool, &RenderJobRow::from(&job)).await.unwrap();
    }

    let rows = RenderJobRepo::list_recent(&pool, 1000).await.unwrap();
    assert_eq!(rows.len(), HISTORY_LIMIT as usize);
    assert_eq!(rows[0].id, format!("job-{:03}", HISTORY_LIMIT + 4));
    assert!(rows.windows(2).all(|w| w[0].created_at >= w[1].created_at));
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sqlite_store_implements_insert_and_update() {
    let store = SqliteJobStore::new(pool().await);
    let job = running("gw-1", 0);

    store.insert(&job).await.unwrap();
    let failed = JobSnapshot {
        status: JobStatus::Failed,
        progress: 1.0,
        duration_ms: Some(12.0),
        ..job.clone()
    };
    store.update(&failed).await.unwrap();

    let stored = RenderJobRepo::find_by_id(store.pool(), "gw-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, "failed");
    assert!(stored.pixels_per_second.is_none());
}

#[tokio::test]
async fn sqlite_store_update_of_unknown_job_is_not_found() {
    let store = SqliteJobStore::new(pool().await);
    assert_matches!(
        store.update(&running("missing", 0)).await,
        Err(CoreError::NotFound { .. })
    );
}

#[tokio::test]
async fn sqlite_store_insert_conflict_is_internal_error() {
    let store = SqliteJobStore::new(pool().await);
    let job = running("twice", 0);
    store.insert(&job).await.unwrap();
    assert_matches!(store.insert(&job).await, Err(CoreError::Internal(_)));
}
