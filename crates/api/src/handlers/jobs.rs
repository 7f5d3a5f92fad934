//! Handlers for the `/jobs` and `/history` resources.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::Json;
use fractal_core::job::JobSnapshot;
use fractal_core::request::RenderRequest;
use fractal_db::repositories::render_job_repo::HISTORY_LIMIT;
use fractal_db::repositories::RenderJobRepo;
use fractal_engine::JobView;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::response::OkResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct CreatedJob {
    pub job_id: String,
    pub workers: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct JobQuery {
    pub include_result: Option<String>,
}

impl JobQuery {
    fn wants_result(&self) -> bool {
        self.include_result.as_deref() == Some("1")
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryPage {
    pub items: Vec<JobSnapshot>,
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// POST /api/jobs
///
/// Accepts any body. Missing, malformed or non-object JSON falls back to
/// the default request. Fields are read individually, then defaulted and
/// clamped.
pub async fn create_job(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<OkResponse<CreatedJob>>> {
    let request = parse_request(&body);
    let params = request.resolve(state.config.cpu_cores);

    let submitted = state.engine.submit(params).await?;

    Ok(Json(OkResponse::new(CreatedJob {
        job_id: submitted.snapshot.id,
        workers: submitted.snapshot.workers,
    })))
}

fn parse_request(body: &[u8]) -> RenderRequest {
    if body.is_empty() {
        return RenderRequest::default();
    }
    match serde_json::from_slice(body) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!(error = %e, "Unparseable job request, using defaults");
            RenderRequest::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// GET /api/jobs/{id}
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<JobQuery>,
) -> AppResult<Json<OkResponse<JobView>>> {
    let view = state.engine.get(&id, query.wants_result()).await?;
    Ok(Json(OkResponse::new(view)))
}

/// GET /api/history
///
/// Persisted jobs, newest first.
pub async fn list_history(
    State(state): State<AppState>,
) -> AppResult<Json<OkResponse<HistoryPage>>> {
    let rows = RenderJobRepo::list_recent(&state.pool, HISTORY_LIMIT).await?;
    let items = rows
        .into_iter()
        .map(|row| row.into_snapshot())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(OkResponse::new(HistoryPage { items })))
}
