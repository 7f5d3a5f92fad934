pub mod health;
pub mod jobs;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /jobs              POST   submit a render job
/// /jobs/{id}         GET    job snapshot (?include_result=1)
/// /history           GET    most recent persisted jobs
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(jobs::router())
}
