//! SQLite-backed implementation of the persistence gateway.

use async_trait::async_trait;
use fractal_core::error::CoreError;
use fractal_core::job::JobSnapshot;
use fractal_core::store::JobStore;

use crate::models::render_job::RenderJobRow;
use crate::repositories::RenderJobRepo;
use crate::DbPool;

/// [`JobStore`] writing to the `render_jobs` table.
#[derive(Clone)]
pub struct SqliteJobStore {
    pool: DbPool,
}

impl SqliteJobStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl JobStore for SqliteJobStore {
    async fn insert(&self, job: &JobSnapshot) -> Result<(), CoreError> {
        RenderJobRepo::insert(&self.pool, &RenderJobRow::from(job))
            .await
            .map_err(|e| db_error("insert", &job.id, e))
    }

    async fn update(&self, job: &JobSnapshot) -> Result<(), CoreError> {
        let updated = RenderJobRepo::update_terminal(&self.pool, &RenderJobRow::from(job))
            .await
            .map_err(|e| db_error("update", &job.id, e))?;
        if !updated {
            return Err(CoreError::NotFound {
                entity: "Job",
                id: job.id.clone(),
            });
        }
        Ok(())
    }
}

fn db_error(action: &str, id: &str, err: sqlx::Error) -> CoreError {
    tracing::error!(job_id = %id, action, error = %err, "Render job row write failed");
    CoreError::Internal(format!("Database {action} failed for job {id}: {err}"))
}
