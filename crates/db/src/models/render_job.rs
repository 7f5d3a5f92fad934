//! Row model for the `render_jobs` table.

use fractal_core::error::CoreError;
use fractal_core::job::{JobSnapshot, JobStatus, RenderMode};
use fractal_core::types::Timestamp;
use sqlx::FromRow;

/// A row from the `render_jobs` table.
#[derive(Debug, Clone, FromRow)]
pub struct RenderJobRow {
    pub id: String,
    pub created_at: Timestamp,
    pub mode: String,
    pub width: i64,
    pub height: i64,
    pub max_iter: i64,
    pub samples: i64,
    pub workers: i64,
    pub chunk_size: i64,
    pub status: String,
    pub progress: f64,
    pub duration_ms: Option<f64>,
    pub pixels_per_second: Option<f64>,
}

impl RenderJobRow {
    /// Convert back into the domain snapshot.
    pub fn into_snapshot(self) -> Result<JobSnapshot, CoreError> {
        Ok(JobSnapshot {
            status: JobStatus::parse(&self.status)?,
            mode: RenderMode::parse(&self.mode),
            width: to_u32("width", self.width)?,
            height: to_u32("height", self.height)?,
            max_iter: to_u32("max_iter", self.max_iter)?,
            samples: to_u32("samples", self.samples)?,
            chunk_size: to_u32("chunk_size", self.chunk_size)?,
            workers: usize::try_from(self.workers).map_err(|_| out_of_range("workers"))?,
            id: self.id,
            progress: self.progress,
            created_at: self.created_at,
            duration_ms: self.duration_ms,
            pixels_per_second: self.pixels_per_second,
        })
    }
}

impl From<&JobSnapshot> for RenderJobRow {
    fn from(job: &JobSnapshot) -> Self {
        Self {
            id: job.id.clone(),
            created_at: job.created_at,
            mode: job.mode.as_str().to_string(),
            width: i64::from(job.width),
            height: i64::from(job.height),
            max_iter: i64::from(job.max_iter),
            samples: i64::from(job.samples),
            workers: job.workers as i64,
            chunk_size: i64::from(job.chunk_size),
            status: job.status.as_str().to_string(),
            progress: job.progress,
            duration_ms: job.duration_ms,
            pixels_per_second: job.pixels_per_second,
        }
    }
}

fn to_u32(field: &'static str, value: i64) -> Result<u32, CoreError> {
    u32::try_from(value).map_err(|_| out_of_range(field))
}

fn out_of_range(field: &str) -> CoreError {
    CoreError::Internal(format!("Stored {field} is out of range"))
}
