//! In-memory job registry.
//!
//! One map of job id to [`Job`], guarded by a single mutex. Every read and
//! write of a job's status, progress and result goes through this type.

use std::collections::HashMap;
use std::time::Duration;

use fractal_core::error::CoreError;
use fractal_core::job::{Job, JobSnapshot, JobStatus};
use fractal_core::types::{JobId, Pixel, Timestamp};
use serde::Serialize;
use tokio::sync::Mutex;

/// A job snapshot plus, when requested and available, its pixel buffer.
#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    #[serde(flatten)]
    pub snapshot: JobSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Vec<Pixel>>,
}

/// Thread-safe keyed store of job records.
///
/// Designed to be wrapped in `Arc` and shared between the API and the
/// supervising tasks. Records are never evicted.
#[derive(Default)]
pub struct JobRegistry {
    jobs: Mutex<HashMap<JobId, Job>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new job. Fails if the id is already taken.
    pub async fn insert(&self, job: Job) -> Result<(), CoreError> {
        let mut jobs = self.jobs.lock().await;
        if jobs.contains_key(job.id()) {
            return Err(CoreError::Conflict(format!(
                "Job {} is already registered",
                job.id()
            )));
        }
        jobs.insert(job.id().to_string(), job);
        Ok(())
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.jobs.lock().await.contains_key(id)
    }

    /// Current metadata for a job.
    pub async fn snapshot(&self, id: &str) -> Option<JobSnapshot> {
        self.jobs.lock().await.get(id).map(Job::snapshot)
    }

    /// Snapshot plus the result buffer when `include_result` is set and the
    /// job is `Done`.
    pub async fn view(&self, id: &str, include_result: bool) -> Option<JobView> {
        let jobs = self.jobs.lock().await;
        let job = jobs.get(id)?;
        let result = if include_result && job.status() == JobStatus::Done {
            job.result().map(<[Pixel]>::to_vec)
        } else {
            None
        };
        Some(JobView {
            snapshot: job.snapshot(),
            result,
        })
    }

    /// Raise a running job's progress. Returns the stored progress, or
    /// `None` if the job is unknown.
    pub async fn record_progress(&self, id: &str, progress: f64, now: Timestamp) -> Option<f64> {
        let mut jobs = self.jobs.lock().await;
        let job = jobs.get_mut(id)?;
        job.record_progress(progress, now);
        Some(job.progress())
    }

    /// Move a job to `Done` and return its terminal snapshot.
    pub async fn complete(
        &self,
        id: &str,
        result: Vec<Pixel>,
        elapsed: Duration,
        now: Timestamp,
    ) -> Result<JobSnapshot, CoreError> {
        let mut jobs = self.jobs.lock().await;
        let job = jobs.get_mut(id).ok_or_else(|| not_found(id))?;
        job.complete(result, elapsed, now)?;
        Ok(job.snapshot())
    }

    /// Move a job to `Failed` and return its terminal snapshot.
    pub async fn fail(
        &self,
        id: &str,
        elapsed: Duration,
        now: Timestamp,
    ) -> Result<JobSnapshot, CoreError> {
        let mut jobs = self.jobs.lock().await;
        let job = jobs.get_mut(id).ok_or_else(|| not_found(id))?;
        job.fail(elapsed, now)?;
        Ok(job.snapshot())
    }

    /// Number of registered jobs.
    pub async fn len(&self) -> usize {
        self.jobs.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.lock().await.is_empty()
    }

    /// Number of jobs still running.
    pub async fn running_count(&self) -> usize {
        self.jobs
            .lock()
            .await
            .values()
            .filter(|job| job.status() == JobStatus::Running)
            .count()
    }
}

fn not_found(id: &str) -> CoreError {
    CoreError::NotFound {
        entity: "Job",
        id: id.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
