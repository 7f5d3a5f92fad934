//! Per-job supervising task.
//!
//! Partitions the domain, dispatches chunks to the job's worker pool,
//! aggregates completions as they arrive, advances progress, and finally
//! drives the job to `Done` or `Failed` and persists the terminal snapshot.
//! Nothing raised here escapes the task; every failure becomes `Failed`.

use std::sync::Arc;
use std::time::Duration;

use fractal_core::clock::Clock;
use fractal_core::job::{JobSnapshot, JobStatus, RenderParams};
use fractal_core::kernel::ChunkRenderer;
use fractal_core::partition;
use fractal_core::store::JobStore;
use fractal_core::types::{JobId, Pixel, Timestamp};

use crate::aggregator::FrameBuffer;
use crate::dispatcher::WorkerPool;
use crate::error::{EngineError, EngineResult};
use crate::progress::ProgressTracker;
use crate::registry::JobRegistry;

/// Everything a supervising task needs, cheaply cloneable into the task.
#[derive(Clone)]
pub struct Supervisor {
    pub registry: Arc<JobRegistry>,
    pub store: Arc<dyn JobStore>,
    pub clock: Arc<dyn Clock>,
    pub renderer: Arc<dyn ChunkRenderer>,
}

impl Supervisor {
    /// Run one job to its terminal state and return that state.
    pub async fn run(self, job_id: JobId, params: RenderParams) -> JobStatus {
        let started = self.clock.now();
        tracing::info!(
            job_id = %job_id,
            mode = params.mode.as_str(),
            workers = params.workers,
            width = params.width,
            height = params.height,
            "Render job started",
        );

        let outcome = self.render(&job_id, &params).await;

        let finished = self.clock.now();
        let elapsed = elapsed_between(started, finished);

        let terminal = match outcome {
            Ok(pixels) => match self.registry.complete(&job_id, pixels, elapsed, finished).await {
                Ok(snapshot) => Ok(snapshot),
                Err(e) => {
                    tracing::error!(job_id = %job_id, error = %e, "Failed to finalize render job");
                    self.registry.fail(&job_id, elapsed, finished).await
                }
            },
            Err(e) => {
                tracing::error!(job_id = %job_id, error = %e, "Render job failed");
                self.registry.fail(&job_id, elapsed, finished).await
            }
        };

        match terminal {
            Ok(snapshot) => {
                log_terminal(&snapshot);
                self.persist_terminal(&snapshot).await;
                snapshot.status
            }
            Err(e) => {
                tracing::error!(job_id = %job_id, error = %e, "Job missing at terminal transition");
                JobStatus::Failed
            }
        }
    }

    /// Render every chunk and return the assembled buffer.
    ///
    /// Returns on the first chunk error; dropping the dispatch stops any
    /// chunk that has not started yet.
    async fn render(&self, job_id: &str, params: &RenderParams) -> EngineResult<Vec<Pixel>> {
        let chunks = partition::plan(params.height, params.chunk_size);
        let pool = WorkerPool::new(params.workers)?;
        let mut buffer = FrameBuffer::new(params.width, params.height);
        let mut progress = ProgressTracker::new(chunks.len());

        tracing::debug!(
            job_id = %job_id,
            chunks = chunks.len(),
            workers = pool.workers(),
            "Dispatching chunks",
        );

        let mut dispatch = pool.dispatch(
            params.kernel_params(),
            &chunks,
            Arc::clone(&self.renderer),
        );

        while let Some(result) = dispatch.next().await {
            let output = result?;
            buffer.write_chunk(&output)?;
            let fraction = progress.record_chunk();
            self.registry
                .record_progress(job_id, fraction, self.clock.now())
                .await;
        }

        if !progress.is_complete() {
            return Err(EngineError::Incomplete {
                received: progress.completed(),
                expected: progress.total(),
            });
        }

        Ok(buffer.into_pixels())
    }

    async fn persist_terminal(&self, snapshot: &JobSnapshot) {
        if let Err(e) = self.store.update(snapshot).await {
            tracing::error!(
                job_id = %snapshot.id,
                error = %e,
                "Failed to persist terminal job state",
            );
        }
    }
}

fn elapsed_between(started: Timestamp, finished: Timestamp) -> Duration {
    (finished - started).to_std().unwrap_or(Duration::ZERO)
}

fn log_terminal(snapshot: &JobSnapshot) {
    match snapshot.status {
        JobStatus::Done => tracing::info!(
            job_id = %snapshot.id,
            duration_ms = ?snapshot.duration_ms,
            pixels_per_second = ?snapshot.pixels_per_second,
            "Render job completed",
        ),
        _ => tracing::warn!(
            job_id = %snapshot.id,
            duration_ms = ?snapshot.duration_ms,
            "Render job marked failed",
        ),
    }
}
