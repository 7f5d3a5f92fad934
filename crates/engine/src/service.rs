//! The render engine facade used by the API layer.

use std::sync::Arc;

use fractal_core::clock::{Clock, IdGenerator, SystemClock, UuidJobIds};
use fractal_core::error::CoreError;
use fractal_core::job::{Job, JobSnapshot, JobStatus, RenderParams};
use fractal_core::kernel::{ChunkRenderer, EscapeTimeKernel};
use fractal_core::store::JobStore;
use tokio::task::JoinHandle;

use crate::error::EngineResult;
use crate::registry::{JobRegistry, JobView};
use crate::supervisor::Supervisor;

/// A job that has been registered, persisted and started.
#[derive(Debug)]
pub struct SubmittedJob {
    /// The job as it was created (running, zero progress).
    pub snapshot: JobSnapshot,
    /// Resolves to the terminal status once the supervising task ends.
    pub completion: JoinHandle<JobStatus>,
}

impl SubmittedJob {
    /// Wait for the job to reach a terminal state.
    pub async fn wait(self) -> JobStatus {
        match self.completion.await {
            Ok(status) => status,
            Err(e) => {
                tracing::error!(job_id = %self.snapshot.id, error = %e, "Supervising task aborted");
                JobStatus::Failed
            }
        }
    }
}

/// Accepts render jobs, runs each on its own supervising task, and answers
/// snapshot queries.
///
/// Cheap to share behind an `Arc`; all mutable state lives in the
/// [`JobRegistry`].
pub struct RenderEngine {
    registry: Arc<JobRegistry>,
    store: Arc<dyn JobStore>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    renderer: Arc<dyn ChunkRenderer>,
}

impl RenderEngine {
    /// Engine with the system clock, random ids and the escape-time kernel.
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self {
            registry: Arc::new(JobRegistry::new()),
            store,
            clock: Arc::new(SystemClock),
            ids: Arc::new(UuidJobIds),
            renderer: Arc::new(EscapeTimeKernel),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn ChunkRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    /// Create a job, persist it, register it, and start rendering.
    ///
    /// Must be called from within a tokio runtime. If the initial insert
    /// fails nothing is registered and no work starts. An id already held by
    /// the registry is rejected before anything is written to the store.
    pub async fn submit(&self, params: RenderParams) -> EngineResult<SubmittedJob> {
        validate_params(&params)?;

        let job = Job::new(self.ids.next_id(), params, self.clock.now());
        let snapshot = job.snapshot();

        if self.registry.contains(&snapshot.id).await {
            return Err(CoreError::Conflict(format!(
                "Job {} is already registered",
                snapshot.id
            ))
            .into());
        }

        self.store.insert(&snapshot).await?;
        self.registry.insert(job).await?;

        tracing::info!(
            job_id = %snapshot.id,
            mode = params.mode.as_str(),
            workers = params.workers,
            chunk_size = params.chunk_size,
            "Render job submitted",
        );

        let supervisor = Supervisor {
            registry: Arc::clone(&self.registry),
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            renderer: Arc::clone(&self.renderer),
        };
        let job_id = snapshot.id.clone();
        let completion = tokio::spawn(supervisor.run(job_id, params));

        Ok(SubmittedJob {
            snapshot,
            completion,
        })
    }

    /// Look up a job, optionally with its result buffer.
    pub async fn get(&self, id: &str, include_result: bool) -> EngineResult<JobView> {
        self.registry
            .view(id, include_result)
            .await
            .ok_or_else(|| {
                CoreError::NotFound {
                    entity: "Job",
                    id: id.to_string(),
                }
                .into()
            })
    }
}

/// Reject parameters the engine cannot run. Clamping at the boundary makes
/// these unreachable in practice.
fn validate_params(params: &RenderParams) -> Result<(), CoreError> {
    let checks = [
        ("width", params.width > 0),
        ("height", params.height > 0),
        ("chunk_size", params.chunk_size > 0),
        ("samples", params.samples > 0),
        ("workers", params.workers > 0),
    ];
    for (field, ok) in checks {
        if !ok {
            return Err(CoreError::Validation(format!("{field} must be positive")));
        }
    }
    Ok(())
}
