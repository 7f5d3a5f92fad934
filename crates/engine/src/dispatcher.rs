//! Per-job worker pool and chunk dispatch.
//!
//! Each job gets its own rayon pool sized to the job's worker count, so the
//! CPU-bound kernel runs truly in parallel without occupying tokio worker
//! threads. Completed chunks flow back over an unbounded channel in the
//! order they finish.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use fractal_core::kernel::{ChunkOutput, ChunkRenderer, KernelParams, RenderError};
use fractal_core::partition::Chunk;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tokio::sync::mpsc;

use crate::error::{EngineError, EngineResult};

/// Outcome of rendering a single chunk.
pub type ChunkResult = Result<ChunkOutput, RenderError>;

/// A pool of OS threads dedicated to one job.
pub struct WorkerPool {
    pool: ThreadPool,
    workers: usize,
}

impl WorkerPool {
    /// Build a pool with exactly `workers` threads (at least one).
    pub fn new(workers: usize) -> EngineResult<Self> {
        let workers = workers.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("render-worker-{i}"))
            .build()
            .map_err(|e| EngineError::PoolBuild {
                workers,
                reason: e.to_string(),
            })?;
        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Queue every chunk on the pool and return a handle for consuming the
    /// results as they complete.
    ///
    /// Renderer panics are caught and reported as
    /// [`RenderError::Panicked`]. Once the returned [`Dispatch`] is aborted
    /// or dropped, chunks that have not started yet are skipped.
    pub fn dispatch(
        &self,
        params: KernelParams,
        chunks: &[Chunk],
        renderer: Arc<dyn ChunkRenderer>,
    ) -> Dispatch {
        let (tx, rx) = mpsc::unbounded_channel();
        let abort = Arc::new(AtomicBool::new(false));

        for &chunk in chunks {
            let tx = tx.clone();
            let abort = Arc::clone(&abort);
            let renderer = Arc::clone(&renderer);
            self.pool.spawn(move || {
                if abort.load(Ordering::Acquire) {
                    return;
                }
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    renderer.render(&params, chunk)
                }))
                .unwrap_or_else(|payload| {
                    Err(RenderError::Panicked {
                        y0: chunk.y0,
                        y1: chunk.y1,
                        message: panic_message(payload.as_ref()),
                    })
                });
                // The receiver is gone once the job has already finished.
                let _ = tx.send(result);
            });
        }

        Dispatch {
            rx,
            abort,
            expected: chunks.len(),
        }
    }
}

/// Receiving side of a dispatched job.
pub struct Dispatch {
    rx: mpsc::UnboundedReceiver<ChunkResult>,
    abort: Arc<AtomicBool>,
    expected: usize,
}

impl Dispatch {
    /// Wait for the next completed chunk.
    ///
    /// Returns `None` once every queued chunk has either reported or been
    /// skipped after an abort.
    pub async fn next(&mut self) -> Option<ChunkResult> {
        self.rx.recv().await
    }

    /// Number of chunks queued by this dispatch.
    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Stop starting new chunks. Chunks already rendering run to completion
    /// and their results are discarded.
    pub fn abort(&self) {
        self.abort.store(true, Ordering::Release);
    }
}

impl Drop for Dispatch {
    fn drop(&mut self) {
        self.abort();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
