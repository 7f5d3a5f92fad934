use fractal_core::error::CoreError;
use fractal_core::kernel::RenderError;

/// Errors raised while executing a render job.
///
/// Any of these collapses the job to `Failed`; only `Core` errors can also
/// reach callers of the engine API (not-found lookups, store failures).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Failed to build worker pool with {workers} threads: {reason}")]
    PoolBuild { workers: usize, reason: String },

    #[error("Chunk [{y0}, {y1}) with {len} pixels does not fit a {width}x{height} buffer")]
    Aggregation {
        y0: u32,
        y1: u32,
        len: usize,
        width: u32,
        height: u32,
    },

    #[error("Render workers stopped after {received} of {expected} chunks")]
    Incomplete { received: usize, expected: usize },
}

pub type EngineResult<T> = Result<T, EngineError>;
