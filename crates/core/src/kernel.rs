//! Escape-time render kernel.
//!
//! Computes the anti-aliased iteration counts for one row band. Every pixel
//! takes `samples` jittered sub-samples drawn from a PRNG seeded with the
//! chunk seed, so a chunk always renders to the same values.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::partition::Chunk;
use crate::types::Pixel;

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// Width of the real axis covered by the image.
pub const VIEW_REAL_SPAN: f64 = 3.5;
/// Real coordinate of the left image edge.
pub const VIEW_REAL_MIN: f64 = -2.5;
/// Height of the imaginary axis covered by the image.
pub const VIEW_IMAG_SPAN: f64 = 2.0;
/// Imaginary coordinate of the top image edge.
pub const VIEW_IMAG_MIN: f64 = -1.0;

/// Squared magnitude above which an orbit is considered escaped.
pub const ESCAPE_RADIUS_SQ: f64 = 4.0;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The plain, copyable job parameters a worker needs to render a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelParams {
    pub width: u32,
    pub height: u32,
    pub max_iter: u32,
    pub samples: u32,
}

/// Pixel values for one rendered band, row-major within the band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkOutput {
    pub y0: u32,
    pub y1: u32,
    pub pixels: Vec<Pixel>,
}

/// Failure raised while computing a chunk.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("Invalid chunk [{y0}, {y1}): {reason}")]
    InvalidChunk { y0: u32, y1: u32, reason: String },

    #[error("Render worker panicked on chunk [{y0}, {y1}): {message}")]
    Panicked { y0: u32, y1: u32, message: String },
}

/// Something that can turn a chunk into pixel values.
///
/// Implementations must be pure with respect to `(params, chunk)` and safe
/// to call from many worker threads at once.
pub trait ChunkRenderer: Send + Sync {
    fn render(&self, params: &KernelParams, chunk: Chunk) -> Result<ChunkOutput, RenderError>;
}

/// The production escape-time renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct EscapeTimeKernel;

impl ChunkRenderer for EscapeTimeKernel {
    fn render(&self, params: &KernelParams, chunk: Chunk) -> Result<ChunkOutput, RenderError> {
        render_chunk(params, chunk.y0, chunk.y1, chunk.seed)
    }
}

// ---------------------------------------------------------------------------
// Kernel
// ---------------------------------------------------------------------------

/// Number of iterations of `z <- z^2 + c` before `|z|^2 > 4`.
///
/// Returns the zero-based index of the escaping iteration, or `max_iter`
/// when the orbit stays bounded.
pub fn escape_iterations(cx: f64, cy: f64, max_iter: u32) -> u32 {
    let mut zx = 0.0_f64;
    let mut zy = 0.0_f64;
    for i in 0..max_iter {
        let next_x = zx * zx - zy * zy + cx;
        let next_y = 2.0 * zx * zy + cy;
        zx = next_x;
        zy = next_y;
        if zx * zx + zy * zy > ESCAPE_RADIUS_SQ {
            return i;
        }
    }
    max_iter
}

/// Render rows `[y0, y1)` of the image described by `params`.
pub fn render_chunk(
    params: &KernelParams,
    y0: u32,
    y1: u32,
    seed: u64,
) -> Result<ChunkOutput, RenderError> {
    validate_chunk(params, y0, y1)?;

    let width = params.width;
    let width_f = f64::from(width);
    let height_f = f64::from(params.height);
    let samples_f = f64::from(params.samples);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut pixels = Vec::with_capacity((y1 - y0) as usize * width as usize);

    for y in y0..y1 {
        for x in 0..width {
            let mut total = 0.0_f64;
            for _ in 0..params.samples {
                let jx = rng.random::<f64>() - 0.5;
                let jy = rng.random::<f64>() - 0.5;
                let nx = (f64::from(x) + 0.5 + jx) / width_f;
                let ny = (f64::from(y) + 0.5 + jy) / height_f;
                let cx = nx * VIEW_REAL_SPAN + VIEW_REAL_MIN;
                let cy = ny * VIEW_IMAG_SPAN + VIEW_IMAG_MIN;
                total += f64::from(escape_iterations(cx, cy, params.max_iter));
            }
            pixels.push((total / samples_f) as Pixel);
        }
    }

    Ok(ChunkOutput { y0, y1, pixels })
}

fn validate_chunk(params: &KernelParams, y0: u32, y1: u32) -> Result<(), RenderError> {
    let invalid = |reason: &str| RenderError::InvalidChunk {
        y0,
        y1,
        reason: reason.to_string(),
    };
    if y0 >= y1 {
        return Err(invalid("chunk is empty"));
    }
    if y1 > params.height {
        return Err(invalid("chunk extends past the image height"));
    }
    if params.width == 0 {
        return Err(invalid("image width is zero"));
    }
    if params.samples == 0 {
        return Err(invalid("sample count is zero"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
