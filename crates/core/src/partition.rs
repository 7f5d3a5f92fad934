//! Domain partitioning: splits the pixel grid into row-band chunks.
//!
//! Each chunk carries a seed derived from its first row so that identical
//! chunk boundaries always sample the same jitter sequence.

/// Multiplier used to derive a chunk seed from its first row.
pub const SEED_MULTIPLIER: u64 = 9973;

/// A contiguous band of rows `[y0, y1)` rendered as one unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub y0: u32,
    pub y1: u32,
    pub seed: u64,
}

impl Chunk {
    /// Build a chunk for rows `[y0, y1)` with its deterministic seed.
    pub fn new(y0: u32, y1: u32) -> Self {
        Self {
            y0,
            y1,
            seed: chunk_seed(y0),
        }
    }

    /// Number of rows in the band.
    pub fn rows(&self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }
}

/// Seed for the chunk starting at row `y0`: `(y0 + 1) * 9973`.
pub fn chunk_seed(y0: u32) -> u64 {
    (u64::from(y0) + 1) * SEED_MULTIPLIER
}

/// Plan the row bands covering `[0, height)`.
///
/// Bands are `chunk_size` rows tall except the last, which is clipped to
/// `height`. A `chunk_size` of zero is treated as one.
pub fn plan(height: u32, chunk_size: u32) -> Vec<Chunk> {
    let step = chunk_size.max(1);
    (0..height)
        .step_by(step as usize)
        .map(|y0| Chunk::new(y0, y0.saturating_add(step).min(height)))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
