//! Result aggregation into the job's output buffer.

use fractal_core::kernel::ChunkOutput;
use fractal_core::types::Pixel;

use crate::error::{EngineError, EngineResult};

/// Row-major `width x height` pixel buffer, pre-sized before dispatch.
///
/// Chunks may be written in any order; each one lands at row offset `y0`.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Pixel>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    /// Copy a rendered band into rows `y0..y1`.
    pub fn write_chunk(&mut self, chunk: &ChunkOutput) -> EngineResult<()> {
        let width = self.width as usize;
        let fits = chunk.y0 < chunk.y1
            && chunk.y1 <= self.height
            && chunk.pixels.len() == (chunk.y1 - chunk.y0) as usize * width;
        if !fits {
            return Err(EngineError::Aggregation {
                y0: chunk.y0,
                y1: chunk.y1,
                len: chunk.pixels.len(),
                width: self.width,
                height: self.height,
            });
        }

        let start = chunk.y0 as usize * width;
        self.pixels[start..start + chunk.pixels.len()].copy_from_slice(&chunk.pixels);
        Ok(())
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<Pixel> {
        self.pixels
    }
}
